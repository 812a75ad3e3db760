//! Leaderboard models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Top reviewer by points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewerEntry {
    pub id: u32,
    pub name: String,
    pub points: i64,
    pub quests: u32,
    pub avatar: String,
}

/// Top earner by redeemed rewards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarnerEntry {
    pub id: u32,
    pub name: String,
    pub rewards: i64,
    pub achievements: u32,
    pub avatar: String,
}

/// Leaderboard season.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Season {
    pub id: String,
    pub name: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

impl Season {
    /// Whole days left in the season at `now` (zero once it ended).
    pub fn days_remaining(&self, now: DateTime<Utc>) -> i64 {
        (self.end_date - now).num_days().max(0)
    }
}

/// A user's standing on the leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRanking {
    pub rank: u32,
    pub percentile: u32,
    pub position: u32,
    pub total: u32,
}

/// Options accepted by the leaderboard lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardOptions {
    /// Truncate to the first `limit` entries when greater than zero.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeframe: Option<String>,
}

impl LeaderboardOptions {
    pub fn apply<T>(&self, mut entries: Vec<T>) -> Vec<T> {
        if let Some(limit) = self.limit.filter(|l| *l > 0) {
            entries.truncate(limit);
        }
        entries
    }
}

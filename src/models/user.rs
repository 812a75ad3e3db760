//! Current user profile, badges and activity.

use serde::{Deserialize, Serialize};

/// Aggregate profile statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub points: i64,
    pub quests: u32,
    pub reviews: u32,
    pub badges: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bugs_found: Option<u32>,
}

/// The single mock "current user".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: u32,
    pub name: String,
    pub avatar: String,
    pub level: u32,
    pub xp: u32,
    pub xp_to_next_level: u32,
    pub title: String,
    pub join_date: String,
    pub stats: UserStats,
}

impl UserProfile {
    /// Progress towards the next level, clamped to 0..=100.
    pub fn xp_progress_percent(&self) -> u32 {
        if self.xp_to_next_level == 0 {
            return 100;
        }
        ((u64::from(self.xp) * 100) / u64::from(self.xp_to_next_level)).min(100) as u32
    }
}

/// Profile statistics snapshot (subset of the profile plus bug count).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStatsSnapshot {
    pub id: u32,
    pub name: String,
    pub level: u32,
    pub xp: u32,
    pub xp_to_next_level: u32,
    pub stats: UserStats,
}

/// Achievement badge shown on the profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Badge {
    pub id: u32,
    pub name: String,
    pub icon: String,
    pub description: String,
    pub unlocked: bool,
}

/// Badge earned through review milestones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewBadge {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub requirement: u32,

    #[serde(rename = "type")]
    pub badge_type: String,
}

/// Kind of activity history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityType {
    Review,
    Badge,
    Level,
    Quest,
}

impl std::str::FromStr for ActivityType {
    type Err = crate::error::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "review" => Ok(Self::Review),
            "badge" => Ok(Self::Badge),
            "level" => Ok(Self::Level),
            "quest" => Ok(Self::Quest),
            other => Err(crate::error::AppError::invalid_input_field(
                format!("Unknown activity type: {}", other),
                "type",
            )),
        }
    }
}

/// Activity history entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: u32,

    #[serde(rename = "type")]
    pub activity_type: ActivityType,

    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<i64>,

    /// Relative date as displayed, e.g. `2 days ago`.
    pub date: String,

    pub icon: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityFilters {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub activity_type: Option<ActivityType>,
}

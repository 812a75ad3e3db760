//! Top reviewers and earners for the current season.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::leaderboard::{
    EarnerEntry, LeaderboardOptions, ReviewerEntry, Season, UserRanking,
};
use crate::services::leaderboard::CURRENT_USER;
use crate::services::Services;

use super::Notice;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LeaderboardTab {
    #[default]
    Reviewers,
    Earners,
}

/// Independent loading flags, one per concurrent fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LeaderboardLoading {
    pub reviewers: bool,
    pub earners: bool,
    pub season: bool,
    pub ranking: bool,
}

impl LeaderboardLoading {
    pub fn any(&self) -> bool {
        self.reviewers || self.earners || self.season || self.ranking
    }
}

/// One rendered row of either table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardRow {
    pub rank: usize,
    pub name: String,
    pub avatar: String,
    /// Points for reviewers, reward total for earners.
    pub score: i64,
    /// Quests for reviewers, achievements for earners.
    pub count: u32,
    pub crown: bool,
    pub top_rank: bool,
}

pub struct LeaderboardPage {
    services: Services,
    pub tab: LeaderboardTab,
    pub options: LeaderboardOptions,
    pub reviewers: Vec<ReviewerEntry>,
    pub earners: Vec<EarnerEntry>,
    pub season: Option<Season>,
    pub ranking: Option<UserRanking>,
    pub loading: LeaderboardLoading,
    pub notice: Option<Notice>,
}

impl LeaderboardPage {
    pub fn new(services: Services) -> Self {
        Self {
            services,
            tab: LeaderboardTab::default(),
            options: LeaderboardOptions::default(),
            reviewers: Vec::new(),
            earners: Vec::new(),
            season: None,
            ranking: None,
            loading: LeaderboardLoading::default(),
            notice: None,
        }
    }

    pub async fn load(&mut self) {
        self.loading = LeaderboardLoading {
            reviewers: true,
            earners: true,
            season: true,
            ranking: true,
        };

        let services = &self.services;
        let options = &self.options;
        let (reviewers, earners, season, ranking) = tokio::join!(
            services.leaderboard.get_top_reviewers(options),
            services.leaderboard.get_top_earners(options),
            services.leaderboard.get_current_season(),
            services.leaderboard.get_user_ranking(CURRENT_USER),
        );

        match reviewers {
            Ok(reviewers) => self.reviewers = reviewers,
            Err(e) => self.notice = Some(Notice::failed("Failed to load reviewers", &e)),
        }
        self.loading.reviewers = false;

        match earners {
            Ok(earners) => self.earners = earners,
            Err(e) => self.notice = Some(Notice::failed("Failed to load earners", &e)),
        }
        self.loading.earners = false;

        match season {
            Ok(season) => self.season = Some(season),
            Err(e) => self.notice = Some(Notice::failed("Failed to load season", &e)),
        }
        self.loading.season = false;

        match ranking {
            Ok(ranking) => self.ranking = Some(ranking),
            Err(e) => self.notice = Some(Notice::failed("Failed to load ranking", &e)),
        }
        self.loading.ranking = false;
    }

    pub fn set_tab(&mut self, tab: LeaderboardTab) {
        self.tab = tab;
    }

    /// Rows for the active tab. The leader wears the crown; the top three
    /// are highlighted.
    pub fn rows(&self) -> Vec<LeaderboardRow> {
        let row = |index: usize, name: &str, avatar: &str, score: i64, count: u32| LeaderboardRow {
            rank: index + 1,
            name: name.to_string(),
            avatar: avatar.to_string(),
            score,
            count,
            crown: index == 0,
            top_rank: index < 3,
        };

        match self.tab {
            LeaderboardTab::Reviewers => self
                .reviewers
                .iter()
                .enumerate()
                .map(|(i, r)| row(i, &r.name, &r.avatar, r.points, r.quests))
                .collect(),
            LeaderboardTab::Earners => self
                .earners
                .iter()
                .enumerate()
                .map(|(i, e)| row(i, &e.name, &e.avatar, e.rewards, e.achievements))
                .collect(),
        }
    }

    pub fn days_left(&self, now: DateTime<Utc>) -> Option<i64> {
        self.season.as_ref().map(|s| s.days_remaining(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_clears_every_flag() {
        let mut page = LeaderboardPage::new(Services::mock().unwrap());
        page.load().await;
        assert!(!page.loading.any());
        assert!(page.notice.is_none());
        assert_eq!(page.reviewers.len(), 10);
        assert_eq!(page.earners.len(), 10);
        assert_eq!(page.ranking.as_ref().map(|r| r.rank), Some(5));
    }

    #[tokio::test]
    async fn test_tab_switch_changes_rows() {
        let mut page = LeaderboardPage::new(Services::mock().unwrap());
        page.load().await;

        let reviewers = page.rows();
        assert_eq!(reviewers[0].name, "DragonSlayer");
        assert!(reviewers[0].crown);
        assert!(reviewers[2].top_rank);
        assert!(!reviewers[3].top_rank);

        page.set_tab(LeaderboardTab::Earners);
        let earners = page.rows();
        assert_eq!(earners[0].name, "CodeNinja");
        assert_eq!(earners[0].score, 12500);
    }
}

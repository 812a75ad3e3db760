//! Embedded fixture data.
//!
//! The seed collections ship with the binary as JSON documents and are
//! parsed once when a store is created.

use serde::Deserialize;

use crate::error::AppError;
use crate::models::admin::{Analytics, ManagedProject, ManagedUser, SystemConfig};
use crate::models::git_integration::{ConnectedRepository, RepositoryStats, WebhookEvent};
use crate::models::leaderboard::{EarnerEntry, ReviewerEntry, Season, UserRanking};
use crate::models::merge_request::MergeRequest;
use crate::models::project::{Project, ProjectPerformance, RoutingRule, Team};
use crate::models::reward::{RedemptionRecord, Reward, RewardCategory};
use crate::models::user::{Activity, Badge, ReviewBadge, UserProfile, UserStatsSnapshot};

const MERGE_REQUESTS_JSON: &str = include_str!("fixtures/merge_requests.json");
const REWARDS_JSON: &str = include_str!("fixtures/rewards.json");
const USERS_JSON: &str = include_str!("fixtures/users.json");
const LEADERBOARD_JSON: &str = include_str!("fixtures/leaderboard.json");
const PROJECTS_JSON: &str = include_str!("fixtures/projects.json");
const GIT_JSON: &str = include_str!("fixtures/git.json");
const ADMIN_JSON: &str = include_str!("fixtures/admin.json");

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewFixtures {
    pub merge_requests: Vec<MergeRequest>,
    pub review_badges: Vec<ReviewBadge>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardFixtures {
    pub rewards: Vec<Reward>,
    pub categories: Vec<RewardCategory>,
    pub redemption_history: Vec<RedemptionRecord>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFixtures {
    pub current_user: UserProfile,
    pub badges: Vec<Badge>,
    pub activity: Vec<Activity>,
    pub stats: UserStatsSnapshot,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeaderboardFixtures {
    pub reviewers: Vec<ReviewerEntry>,
    pub earners: Vec<EarnerEntry>,
    pub season: Season,
    pub ranking: UserRanking,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectFixtures {
    pub projects: Vec<Project>,

    /// Routing rules attached to every project detail.
    pub routing_rules: Vec<RoutingRule>,

    pub teams: Vec<Team>,
    pub performance: ProjectPerformance,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitFixtures {
    pub repositories: Vec<ConnectedRepository>,
    pub webhook_events: Vec<WebhookEvent>,
    pub repository_stats: RepositoryStats,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminFixtures {
    pub system_config: SystemConfig,
    pub projects: Vec<ManagedProject>,
    pub users: Vec<ManagedUser>,
    pub analytics: Analytics,
}

/// Every seed collection of the dashboard.
#[derive(Debug, Clone)]
pub struct Fixtures {
    pub review: ReviewFixtures,
    pub rewards: RewardFixtures,
    pub users: UserFixtures,
    pub leaderboard: LeaderboardFixtures,
    pub projects: ProjectFixtures,
    pub git: GitFixtures,
    pub admin: AdminFixtures,
}

impl Fixtures {
    /// Parse the embedded fixture documents.
    pub fn load() -> Result<Self, AppError> {
        Ok(Self {
            review: parse("merge_requests", MERGE_REQUESTS_JSON)?,
            rewards: parse("rewards", REWARDS_JSON)?,
            users: parse("users", USERS_JSON)?,
            leaderboard: parse("leaderboard", LEADERBOARD_JSON)?,
            projects: parse("projects", PROJECTS_JSON)?,
            git: parse("git", GIT_JSON)?,
            admin: parse("admin", ADMIN_JSON)?,
        })
    }
}

fn parse<T: serde::de::DeserializeOwned>(name: &str, raw: &str) -> Result<T, AppError> {
    serde_json::from_str(raw)
        .map_err(|e| AppError::internal(format!("Invalid {} fixture: {}", name, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::merge_request::Severity;
    use crate::models::reward::{Popularity, RedemptionStatus};

    #[test]
    fn test_fixtures_parse() {
        let fixtures = Fixtures::load().unwrap();
        assert_eq!(fixtures.review.merge_requests.len(), 3);
        assert_eq!(fixtures.review.review_badges.len(), 4);
        assert_eq!(fixtures.rewards.rewards.len(), 12);
        assert_eq!(fixtures.rewards.categories.len(), 5);
        assert_eq!(fixtures.users.badges.len(), 12);
        assert_eq!(fixtures.leaderboard.reviewers.len(), 10);
        assert_eq!(fixtures.projects.projects.len(), 3);
        assert_eq!(fixtures.git.webhook_events.len(), 4);
        assert_eq!(fixtures.admin.users.len(), 4);
    }

    #[test]
    fn test_merge_request_fixture_values() {
        let fixtures = Fixtures::load().unwrap();
        let mr = &fixtures.review.merge_requests[0];
        assert_eq!(mr.id, "MR-1423");
        assert_eq!(mr.bugs_total, 4);

        let (_, bug) = mr.find_bug("bug-1").unwrap();
        assert_eq!(bug.severity, Severity::Medium);
        assert_eq!(bug.points, 20);
        assert!(!bug.claimed);
        assert_eq!(bug.line_numbers, vec![32, 38]);

        // Diff text keeps its leading newline so bug lines stay aligned.
        assert!(mr.code_changes[0].diff_content.starts_with('\n'));
    }

    #[test]
    fn test_reward_fixture_values() {
        let fixtures = Fixtures::load().unwrap();
        let vacation = fixtures
            .rewards
            .rewards
            .iter()
            .find(|r| r.id == "reward-4")
            .unwrap();
        assert_eq!(vacation.popularity, Popularity::VeryHigh);
        assert_eq!(vacation.points, 5000);

        let history = &fixtures.rewards.redemption_history;
        assert_eq!(history[0].status, RedemptionStatus::Delivered);
        assert_eq!(history[1].status, RedemptionStatus::Scheduled);
        assert!(history[1].scheduled_for.is_some());
    }

    #[test]
    fn test_user_fixture_values() {
        let fixtures = Fixtures::load().unwrap();
        let user = &fixtures.users.current_user;
        assert_eq!(user.name, "DragonSlayer");
        assert_eq!(user.stats.points, 856);
        assert_eq!(fixtures.users.stats.stats.bugs_found, Some(75));
        assert_eq!(fixtures.users.badges.iter().filter(|b| b.unlocked).count(), 9);
    }
}

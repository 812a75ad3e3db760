//! Administration models: system configuration, managed users and analytics.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::project::{GitProvider, MemberRole};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeverityPoints {
    pub low: i64,
    pub medium: i64,
    pub high: i64,
    pub critical: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeQualityPoints {
    pub minor_improvement: i64,
    pub major_improvement: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipationPoints {
    pub review_completion: i64,
    pub daily_streak: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardPointsConfig {
    pub bug_severity: SeverityPoints,
    pub code_quality: CodeQualityPoints,
    pub participation: ParticipationPoints,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardConfig {
    /// Seconds.
    pub refresh_interval: u64,
    pub top_entries_count: u32,
    /// Days.
    pub season_duration: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitIntegrationConfig {
    pub providers: Vec<GitProvider>,
    pub webhook_endpoint: String,
    /// Seconds.
    pub polling_interval: u64,
}

/// System-wide gamification settings managed by admins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemConfig {
    pub reward_points: RewardPointsConfig,
    pub leaderboard: LeaderboardConfig,
    pub git_integration: GitIntegrationConfig,
}

/// Project row in the admin project list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagedProject {
    pub id: String,
    pub name: String,

    /// `org/name` slug.
    pub repository: String,

    pub git_provider: GitProvider,
    pub teams: Vec<String>,

    #[serde(rename = "activeMRs")]
    pub active_mrs: u32,

    pub total_bugs: u32,
    pub active_since: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewManagedProject {
    pub name: String,
    pub repository: String,
    pub git_provider: GitProvider,

    #[serde(default)]
    pub teams: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddProjectResult {
    pub success: bool,
    pub project: ManagedProject,
}

/// A user as seen by the admin user management screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagedUser {
    pub id: String,
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    pub role: MemberRole,
    pub teams: Vec<String>,
    pub level: u32,
    pub points: i64,
    pub active_since: NaiveDate,
}

/// Data submitted by the admin user form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewManagedUser {
    pub name: String,
    pub email: String,
    pub role: MemberRole,
    pub teams: Vec<String>,
    pub level: u32,
    pub points: i64,
}

impl Default for NewManagedUser {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            role: MemberRole::Reviewer,
            teams: Vec::new(),
            level: 1,
            points: 0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<MemberRole>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
}

impl UserFilters {
    pub fn matches(&self, user: &ManagedUser) -> bool {
        if let Some(role) = self.role {
            if user.role != role {
                return false;
            }
        }
        if let Some(team) = &self.team {
            if !user.teams.iter().any(|t| t == team) {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserActivitySummary {
    pub active_users: u32,
    pub reviews_completed: u32,
    pub bugs_found: u32,
    pub points_awarded: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectHealth {
    pub total_projects: u32,

    #[serde(rename = "activeMRs")]
    pub active_mrs: u32,

    pub avg_review_time: String,
    pub bug_detection_rate: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardCount {
    pub name: String,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardsSummary {
    pub points_redeemed: i64,
    pub top_rewards: Vec<RewardCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trends {
    pub participation_trend: Vec<u32>,
    pub quality_improvement_trend: Vec<u32>,
    pub points_distribution_trend: Vec<u32>,
}

/// Dashboard analytics for the admin overview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analytics {
    pub user_activity: UserActivitySummary,
    pub project_health: ProjectHealth,
    pub rewards: RewardsSummary,
    pub trends: Trends,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_user(role: MemberRole, teams: &[&str]) -> ManagedUser {
        ManagedUser {
            id: "user-1".to_string(),
            name: "DragonSlayer".to_string(),
            email: None,
            role,
            teams: teams.iter().map(|t| t.to_string()).collect(),
            level: 5,
            points: 856,
            active_since: NaiveDate::from_ymd_opt(2023, 3, 15).unwrap(),
        }
    }

    #[test]
    fn test_user_filters() {
        let user = make_user(MemberRole::Reviewer, &["Backend Team"]);
        assert!(UserFilters::default().matches(&user));
        assert!(UserFilters {
            role: Some(MemberRole::Reviewer),
            team: Some("Backend Team".to_string()),
        }
        .matches(&user));
        assert!(!UserFilters {
            role: Some(MemberRole::Admin),
            team: None,
        }
        .matches(&user));
        assert!(!UserFilters {
            role: None,
            team: Some("UX Team".to_string()),
        }
        .matches(&user));
    }

    #[test]
    fn test_managed_user_dates_serialize_as_plain_dates() {
        let json = serde_json::to_string(&make_user(MemberRole::TeamLead, &[])).unwrap();
        assert!(json.contains("\"activeSince\":\"2023-03-15\""));
        assert!(json.contains("\"role\":\"team_lead\""));
    }
}

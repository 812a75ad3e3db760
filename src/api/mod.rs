//! Data-source layer.
//!
//! One async trait per backend domain, combined into [`DataSource`]. The
//! services only ever talk to `Arc<dyn DataSource>`, so the canned
//! [`MockDataSource`] and the HTTP-backed [`RemoteDataSource`] are
//! interchangeable.

pub mod client;
pub mod mock;
pub mod remote;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::admin::{
    AddProjectResult, Analytics, ManagedProject, ManagedUser, NewManagedProject, NewManagedUser,
    SystemConfig, UserFilters,
};
use crate::models::comment::NewComment;
use crate::models::git_integration::{
    ConfigureRepositoryResult, ConnectedRepository, RepositoryConfig, RepositoryFilters,
    RepositoryStats, SyncResult, WebhookEvent, WebhookEventFilters, WebhookTestResult,
};
use crate::models::leaderboard::{
    EarnerEntry, LeaderboardOptions, ReviewerEntry, Season, UserRanking,
};
use crate::models::merge_request::{
    MergeRequest, MergeRequestFilters, ReviewResult, ReviewSubmission,
};
use crate::models::project::{
    CreateProjectResult, NewProject, Project, ProjectFilters, ProjectPerformance, ProjectUpdate,
    RoutingRule, Team, Timeframe,
};
use crate::models::reward::{RedemptionRecord, Reward, RewardCategory, RewardFilters};
use crate::models::user::{Activity, ActivityFilters, Badge, UserProfile, UserStatsSnapshot};
use crate::models::Ack;

pub use client::ApiClient;
pub use mock::MockDataSource;
pub use remote::RemoteDataSource;

/// Response envelope: the decoded body of a backend call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }

    pub fn into_data(self) -> T {
        self.data
    }
}

/// A list endpoint's page of items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemPage<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(default)]
    pub total: usize,
}

impl<T> Default for ItemPage<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
        }
    }
}

/// Backend acknowledgement of a bug claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimAck {
    pub success: bool,
    pub bug_id: String,
    #[serde(default)]
    pub points: i64,
    #[serde(default)]
    pub xp: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentAck {
    pub success: bool,
    pub comment_id: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedeemAck {
    pub success: bool,
    pub transaction_id: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedeemRequest<'a> {
    pub reward_id: &'a str,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AchievementsPayload {
    #[serde(default)]
    pub badges: Vec<Badge>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityPayload {
    #[serde(default)]
    pub activities: Vec<Activity>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardPayload<T> {
    #[serde(default = "Vec::new")]
    pub users: Vec<T>,
}

impl<T> Default for LeaderboardPayload<T> {
    fn default() -> Self {
        Self { users: Vec::new() }
    }
}

/// Generated identifier `<prefix>-<unix millis>`.
pub(crate) fn timestamp_id(prefix: &str, now: DateTime<Utc>) -> String {
    format!("{}-{}", prefix, now.timestamp_millis())
}

#[async_trait]
pub trait MergeRequestApi: Send + Sync {
    async fn get_merge_requests(
        &self,
        filters: &MergeRequestFilters,
    ) -> Result<ApiResponse<ItemPage<MergeRequest>>, AppError>;

    async fn get_merge_request_by_id(
        &self,
        id: &str,
    ) -> Result<ApiResponse<Option<MergeRequest>>, AppError>;

    async fn claim_bug(&self, mr_id: &str, bug_id: &str) -> Result<ApiResponse<ClaimAck>, AppError>;

    async fn submit_review(
        &self,
        mr_id: &str,
        review: &ReviewSubmission,
    ) -> Result<ApiResponse<ReviewResult>, AppError>;

    async fn add_comment(
        &self,
        mr_id: &str,
        comment: &NewComment,
    ) -> Result<ApiResponse<CommentAck>, AppError>;
}

#[async_trait]
pub trait RewardsApi: Send + Sync {
    async fn get_available_rewards(
        &self,
        filters: &RewardFilters,
    ) -> Result<ApiResponse<ItemPage<Reward>>, AppError>;

    async fn get_reward_categories(&self) -> Result<ApiResponse<Vec<RewardCategory>>, AppError>;

    async fn redeem_reward(&self, reward_id: &str) -> Result<ApiResponse<RedeemAck>, AppError>;

    async fn get_redemption_history(&self)
        -> Result<ApiResponse<Vec<RedemptionRecord>>, AppError>;
}

#[async_trait]
pub trait UserApi: Send + Sync {
    async fn get_current_user(&self) -> Result<ApiResponse<Option<UserProfile>>, AppError>;

    async fn get_user_achievements(&self) -> Result<ApiResponse<AchievementsPayload>, AppError>;

    async fn get_user_activity(
        &self,
        filters: &ActivityFilters,
    ) -> Result<ApiResponse<ActivityPayload>, AppError>;

    async fn get_user_stats(&self) -> Result<ApiResponse<Option<UserStatsSnapshot>>, AppError>;
}

#[async_trait]
pub trait LeaderboardApi: Send + Sync {
    async fn get_top_reviewers(
        &self,
        options: &LeaderboardOptions,
    ) -> Result<ApiResponse<LeaderboardPayload<ReviewerEntry>>, AppError>;

    async fn get_top_earners(
        &self,
        options: &LeaderboardOptions,
    ) -> Result<ApiResponse<LeaderboardPayload<EarnerEntry>>, AppError>;

    /// The season is owned by the backend; there is no fixture fallback.
    async fn get_current_season(&self) -> Result<ApiResponse<Season>, AppError>;

    async fn get_user_ranking(
        &self,
        user_id: &str,
    ) -> Result<ApiResponse<Option<UserRanking>>, AppError>;
}

#[async_trait]
pub trait ProjectApi: Send + Sync {
    async fn get_projects(
        &self,
        filters: &ProjectFilters,
    ) -> Result<ApiResponse<Vec<Project>>, AppError>;

    async fn get_project_by_id(&self, id: &str) -> Result<ApiResponse<Option<Project>>, AppError>;

    async fn create_project(
        &self,
        project: &NewProject,
    ) -> Result<ApiResponse<CreateProjectResult>, AppError>;

    async fn update_project(
        &self,
        id: &str,
        update: &ProjectUpdate,
    ) -> Result<ApiResponse<Ack>, AppError>;

    async fn get_project_teams(&self, id: &str) -> Result<ApiResponse<Vec<Team>>, AppError>;

    async fn configure_routing(
        &self,
        id: &str,
        rules: &[RoutingRule],
    ) -> Result<ApiResponse<Ack>, AppError>;

    async fn get_project_metrics(
        &self,
        id: &str,
        timeframe: &Timeframe,
    ) -> Result<ApiResponse<Option<ProjectPerformance>>, AppError>;
}

#[async_trait]
pub trait GitIntegrationApi: Send + Sync {
    async fn configure_repository(
        &self,
        config: &RepositoryConfig,
    ) -> Result<ApiResponse<ConfigureRepositoryResult>, AppError>;

    async fn get_repositories(
        &self,
        filters: &RepositoryFilters,
    ) -> Result<ApiResponse<Vec<ConnectedRepository>>, AppError>;

    /// Sync one repository, or all of them when `repository_id` is `None`.
    async fn trigger_sync(
        &self,
        repository_id: Option<&str>,
    ) -> Result<ApiResponse<SyncResult>, AppError>;

    async fn test_webhook(
        &self,
        repository_id: &str,
    ) -> Result<ApiResponse<WebhookTestResult>, AppError>;

    async fn get_webhook_events(
        &self,
        filters: &WebhookEventFilters,
    ) -> Result<ApiResponse<Vec<WebhookEvent>>, AppError>;

    async fn get_repository_stats(
        &self,
        repository_id: &str,
    ) -> Result<ApiResponse<Option<RepositoryStats>>, AppError>;
}

#[async_trait]
pub trait AdminApi: Send + Sync {
    async fn get_system_config(&self) -> Result<ApiResponse<Option<SystemConfig>>, AppError>;

    async fn update_system_config(
        &self,
        config: &SystemConfig,
    ) -> Result<ApiResponse<Ack>, AppError>;

    async fn get_managed_projects(&self) -> Result<ApiResponse<Vec<ManagedProject>>, AppError>;

    async fn add_managed_project(
        &self,
        project: &NewManagedProject,
    ) -> Result<ApiResponse<AddProjectResult>, AppError>;

    async fn get_managed_users(
        &self,
        filters: &UserFilters,
    ) -> Result<ApiResponse<Vec<ManagedUser>>, AppError>;

    async fn add_managed_user(
        &self,
        user: &NewManagedUser,
    ) -> Result<ApiResponse<ManagedUser>, AppError>;

    async fn get_analytics(
        &self,
        timeframe: &Timeframe,
    ) -> Result<ApiResponse<Option<Analytics>>, AppError>;
}

/// Everything the services need from a backend.
pub trait DataSource:
    MergeRequestApi + RewardsApi + UserApi + LeaderboardApi + ProjectApi + GitIntegrationApi + AdminApi
{
    /// Short name for logs, e.g. `mock` or `remote`.
    fn name(&self) -> &'static str;
}

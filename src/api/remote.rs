//! HTTP-backed data source.

use async_trait::async_trait;

use super::client::segment;
use super::{
    AchievementsPayload, ActivityPayload, AdminApi, ApiClient, ApiResponse, ClaimAck, CommentAck,
    DataSource, GitIntegrationApi, ItemPage, LeaderboardApi, LeaderboardPayload, MergeRequestApi,
    ProjectApi, RedeemAck, RedeemRequest, RewardsApi, UserApi,
};
use crate::config::ApiConfig;
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
use crate::models::user::{ActivityFilters, UserProfile, UserStatsSnapshot};
use crate::models::Ack;
use crate::services::credentials::CredentialService;

/// Data source talking to the rewards backend over HTTP.
#[derive(Debug, Clone)]
pub struct RemoteDataSource {
    client: ApiClient,
}

impl RemoteDataSource {
    /// Build a remote source from configuration, resolving the bearer
    /// token from the configuration or the keychain.
    pub fn from_config(config: &ApiConfig) -> Result<Self, AppError> {
        let token = CredentialService::resolve_auth_token(config);
        if token.is_none() {
            log::info!("[api] No auth token available, sending unauthenticated requests");
        }
        Ok(Self::new(ApiClient::new(config, token.as_deref())?))
    }

    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MergeRequestApi for RemoteDataSource {
    async fn get_merge_requests(
        &self,
        filters: &MergeRequestFilters,
    ) -> Result<ApiResponse<ItemPage<MergeRequest>>, AppError> {
        let page = self.client.get("/merge-requests", Some(filters)).await?;
        Ok(ApiResponse::new(page))
    }

    async fn get_merge_request_by_id(
        &self,
        id: &str,
    ) -> Result<ApiResponse<Option<MergeRequest>>, AppError> {
        let endpoint = format!("/merge-requests/{}", segment(id));
        let mr = self.client.get_optional(&endpoint, None::<&()>).await?;
        Ok(ApiResponse::new(mr))
    }

    async fn claim_bug(&self, mr_id: &str, bug_id: &str) -> Result<ApiResponse<ClaimAck>, AppError> {
        let endpoint = format!(
            "/merge-requests/{}/bugs/{}/claim",
            segment(mr_id),
            segment(bug_id)
        );
        let ack = self.client.post(&endpoint, None::<&()>).await?;
        Ok(ApiResponse::new(ack))
    }

    async fn submit_review(
        &self,
        mr_id: &str,
        review: &ReviewSubmission,
    ) -> Result<ApiResponse<ReviewResult>, AppError> {
        let endpoint = format!("/merge-requests/{}/reviews", segment(mr_id));
        let result = self.client.post(&endpoint, Some(review)).await?;
        Ok(ApiResponse::new(result))
    }

    async fn add_comment(
        &self,
        mr_id: &str,
        comment: &NewComment,
    ) -> Result<ApiResponse<CommentAck>, AppError> {
        let endpoint = format!("/merge-requests/{}/comments", segment(mr_id));
        let ack = self.client.post(&endpoint, Some(comment)).await?;
        Ok(ApiResponse::new(ack))
    }
}

#[async_trait]
impl RewardsApi for RemoteDataSource {
    async fn get_available_rewards(
        &self,
        filters: &RewardFilters,
    ) -> Result<ApiResponse<ItemPage<Reward>>, AppError> {
        let page = self.client.get("/rewards", Some(filters)).await?;
        Ok(ApiResponse::new(page))
    }

    async fn get_reward_categories(&self) -> Result<ApiResponse<Vec<RewardCategory>>, AppError> {
        let categories = self.client.get("/rewards/categories", None::<&()>).await?;
        Ok(ApiResponse::new(categories))
    }

    async fn redeem_reward(&self, reward_id: &str) -> Result<ApiResponse<RedeemAck>, AppError> {
        let ack = self
            .client
            .post("/rewards/redeem", Some(&RedeemRequest { reward_id }))
            .await?;
        Ok(ApiResponse::new(ack))
    }

    async fn get_redemption_history(
        &self,
    ) -> Result<ApiResponse<Vec<RedemptionRecord>>, AppError> {
        let history = self
            .client
            .get("/rewards/redemption-history", None::<&()>)
            .await?;
        Ok(ApiResponse::new(history))
    }
}

#[async_trait]
impl UserApi for RemoteDataSource {
    async fn get_current_user(&self) -> Result<ApiResponse<Option<UserProfile>>, AppError> {
        let user = self.client.get_optional("/users/me", None::<&()>).await?;
        Ok(ApiResponse::new(user))
    }

    async fn get_user_achievements(&self) -> Result<ApiResponse<AchievementsPayload>, AppError> {
        let payload = self
            .client
            .get("/users/me/achievements", None::<&()>)
            .await?;
        Ok(ApiResponse::new(payload))
    }

    async fn get_user_activity(
        &self,
        filters: &ActivityFilters,
    ) -> Result<ApiResponse<ActivityPayload>, AppError> {
        let payload = self.client.get("/users/me/activity", Some(filters)).await?;
        Ok(ApiResponse::new(payload))
    }

    async fn get_user_stats(&self) -> Result<ApiResponse<Option<UserStatsSnapshot>>, AppError> {
        let stats = self
            .client
            .get_optional("/users/me/stats", None::<&()>)
            .await?;
        Ok(ApiResponse::new(stats))
    }
}

#[async_trait]
impl LeaderboardApi for RemoteDataSource {
    async fn get_top_reviewers(
        &self,
        options: &LeaderboardOptions,
    ) -> Result<ApiResponse<LeaderboardPayload<ReviewerEntry>>, AppError> {
        let payload = self
            .client
            .get("/leaderboard/reviewers", Some(options))
            .await?;
        Ok(ApiResponse::new(payload))
    }

    async fn get_top_earners(
        &self,
        options: &LeaderboardOptions,
    ) -> Result<ApiResponse<LeaderboardPayload<EarnerEntry>>, AppError> {
        let payload = self.client.get("/leaderboard/earners", Some(options)).await?;
        Ok(ApiResponse::new(payload))
    }

    async fn get_current_season(&self) -> Result<ApiResponse<Season>, AppError> {
        let season = self
            .client
            .get("/leaderboard/current-season", None::<&()>)
            .await?;
        Ok(ApiResponse::new(season))
    }

    async fn get_user_ranking(
        &self,
        user_id: &str,
    ) -> Result<ApiResponse<Option<UserRanking>>, AppError> {
        let endpoint = format!("/leaderboard/ranking/{}", segment(user_id));
        let ranking = self.client.get_optional(&endpoint, None::<&()>).await?;
        Ok(ApiResponse::new(ranking))
    }
}

#[async_trait]
impl ProjectApi for RemoteDataSource {
    async fn get_projects(
        &self,
        filters: &ProjectFilters,
    ) -> Result<ApiResponse<Vec<Project>>, AppError> {
        let projects = self.client.get("/projects", Some(filters)).await?;
        Ok(ApiResponse::new(projects))
    }

    async fn get_project_by_id(&self, id: &str) -> Result<ApiResponse<Option<Project>>, AppError> {
        let endpoint = format!("/projects/{}", segment(id));
        let project = self.client.get_optional(&endpoint, None::<&()>).await?;
        Ok(ApiResponse::new(project))
    }

    async fn create_project(
        &self,
        project: &NewProject,
    ) -> Result<ApiResponse<CreateProjectResult>, AppError> {
        let result = self.client.post("/projects", Some(project)).await?;
        Ok(ApiResponse::new(result))
    }

    async fn update_project(
        &self,
        id: &str,
        update: &ProjectUpdate,
    ) -> Result<ApiResponse<Ack>, AppError> {
        let endpoint = format!("/projects/{}", segment(id));
        let ack = self.client.put(&endpoint, update).await?;
        Ok(ApiResponse::new(ack))
    }

    async fn get_project_teams(&self, id: &str) -> Result<ApiResponse<Vec<Team>>, AppError> {
        let endpoint = format!("/projects/{}/teams", segment(id));
        let teams = self.client.get(&endpoint, None::<&()>).await?;
        Ok(ApiResponse::new(teams))
    }

    async fn configure_routing(
        &self,
        id: &str,
        rules: &[RoutingRule],
    ) -> Result<ApiResponse<Ack>, AppError> {
        let endpoint = format!("/projects/{}/routing", segment(id));
        let ack = self.client.put(&endpoint, rules).await?;
        Ok(ApiResponse::new(ack))
    }

    async fn get_project_metrics(
        &self,
        id: &str,
        timeframe: &Timeframe,
    ) -> Result<ApiResponse<Option<ProjectPerformance>>, AppError> {
        let endpoint = format!("/projects/{}/metrics", segment(id));
        let metrics = self.client.get_optional(&endpoint, Some(timeframe)).await?;
        Ok(ApiResponse::new(metrics))
    }
}

#[async_trait]
impl GitIntegrationApi for RemoteDataSource {
    async fn configure_repository(
        &self,
        config: &RepositoryConfig,
    ) -> Result<ApiResponse<ConfigureRepositoryResult>, AppError> {
        let result = self.client.post("/git/repositories", Some(config)).await?;
        Ok(ApiResponse::new(result))
    }

    async fn get_repositories(
        &self,
        filters: &RepositoryFilters,
    ) -> Result<ApiResponse<Vec<ConnectedRepository>>, AppError> {
        let repositories = self.client.get("/git/repositories", Some(filters)).await?;
        Ok(ApiResponse::new(repositories))
    }

    async fn trigger_sync(
        &self,
        repository_id: Option<&str>,
    ) -> Result<ApiResponse<SyncResult>, AppError> {
        let endpoint = match repository_id {
            Some(id) => format!("/git/repositories/{}/sync", segment(id)),
            None => "/git/sync".to_string(),
        };
        let result = self.client.post(&endpoint, None::<&()>).await?;
        Ok(ApiResponse::new(result))
    }

    async fn test_webhook(
        &self,
        repository_id: &str,
    ) -> Result<ApiResponse<WebhookTestResult>, AppError> {
        let endpoint = format!("/git/repositories/{}/test-webhook", segment(repository_id));
        let result = self.client.post(&endpoint, None::<&()>).await?;
        Ok(ApiResponse::new(result))
    }

    async fn get_webhook_events(
        &self,
        filters: &WebhookEventFilters,
    ) -> Result<ApiResponse<Vec<WebhookEvent>>, AppError> {
        let events = self.client.get("/git/webhook-events", Some(filters)).await?;
        Ok(ApiResponse::new(events))
    }

    async fn get_repository_stats(
        &self,
        repository_id: &str,
    ) -> Result<ApiResponse<Option<RepositoryStats>>, AppError> {
        let endpoint = format!("/git/repositories/{}/stats", segment(repository_id));
        let stats = self.client.get_optional(&endpoint, None::<&()>).await?;
        Ok(ApiResponse::new(stats))
    }
}

#[async_trait]
impl AdminApi for RemoteDataSource {
    async fn get_system_config(&self) -> Result<ApiResponse<Option<SystemConfig>>, AppError> {
        let config = self
            .client
            .get_optional("/admin/system-config", None::<&()>)
            .await?;
        Ok(ApiResponse::new(config))
    }

    async fn update_system_config(
        &self,
        config: &SystemConfig,
    ) -> Result<ApiResponse<Ack>, AppError> {
        let ack = self.client.put("/admin/system-config", config).await?;
        Ok(ApiResponse::new(ack))
    }

    async fn get_managed_projects(&self) -> Result<ApiResponse<Vec<ManagedProject>>, AppError> {
        let projects = self.client.get("/admin/projects", None::<&()>).await?;
        Ok(ApiResponse::new(projects))
    }

    async fn add_managed_project(
        &self,
        project: &NewManagedProject,
    ) -> Result<ApiResponse<AddProjectResult>, AppError> {
        let result = self.client.post("/admin/projects", Some(project)).await?;
        Ok(ApiResponse::new(result))
    }

    async fn get_managed_users(
        &self,
        filters: &UserFilters,
    ) -> Result<ApiResponse<Vec<ManagedUser>>, AppError> {
        let users = self.client.get("/admin/users", Some(filters)).await?;
        Ok(ApiResponse::new(users))
    }

    async fn add_managed_user(
        &self,
        user: &NewManagedUser,
    ) -> Result<ApiResponse<ManagedUser>, AppError> {
        let created = self.client.post("/admin/users", Some(user)).await?;
        Ok(ApiResponse::new(created))
    }

    async fn get_analytics(
        &self,
        timeframe: &Timeframe,
    ) -> Result<ApiResponse<Option<Analytics>>, AppError> {
        let analytics = self
            .client
            .get_optional("/admin/analytics", Some(timeframe))
            .await?;
        Ok(ApiResponse::new(analytics))
    }
}

impl DataSource for RemoteDataSource {
    fn name(&self) -> &'static str {
        "remote"
    }
}

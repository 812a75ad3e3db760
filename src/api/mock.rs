//! Canned in-process data source.
//!
//! Answers every call immediately with the placeholder payloads the
//! services know how to merge: empty lists, `None` details and
//! acknowledgements carrying freshly generated ids. Never fails.

use async_trait::async_trait;
use chrono::Utc;

use super::{
    timestamp_id, AchievementsPayload, ActivityPayload, AdminApi, ApiResponse, ClaimAck,
    CommentAck, DataSource, GitIntegrationApi, ItemPage, LeaderboardApi, LeaderboardPayload,
    MergeRequestApi, ProjectApi, RedeemAck, RewardsApi, UserApi,
};
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
    CreateProjectResult, NewProject, Project, ProjectFilters, ProjectMetrics, ProjectPerformance,
    ProjectRepository, ProjectUpdate, RoutingRule, Team, Timeframe,
};
use crate::models::reward::{RedemptionRecord, Reward, RewardCategory, RewardFilters};
use crate::models::user::{ActivityFilters, UserProfile, UserStatsSnapshot};
use crate::models::Ack;

/// Public URL the mock webhook test reports.
const WEBHOOK_URL: &str = "https://codequest-rewards.example.com/api/webhooks/git-events";

/// Data source that never leaves the process.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockDataSource;

impl MockDataSource {
    pub fn new() -> Self {
        Self
    }

    fn current_season() -> Result<Season, AppError> {
        let parse = |raw: &str| {
            chrono::DateTime::parse_from_rfc3339(raw)
                .map(|d| d.with_timezone(&Utc))
                .map_err(|e| AppError::internal(format!("Invalid season date: {}", e)))
        };
        Ok(Season {
            id: "season-2".to_string(),
            name: "Season 2".to_string(),
            start_date: parse("2023-04-01T00:00:00Z")?,
            end_date: parse("2023-06-30T23:59:59Z")?,
        })
    }
}

#[async_trait]
impl MergeRequestApi for MockDataSource {
    async fn get_merge_requests(
        &self,
        filters: &MergeRequestFilters,
    ) -> Result<ApiResponse<ItemPage<MergeRequest>>, AppError> {
        log::debug!("[api] get merge requests filters={:?}", filters);
        Ok(ApiResponse::new(ItemPage::default()))
    }

    async fn get_merge_request_by_id(
        &self,
        id: &str,
    ) -> Result<ApiResponse<Option<MergeRequest>>, AppError> {
        log::debug!("[api] get merge request {}", id);
        Ok(ApiResponse::new(None))
    }

    async fn claim_bug(&self, mr_id: &str, bug_id: &str) -> Result<ApiResponse<ClaimAck>, AppError> {
        log::debug!("[api] claim bug {} in {}", bug_id, mr_id);
        Ok(ApiResponse::new(ClaimAck {
            success: true,
            bug_id: bug_id.to_string(),
            points: 0,
            xp: 0,
        }))
    }

    async fn submit_review(
        &self,
        mr_id: &str,
        review: &ReviewSubmission,
    ) -> Result<ApiResponse<ReviewResult>, AppError> {
        log::debug!("[api] submit review for {}: {:?}", mr_id, review);
        Ok(ApiResponse::new(ReviewResult {
            success: true,
            review_id: timestamp_id("rev", Utc::now()),
            message: "Review submitted successfully".to_string(),
        }))
    }

    async fn add_comment(
        &self,
        mr_id: &str,
        comment: &NewComment,
    ) -> Result<ApiResponse<CommentAck>, AppError> {
        log::debug!("[api] add comment to {}: {:?}", mr_id, comment);
        Ok(ApiResponse::new(CommentAck {
            success: true,
            comment_id: timestamp_id("com", Utc::now()),
            message: "Comment added successfully".to_string(),
        }))
    }
}

#[async_trait]
impl RewardsApi for MockDataSource {
    async fn get_available_rewards(
        &self,
        filters: &RewardFilters,
    ) -> Result<ApiResponse<ItemPage<Reward>>, AppError> {
        log::debug!("[api] get available rewards filters={:?}", filters);
        Ok(ApiResponse::new(ItemPage::default()))
    }

    async fn get_reward_categories(&self) -> Result<ApiResponse<Vec<RewardCategory>>, AppError> {
        log::debug!("[api] get reward categories");
        Ok(ApiResponse::new(Vec::new()))
    }

    async fn redeem_reward(&self, reward_id: &str) -> Result<ApiResponse<RedeemAck>, AppError> {
        log::debug!("[api] redeem reward {}", reward_id);
        Ok(ApiResponse::new(RedeemAck {
            success: true,
            transaction_id: timestamp_id("txn", Utc::now()),
            message: "Reward redeemed successfully".to_string(),
        }))
    }

    async fn get_redemption_history(
        &self,
    ) -> Result<ApiResponse<Vec<RedemptionRecord>>, AppError> {
        log::debug!("[api] get redemption history");
        Ok(ApiResponse::new(Vec::new()))
    }
}

#[async_trait]
impl UserApi for MockDataSource {
    async fn get_current_user(&self) -> Result<ApiResponse<Option<UserProfile>>, AppError> {
        log::debug!("[api] get current user");
        Ok(ApiResponse::new(None))
    }

    async fn get_user_achievements(&self) -> Result<ApiResponse<AchievementsPayload>, AppError> {
        log::debug!("[api] get user achievements");
        Ok(ApiResponse::new(AchievementsPayload::default()))
    }

    async fn get_user_activity(
        &self,
        filters: &ActivityFilters,
    ) -> Result<ApiResponse<ActivityPayload>, AppError> {
        log::debug!("[api] get user activity filters={:?}", filters);
        Ok(ApiResponse::new(ActivityPayload::default()))
    }

    async fn get_user_stats(&self) -> Result<ApiResponse<Option<UserStatsSnapshot>>, AppError> {
        log::debug!("[api] get user stats");
        Ok(ApiResponse::new(None))
    }
}

#[async_trait]
impl LeaderboardApi for MockDataSource {
    async fn get_top_reviewers(
        &self,
        options: &LeaderboardOptions,
    ) -> Result<ApiResponse<LeaderboardPayload<ReviewerEntry>>, AppError> {
        log::debug!("[api] get top reviewers options={:?}", options);
        Ok(ApiResponse::new(LeaderboardPayload::default()))
    }

    async fn get_top_earners(
        &self,
        options: &LeaderboardOptions,
    ) -> Result<ApiResponse<LeaderboardPayload<EarnerEntry>>, AppError> {
        log::debug!("[api] get top earners options={:?}", options);
        Ok(ApiResponse::new(LeaderboardPayload::default()))
    }

    async fn get_current_season(&self) -> Result<ApiResponse<Season>, AppError> {
        log::debug!("[api] get current season");
        Ok(ApiResponse::new(Self::current_season()?))
    }

    async fn get_user_ranking(
        &self,
        user_id: &str,
    ) -> Result<ApiResponse<Option<UserRanking>>, AppError> {
        log::debug!("[api] get ranking for {}", user_id);
        Ok(ApiResponse::new(None))
    }
}

#[async_trait]
impl ProjectApi for MockDataSource {
    async fn get_projects(
        &self,
        filters: &ProjectFilters,
    ) -> Result<ApiResponse<Vec<Project>>, AppError> {
        log::debug!("[api] get projects filters={:?}", filters);
        Ok(ApiResponse::new(Vec::new()))
    }

    async fn get_project_by_id(&self, id: &str) -> Result<ApiResponse<Option<Project>>, AppError> {
        log::debug!("[api] get project {}", id);
        Ok(ApiResponse::new(None))
    }

    async fn create_project(
        &self,
        project: &NewProject,
    ) -> Result<ApiResponse<CreateProjectResult>, AppError> {
        log::debug!("[api] create project {:?}", project.name);
        let now = Utc::now();
        let repositories = project
            .repositories
            .iter()
            .enumerate()
            .map(|(index, repo)| ProjectRepository {
                id: if repo.id.is_empty() {
                    format!("{}-{}", timestamp_id("repo", now), index + 1)
                } else {
                    repo.id.clone()
                },
                ..repo.clone()
            })
            .collect();

        Ok(ApiResponse::new(CreateProjectResult {
            success: true,
            project: Project {
                id: timestamp_id("proj", now),
                name: project.name.clone(),
                description: project.description.clone(),
                repositories,
                teams: project.teams.clone(),
                primary_languages: project.primary_languages.clone(),
                primary_reviewers: project.primary_reviewers.clone(),
                metrics: ProjectMetrics::empty(),
                routing_rules: Vec::new(),
            },
        }))
    }

    async fn update_project(
        &self,
        id: &str,
        update: &ProjectUpdate,
    ) -> Result<ApiResponse<Ack>, AppError> {
        log::debug!("[api] update project {}: {:?}", id, update);
        Ok(ApiResponse::new(Ack::ok("Project updated successfully")))
    }

    async fn get_project_teams(&self, id: &str) -> Result<ApiResponse<Vec<Team>>, AppError> {
        log::debug!("[api] get teams for project {}", id);
        Ok(ApiResponse::new(Vec::new()))
    }

    async fn configure_routing(
        &self,
        id: &str,
        rules: &[RoutingRule],
    ) -> Result<ApiResponse<Ack>, AppError> {
        log::debug!("[api] configure routing for {} ({} rules)", id, rules.len());
        Ok(ApiResponse::new(Ack::ok(
            "Reviewer routing configured successfully",
        )))
    }

    async fn get_project_metrics(
        &self,
        id: &str,
        timeframe: &Timeframe,
    ) -> Result<ApiResponse<Option<ProjectPerformance>>, AppError> {
        log::debug!("[api] get metrics for {} ({})", id, timeframe.period);
        Ok(ApiResponse::new(None))
    }
}

#[async_trait]
impl GitIntegrationApi for MockDataSource {
    async fn configure_repository(
        &self,
        config: &RepositoryConfig,
    ) -> Result<ApiResponse<ConfigureRepositoryResult>, AppError> {
        log::debug!("[api] configure repository {:?}", config);
        let now = Utc::now();
        Ok(ApiResponse::new(ConfigureRepositoryResult {
            success: true,
            repository: ConnectedRepository {
                id: timestamp_id("repo", now),
                name: config.name.clone(),
                url: config.url.clone(),
                provider: config.provider,
                webhook_configured: true,
                api_access_configured: true,
                active_since: now,
                open_prs: 0,
                total_prs: 0,
            },
        }))
    }

    async fn get_repositories(
        &self,
        filters: &RepositoryFilters,
    ) -> Result<ApiResponse<Vec<ConnectedRepository>>, AppError> {
        log::debug!("[api] get repositories filters={:?}", filters);
        Ok(ApiResponse::new(Vec::new()))
    }

    async fn trigger_sync(
        &self,
        repository_id: Option<&str>,
    ) -> Result<ApiResponse<SyncResult>, AppError> {
        log::debug!(
            "[api] trigger sync for {}",
            repository_id.unwrap_or("all repositories")
        );
        let single = repository_id.is_some();
        Ok(ApiResponse::new(SyncResult {
            success: true,
            sync_id: timestamp_id("sync", Utc::now()),
            repository_synced: if single { 1 } else { 3 },
            new_prs_detected: if single { 2 } else { 7 },
            updated_prs: if single { 1 } else { 4 },
        }))
    }

    async fn test_webhook(
        &self,
        repository_id: &str,
    ) -> Result<ApiResponse<WebhookTestResult>, AppError> {
        log::debug!("[api] test webhook for {}", repository_id);
        Ok(ApiResponse::new(WebhookTestResult {
            success: true,
            webhook_url: WEBHOOK_URL.to_string(),
            test_event_sent: true,
            test_event_received: true,
            latency: "245ms".to_string(),
        }))
    }

    async fn get_webhook_events(
        &self,
        filters: &WebhookEventFilters,
    ) -> Result<ApiResponse<Vec<WebhookEvent>>, AppError> {
        log::debug!("[api] get webhook events filters={:?}", filters);
        Ok(ApiResponse::new(Vec::new()))
    }

    async fn get_repository_stats(
        &self,
        repository_id: &str,
    ) -> Result<ApiResponse<Option<RepositoryStats>>, AppError> {
        log::debug!("[api] get repository stats for {}", repository_id);
        Ok(ApiResponse::new(None))
    }
}

#[async_trait]
impl AdminApi for MockDataSource {
    async fn get_system_config(&self) -> Result<ApiResponse<Option<SystemConfig>>, AppError> {
        log::debug!("[api] get system config");
        Ok(ApiResponse::new(None))
    }

    async fn update_system_config(
        &self,
        config: &SystemConfig,
    ) -> Result<ApiResponse<Ack>, AppError> {
        log::debug!("[api] update system config {:?}", config);
        Ok(ApiResponse::new(Ack::ok("Configuration updated successfully")))
    }

    async fn get_managed_projects(&self) -> Result<ApiResponse<Vec<ManagedProject>>, AppError> {
        log::debug!("[api] get managed projects");
        Ok(ApiResponse::new(Vec::new()))
    }

    async fn add_managed_project(
        &self,
        project: &NewManagedProject,
    ) -> Result<ApiResponse<AddProjectResult>, AppError> {
        log::debug!("[api] add managed project {:?}", project);
        let now = Utc::now();
        Ok(ApiResponse::new(AddProjectResult {
            success: true,
            project: ManagedProject {
                id: timestamp_id("proj", now),
                name: project.name.clone(),
                repository: project.repository.clone(),
                git_provider: project.git_provider,
                teams: project.teams.clone(),
                active_mrs: 0,
                total_bugs: 0,
                active_since: now.date_naive(),
            },
        }))
    }

    async fn get_managed_users(
        &self,
        filters: &UserFilters,
    ) -> Result<ApiResponse<Vec<ManagedUser>>, AppError> {
        log::debug!("[api] get managed users filters={:?}", filters);
        Ok(ApiResponse::new(Vec::new()))
    }

    async fn add_managed_user(
        &self,
        user: &NewManagedUser,
    ) -> Result<ApiResponse<ManagedUser>, AppError> {
        log::debug!("[api] add managed user {:?}", user.name);
        let now = Utc::now();
        Ok(ApiResponse::new(ManagedUser {
            id: timestamp_id("user", now),
            name: user.name.clone(),
            email: Some(user.email.clone()).filter(|e| !e.is_empty()),
            role: user.role,
            teams: user.teams.clone(),
            level: user.level,
            points: user.points,
            active_since: now.date_naive(),
        }))
    }

    async fn get_analytics(
        &self,
        timeframe: &Timeframe,
    ) -> Result<ApiResponse<Option<Analytics>>, AppError> {
        log::debug!("[api] get analytics ({})", timeframe.period);
        Ok(ApiResponse::new(None))
    }
}

impl DataSource for MockDataSource {
    fn name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::project::GitProvider;

    #[tokio::test]
    async fn test_placeholder_payloads() {
        let source = MockDataSource::new();
        let page = source
            .get_merge_requests(&MergeRequestFilters::default())
            .await
            .unwrap()
            .into_data();
        assert!(page.items.is_empty());
        assert_eq!(page.total, 0);
        assert!(source.get_current_user().await.unwrap().data.is_none());
        assert!(source.get_user_ranking("current").await.unwrap().data.is_none());
    }

    #[tokio::test]
    async fn test_generated_ids() {
        let source = MockDataSource::new();
        let review = source
            .submit_review("MR-1423", &ReviewSubmission::completed())
            .await
            .unwrap()
            .data;
        assert!(review.review_id.starts_with("rev-"));

        let redeem = source.redeem_reward("reward-1").await.unwrap().data;
        assert!(redeem.transaction_id.starts_with("txn-"));
        assert_eq!(redeem.message, "Reward redeemed successfully");
    }

    #[tokio::test]
    async fn test_sync_counts() {
        let source = MockDataSource::new();
        let one = source.trigger_sync(Some("repo-1")).await.unwrap().data;
        assert_eq!(
            (one.repository_synced, one.new_prs_detected, one.updated_prs),
            (1, 2, 1)
        );
        let all = source.trigger_sync(None).await.unwrap().data;
        assert_eq!(
            (all.repository_synced, all.new_prs_detected, all.updated_prs),
            (3, 7, 4)
        );
    }

    #[tokio::test]
    async fn test_fixed_season() {
        let season = MockDataSource::new().get_current_season().await.unwrap().data;
        assert_eq!(season.id, "season-2");
        assert_eq!(season.end_date.to_rfc3339(), "2023-06-30T23:59:59+00:00");
    }

    #[tokio::test]
    async fn test_configure_repository_echoes_input() {
        let result = MockDataSource::new()
            .configure_repository(&RepositoryConfig {
                name: "search-service".to_string(),
                url: "https://github.com/org/search-service".to_string(),
                provider: GitProvider::Github,
            })
            .await
            .unwrap()
            .data;
        assert!(result.repository.id.starts_with("repo-"));
        assert!(result.repository.webhook_configured);
        assert_eq!(result.repository.provider, GitProvider::Github);
    }
}

//! In-memory fixture store.
//!
//! The store owns every collection the dashboard works with. Reads return
//! owned snapshots; mutations go through the named methods below so that
//! state changes stay in one place. Clones share the same data.

pub mod fixtures;

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::error::AppError;
use crate::models::admin::{Analytics, ManagedProject, ManagedUser, SystemConfig};
use crate::models::comment::Comment;
use crate::models::git_integration::{ConnectedRepository, RepositoryStats, WebhookEvent};
use crate::models::leaderboard::{EarnerEntry, ReviewerEntry, Season, UserRanking};
use crate::models::merge_request::{Bug, MergeRequest};
use crate::models::project::{Project, ProjectPerformance, ProjectUpdate, RoutingRule, Team};
use crate::models::reward::{RedemptionRecord, Reward, RewardCategory};
use crate::models::user::{Activity, Badge, ReviewBadge, UserProfile, UserStatsSnapshot};

pub use fixtures::Fixtures;

/// Shared handle to the fixture collections.
#[derive(Clone)]
pub struct FixtureStore {
    data: Arc<RwLock<Fixtures>>,
}

impl FixtureStore {
    /// Create a store seeded with the embedded fixtures.
    pub fn new() -> Result<Self, AppError> {
        Ok(Self::from_fixtures(Fixtures::load()?))
    }

    pub fn from_fixtures(fixtures: Fixtures) -> Self {
        Self {
            data: Arc::new(RwLock::new(fixtures)),
        }
    }

    // Merge requests

    pub async fn merge_requests(&self) -> Vec<MergeRequest> {
        self.data.read().await.review.merge_requests.clone()
    }

    pub async fn merge_request(&self, id: &str) -> Option<MergeRequest> {
        self.data
            .read()
            .await
            .review
            .merge_requests
            .iter()
            .find(|mr| mr.id == id)
            .cloned()
    }

    pub async fn review_badges(&self) -> Vec<ReviewBadge> {
        self.data.read().await.review.review_badges.clone()
    }

    /// Flip a bug to claimed and bump the MR's claimed counter.
    ///
    /// The checks are repeated under the write lock, so two concurrent
    /// claims of the same bug cannot both succeed.
    pub async fn claim_bug(&self, mr_id: &str, bug_id: &str) -> Result<Bug, AppError> {
        let mut data = self.data.write().await;
        let mr = data
            .review
            .merge_requests
            .iter_mut()
            .find(|mr| mr.id == mr_id)
            .ok_or_else(|| AppError::not_found_with_id("MergeRequest", mr_id))?;

        let bug = mr
            .find_bug_mut(bug_id)
            .ok_or_else(|| AppError::not_found_with_id("Bug", bug_id))?;
        if bug.claimed {
            return Err(AppError::already_claimed(bug_id));
        }
        bug.claimed = true;
        let claimed = bug.clone();
        mr.bugs_claimed += 1;

        Ok(claimed)
    }

    /// Append a comment to a merge request.
    pub async fn push_comment(&self, mr_id: &str, comment: Comment) -> Result<(), AppError> {
        let mut data = self.data.write().await;
        let mr = data
            .review
            .merge_requests
            .iter_mut()
            .find(|mr| mr.id == mr_id)
            .ok_or_else(|| AppError::not_found_with_id("MergeRequest", mr_id))?;
        mr.comments.push(comment);
        Ok(())
    }

    pub async fn mark_reviewed(&self, mr_id: &str) -> Result<(), AppError> {
        let mut data = self.data.write().await;
        let mr = data
            .review
            .merge_requests
            .iter_mut()
            .find(|mr| mr.id == mr_id)
            .ok_or_else(|| AppError::not_found_with_id("MergeRequest", mr_id))?;
        mr.reviews_completed = true;
        Ok(())
    }

    /// Merge backend merge requests into the store, replacing entries with
    /// the same id and appending new ones.
    pub async fn upsert_merge_requests(&self, merge_requests: Vec<MergeRequest>) {
        let mut data = self.data.write().await;
        upsert_by(&mut data.review.merge_requests, merge_requests, |mr| mr.id.clone());
    }

    // Rewards

    pub async fn rewards(&self) -> Vec<Reward> {
        self.data.read().await.rewards.rewards.clone()
    }

    pub async fn reward(&self, id: &str) -> Option<Reward> {
        self.data
            .read()
            .await
            .rewards
            .rewards
            .iter()
            .find(|r| r.id == id)
            .cloned()
    }

    pub async fn reward_categories(&self) -> Vec<RewardCategory> {
        self.data.read().await.rewards.categories.clone()
    }

    pub async fn redemption_history(&self) -> Vec<RedemptionRecord> {
        self.data.read().await.rewards.redemption_history.clone()
    }

    pub async fn record_redemption(&self, record: RedemptionRecord) {
        self.data
            .write()
            .await
            .rewards
            .redemption_history
            .push(record);
    }

    /// Merge backend rewards into the catalog.
    pub async fn upsert_rewards(&self, rewards: Vec<Reward>) {
        let mut data = self.data.write().await;
        upsert_by(&mut data.rewards.rewards, rewards, |r| r.id.clone());
    }

    // Current user

    pub async fn current_user(&self) -> UserProfile {
        self.data.read().await.users.current_user.clone()
    }

    pub async fn badges(&self) -> Vec<Badge> {
        self.data.read().await.users.badges.clone()
    }

    pub async fn activity(&self) -> Vec<Activity> {
        self.data.read().await.users.activity.clone()
    }

    pub async fn user_stats(&self) -> UserStatsSnapshot {
        self.data.read().await.users.stats.clone()
    }

    // Leaderboard

    pub async fn top_reviewers(&self) -> Vec<ReviewerEntry> {
        self.data.read().await.leaderboard.reviewers.clone()
    }

    pub async fn top_earners(&self) -> Vec<EarnerEntry> {
        self.data.read().await.leaderboard.earners.clone()
    }

    pub async fn season(&self) -> Season {
        self.data.read().await.leaderboard.season.clone()
    }

    pub async fn user_ranking(&self) -> UserRanking {
        self.data.read().await.leaderboard.ranking.clone()
    }

    // Projects

    pub async fn projects(&self) -> Vec<Project> {
        self.data.read().await.projects.projects.clone()
    }

    pub async fn project(&self, id: &str) -> Option<Project> {
        self.data
            .read()
            .await
            .projects
            .projects
            .iter()
            .find(|p| p.id == id)
            .cloned()
    }

    pub async fn routing_rules(&self) -> Vec<RoutingRule> {
        self.data.read().await.projects.routing_rules.clone()
    }

    pub async fn teams(&self) -> Vec<Team> {
        self.data.read().await.projects.teams.clone()
    }

    pub async fn project_performance(&self) -> ProjectPerformance {
        self.data.read().await.projects.performance.clone()
    }

    pub async fn add_project(&self, project: Project) {
        self.data.write().await.projects.projects.push(project);
    }

    /// Apply a partial update and return the updated project.
    pub async fn update_project(
        &self,
        id: &str,
        update: &ProjectUpdate,
    ) -> Result<Project, AppError> {
        let mut data = self.data.write().await;
        let project = data
            .projects
            .projects
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| AppError::not_found_with_id("Project", id))?;
        update.apply_to(project);
        Ok(project.clone())
    }

    /// Replace a project's own routing rules.
    pub async fn set_routing_rules(
        &self,
        project_id: &str,
        rules: Vec<RoutingRule>,
    ) -> Result<(), AppError> {
        let mut data = self.data.write().await;
        let project = data
            .projects
            .projects
            .iter_mut()
            .find(|p| p.id == project_id)
            .ok_or_else(|| AppError::not_found_with_id("Project", project_id))?;
        project.routing_rules = rules;
        Ok(())
    }

    // Git integration

    pub async fn repositories(&self) -> Vec<ConnectedRepository> {
        self.data.read().await.git.repositories.clone()
    }

    pub async fn add_repository(&self, repository: ConnectedRepository) {
        self.data.write().await.git.repositories.push(repository);
    }

    pub async fn webhook_events(&self) -> Vec<WebhookEvent> {
        self.data.read().await.git.webhook_events.clone()
    }

    pub async fn repository_stats(&self) -> RepositoryStats {
        self.data.read().await.git.repository_stats.clone()
    }

    // Administration

    pub async fn system_config(&self) -> SystemConfig {
        self.data.read().await.admin.system_config.clone()
    }

    pub async fn update_system_config(&self, config: SystemConfig) {
        self.data.write().await.admin.system_config = config;
    }

    pub async fn managed_projects(&self) -> Vec<ManagedProject> {
        self.data.read().await.admin.projects.clone()
    }

    pub async fn add_managed_project(&self, project: ManagedProject) {
        self.data.write().await.admin.projects.push(project);
    }

    pub async fn managed_users(&self) -> Vec<ManagedUser> {
        self.data.read().await.admin.users.clone()
    }

    pub async fn add_managed_user(&self, user: ManagedUser) {
        self.data.write().await.admin.users.push(user);
    }

    pub async fn analytics(&self) -> Analytics {
        self.data.read().await.admin.analytics.clone()
    }
}

fn upsert_by<T, F>(existing: &mut Vec<T>, incoming: Vec<T>, key: F)
where
    F: Fn(&T) -> String,
{
    for item in incoming {
        let id = key(&item);
        match existing.iter_mut().find(|e| key(e) == id) {
            Some(slot) => *slot = item,
            None => existing.push(item),
        }
    }
}

//! Business logic services.
//!
//! Each service reads from a [`DataSource`] and falls back to the shared
//! [`FixtureStore`] when the source has nothing to offer. Services are
//! cheap to clone; clones share the same store.

pub mod admin;
pub mod credentials;
pub mod git_integration;
pub mod leaderboard;
pub mod merge_requests;
pub mod project;
pub mod rewards;
pub mod user;

use std::sync::Arc;

pub use admin::AdminService;
pub use credentials::CredentialService;
pub use git_integration::GitIntegrationService;
pub use leaderboard::LeaderboardService;
pub use merge_requests::MergeRequestService;
pub use project::ProjectService;
pub use rewards::RewardsService;
pub use user::UserService;

use crate::api::{DataSource, MockDataSource, RemoteDataSource};
use crate::config::AppConfig;
use crate::error::AppError;
use crate::store::FixtureStore;

/// Every service wired to one data source and one store.
#[derive(Clone)]
pub struct Services {
    pub merge_requests: MergeRequestService,
    pub rewards: RewardsService,
    pub user: UserService,
    pub leaderboard: LeaderboardService,
    pub projects: ProjectService,
    pub git: GitIntegrationService,
    pub admin: AdminService,
    source_name: &'static str,
}

impl Services {
    pub fn new(source: Arc<dyn DataSource>, store: FixtureStore) -> Self {
        let source_name = source.name();
        Self {
            merge_requests: MergeRequestService::new(source.clone(), store.clone()),
            rewards: RewardsService::new(source.clone(), store.clone()),
            user: UserService::new(source.clone(), store.clone()),
            leaderboard: LeaderboardService::new(source.clone(), store.clone()),
            projects: ProjectService::new(source.clone(), store.clone()),
            git: GitIntegrationService::new(source.clone(), store.clone()),
            admin: AdminService::new(source, store),
            source_name,
        }
    }

    /// Services over the in-process mock backend.
    pub fn mock() -> Result<Self, AppError> {
        Ok(Self::new(Arc::new(MockDataSource::new()), FixtureStore::new()?))
    }

    /// Remote backend when an API URL is configured, mock otherwise.
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let store = FixtureStore::new()?;
        let source: Arc<dyn DataSource> = if config.uses_remote() {
            Arc::new(RemoteDataSource::from_config(&config.api)?)
        } else {
            Arc::new(MockDataSource::new())
        };
        log::info!("[services] Using {} data source", source.name());
        Ok(Self::new(source, store))
    }

    pub fn source_name(&self) -> &'static str {
        self.source_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_uses_mock() {
        let services = Services::from_config(&AppConfig::default()).unwrap();
        assert_eq!(services.source_name(), "mock");
    }

    #[tokio::test]
    async fn test_services_share_one_store() {
        let services = Services::mock().unwrap();
        services
            .merge_requests
            .claim_bug("MR-1423", "bug-2")
            .await
            .unwrap();

        // A clone sees the same mutation.
        let other = services.clone();
        let mr = other
            .merge_requests
            .get_merge_request_by_id("MR-1423")
            .await
            .unwrap();
        let bug = mr
            .code_changes
            .iter()
            .flat_map(|c| &c.bugs)
            .find(|b| b.id == "bug-2")
            .unwrap();
        assert!(bug.claimed);
    }
}

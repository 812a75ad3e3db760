//! Connected repositories, manual syncs and webhook diagnostics.

use std::sync::Arc;

use crate::api::DataSource;
use crate::error::AppError;
use crate::models::git_integration::{
    ConfigureRepositoryResult, ConnectedRepository, RepositoryConfig, RepositoryFilters,
    RepositoryStats, SyncResult, WebhookEvent, WebhookEventFilters, WebhookTestResult,
};
use crate::store::FixtureStore;

#[derive(Clone)]
pub struct GitIntegrationService {
    source: Arc<dyn DataSource>,
    store: FixtureStore,
}

impl GitIntegrationService {
    pub fn new(source: Arc<dyn DataSource>, store: FixtureStore) -> Self {
        Self { source, store }
    }

    /// Connect a repository and remember it.
    pub async fn configure_repository(
        &self,
        config: &RepositoryConfig,
    ) -> Result<ConfigureRepositoryResult, AppError> {
        self.try_configure_repository(config)
            .await
            .inspect_err(|e| log::error!("[git] Failed to configure repository: {}", e))
    }

    async fn try_configure_repository(
        &self,
        config: &RepositoryConfig,
    ) -> Result<ConfigureRepositoryResult, AppError> {
        if config.name.trim().is_empty() {
            return Err(AppError::invalid_input_field("Repository name is required", "name"));
        }
        let url = config.url.trim();
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(AppError::invalid_input_field(
                "Repository URL must start with http:// or https://",
                "url",
            ));
        }

        let result = self.source.configure_repository(config).await?.into_data();
        self.store.add_repository(result.repository.clone()).await;
        log::info!(
            "[git] Connected {} repository {} ({})",
            result.repository.provider,
            result.repository.name,
            result.repository.id
        );
        Ok(result)
    }

    pub async fn get_connected_repositories(
        &self,
        filters: &RepositoryFilters,
    ) -> Result<Vec<ConnectedRepository>, AppError> {
        let remote = self
            .source
            .get_repositories(filters)
            .await
            .inspect_err(|e| log::error!("[git] Failed to get repositories: {}", e))?
            .into_data();

        let repositories = if remote.is_empty() {
            self.store.repositories().await
        } else {
            remote
        };

        Ok(match filters.provider {
            Some(provider) => repositories
                .into_iter()
                .filter(|r| r.provider == provider)
                .collect(),
            None => repositories,
        })
    }

    /// Sync one repository, or every connected repository when `None`.
    pub async fn trigger_sync(&self, repository_id: Option<&str>) -> Result<SyncResult, AppError> {
        let result = self
            .source
            .trigger_sync(repository_id)
            .await
            .inspect_err(|e| log::error!("[git] Sync failed: {}", e))?
            .into_data();

        log::info!(
            "[git] Sync {} finished: {} repositories, {} new, {} updated",
            result.sync_id,
            result.repository_synced,
            result.new_prs_detected,
            result.updated_prs
        );
        Ok(result)
    }

    pub async fn test_webhook(&self, repository_id: &str) -> Result<WebhookTestResult, AppError> {
        self.source
            .test_webhook(repository_id)
            .await
            .map(|response| response.into_data())
            .inspect_err(|e| {
                log::error!("[git] Webhook test for {} failed: {}", repository_id, e)
            })
    }

    pub async fn get_webhook_event_history(
        &self,
        filters: &WebhookEventFilters,
    ) -> Result<Vec<WebhookEvent>, AppError> {
        let remote = self
            .source
            .get_webhook_events(filters)
            .await
            .inspect_err(|e| log::error!("[git] Failed to get webhook events: {}", e))?
            .into_data();

        let events = if remote.is_empty() {
            self.store.webhook_events().await
        } else {
            remote
        };
        Ok(events.into_iter().filter(|e| filters.matches(e)).collect())
    }

    pub async fn get_repository_pr_stats(
        &self,
        repository_id: &str,
    ) -> Result<RepositoryStats, AppError> {
        let remote = self
            .source
            .get_repository_stats(repository_id)
            .await
            .inspect_err(|e| {
                log::error!("[git] Failed to get stats for {}: {}", repository_id, e)
            })?
            .into_data();

        match remote {
            Some(stats) => Ok(stats),
            None => Ok(self.store.repository_stats().await),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockDataSource;
    use crate::models::project::GitProvider;

    fn service() -> GitIntegrationService {
        GitIntegrationService::new(
            Arc::new(MockDataSource::new()),
            FixtureStore::new().unwrap(),
        )
    }

    #[tokio::test]
    async fn test_provider_filter() {
        let gitlab = service()
            .get_connected_repositories(&RepositoryFilters {
                provider: Some(GitProvider::Gitlab),
            })
            .await
            .unwrap();
        assert_eq!(gitlab.len(), 1);
        assert_eq!(gitlab[0].name, "payment-gateway");
    }

    #[tokio::test]
    async fn test_configure_repository() {
        let service = service();
        let result = service
            .configure_repository(&RepositoryConfig {
                name: "search-service".to_string(),
                url: "https://github.com/org/search-service".to_string(),
                provider: GitProvider::Github,
            })
            .await
            .unwrap();
        assert!(result.success);

        let all = service
            .get_connected_repositories(&RepositoryFilters::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 4);

        let err = service
            .configure_repository(&RepositoryConfig {
                name: "bad".to_string(),
                url: "git@github.com:org/bad.git".to_string(),
                provider: GitProvider::Github,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput { .. }));
    }

    #[tokio::test]
    async fn test_event_history_filters() {
        let events = service()
            .get_webhook_event_history(&WebhookEventFilters {
                repository: Some("auth-service".to_string()),
                event_type: None,
            })
            .await
            .unwrap();
        assert!(!events.is_empty());
        assert!(events.iter().all(|e| e.repository == "auth-service"));
    }

    #[tokio::test]
    async fn test_webhook_and_stats() {
        let service = service();
        let test = service.test_webhook("repo-1").await.unwrap();
        assert_eq!(test.latency, "245ms");
        let stats = service.get_repository_pr_stats("repo-1").await.unwrap();
        assert!(stats.total_prs >= stats.open_prs);
    }
}

//! Current user profile, achievements and activity.

use std::sync::Arc;

use crate::api::DataSource;
use crate::error::AppError;
use crate::models::user::{Activity, ActivityFilters, Badge, UserProfile, UserStatsSnapshot};
use crate::store::FixtureStore;

#[derive(Clone)]
pub struct UserService {
    source: Arc<dyn DataSource>,
    store: FixtureStore,
}

impl UserService {
    pub fn new(source: Arc<dyn DataSource>, store: FixtureStore) -> Self {
        Self { source, store }
    }

    pub async fn get_current_user(&self) -> Result<UserProfile, AppError> {
        let remote = self
            .source
            .get_current_user()
            .await
            .inspect_err(|e| log::error!("[user] Failed to get current user: {}", e))?
            .into_data();

        match remote {
            Some(user) => Ok(user),
            None => Ok(self.store.current_user().await),
        }
    }

    pub async fn get_user_achievements(&self) -> Result<Vec<Badge>, AppError> {
        let payload = self
            .source
            .get_user_achievements()
            .await
            .inspect_err(|e| log::error!("[user] Failed to get achievements: {}", e))?
            .into_data();

        if payload.badges.is_empty() {
            Ok(self.store.badges().await)
        } else {
            Ok(payload.badges)
        }
    }

    /// Activity history, optionally narrowed to one activity type.
    pub async fn get_user_activity(
        &self,
        filters: &ActivityFilters,
    ) -> Result<Vec<Activity>, AppError> {
        let payload = self
            .source
            .get_user_activity(filters)
            .await
            .inspect_err(|e| log::error!("[user] Failed to get activity: {}", e))?
            .into_data();

        let activities = if payload.activities.is_empty() {
            self.store.activity().await
        } else {
            payload.activities
        };

        Ok(match filters.activity_type {
            Some(kind) => activities
                .into_iter()
                .filter(|a| a.activity_type == kind)
                .collect(),
            None => activities,
        })
    }

    pub async fn get_user_stats(&self) -> Result<UserStatsSnapshot, AppError> {
        let remote = self
            .source
            .get_user_stats()
            .await
            .inspect_err(|e| log::error!("[user] Failed to get stats: {}", e))?
            .into_data();

        match remote {
            Some(stats) => Ok(stats),
            None => Ok(self.store.user_stats().await),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockDataSource;
    use crate::models::user::ActivityType;

    fn service() -> UserService {
        UserService::new(
            Arc::new(MockDataSource::new()),
            FixtureStore::new().unwrap(),
        )
    }

    #[tokio::test]
    async fn test_current_user_from_fixtures() {
        let user = service().get_current_user().await.unwrap();
        assert_eq!(user.name, "DragonSlayer");
        assert_eq!(user.level, 5);
        assert_eq!(user.xp_progress_percent(), 76);
    }

    #[tokio::test]
    async fn test_activity_type_filter() {
        let service = service();
        let all = service
            .get_user_activity(&ActivityFilters::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 5);

        let reviews = service
            .get_user_activity(&ActivityFilters {
                activity_type: Some(ActivityType::Review),
            })
            .await
            .unwrap();
        assert!(!reviews.is_empty());
        assert!(reviews.iter().all(|a| a.activity_type == ActivityType::Review));
    }

    #[tokio::test]
    async fn test_stats_include_bugs_found() {
        let stats = service().get_user_stats().await.unwrap();
        assert_eq!(stats.stats.bugs_found, Some(75));
    }
}

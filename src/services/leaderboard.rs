//! Leaderboard rankings and the current season.

use std::sync::Arc;

use crate::api::DataSource;
use crate::error::AppError;
use crate::models::leaderboard::{
    EarnerEntry, LeaderboardOptions, ReviewerEntry, Season, UserRanking,
};
use crate::store::FixtureStore;

/// User id used when ranking the signed-in user.
pub const CURRENT_USER: &str = "current";

#[derive(Clone)]
pub struct LeaderboardService {
    source: Arc<dyn DataSource>,
    store: FixtureStore,
}

impl LeaderboardService {
    pub fn new(source: Arc<dyn DataSource>, store: FixtureStore) -> Self {
        Self { source, store }
    }

    /// Top reviewers by points, truncated to `options.limit` when positive.
    pub async fn get_top_reviewers(
        &self,
        options: &LeaderboardOptions,
    ) -> Result<Vec<ReviewerEntry>, AppError> {
        let payload = self
            .source
            .get_top_reviewers(options)
            .await
            .inspect_err(|e| log::error!("[leaderboard] Failed to get top reviewers: {}", e))?
            .into_data();

        let reviewers = if payload.users.is_empty() {
            self.store.top_reviewers().await
        } else {
            payload.users
        };
        Ok(options.apply(reviewers))
    }

    pub async fn get_top_earners(
        &self,
        options: &LeaderboardOptions,
    ) -> Result<Vec<EarnerEntry>, AppError> {
        let payload = self
            .source
            .get_top_earners(options)
            .await
            .inspect_err(|e| log::error!("[leaderboard] Failed to get top earners: {}", e))?
            .into_data();

        let earners = if payload.users.is_empty() {
            self.store.top_earners().await
        } else {
            payload.users
        };
        Ok(options.apply(earners))
    }

    /// The season always comes from the data source.
    pub async fn get_current_season(&self) -> Result<Season, AppError> {
        self.source
            .get_current_season()
            .await
            .map(|response| response.into_data())
            .inspect_err(|e| log::error!("[leaderboard] Failed to get current season: {}", e))
    }

    pub async fn get_user_ranking(&self, user_id: &str) -> Result<UserRanking, AppError> {
        let remote = self
            .source
            .get_user_ranking(user_id)
            .await
            .inspect_err(|e| {
                log::error!("[leaderboard] Failed to get ranking for {}: {}", user_id, e)
            })?
            .into_data();

        match remote {
            Some(ranking) => Ok(ranking),
            None => Ok(self.store.user_ranking().await),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockDataSource;

    fn service() -> LeaderboardService {
        LeaderboardService::new(
            Arc::new(MockDataSource::new()),
            FixtureStore::new().unwrap(),
        )
    }

    #[tokio::test]
    async fn test_limit_truncates() {
        let service = service();
        let top3 = service
            .get_top_reviewers(&LeaderboardOptions {
                limit: Some(3),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(top3.len(), 3);
        assert_eq!(top3[0].name, "DragonSlayer");

        let unlimited = service
            .get_top_earners(&LeaderboardOptions {
                limit: Some(0),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(unlimited.len(), 10);
    }

    #[tokio::test]
    async fn test_season_and_ranking() {
        let service = service();
        assert_eq!(service.get_current_season().await.unwrap().id, "season-2");

        let ranking = service.get_user_ranking(CURRENT_USER).await.unwrap();
        assert_eq!(ranking.rank, 5);
        assert_eq!(ranking.total, 150);
    }
}

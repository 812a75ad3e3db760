//! Reward catalog, redemption and history.

use std::sync::Arc;

use chrono::Utc;

use crate::api::{timestamp_id, DataSource};
use crate::error::AppError;
use crate::models::reward::{
    RedeemingUser, RedemptionRecord, RedemptionResult, RedemptionStatus, Reward, RewardCategory,
    RewardFilters, RewardSort, ALL_CATEGORIES,
};
use crate::models::Page;
use crate::store::FixtureStore;

#[derive(Clone)]
pub struct RewardsService {
    source: Arc<dyn DataSource>,
    store: FixtureStore,
}

impl RewardsService {
    pub fn new(source: Arc<dyn DataSource>, store: FixtureStore) -> Self {
        Self { source, store }
    }

    /// List rewards filtered by category and search text, then sorted.
    ///
    /// Without a requested sort the catalog order is kept.
    pub async fn get_available_rewards(
        &self,
        filters: &RewardFilters,
    ) -> Result<Page<Reward>, AppError> {
        let page = self
            .source
            .get_available_rewards(filters)
            .await
            .inspect_err(|e| log::error!("[rewards] Failed to get available rewards: {}", e))?
            .into_data();

        if !page.items.is_empty() {
            self.store.upsert_rewards(page.items).await;
        }

        let mut rewards: Vec<Reward> = self
            .store
            .rewards()
            .await
            .into_iter()
            .filter(|reward| matches_filters(reward, filters))
            .collect();

        if let Some(sort) = filters.sort_by {
            sort_rewards(&mut rewards, sort);
        }

        Ok(Page::new(rewards))
    }

    pub async fn get_reward_categories(&self) -> Result<Vec<RewardCategory>, AppError> {
        let categories = self
            .source
            .get_reward_categories()
            .await
            .inspect_err(|e| log::error!("[rewards] Failed to get reward categories: {}", e))?
            .into_data();

        if categories.is_empty() {
            Ok(self.store.reward_categories().await)
        } else {
            Ok(categories)
        }
    }

    /// Redeem a reward for `user`.
    ///
    /// Checks run in order: unknown reward, insufficient points, no stock.
    /// A successful redemption appends a pending record to the history;
    /// stock is left untouched.
    pub async fn redeem_reward(
        &self,
        reward_id: &str,
        user: &RedeemingUser,
    ) -> Result<RedemptionResult, AppError> {
        self.try_redeem_reward(reward_id, user)
            .await
            .inspect_err(|e| log::error!("[rewards] Failed to redeem reward {}: {}", reward_id, e))
    }

    async fn try_redeem_reward(
        &self,
        reward_id: &str,
        user: &RedeemingUser,
    ) -> Result<RedemptionResult, AppError> {
        let reward = self
            .store
            .reward(reward_id)
            .await
            .ok_or_else(|| AppError::not_found_with_id("Reward", reward_id))?;

        if user.points < reward.points {
            return Err(AppError::insufficient_points(reward.points, user.points));
        }
        if !reward.in_stock() {
            return Err(AppError::out_of_stock(reward_id));
        }

        let ack = self.source.redeem_reward(reward_id).await?.into_data();

        let now = Utc::now();
        let redemption = RedemptionRecord {
            id: timestamp_id("rdm", now),
            reward_id: reward.id.clone(),
            reward_name: reward.name.clone(),
            points_cost: reward.points,
            redeem_date: now,
            status: RedemptionStatus::Pending,
            scheduled_for: None,
        };
        self.store.record_redemption(redemption.clone()).await;
        log::info!(
            "[rewards] {} redeemed {} for {} points ({})",
            user.name,
            reward.name,
            reward.points,
            ack.transaction_id
        );

        Ok(RedemptionResult {
            success: true,
            transaction_id: ack.transaction_id,
            redemption,
        })
    }

    pub async fn get_redemption_history(&self) -> Result<Vec<RedemptionRecord>, AppError> {
        let history = self
            .source
            .get_redemption_history()
            .await
            .inspect_err(|e| log::error!("[rewards] Failed to get redemption history: {}", e))?
            .into_data();

        if history.is_empty() {
            Ok(self.store.redemption_history().await)
        } else {
            Ok(history)
        }
    }
}

fn matches_filters(reward: &Reward, filters: &RewardFilters) -> bool {
    if let Some(category) = filters.category.as_deref() {
        if category != ALL_CATEGORIES && reward.category != category {
            return false;
        }
    }
    match filters.search_query.as_deref() {
        Some(query) if !query.is_empty() => reward.matches_search(query),
        _ => true,
    }
}

/// Stable sort of `rewards` by the requested order.
pub fn sort_rewards(rewards: &mut [Reward], sort: RewardSort) {
    match sort {
        RewardSort::PriceLow => rewards.sort_by_key(|r| r.points),
        RewardSort::PriceHigh => rewards.sort_by(|a, b| b.points.cmp(&a.points)),
        RewardSort::Popularity => {
            rewards.sort_by(|a, b| b.popularity.rank().cmp(&a.popularity.rank()))
        }
        RewardSort::Featured => rewards.sort_by(|a, b| {
            b.featured
                .cmp(&a.featured)
                .then_with(|| b.points.cmp(&a.points))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockDataSource;
    use crate::store::Fixtures;

    fn service() -> RewardsService {
        RewardsService::new(
            Arc::new(MockDataSource::new()),
            FixtureStore::new().unwrap(),
        )
    }

    fn user(points: i64) -> RedeemingUser {
        RedeemingUser {
            name: "DragonSlayer".to_string(),
            level: 5,
            points,
        }
    }

    fn ids(page: &Page<Reward>) -> Vec<&str> {
        page.data.iter().map(|r| r.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_catalog_order_without_sort() {
        let page = service()
            .get_available_rewards(&RewardFilters::default())
            .await
            .unwrap();
        assert_eq!(page.total, 12);
        assert_eq!(page.data[0].id, "reward-1");
        assert_eq!(page.data[11].id, "reward-12");
    }

    #[tokio::test]
    async fn test_category_and_search() {
        let service = service();
        let digital = service
            .get_available_rewards(&RewardFilters {
                category: Some("digital".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(ids(&digital), vec!["reward-6", "reward-7", "reward-11"]);

        let everything = service
            .get_available_rewards(&RewardFilters {
                category: Some("all".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(everything.total, 12);
    }

    #[tokio::test]
    async fn test_sorts() {
        let service = service();
        let by = |sort| RewardFilters {
            sort_by: Some(sort),
            ..Default::default()
        };

        let low = service.get_available_rewards(&by(RewardSort::PriceLow)).await.unwrap();
        assert_eq!(low.data[0].id, "reward-12");
        assert!(low.data.windows(2).all(|w| w[0].points <= w[1].points));

        let high = service.get_available_rewards(&by(RewardSort::PriceHigh)).await.unwrap();
        assert_eq!(high.data[0].id, "reward-4");

        let popular = service.get_available_rewards(&by(RewardSort::Popularity)).await.unwrap();
        assert_eq!(popular.data[0].id, "reward-4");
        // Ties keep catalog order.
        assert_eq!(popular.data[1].id, "reward-1");

        let featured = service.get_available_rewards(&by(RewardSort::Featured)).await.unwrap();
        assert_eq!(
            &ids(&featured)[..5],
            &["reward-4", "reward-2", "reward-10", "reward-1", "reward-3"]
        );
    }

    #[tokio::test]
    async fn test_redeem_checks_in_order() {
        let service = service();
        let err = service.redeem_reward("reward-99", &user(0)).await.unwrap_err();
        assert!(err.is_not_found());

        let err = service.redeem_reward("reward-1", &user(856)).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::InsufficientPoints {
                required: 2500,
                available: 856
            }
        ));
    }

    #[tokio::test]
    async fn test_out_of_stock_after_points_check() {
        let mut fixtures = Fixtures::load().unwrap();
        fixtures.rewards.rewards[11].stock = 0;
        let service = RewardsService::new(
            Arc::new(MockDataSource::new()),
            FixtureStore::from_fixtures(fixtures),
        );

        let err = service.redeem_reward("reward-12", &user(100)).await.unwrap_err();
        assert!(matches!(err, AppError::InsufficientPoints { .. }));

        let err = service.redeem_reward("reward-12", &user(1000)).await.unwrap_err();
        assert!(matches!(err, AppError::OutOfStock { .. }));
    }

    #[tokio::test]
    async fn test_redeem_appends_pending_record() {
        let service = service();
        let result = service.redeem_reward("reward-12", &user(856)).await.unwrap();
        assert!(result.transaction_id.starts_with("txn-"));
        assert!(result.redemption.id.starts_with("rdm-"));
        assert_eq!(result.redemption.status, RedemptionStatus::Pending);
        assert_eq!(result.redemption.points_cost, 800);

        let history = service.get_redemption_history().await.unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(history[2].reward_id, "reward-12");

        // Stock is not decremented.
        let catalog = service
            .get_available_rewards(&RewardFilters::default())
            .await
            .unwrap();
        assert_eq!(catalog.data[11].stock, 15);
    }
}

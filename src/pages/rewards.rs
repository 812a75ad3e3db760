//! Reward catalog and redemption.

use serde::Serialize;

use crate::models::reward::{
    RedeemingUser, RedemptionRecord, Reward, RewardCategory, RewardFilters, RewardSort,
    ALL_CATEGORIES,
};
use crate::services::Services;

use super::Notice;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RewardsLoading {
    pub rewards: bool,
    pub categories: bool,
    pub history: bool,
}

pub struct RewardsPage {
    services: Services,
    pub user: RedeemingUser,
    pub category: String,
    pub search: String,
    pub sort: RewardSort,
    pub rewards: Vec<Reward>,
    pub categories: Vec<RewardCategory>,
    pub history: Vec<RedemptionRecord>,
    /// The reward shown in the redeem modal.
    pub selected: Option<Reward>,
    pub loading: RewardsLoading,
    pub notice: Option<Notice>,
}

impl RewardsPage {
    pub fn new(services: Services, user: RedeemingUser) -> Self {
        Self {
            services,
            user,
            category: ALL_CATEGORIES.to_string(),
            search: String::new(),
            sort: RewardSort::Featured,
            rewards: Vec::new(),
            categories: Vec::new(),
            history: Vec::new(),
            selected: None,
            loading: RewardsLoading::default(),
            notice: None,
        }
    }

    pub async fn load(&mut self) {
        self.loading = RewardsLoading {
            rewards: true,
            categories: true,
            history: true,
        };

        let services = &self.services;
        let filters = self.filters();
        let (rewards, categories, history) = tokio::join!(
            services.rewards.get_available_rewards(&filters),
            services.rewards.get_reward_categories(),
            services.rewards.get_redemption_history(),
        );

        match rewards {
            Ok(page) => self.rewards = page.data,
            Err(e) => {
                self.rewards.clear();
                self.notice = Some(Notice::failed("Failed to load rewards", &e));
            }
        }
        self.loading.rewards = false;

        match categories {
            Ok(categories) => self.categories = categories,
            Err(e) => self.notice = Some(Notice::failed("Failed to load categories", &e)),
        }
        self.loading.categories = false;

        match history {
            Ok(history) => self.history = history,
            Err(e) => self.notice = Some(Notice::failed("Failed to load redemption history", &e)),
        }
        self.loading.history = false;
    }

    fn filters(&self) -> RewardFilters {
        let search = self.search.trim();
        RewardFilters {
            category: Some(self.category.clone()),
            search_query: (!search.is_empty()).then(|| search.to_string()),
            sort_by: Some(self.sort),
        }
    }

    async fn refresh_rewards(&mut self) {
        self.loading.rewards = true;
        let filters = self.filters();
        match self.services.rewards.get_available_rewards(&filters).await {
            Ok(page) => self.rewards = page.data,
            Err(e) => {
                self.rewards.clear();
                self.notice = Some(Notice::failed("Failed to load rewards", &e));
            }
        }
        self.loading.rewards = false;
    }

    pub async fn set_category(&mut self, category: impl Into<String>) {
        self.category = category.into();
        self.refresh_rewards().await;
    }

    pub async fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
        self.refresh_rewards().await;
    }

    pub async fn set_sort(&mut self, sort: RewardSort) {
        self.sort = sort;
        self.refresh_rewards().await;
    }

    /// Open the redeem modal for a listed reward.
    pub fn select_reward(&mut self, reward_id: &str) -> bool {
        self.selected = self.rewards.iter().find(|r| r.id == reward_id).cloned();
        self.selected.is_some()
    }

    pub fn close_modal(&mut self) {
        self.selected = None;
    }

    pub fn can_afford(&self, reward: &Reward) -> bool {
        self.user.points >= reward.points
    }

    /// Redeem the selected reward. On success the modal closes and the
    /// history is refreshed.
    pub async fn redeem(&mut self) {
        let Some(reward) = self.selected.clone() else {
            return;
        };

        match self.services.rewards.redeem_reward(&reward.id, &self.user).await {
            Ok(_) => {
                self.selected = None;
                self.loading.history = true;
                match self.services.rewards.get_redemption_history().await {
                    Ok(history) => self.history = history,
                    Err(e) => {
                        self.notice =
                            Some(Notice::failed("Failed to load redemption history", &e))
                    }
                }
                self.loading.history = false;
                self.notice = Some(Notice::Success(format!(
                    "Successfully redeemed {}!",
                    reward.name
                )));
            }
            Err(e) => self.notice = Some(Notice::failed("Failed to redeem reward", &e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(points: i64) -> RedeemingUser {
        RedeemingUser {
            name: "DragonSlayer".to_string(),
            level: 5,
            points,
        }
    }

    async fn loaded(points: i64) -> RewardsPage {
        let mut page = RewardsPage::new(Services::mock().unwrap(), user(points));
        page.load().await;
        page
    }

    #[tokio::test]
    async fn test_default_view_is_featured() {
        let page = loaded(3000).await;
        assert_eq!(page.sort, RewardSort::Featured);
        assert_eq!(page.rewards.len(), 12);
        assert!(page.rewards[..5].iter().all(|r| r.featured));
        assert!(!page.categories.is_empty());
        assert_eq!(page.history.len(), 2);
        assert_eq!(page.loading, RewardsLoading::default());
    }

    #[tokio::test]
    async fn test_filters_refetch() {
        let mut page = loaded(3000).await;
        page.set_category("digital").await;
        assert!(page.rewards.iter().all(|r| r.category == "digital"));

        page.set_category(ALL_CATEGORIES).await;
        page.set_sort(RewardSort::PriceLow).await;
        assert!(page.rewards.windows(2).all(|w| w[0].points <= w[1].points));
    }

    #[tokio::test]
    async fn test_redeem_closes_modal_and_refreshes_history() {
        let mut page = loaded(3000).await;
        assert!(page.select_reward("reward-12"));
        let reward = page.selected.clone().unwrap();
        assert!(page.can_afford(&reward));

        page.redeem().await;
        assert!(page.selected.is_none());
        assert_eq!(page.history.len(), 3);
        assert_eq!(
            page.notice,
            Some(Notice::Success(
                "Successfully redeemed Company Swag Pack!".to_string()
            ))
        );
    }

    #[tokio::test]
    async fn test_failed_redeem_keeps_modal_open() {
        let mut page = loaded(100).await;
        assert!(page.select_reward("reward-4"));
        page.redeem().await;
        assert!(page.selected.is_some());
        assert!(page.notice.as_ref().unwrap().is_error());
        assert_eq!(page.history.len(), 2);
    }
}

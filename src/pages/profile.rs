//! The signed-in user's profile: badges, activity and stats.

use serde::Serialize;

use crate::models::user::{
    Activity, ActivityFilters, ActivityType, Badge, UserProfile, UserStatsSnapshot,
};
use crate::services::Services;

use super::Notice;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileTab {
    #[default]
    Achievements,
    Activity,
    Stats,
}

pub struct ProfilePage {
    services: Services,
    pub tab: ProfileTab,
    pub user: Option<UserProfile>,
    pub badges: Vec<Badge>,
    pub activity: Vec<Activity>,
    pub activity_filter: Option<ActivityType>,
    pub stats: Option<UserStatsSnapshot>,
    pub loading: bool,
    pub notice: Option<Notice>,
}

impl ProfilePage {
    pub fn new(services: Services) -> Self {
        Self {
            services,
            tab: ProfileTab::default(),
            user: None,
            badges: Vec::new(),
            activity: Vec::new(),
            activity_filter: None,
            stats: None,
            loading: false,
            notice: None,
        }
    }

    pub async fn load(&mut self) {
        self.loading = true;
        let services = &self.services;
        let filters = ActivityFilters {
            activity_type: self.activity_filter,
        };
        let (user, badges, activity, stats) = tokio::join!(
            services.user.get_current_user(),
            services.user.get_user_achievements(),
            services.user.get_user_activity(&filters),
            services.user.get_user_stats(),
        );

        match user {
            Ok(user) => self.user = Some(user),
            Err(e) => self.notice = Some(Notice::failed("Failed to load profile", &e)),
        }
        match badges {
            Ok(badges) => self.badges = badges,
            Err(e) => self.notice = Some(Notice::failed("Failed to load badges", &e)),
        }
        match activity {
            Ok(activity) => self.activity = activity,
            Err(e) => self.notice = Some(Notice::failed("Failed to load activity", &e)),
        }
        match stats {
            Ok(stats) => self.stats = Some(stats),
            Err(e) => self.notice = Some(Notice::failed("Failed to load stats", &e)),
        }
        self.loading = false;
    }

    pub fn set_tab(&mut self, tab: ProfileTab) {
        self.tab = tab;
    }

    /// Narrow the activity list and refetch it.
    pub async fn set_activity_filter(&mut self, filter: Option<ActivityType>) {
        self.activity_filter = filter;
        let filters = ActivityFilters {
            activity_type: filter,
        };
        match self.services.user.get_user_activity(&filters).await {
            Ok(activity) => self.activity = activity,
            Err(e) => self.notice = Some(Notice::failed("Failed to load activity", &e)),
        }
    }

    pub fn xp_progress_percent(&self) -> u32 {
        self.user.as_ref().map_or(0, UserProfile::xp_progress_percent)
    }

    pub fn unlocked_badges(&self) -> usize {
        self.badges.iter().filter(|b| b.unlocked).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_and_derived_values() {
        let mut page = ProfilePage::new(Services::mock().unwrap());
        assert_eq!(page.xp_progress_percent(), 0);
        page.load().await;

        assert_eq!(page.tab, ProfileTab::Achievements);
        assert_eq!(page.xp_progress_percent(), 76);
        assert_eq!(page.badges.len(), 12);
        assert_eq!(page.unlocked_badges(), 9);
        assert_eq!(page.activity.len(), 5);
    }

    #[tokio::test]
    async fn test_activity_filter_refetches() {
        let mut page = ProfilePage::new(Services::mock().unwrap());
        page.load().await;
        page.set_activity_filter(Some(ActivityType::Quest)).await;
        assert_eq!(page.activity.len(), 1);

        page.set_activity_filter(None).await;
        assert_eq!(page.activity.len(), 5);
    }
}

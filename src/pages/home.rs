//! Landing page.

use rand::Rng;

use crate::effects::EmberField;
use crate::models::leaderboard::UserRanking;
use crate::models::user::UserProfile;
use crate::services::leaderboard::CURRENT_USER;
use crate::services::Services;

use super::Notice;

pub const TITLE: &str = "CodeQuest Rewards";
pub const SUBTITLE: &str = "Level Up Your Code";
pub const DESCRIPTION: &str = "A gamified internal application designed to incentivize and \
     improve code quality by rewarding reviewers who identify and validate bugs or \
     discrepancies in Merge Requests across organizational projects.";

pub struct HomePage {
    services: Services,
    pub user: Option<UserProfile>,
    pub ranking: Option<UserRanking>,
    pub embers: EmberField,
    pub loading: bool,
    pub notice: Option<Notice>,
}

impl HomePage {
    pub fn new<R: Rng + ?Sized>(services: Services, rng: &mut R) -> Self {
        Self {
            services,
            user: None,
            ranking: None,
            embers: EmberField::generate(rng),
            loading: false,
            notice: None,
        }
    }

    pub async fn load(&mut self) {
        self.loading = true;
        let services = &self.services;
        let (user, ranking) = tokio::join!(
            services.user.get_current_user(),
            services.leaderboard.get_user_ranking(CURRENT_USER),
        );

        match user {
            Ok(user) => self.user = Some(user),
            Err(e) => self.notice = Some(Notice::failed("Failed to load profile", &e)),
        }
        match ranking {
            Ok(ranking) => self.ranking = Some(ranking),
            Err(e) => self.notice = Some(Notice::failed("Failed to load ranking", &e)),
        }
        self.loading = false;
    }

    /// The hero stat tiles: points, quests and rank.
    pub fn quick_stats(&self) -> Vec<(&'static str, String)> {
        let value = |v: Option<String>| v.unwrap_or_else(|| "-".to_string());
        vec![
            (
                "Points",
                value(self.user.as_ref().map(|u| u.stats.points.to_string())),
            ),
            (
                "Quests",
                value(self.user.as_ref().map(|u| u.stats.quests.to_string())),
            ),
            (
                "Rank",
                value(self.ranking.as_ref().map(|r| r.rank.to_string())),
            ),
        ]
    }

    pub fn level(&self) -> Option<u32> {
        self.user.as_ref().map(|u| u.level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[tokio::test]
    async fn test_load_fills_quick_stats() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut page = HomePage::new(Services::mock().unwrap(), &mut rng);
        assert_eq!(page.quick_stats()[0].1, "-");

        page.load().await;
        assert!(!page.loading);
        assert!(page.notice.is_none());
        assert_eq!(page.level(), Some(5));

        let stats = page.quick_stats();
        assert_eq!(stats[0], ("Points", "856".to_string()));
        assert_eq!(stats[2], ("Rank", "5".to_string()));
    }
}

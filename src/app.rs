//! Root shell: routes, navigation and page construction.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::Serialize;

use crate::config::AppConfig;
use crate::error::AppError;
use crate::models::reward::RedeemingUser;
use crate::pages::{
    AdminDashboard, HomePage, LeaderboardPage, ProfilePage, ReviewPage, RewardsPage,
};
use crate::services::Services;

pub const APP_NAME: &str = "CodeQuest Rewards";
pub const LOGO: &str = "🔥";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Route {
    #[default]
    Home,
    Leaderboard,
    Profile,
    Review,
    Rewards,
    Admin,
}

impl Route {
    pub const ALL: [Route; 6] = [
        Route::Home,
        Route::Leaderboard,
        Route::Profile,
        Route::Review,
        Route::Rewards,
        Route::Admin,
    ];

    /// Parse a location path. Unknown paths land on `Home`.
    pub fn from_path(path: &str) -> Self {
        let trimmed = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = trimmed.trim_end_matches('/');
        match trimmed {
            "/leaderboard" => Self::Leaderboard,
            "/profile" => Self::Profile,
            "/review" | "/merge-requests" => Self::Review,
            "/rewards" => Self::Rewards,
            "/admin" => Self::Admin,
            _ => Self::Home,
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::Leaderboard => "/leaderboard",
            Self::Profile => "/profile",
            Self::Review => "/review",
            Self::Rewards => "/rewards",
            Self::Admin => "/admin",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::Leaderboard => "Leaderboard",
            Self::Profile => "Profile",
            Self::Review => "Review",
            Self::Rewards => "Rewards",
            Self::Admin => "Admin",
        }
    }
}

impl FromStr for Route {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_path(s))
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavItem {
    pub route: Route,
    pub label: &'static str,
    pub path: &'static str,
    pub active: bool,
}

/// Entries of the navigation bar with `current` marked active.
pub fn nav_items(current: Route) -> Vec<NavItem> {
    Route::ALL
        .into_iter()
        .map(|route| NavItem {
            route,
            label: route.label(),
            path: route.path(),
            active: route == current,
        })
        .collect()
}

/// A constructed page, ready to load.
pub enum Page {
    Home(Box<HomePage>),
    Leaderboard(Box<LeaderboardPage>),
    Profile(Box<ProfilePage>),
    Review(Box<ReviewPage>),
    Rewards(Box<RewardsPage>),
    Admin(Box<AdminDashboard>),
}

impl Page {
    pub async fn load(&mut self) {
        match self {
            Self::Home(page) => page.load().await,
            Self::Leaderboard(page) => page.load().await,
            Self::Profile(page) => page.load().await,
            Self::Review(page) => page.load().await,
            Self::Rewards(page) => page.load().await,
            Self::Admin(page) => page.load().await,
        }
    }
}

/// The application root. Owns the services shared by every page.
pub struct App {
    services: Services,
    route: Route,
}

impl App {
    pub fn new(services: Services) -> Self {
        Self {
            services,
            route: Route::Home,
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        Ok(Self::new(Services::from_config(config)?))
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    pub fn route(&self) -> Route {
        self.route
    }

    pub fn nav_items(&self) -> Vec<NavItem> {
        nav_items(self.route)
    }

    /// Navigate to `path` and build the page for it.
    pub fn navigate<R: Rng + ?Sized>(&mut self, path: &str, rng: &mut R) -> Page {
        self.route = Route::from_path(path);
        log::debug!("[app] Navigating to {}", self.route);
        self.page(rng)
    }

    fn page<R: Rng + ?Sized>(&self, rng: &mut R) -> Page {
        let services = self.services.clone();
        match self.route {
            Route::Home => Page::Home(Box::new(HomePage::new(services, rng))),
            Route::Leaderboard => Page::Leaderboard(Box::new(LeaderboardPage::new(services))),
            Route::Profile => Page::Profile(Box::new(ProfilePage::new(services))),
            Route::Review => Page::Review(Box::new(ReviewPage::new(services))),
            Route::Rewards => Page::Rewards(Box::new(RewardsPage::new(
                services,
                default_redeeming_user(),
            ))),
            Route::Admin => Page::Admin(Box::new(AdminDashboard::new(services))),
        }
    }
}

/// Balance used by the rewards page until a wallet endpoint exists.
pub fn default_redeeming_user() -> RedeemingUser {
    RedeemingUser {
        name: "DragonSlayer".to_string(),
        level: 5,
        points: 3000,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_from_path() {
        assert_eq!(Route::from_path("/"), Route::Home);
        assert_eq!(Route::from_path("/leaderboard"), Route::Leaderboard);
        assert_eq!(Route::from_path("/profile/"), Route::Profile);
        assert_eq!(Route::from_path("/merge-requests"), Route::Review);
        assert_eq!(Route::from_path("/rewards?category=digital"), Route::Rewards);
        assert_eq!(Route::from_path("/admin"), Route::Admin);
        assert_eq!(Route::from_path("/nowhere"), Route::Home);
        assert_eq!(Route::from_path(""), Route::Home);
    }

    #[test]
    fn test_paths_round_trip() {
        for route in Route::ALL {
            assert_eq!(Route::from_path(route.path()), route);
        }
    }

    #[test]
    fn test_nav_items_mark_active() {
        let items = nav_items(Route::Rewards);
        assert_eq!(items.len(), 6);
        let active: Vec<_> = items.iter().filter(|i| i.active).collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].label, "Rewards");
    }

    #[tokio::test]
    async fn test_navigate_builds_and_loads_page() {
        let mut app = App::new(Services::mock().unwrap());
        let mut rng = StdRng::seed_from_u64(0);

        let mut page = app.navigate("/review", &mut rng);
        assert_eq!(app.route(), Route::Review);
        page.load().await;
        match page {
            Page::Review(review) => assert!(review.selected.is_some()),
            _ => panic!("expected the review page"),
        }
    }
}

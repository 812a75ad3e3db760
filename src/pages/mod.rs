//! Page view models.
//!
//! Each page owns its view state and a [`Services`](crate::services::Services)
//! handle. `load()` issues the page's fetches; user actions are methods.
//! Service failures never propagate out of a page: they are logged and
//! surfaced through the page's [`Notice`].

pub mod admin;
pub mod home;
pub mod leaderboard;
pub mod profile;
pub mod review;
pub mod rewards;

use serde::Serialize;

use crate::error::AppError;

pub use admin::{AdminDashboard, AdminTab};
pub use home::HomePage;
pub use leaderboard::{LeaderboardPage, LeaderboardTab};
pub use profile::{ProfilePage, ProfileTab};
pub use review::{ReviewPage, SessionStats};
pub use rewards::RewardsPage;

/// A message for the user after an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "lowercase")]
pub enum Notice {
    Success(String),
    Error(String),
}

impl Notice {
    /// Log `err` and turn it into an error notice prefixed with `action`.
    pub(crate) fn failed(action: &str, err: &AppError) -> Self {
        log::error!("[pages] {}: {}", action, err);
        Self::Error(format!("{}: {}", action, err))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Success(message) | Self::Error(message) => message,
        }
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

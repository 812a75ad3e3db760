//! CodeQuest Rewards - gamified merge request review dashboard.
//!
//! Reviewers claim bugs found in merge requests, earn points and XP, and
//! redeem points for rewards. Services read from a pluggable data source
//! (an in-process mock or a remote REST backend) and keep their state in
//! an in-memory fixture store. Pages are view models over the services.

pub mod api;
pub mod app;
pub mod config;
pub mod effects;
pub mod error;
pub mod models;
pub mod pages;
pub mod services;
pub mod store;

pub use app::{App, Route};
pub use config::AppConfig;
pub use error::AppError;
pub use services::Services;

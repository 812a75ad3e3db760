//! Data models for the application.
//!
//! These models represent the fixture entities held by the store and the
//! JSON payloads exchanged with the rewards backend. All wire-facing models
//! use the backend's camelCase field names.

pub mod admin;
pub mod comment;
pub mod diff;
pub mod git_integration;
pub mod leaderboard;
pub mod merge_request;
pub mod project;
pub mod reward;
pub mod user;

use serde::{Deserialize, Serialize};

// Re-exports for convenient access
pub use admin::{
    AddProjectResult, Analytics, ManagedProject, ManagedUser, NewManagedProject, NewManagedUser,
    SystemConfig, UserFilters,
};
pub use comment::{Comment, CommentResult, NewComment};
pub use diff::{format_diff_lines, DiffLine, DiffLineKind};
pub use git_integration::{
    ConfigureRepositoryResult, ConnectedRepository, RepositoryConfig, RepositoryFilters,
    RepositoryStats, SyncResult, WebhookEvent, WebhookEventFilters, WebhookTestResult,
};
pub use leaderboard::{EarnerEntry, LeaderboardOptions, ReviewerEntry, Season, UserRanking};
pub use merge_request::{
    Bug, BugReward, ClaimResult, CodeChange, MergeRequest, MergeRequestFilters,
    MergeRequestStatus, ReviewResult, ReviewSubmission, Severity,
};
pub use project::{
    CreateProjectResult, GitProvider, MemberRole, NewProject, Project, ProjectFilters,
    ProjectPerformance, ProjectUpdate, RoutingAction, RoutingRule, Team, Timeframe,
};
pub use reward::{
    Popularity, RedeemingUser, RedemptionRecord, RedemptionResult, RedemptionStatus, Reward,
    RewardCategory, RewardFilters, RewardSort,
};
pub use user::{
    Activity, ActivityFilters, ActivityType, Badge, ReviewBadge, UserProfile, UserStats,
    UserStatsSnapshot,
};

/// Plain acknowledgement returned by mutating endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ack {
    pub success: bool,
    pub message: String,
}

impl Ack {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// A page of results with its total count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: usize,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>) -> Self {
        let total = data.len();
        Self { data, total }
    }
}

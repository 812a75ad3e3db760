//! Git provider integration models: connected repositories, syncs and webhooks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::project::GitProvider;

/// Connection request for a new repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryConfig {
    pub name: String,
    pub url: String,
    pub provider: GitProvider,
}

/// A repository connected to a Git provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectedRepository {
    pub id: String,
    pub name: String,
    pub url: String,
    pub provider: GitProvider,
    pub webhook_configured: bool,
    pub api_access_configured: bool,
    pub active_since: DateTime<Utc>,

    #[serde(rename = "openPRs", default)]
    pub open_prs: u32,

    #[serde(rename = "totalPRs", default)]
    pub total_prs: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigureRepositoryResult {
    pub success: bool,
    pub repository: ConnectedRepository,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepositoryFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<GitProvider>,
}

/// Outcome of a manual sync with the Git providers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResult {
    pub success: bool,
    pub sync_id: String,

    #[serde(alias = "repositoriesSynced")]
    pub repository_synced: u32,

    #[serde(rename = "newPRsDetected")]
    pub new_prs_detected: u32,

    #[serde(rename = "updatedPRs")]
    pub updated_prs: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookTestResult {
    pub success: bool,
    pub webhook_url: String,
    pub test_event_sent: bool,
    pub test_event_received: bool,
    pub latency: String,
}

/// Webhook delivery received from a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookEvent {
    pub id: String,

    /// Repository name.
    pub repository: String,

    /// Provider event name, e.g. `pull_request.opened`.
    pub event_type: String,

    pub received_at: DateTime<Utc>,
    pub processed: bool,
    pub pr_id: String,
    pub pr_title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookEventFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
}

impl WebhookEventFilters {
    pub fn matches(&self, event: &WebhookEvent) -> bool {
        if let Some(repository) = &self.repository {
            if &event.repository != repository {
                return false;
            }
        }
        if let Some(event_type) = &self.event_type {
            if &event.event_type != event_type {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryReviewer {
    pub name: String,
    pub reviews_completed: u32,
    pub bugs_found: u32,
}

/// PR statistics for one repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryStats {
    #[serde(rename = "totalPRs")]
    pub total_prs: u32,

    #[serde(rename = "openPRs")]
    pub open_prs: u32,

    #[serde(rename = "reviewedPRs")]
    pub reviewed_prs: u32,

    pub average_time_to_review: String,
    pub bugs_detected: u32,
    pub top_reviewers: Vec<RepositoryReviewer>,
}

//! Merge request, code change and bug models.

use crate::error::AppError;
use crate::models::comment::Comment;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Status of a merge request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeRequestStatus {
    Open,
    Merged,
    Closed,
}

impl FromStr for MergeRequestStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "open" | "opened" => Ok(Self::Open),
            "merged" => Ok(Self::Merged),
            "closed" => Ok(Self::Closed),
            other => Err(AppError::invalid_input_field(
                format!("Unknown merge request status: {}", other),
                "status",
            )),
        }
    }
}

impl std::fmt::Display for MergeRequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Merged => write!(f, "merged"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

/// Severity tier of a flagged bug.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl FromStr for Severity {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(AppError::invalid_input_field(
                format!("Unknown severity: {}", other),
                "severity",
            )),
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// Reward tier awarded for claiming a bug of a given severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BugReward {
    /// Baseline points for the tier.
    pub points: i64,

    /// Experience awarded on claim.
    pub xp: i64,

    pub description: &'static str,
}

impl BugReward {
    /// Static severity → reward table.
    pub const fn for_severity(severity: Severity) -> Self {
        match severity {
            Severity::Low => Self {
                points: 10,
                xp: 5,
                description: "Minor issues, simple fixes",
            },
            Severity::Medium => Self {
                points: 20,
                xp: 15,
                description: "Moderate issues, potential edge cases",
            },
            Severity::High => Self {
                points: 30,
                xp: 25,
                description: "Critical issues, security vulnerabilities",
            },
        }
    }
}

/// A defect flagged inside a code change, waiting to be claimed.
///
/// A bug moves from unclaimed to claimed exactly once; there is no way back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bug {
    pub id: String,
    pub description: String,
    pub severity: Severity,
    pub claimed: bool,

    /// Affected lines in the diff.
    pub line_numbers: Vec<u32>,

    /// Bug-specific point value (may differ from the tier baseline).
    pub points: i64,
}

impl Bug {
    /// Check if the bug touches the given diff line.
    pub fn covers_line(&self, line: u32) -> bool {
        self.line_numbers.contains(&line)
    }

    /// Reward tier for this bug's severity.
    pub fn reward_tier(&self) -> BugReward {
        BugReward::for_severity(self.severity)
    }
}

/// A single changed file within a merge request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeChange {
    pub id: String,
    pub filename: String,
    pub additions: u32,
    pub deletions: u32,

    /// Raw unified diff text.
    pub diff_content: String,

    pub bugs: Vec<Bug>,
}

impl CodeChange {
    pub fn bug(&self, bug_id: &str) -> Option<&Bug> {
        self.bugs.iter().find(|b| b.id == bug_id)
    }
}

/// A merge request under review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeRequest {
    /// Display ID, e.g. `MR-1423`.
    pub id: String,

    pub title: String,

    /// Author's display name.
    pub author: String,
    pub author_avatar: String,

    pub project_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub status: MergeRequestStatus,

    /// MR description (Markdown).
    pub description: String,

    pub code_changes: Vec<CodeChange>,
    pub reviewers: Vec<String>,
    pub comments: Vec<Comment>,

    /// Aggregate counters as reported for the MR.
    pub bugs_claimed: u32,
    pub bugs_total: u32,

    /// Set once a review has been submitted.
    #[serde(default)]
    pub reviews_completed: bool,
}

impl MergeRequest {
    /// Locate a bug by scanning each code change in order.
    pub fn find_bug(&self, bug_id: &str) -> Option<(&CodeChange, &Bug)> {
        self.code_changes
            .iter()
            .find_map(|change| change.bug(bug_id).map(|bug| (change, bug)))
    }

    /// Mutable counterpart of [`MergeRequest::find_bug`].
    pub fn find_bug_mut(&mut self, bug_id: &str) -> Option<&mut Bug> {
        self.code_changes
            .iter_mut()
            .flat_map(|change| change.bugs.iter_mut())
            .find(|b| b.id == bug_id)
    }

    /// Claimed and total bugs derived from the bug flags.
    pub fn bug_counts(&self) -> (usize, usize) {
        let bugs = self.code_changes.iter().flat_map(|c| c.bugs.iter());
        let (claimed, total) = bugs.fold((0, 0), |(claimed, total), bug| {
            (claimed + usize::from(bug.claimed), total + 1)
        });
        (claimed, total)
    }

    /// Case-insensitive substring match on title or ID.
    pub fn matches_search(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.title.to_lowercase().contains(&query) || self.id.to_lowercase().contains(&query)
    }

    pub fn is_open(&self) -> bool {
        self.status == MergeRequestStatus::Open
    }
}

/// Filters accepted by the merge request list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeRequestFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<MergeRequestStatus>,

    /// Exact project name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,

    /// Substring over title and ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl MergeRequestFilters {
    pub fn matches(&self, mr: &MergeRequest) -> bool {
        if let Some(status) = self.status {
            if mr.status != status {
                return false;
            }
        }
        if let Some(project) = self.project.as_deref() {
            if mr.project_name != project {
                return false;
            }
        }
        match self.search.as_deref() {
            Some(query) if !query.is_empty() => mr.matches_search(query),
            _ => true,
        }
    }
}

/// Result of claiming a bug.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimResult {
    pub success: bool,
    pub bug_id: String,
    pub description: String,

    /// The bug's own point value.
    pub points: i64,

    /// XP from the severity tier.
    pub xp: i64,

    pub severity: Severity,
}

/// Review submitted for a merge request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSubmission {
    /// Review outcome, e.g. `completed`.
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

impl ReviewSubmission {
    /// A completed review stamped with the current time.
    pub fn completed() -> Self {
        Self {
            status: "completed".to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Result of submitting a review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResult {
    pub success: bool,
    pub review_id: String,
    pub message: String,
}

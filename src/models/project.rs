//! Project, team and reviewer routing models.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::AppError;

/// Supported Git hosting providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GitProvider {
    Github,
    Gitlab,
}

impl FromStr for GitProvider {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "github" => Ok(Self::Github),
            "gitlab" => Ok(Self::Gitlab),
            other => Err(AppError::invalid_input_field(
                format!("Unsupported git provider: {}", other),
                "provider",
            )),
        }
    }
}

impl std::fmt::Display for GitProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Github => write!(f, "github"),
            Self::Gitlab => write!(f, "gitlab"),
        }
    }
}

/// Repository reference attached to a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRepository {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub provider: GitProvider,
}

/// Headline metrics shown in the project list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectMetrics {
    #[serde(rename = "activeMRs")]
    pub active_mrs: u32,

    #[serde(rename = "reviewedLast30Days")]
    pub reviewed_last_30_days: u32,

    /// Display percentage, e.g. `18%`.
    #[serde(rename = "bugsDetectedRate")]
    pub bugs_detected_rate: String,
}

impl ProjectMetrics {
    /// Metrics for a freshly created project.
    pub fn empty() -> Self {
        Self {
            active_mrs: 0,
            reviewed_last_30_days: 0,
            bugs_detected_rate: "0%".to_string(),
        }
    }
}

/// Reviewer assignment priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewPriority {
    Low,
    Medium,
    High,
    Critical,
}

/// When a routing rule applies.
///
/// Every criterion that is set must hold for at least one changed path.
/// A `fallback` condition matches unconditionally.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingCondition {
    /// Glob where `*` matches any run of characters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_matches: Option<String>,

    /// File suffixes such as `.js`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub file_types: Vec<String>,

    /// Keywords looked up (case-insensitively) in the changed path.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contains_modification: Vec<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub fallback: bool,
}

impl RoutingCondition {
    pub fn matches<S: AsRef<str>>(&self, changed_paths: &[S]) -> bool {
        if self.fallback {
            return true;
        }
        if self.path_matches.is_none()
            && self.file_types.is_empty()
            && self.contains_modification.is_empty()
        {
            return false;
        }
        changed_paths
            .iter()
            .any(|path| self.matches_path(path.as_ref()))
    }

    fn matches_path(&self, path: &str) -> bool {
        if let Some(pattern) = &self.path_matches {
            if !glob_match(pattern, path) {
                return false;
            }
        }
        if !self.file_types.is_empty() && !self.file_types.iter().any(|ext| path.ends_with(ext.as_str())) {
            return false;
        }
        if !self.contains_modification.is_empty() {
            let lowered = path.to_lowercase();
            if !self
                .contains_modification
                .iter()
                .any(|kw| lowered.contains(&kw.to_lowercase()))
            {
                return false;
            }
        }
        true
    }
}

/// Who gets assigned when a routing rule matches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingAction {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assign_to: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assign_to_team: Option<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub require_secondary_review: bool,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub use_load_balancing: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<ReviewPriority>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingRule {
    pub condition: RoutingCondition,
    pub action: RoutingAction,
}

/// A project with its repositories, owning teams and routing rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    pub description: String,
    pub repositories: Vec<ProjectRepository>,

    /// Team names.
    pub teams: Vec<String>,

    pub primary_languages: Vec<String>,
    pub primary_reviewers: Vec<String>,
    pub metrics: ProjectMetrics,

    /// Populated on the detail view only.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub routing_rules: Vec<RoutingRule>,
}

impl Project {
    pub fn has_team(&self, team: &str) -> bool {
        self.teams.iter().any(|t| t == team)
    }
}

/// Data required to create a project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    pub name: String,
    pub description: String,

    #[serde(default)]
    pub repositories: Vec<ProjectRepository>,

    #[serde(default)]
    pub teams: Vec<String>,

    #[serde(default)]
    pub primary_languages: Vec<String>,

    #[serde(default)]
    pub primary_reviewers: Vec<String>,
}

/// Partial project update; unset fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub repositories: Option<Vec<ProjectRepository>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub teams: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_languages: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_reviewers: Option<Vec<String>>,
}

impl ProjectUpdate {
    pub fn apply_to(&self, project: &mut Project) {
        if let Some(name) = &self.name {
            project.name = name.clone();
        }
        if let Some(description) = &self.description {
            project.description = description.clone();
        }
        if let Some(repositories) = &self.repositories {
            project.repositories = repositories.clone();
        }
        if let Some(teams) = &self.teams {
            project.teams = teams.clone();
        }
        if let Some(languages) = &self.primary_languages {
            project.primary_languages = languages.clone();
        }
        if let Some(reviewers) = &self.primary_reviewers {
            project.primary_reviewers = reviewers.clone();
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
}

/// Reporting window for metrics queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeframe {
    pub period: String,
}

impl Default for Timeframe {
    fn default() -> Self {
        Self {
            period: "month".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    Admin,
    TeamLead,
    Reviewer,
    Developer,
}

impl FromStr for MemberRole {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "team_lead" | "team-lead" => Ok(Self::TeamLead),
            "reviewer" => Ok(Self::Reviewer),
            "developer" => Ok(Self::Developer),
            other => Err(AppError::invalid_input_field(
                format!("Unknown role: {}", other),
                "role",
            )),
        }
    }
}

impl std::fmt::Display for MemberRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::TeamLead => write!(f, "team_lead"),
            Self::Reviewer => write!(f, "reviewer"),
            Self::Developer => write!(f, "developer"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMember {
    pub id: String,
    pub name: String,
    pub role: MemberRole,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMetrics {
    pub reviews_completed: u32,
    pub bugs_detected: u32,
    pub average_response_time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    pub name: String,
    pub description: String,
    pub members: Vec<TeamMember>,
    pub metrics: TeamMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewMetrics {
    pub total_reviews: u32,
    pub bugs_detected: u32,
    pub average_review_time: String,
    pub detection_rate: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityTrends {
    pub bug_detection_rate: Vec<f64>,
    pub review_depth: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectReviewer {
    pub name: String,
    pub review_count: u32,
    pub bugs_found: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewDistribution {
    pub critical: u32,
    pub high: u32,
    pub medium: u32,
    pub low: u32,
}

/// Performance report for one project over a timeframe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPerformance {
    pub review_metrics: ReviewMetrics,
    pub quality_trends: QualityTrends,
    pub top_reviewers: Vec<ProjectReviewer>,
    pub review_distribution: ReviewDistribution,
}

/// Result of creating a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateProjectResult {
    pub success: bool,
    pub project: Project,
}

/// Match `path` against a glob where `*` spans any characters, `/`
/// included. An invalid pattern matches nothing.
pub fn glob_match(pattern: &str, path: &str) -> bool {
    match glob::Pattern::new(pattern) {
        Ok(glob) => glob.matches(path),
        Err(e) => {
            log::warn!("[projects] Invalid routing pattern {:?}: {}", pattern, e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glob_match() {
        assert!(glob_match("src/main/*", "src/main/app.js"));
        assert!(glob_match("src/main/*", "src/main/nested/app.js"));
        assert!(glob_match("*.rs", "lib.rs"));
        assert!(glob_match("src/*/mod.rs", "src/api/mod.rs"));
        assert!(!glob_match("src/api/*", "src/main/app.js"));
        assert!(!glob_match("src/main", "src/main/app.js"));
    }

    #[test]
    fn test_invalid_pattern_matches_nothing() {
        assert!(!glob_match("src/[", "src/["));

        let condition = RoutingCondition {
            path_matches: Some("src/[".to_string()),
            ..Default::default()
        };
        assert!(!condition.matches(&["src/[", "src/main.rs"]));
    }

    #[test]
    fn test_condition_requires_every_criterion() {
        let condition = RoutingCondition {
            path_matches: Some("src/main/*".to_string()),
            file_types: vec![".js".to_string(), ".jsx".to_string()],
            ..Default::default()
        };
        assert!(condition.matches(&["src/main/App.jsx"]));
        assert!(!condition.matches(&["src/main/App.css"]));
        assert!(!condition.matches(&["lib/App.js"]));
    }

    #[test]
    fn test_condition_keywords_case_insensitive() {
        let condition = RoutingCondition {
            path_matches: Some("src/api/*".to_string()),
            contains_modification: vec!["auth".to_string(), "security".to_string()],
            ..Default::default()
        };
        assert!(condition.matches(&["src/api/Auth.js"]));
        assert!(!condition.matches(&["src/api/payments.js"]));
    }

    #[test]
    fn test_empty_condition_never_matches_but_fallback_does() {
        let empty = RoutingCondition::default();
        assert!(!empty.matches(&["anything"]));

        let fallback = RoutingCondition {
            fallback: true,
            ..Default::default()
        };
        assert!(fallback.matches::<&str>(&[]));
    }

    #[test]
    fn test_project_update_applies_only_set_fields() {
        let mut project = Project {
            id: "proj-1".to_string(),
            name: "Auth Service".to_string(),
            description: "Authentication".to_string(),
            repositories: vec![],
            teams: vec!["Backend Team".to_string()],
            primary_languages: vec![],
            primary_reviewers: vec![],
            metrics: ProjectMetrics::empty(),
            routing_rules: vec![],
        };
        let update = ProjectUpdate {
            description: Some("Identity platform".to_string()),
            ..Default::default()
        };
        update.apply_to(&mut project);
        assert_eq!(project.name, "Auth Service");
        assert_eq!(project.description, "Identity platform");
    }

    #[test]
    fn test_metrics_serde_names() {
        let json = serde_json::to_string(&ProjectMetrics::empty()).unwrap();
        assert!(json.contains("\"activeMRs\":0"));
        assert!(json.contains("\"reviewedLast30Days\":0"));
        assert!(json.contains("\"bugsDetectedRate\":\"0%\""));
    }

    #[test]
    fn test_member_role_parse() {
        assert_eq!("team_lead".parse::<MemberRole>().unwrap(), MemberRole::TeamLead);
        assert!("owner".parse::<MemberRole>().is_err());
        assert_eq!(MemberRole::TeamLead.to_string(), "team_lead");
    }
}

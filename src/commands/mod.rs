//! Command-line handlers.
//!
//! Each submodule backs one top-level subcommand:
//! - `dashboard`: home, leaderboard and profile views
//! - `mr`: merge request browsing, bug claims, reviews and comments
//! - `rewards`: catalog, categories, history and redemption
//! - `projects`: project details, teams, metrics and reviewer routing
//! - `repos`: connected repositories, syncs and webhooks
//! - `admin`: system configuration, managed users and analytics
//! - `fire`: headless run of the fire simulation
//! - `auth`: API token storage in the OS keychain

pub mod admin;
pub mod auth;
pub mod dashboard;
pub mod fire;
pub mod mr;
pub mod projects;
pub mod repos;
pub mod rewards;

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use codequest_rewards::pages::admin::FormErrors;
use codequest_rewards::pages::Notice;
use codequest_rewards::AppError;

/// Where command results go: pretty JSON or human-readable text.
pub struct Output {
    json: bool,
}

impl Output {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    /// Print `value` as JSON, or the text produced by `human`.
    pub fn emit<T, F>(&self, value: &T, human: F) -> Result<(), AppError>
    where
        T: Serialize + ?Sized,
        F: FnOnce(&T) -> String,
    {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            println!("{}", human(value));
        }
        Ok(())
    }
}

/// Surface a page notice. Errors recorded by a page become command errors.
pub(crate) fn check_notice(notice: Option<&Notice>) -> Result<(), AppError> {
    match notice {
        Some(notice) if notice.is_error() => Err(AppError::internal(notice.message())),
        Some(notice) => {
            eprintln!("{}", notice.message());
            Ok(())
        }
        None => Ok(()),
    }
}

/// Turn the validation errors of an admin form into one error.
pub(crate) fn form_error(errors: &FormErrors) -> AppError {
    let message = errors.values().copied().collect::<Vec<_>>().join("; ");
    match errors.keys().next() {
        Some(field) => AppError::invalid_input_field(message, *field),
        None => AppError::invalid_input(message),
    }
}

/// Read and parse a JSON document from disk.
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, AppError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        AppError::invalid_input(format!("Failed to read {}: {}", path.display(), e))
    })?;
    Ok(serde_json::from_str(&content)?)
}

/// Split a comma separated option into trimmed, non-empty values.
pub(crate) fn split_list(value: Option<&str>) -> Vec<String> {
    value
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_list() {
        assert_eq!(
            split_list(Some("Backend Team, UX Team,,")),
            vec!["Backend Team", "UX Team"]
        );
        assert!(split_list(None).is_empty());
    }

    #[test]
    fn test_form_error_joins_messages() {
        let mut errors = FormErrors::new();
        errors.insert("name", "Name is required");
        errors.insert("teams", "At least one team must be selected");
        let err = form_error(&errors);
        assert_eq!(
            err.to_string(),
            "Invalid input: Name is required; At least one team must be selected"
        );
    }

    #[test]
    fn test_error_notice_fails_command() {
        let err = check_notice(Some(&Notice::Error("Failed to load rewards: boom".into())));
        assert!(err.is_err());
        assert!(check_notice(Some(&Notice::Success("ok".into()))).is_ok());
        assert!(check_notice(None).is_ok());
    }
}

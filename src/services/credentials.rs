//! Credential storage service using the OS keychain.
//!
//! Holds the backend bearer token and its refresh token under fixed keys
//! (Keychain on macOS, Credential Manager on Windows, Secret Service on
//! Linux).

use crate::config::ApiConfig;
use crate::error::AppError;
use keyring::Entry;

/// Service name used in the keychain.
const SERVICE_NAME: &str = "codequest-rewards";

/// Key of the bearer token.
pub const AUTH_TOKEN_KEY: &str = "auth_token";

/// Key of the refresh token.
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// Credential storage operations.
pub struct CredentialService;

impl CredentialService {
    /// Store a token under the given key.
    pub fn store_token(key: &str, token: &str) -> Result<(), AppError> {
        if token.trim().is_empty() {
            return Err(AppError::invalid_input_field("Token must not be empty", key));
        }
        let entry = Self::get_entry(key)?;

        entry
            .set_password(token)
            .map_err(|e| AppError::credential_storage(format!("Failed to store token: {}", e)))
    }

    /// Retrieve the token stored under `key`.
    pub fn get_token(key: &str) -> Result<String, AppError> {
        let entry = Self::get_entry(key)?;

        entry.get_password().map_err(|e| match e {
            keyring::Error::NoEntry => AppError::not_found_with_id("credential", key),
            _ => AppError::credential_storage(format!("Failed to retrieve token: {}", e)),
        })
    }

    /// Delete the token stored under `key`.
    ///
    /// Deleting a missing token is not an error.
    pub fn delete_token(key: &str) -> Result<(), AppError> {
        let entry = Self::get_entry(key)?;

        match entry.delete_credential() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(AppError::credential_storage(format!(
                "Failed to delete token: {}",
                e
            ))),
        }
    }

    pub fn has_token(key: &str) -> Result<bool, AppError> {
        let entry = Self::get_entry(key)?;

        match entry.get_password() {
            Ok(_) => Ok(true),
            Err(keyring::Error::NoEntry) => Ok(false),
            Err(e) => Err(AppError::credential_storage(format!(
                "Failed to check token: {}",
                e
            ))),
        }
    }

    /// Store both tokens at once. A missing refresh token clears the old one.
    pub fn store_tokens(auth_token: &str, refresh_token: Option<&str>) -> Result<(), AppError> {
        Self::store_token(AUTH_TOKEN_KEY, auth_token)?;
        match refresh_token {
            Some(refresh) => Self::store_token(REFRESH_TOKEN_KEY, refresh),
            None => Self::delete_token(REFRESH_TOKEN_KEY),
        }
    }

    pub fn clear_tokens() -> Result<(), AppError> {
        Self::delete_token(AUTH_TOKEN_KEY)?;
        Self::delete_token(REFRESH_TOKEN_KEY)
    }

    /// Bearer token for backend requests.
    ///
    /// A token from the configuration wins over the keychain. Keychain
    /// failures are logged and treated as "no token" so requests still go
    /// out unauthenticated.
    pub fn resolve_auth_token(config: &ApiConfig) -> Option<String> {
        if let Some(token) = config.auth_token.as_deref().map(str::trim) {
            if !token.is_empty() {
                return Some(token.to_string());
            }
        }

        match Self::get_token(AUTH_TOKEN_KEY) {
            Ok(token) => Some(token),
            Err(e) if e.is_not_found() => None,
            Err(e) => {
                log::warn!("[credentials] Keychain unavailable: {}", e);
                None
            }
        }
    }

    /// Create a keyring entry for the given key.
    fn get_entry(key: &str) -> Result<Entry, AppError> {
        Entry::new(SERVICE_NAME, &normalize_key(key)).map_err(|e| {
            AppError::credential_storage(format!("Failed to create keyring entry: {}", e))
        })
    }
}

/// Normalize a key for use as an account identifier.
fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key(" AUTH_TOKEN "), "auth_token");
        assert_eq!(normalize_key("refresh_token"), "refresh_token");
    }

    #[test]
    fn test_config_token_wins() {
        let config = ApiConfig {
            auth_token: Some("from-env".to_string()),
            ..ApiConfig::default()
        };
        assert_eq!(
            CredentialService::resolve_auth_token(&config).as_deref(),
            Some("from-env")
        );
    }

    #[test]
    fn test_empty_token_rejected() {
        let err = CredentialService::store_token(AUTH_TOKEN_KEY, "  ").unwrap_err();
        assert!(matches!(err, AppError::InvalidInput { .. }));
    }

    // Keychain round trips need a real secret store and are exercised
    // manually rather than in CI.
}

//! API token management.
//!
//! Tokens live in the OS keychain and are picked up by the remote data
//! source when `CODEQUEST_AUTH_TOKEN` is not set.

use clap::Subcommand;
use serde::Serialize;

use codequest_rewards::services::credentials::{AUTH_TOKEN_KEY, REFRESH_TOKEN_KEY};
use codequest_rewards::services::CredentialService;
use codequest_rewards::AppError;

use super::Output;

#[derive(Subcommand)]
pub enum AuthAction {
    /// Store the bearer token (and optionally a refresh token).
    SetToken {
        token: String,

        #[arg(long)]
        refresh: Option<String>,
    },

    /// Remove stored tokens.
    Clear,

    /// Report which tokens are stored.
    Status,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TokenStatus {
    auth_token: bool,
    refresh_token: bool,
}

pub fn run(action: &AuthAction, out: &Output) -> Result<(), AppError> {
    match action {
        AuthAction::SetToken { token, refresh } => {
            CredentialService::store_tokens(token, refresh.as_deref())?;
            log::info!("[auth] Stored API token");
            out.emit("Token stored", |msg| msg.to_string())
        }
        AuthAction::Clear => {
            CredentialService::clear_tokens()?;
            log::info!("[auth] Cleared API tokens");
            out.emit("Tokens cleared", |msg| msg.to_string())
        }
        AuthAction::Status => {
            let status = TokenStatus {
                auth_token: CredentialService::has_token(AUTH_TOKEN_KEY)?,
                refresh_token: CredentialService::has_token(REFRESH_TOKEN_KEY)?,
            };
            out.emit(&status, |s| {
                let mark = |present: bool| if present { "stored" } else { "missing" };
                format!(
                    "auth token: {}\nrefresh token: {}",
                    mark(s.auth_token),
                    mark(s.refresh_token)
                )
            })
        }
    }
}

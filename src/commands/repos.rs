//! Repository integration commands.

use clap::Subcommand;

use codequest_rewards::models::git_integration::{
    RepositoryConfig, RepositoryFilters, WebhookEventFilters,
};
use codequest_rewards::{AppError, Services};

use super::Output;

#[derive(Subcommand)]
pub enum ReposAction {
    /// List connected repositories.
    List {
        /// github or gitlab.
        #[arg(long)]
        provider: Option<String>,
    },

    /// Connect a repository.
    Connect {
        #[arg(long)]
        name: String,

        #[arg(long)]
        url: String,

        #[arg(long, default_value = "github")]
        provider: String,
    },

    /// Sync pull requests from the providers.
    Sync {
        /// Only this repository.
        #[arg(long)]
        repo: Option<String>,
    },

    /// Send a test event to a repository's webhook.
    TestWebhook { repo: String },

    /// Webhook delivery history.
    Events {
        /// Repository name.
        #[arg(long)]
        repo: Option<String>,

        /// Event type, e.g. pull_request.opened.
        #[arg(long = "type")]
        event_type: Option<String>,
    },

    /// Pull request statistics for a repository.
    Stats { repo: String },
}

pub async fn run(action: ReposAction, services: &Services, out: &Output) -> Result<(), AppError> {
    match action {
        ReposAction::List { provider } => {
            let filters = RepositoryFilters {
                provider: provider.as_deref().map(str::parse).transpose()?,
            };
            let repos = services.git.get_connected_repositories(&filters).await?;
            out.emit(&repos, |repos| {
                repos
                    .iter()
                    .map(|r| {
                        let webhook = if r.webhook_configured { "webhook ✓" } else { "webhook ✗" };
                        format!(
                            "{:<8} {:<24} {:<7} {} open / {} PRs  {}  since {}",
                            r.id,
                            r.name,
                            r.provider.to_string(),
                            r.open_prs,
                            r.total_prs,
                            webhook,
                            r.active_since.format("%Y-%m-%d")
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }
        ReposAction::Connect {
            name,
            url,
            provider,
        } => {
            let config = RepositoryConfig {
                name,
                url,
                provider: provider.parse()?,
            };
            let result = services.git.configure_repository(&config).await?;
            out.emit(&result, |r| {
                format!(
                    "Connected {} ({}) as {}",
                    r.repository.name, r.repository.provider, r.repository.id
                )
            })
        }
        ReposAction::Sync { repo } => {
            let result = services.git.trigger_sync(repo.as_deref()).await?;
            out.emit(&result, |r| {
                format!(
                    "Sync {}: {} repositories, {} new PRs, {} updated",
                    r.sync_id, r.repository_synced, r.new_prs_detected, r.updated_prs
                )
            })
        }
        ReposAction::TestWebhook { repo } => {
            let result = services.git.test_webhook(&repo).await?;
            out.emit(&result, |r| {
                let status = if r.test_event_received { "received" } else { "not received" };
                format!("{}: test event {} ({})", r.webhook_url, status, r.latency)
            })
        }
        ReposAction::Events { repo, event_type } => {
            let filters = WebhookEventFilters {
                repository: repo,
                event_type,
            };
            let events = services.git.get_webhook_event_history(&filters).await?;
            out.emit(&events, |events| {
                if events.is_empty() {
                    return "No webhook events".to_string();
                }
                events
                    .iter()
                    .map(|e| {
                        let processed = if e.processed { "processed" } else { "pending" };
                        format!(
                            "{}  {:<24} {:<22} {} {}  [{}]",
                            e.received_at.format("%Y-%m-%d %H:%M"),
                            e.repository,
                            e.event_type,
                            e.pr_id,
                            e.pr_title,
                            processed
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }
        ReposAction::Stats { repo } => {
            let stats = services.git.get_repository_pr_stats(&repo).await?;
            out.emit(&stats, |s| {
                let mut text = format!(
                    "PRs {} total, {} open, {} reviewed\nAvg time to review {}\nBugs detected {}\n",
                    s.total_prs, s.open_prs, s.reviewed_prs, s.average_time_to_review, s.bugs_detected
                );
                for reviewer in &s.top_reviewers {
                    text.push_str(&format!(
                        "  {:<16} {} reviews, {} bugs\n",
                        reviewer.name, reviewer.reviews_completed, reviewer.bugs_found
                    ));
                }
                text
            })
        }
    }
}

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use codequest_rewards::{AppConfig, AppError, Services};

use commands::Output;

/// CodeQuest Rewards -- claim bugs, climb the leaderboard, redeem rewards.
#[derive(Parser)]
#[command(name = "codequest", version, about)]
struct Cli {
    /// JSON settings file applied on top of the environment.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print results as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Landing page summary (default when no subcommand is given).
    Home,

    /// Browse and review merge requests.
    Mr {
        #[command(subcommand)]
        action: commands::mr::MrAction,
    },

    /// Browse and redeem rewards.
    Rewards {
        #[command(subcommand)]
        action: commands::rewards::RewardsAction,
    },

    /// Top reviewers or earners for the current season.
    Leaderboard {
        /// Show earners instead of reviewers.
        #[arg(long)]
        earners: bool,

        /// Number of entries to show.
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Your profile, badges and activity.
    Profile {
        /// Only show activity of this type (review, badge, level, quest).
        #[arg(long)]
        activity: Option<String>,
    },

    /// Projects, teams and reviewer routing.
    Projects {
        #[command(subcommand)]
        action: commands::projects::ProjectsAction,
    },

    /// Connected repositories and webhooks.
    Repos {
        #[command(subcommand)]
        action: commands::repos::ReposAction,
    },

    /// System configuration, users and analytics.
    Admin {
        #[command(subcommand)]
        action: commands::admin::AdminAction,
    },

    /// Run the fire simulation headless and report particle stats.
    Fire {
        /// Frames to simulate at 60 fps.
        #[arg(long, default_value_t = 60)]
        frames: u32,

        /// Particle count.
        #[arg(long)]
        particles: Option<usize>,
    },

    /// Manage the API token in the OS keychain.
    Auth {
        #[command(subcommand)]
        action: commands::auth::AuthAction,
    },
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn load_config(path: Option<&PathBuf>) -> Result<AppConfig, AppError> {
    let config = AppConfig::from_env()?;
    match path {
        Some(path) => config.overlay_file(path),
        None => Ok(config),
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let out = Output::new(cli.json);

    // Keychain commands must work without a reachable backend.
    if let Some(Command::Auth { action }) = &cli.command {
        return commands::auth::run(action, &out);
    }

    let config = load_config(cli.config.as_ref())?;
    let services = Services::from_config(&config)?;

    match cli.command {
        None | Some(Command::Home) => commands::dashboard::home(&services, &out).await,
        Some(Command::Mr { action }) => commands::mr::run(action, &services, &out).await,
        Some(Command::Rewards { action }) => {
            commands::rewards::run(action, &services, &out).await
        }
        Some(Command::Leaderboard { earners, limit }) => {
            commands::dashboard::leaderboard(&services, earners, limit, &out).await
        }
        Some(Command::Profile { activity }) => {
            commands::dashboard::profile(&services, activity.as_deref(), &out).await
        }
        Some(Command::Projects { action }) => {
            commands::projects::run(action, &services, &out).await
        }
        Some(Command::Repos { action }) => commands::repos::run(action, &services, &out).await,
        Some(Command::Admin { action }) => commands::admin::run(action, &services, &out).await,
        Some(Command::Fire { frames, particles }) => commands::fire::run(frames, particles, &out),
        Some(Command::Auth { .. }) => Ok(()),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::debug!("[cli] {:?}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

//! Administration commands.

use std::path::PathBuf;

use clap::Subcommand;
use serde::Serialize;

use codequest_rewards::models::admin::{
    ManagedUser, NewManagedProject, SystemConfig, UserFilters,
};
use codequest_rewards::models::project::{Team, TeamMember, Timeframe};
use codequest_rewards::pages::admin::{AssignmentView, UserManagement};
use codequest_rewards::pages::AdminDashboard;
use codequest_rewards::{AppError, Services};

use super::{check_notice, form_error, read_json, Output};

#[derive(Subcommand)]
pub enum AdminAction {
    /// Analytics summary and user list.
    Overview,

    /// Show the system configuration, or replace it from a JSON file.
    Config {
        #[arg(long)]
        set: Option<PathBuf>,
    },

    /// List users.
    Users {
        /// admin, team_lead, reviewer or developer.
        #[arg(long)]
        role: Option<String>,

        #[arg(long)]
        team: Option<String>,
    },

    /// Add a user.
    AddUser {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long, default_value = "reviewer")]
        role: String,

        /// Team, repeatable.
        #[arg(long = "team")]
        teams: Vec<String>,

        #[arg(long, default_value_t = 1)]
        level: u32,

        #[arg(long, default_value_t = 0)]
        points: i64,
    },

    /// List managed projects.
    Projects,

    /// Register a project repository.
    AddProject {
        #[arg(long)]
        name: String,

        /// `org/name` slug.
        #[arg(long)]
        repository: String,

        #[arg(long, default_value = "github")]
        provider: String,

        /// Team, repeatable.
        #[arg(long = "team")]
        teams: Vec<String>,
    },

    /// Usage analytics.
    Analytics {
        #[arg(long, default_value = "month")]
        period: String,
    },

    /// Team membership of a project and the users not on any of its teams.
    Assignments { project: String },
}

pub async fn run(action: AdminAction, services: &Services, out: &Output) -> Result<(), AppError> {
    match action {
        AdminAction::Overview => overview(services, out).await,
        AdminAction::Config { set: None } => {
            let config = services.admin.get_system_config().await?;
            out.emit(&config, |config| {
                let points = &config.reward_points.bug_severity;
                let board = &config.leaderboard;
                format!(
                    "Bug points: low {} medium {} high {} critical {}\n\
                     Leaderboard: top {} entries, refresh every {}s, {} day seasons\n\
                     Webhook endpoint: {} (polling every {}s)",
                    points.low,
                    points.medium,
                    points.high,
                    points.critical,
                    board.top_entries_count,
                    board.refresh_interval,
                    board.season_duration,
                    config.git_integration.webhook_endpoint,
                    config.git_integration.polling_interval
                )
            })
        }
        AdminAction::Config { set: Some(path) } => {
            let config: SystemConfig = read_json(&path)?;
            let ack = services.admin.update_system_config(config).await?;
            out.emit(&ack, |ack| ack.message.clone())
        }
        AdminAction::Users { role, team } => {
            let filters = UserFilters {
                role: role.as_deref().map(str::parse).transpose()?,
                team,
            };
            let users = services.admin.get_users(&filters).await?;
            out.emit(&users, |users| format_users(users))
        }
        AdminAction::AddUser {
            name,
            email,
            role,
            teams,
            level,
            points,
        } => {
            let mut management = UserManagement::new(services.clone());
            management.load().await;
            management.open_add_form();
            if let Some(form) = management.form.as_mut() {
                form.name = name;
                form.email = email;
                form.role = role.parse()?;
                form.level = level;
                form.points = points;
                for team in &teams {
                    form.toggle_team(team);
                }
            }

            if !management.submit().await {
                if let Some(form) = management.form.as_ref().filter(|f| !f.errors.is_empty()) {
                    return Err(form_error(&form.errors));
                }
                check_notice(management.notice.as_ref())?;
            }
            out.emit(&management.users, |users| format_users(users))
        }
        AdminAction::Projects => {
            let projects = services.admin.get_projects().await?;
            out.emit(&projects, |projects| {
                projects
                    .iter()
                    .map(|p| {
                        format!(
                            "{:<8} {:<24} {:<28} {:<7} {} active MRs, {} bugs  [{}]",
                            p.id,
                            p.name,
                            p.repository,
                            p.git_provider.to_string(),
                            p.active_mrs,
                            p.total_bugs,
                            p.teams.join(", ")
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }
        AdminAction::AddProject {
            name,
            repository,
            provider,
            teams,
        } => {
            let project = NewManagedProject {
                name,
                repository,
                git_provider: provider.parse()?,
                teams,
            };
            let result = services.admin.add_project(&project).await?;
            out.emit(&result, |r| {
                format!("Added {} ({}) as {}", r.project.name, r.project.repository, r.project.id)
            })
        }
        AdminAction::Analytics { period } => {
            let analytics = services.admin.get_analytics(&Timeframe { period }).await?;
            out.emit(&analytics, |a| {
                let mut text = format!(
                    "Active users {}  Reviews {}  Bugs {}  Points awarded {}\n",
                    a.user_activity.active_users,
                    a.user_activity.reviews_completed,
                    a.user_activity.bugs_found,
                    a.user_activity.points_awarded
                );
                text.push_str(&format!(
                    "Projects {}  Active MRs {}  Avg review {}  Detection {}\n",
                    a.project_health.total_projects,
                    a.project_health.active_mrs,
                    a.project_health.avg_review_time,
                    a.project_health.bug_detection_rate
                ));
                text.push_str(&format!("Points redeemed {}\n", a.rewards.points_redeemed));
                for reward in &a.rewards.top_rewards {
                    text.push_str(&format!("  {:<28} {}\n", reward.name, reward.count));
                }
                text
            })
        }
        AdminAction::Assignments { project } => assignments(services, &project, out).await,
    }
}

fn format_users(users: &[ManagedUser]) -> String {
    users
        .iter()
        .map(|u| {
            format!(
                "{:<8} {:<16} {:<10} level {:<3} {:>6} pts  [{}]",
                u.id,
                u.name,
                u.role.to_string(),
                u.level,
                u.points,
                u.teams.join(", ")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

async fn overview(services: &Services, out: &Output) -> Result<(), AppError> {
    let mut dashboard = AdminDashboard::new(services.clone());
    dashboard.load().await;
    check_notice(dashboard.notice.as_ref())?;
    check_notice(dashboard.users.notice.as_ref())?;

    let analytics = dashboard
        .analytics
        .as_ref()
        .ok_or_else(|| AppError::not_found("Analytics"))?;
    out.emit(analytics, |a| {
        format!(
            "{} active users, {} projects, {} active MRs, {} points redeemed\n\n{}",
            a.user_activity.active_users,
            a.project_health.total_projects,
            a.project_health.active_mrs,
            a.rewards.points_redeemed,
            format_users(&dashboard.users.users)
        )
    })
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AssignmentTeam<'a> {
    #[serde(flatten)]
    team: &'a Team,
    assigned: &'a [TeamMember],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AssignmentReport<'a> {
    project: &'a str,
    teams: Vec<AssignmentTeam<'a>>,
    unassigned: Vec<&'a ManagedUser>,
}

async fn assignments(services: &Services, project: &str, out: &Output) -> Result<(), AppError> {
    let mut view = AssignmentView::new(services.clone());
    view.load().await;
    view.select_project(Some(project)).await;
    check_notice(view.notice.as_ref())?;

    let report = AssignmentReport {
        project,
        teams: view
            .teams
            .iter()
            .map(|team| AssignmentTeam {
                team,
                assigned: view.members.get(&team.id).map(Vec::as_slice).unwrap_or_default(),
            })
            .collect(),
        unassigned: view.unassigned_users(),
    };
    out.emit(&report, |report| {
        let mut text = String::new();
        for entry in &report.teams {
            text.push_str(&format!("{}\n", entry.team.name));
            for member in entry.assigned {
                text.push_str(&format!("  {:<8} {:<16} {}\n", member.id, member.name, member.role));
            }
        }
        text.push_str("\nUnassigned\n");
        if report.unassigned.is_empty() {
            text.push_str("  (none)\n");
        }
        for user in &report.unassigned {
            text.push_str(&format!("  {:<8} {}\n", user.id, user.name));
        }
        text
    })
}

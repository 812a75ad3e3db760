//! Project commands: details, teams, metrics and reviewer routing.

use std::path::PathBuf;

use clap::Subcommand;

use codequest_rewards::models::project::{
    GitProvider, ProjectFilters, ProjectRepository, RoutingRule, Timeframe,
};
use codequest_rewards::pages::admin::ProjectManagement;
use codequest_rewards::{AppError, Services};

use super::{check_notice, form_error, read_json, Output};

#[derive(Subcommand)]
pub enum ProjectsAction {
    /// List projects.
    List {
        /// Only projects owned by this team.
        #[arg(long)]
        team: Option<String>,
    },

    /// Show a project with its routing rules.
    Show { id: String },

    /// Teams working on a project.
    Teams { id: String },

    /// Review performance of a project.
    Metrics {
        id: String,

        #[arg(long, default_value = "month")]
        period: String,
    },

    /// Pick reviewers for a set of changed paths.
    Route {
        id: String,

        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Replace the routing rules of a project from a JSON file.
    SetRouting { id: String, file: PathBuf },

    /// Create a project.
    Create {
        #[arg(long)]
        name: String,

        #[arg(long)]
        description: String,

        /// Repository as `provider:name` or just `name` (GitHub), repeatable.
        #[arg(long = "repo")]
        repositories: Vec<String>,

        /// Owning team, repeatable.
        #[arg(long = "team")]
        teams: Vec<String>,

        /// Primary language, repeatable.
        #[arg(long = "language")]
        languages: Vec<String>,
    },
}

pub async fn run(action: ProjectsAction, services: &Services, out: &Output) -> Result<(), AppError> {
    match action {
        ProjectsAction::List { team } => {
            let projects = services.projects.get_projects(&ProjectFilters { team }).await?;
            out.emit(&projects, |projects| {
                projects
                    .iter()
                    .map(|p| {
                        format!(
                            "{:<8} {:<28} {} active MRs, {} reviewed (30d), {} bug rate  [{}]",
                            p.id,
                            p.name,
                            p.metrics.active_mrs,
                            p.metrics.reviewed_last_30_days,
                            p.metrics.bugs_detected_rate,
                            p.teams.join(", ")
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }
        ProjectsAction::Show { id } => {
            let project = services.projects.get_project_by_id(&id).await?;
            out.emit(&project, |p| {
                let mut text = format!("{} ({})\n{}\n", p.name, p.id, p.description);
                text.push_str(&format!("Teams: {}\n", p.teams.join(", ")));
                text.push_str(&format!("Languages: {}\n", p.primary_languages.join(", ")));
                text.push_str(&format!("Reviewers: {}\n", p.primary_reviewers.join(", ")));
                text.push_str("Repositories\n");
                for repo in &p.repositories {
                    text.push_str(&format!("  {} ({})\n", repo.name, repo.provider));
                }
                text.push_str(&format!("Routing rules: {}\n", p.routing_rules.len()));
                text
            })
        }
        ProjectsAction::Teams { id } => {
            let teams = services.projects.get_project_teams(&id).await?;
            out.emit(&teams, |teams| {
                if teams.is_empty() {
                    return "No teams assigned".to_string();
                }
                let mut text = String::new();
                for team in teams {
                    text.push_str(&format!(
                        "{} - {} ({} reviews, {} bugs, {} avg response)\n",
                        team.name,
                        team.description,
                        team.metrics.reviews_completed,
                        team.metrics.bugs_detected,
                        team.metrics.average_response_time
                    ));
                    for member in &team.members {
                        text.push_str(&format!("  {:<8} {:<16} {}\n", member.id, member.name, member.role));
                    }
                }
                text
            })
        }
        ProjectsAction::Metrics { id, period } => {
            let metrics = services
                .projects
                .get_project_metrics(&id, &Timeframe { period })
                .await?;
            out.emit(&metrics, |m| {
                let r = &m.review_metrics;
                let d = &m.review_distribution;
                let mut text = format!(
                    "Reviews {}  Bugs {}  Avg review {}  Detection {}\n",
                    r.total_reviews, r.bugs_detected, r.average_review_time, r.detection_rate
                );
                text.push_str(&format!(
                    "Distribution: critical {} high {} medium {} low {}\n",
                    d.critical, d.high, d.medium, d.low
                ));
                for reviewer in &m.top_reviewers {
                    text.push_str(&format!(
                        "  {:<16} {} reviews, {} bugs\n",
                        reviewer.name, reviewer.review_count, reviewer.bugs_found
                    ));
                }
                text
            })
        }
        ProjectsAction::Route { id, paths } => {
            let action = services.projects.route_reviewers(&id, paths.as_slice()).await?;
            out.emit(&action, |action| match action {
                None => "No routing rule matched".to_string(),
                Some(action) => {
                    let mut assignees = action.assign_to.clone();
                    assignees.extend(action.assign_to_team.iter().map(|t| format!("team {}", t)));
                    let mut text = format!("Assign to: {}", assignees.join(", "));
                    if let Some(priority) = action.priority {
                        text.push_str(&format!("\nPriority: {:?}", priority));
                    }
                    if action.require_secondary_review {
                        text.push_str("\nSecondary review required");
                    }
                    if action.use_load_balancing {
                        text.push_str("\nLoad balanced");
                    }
                    text
                }
            })
        }
        ProjectsAction::SetRouting { id, file } => {
            let rules: Vec<RoutingRule> = read_json(&file)?;
            let count = rules.len();
            let ack = services.projects.configure_reviewer_routing(&id, rules).await?;
            out.emit(&ack, |ack| format!("{} ({} rules)", ack.message, count))
        }
        ProjectsAction::Create {
            name,
            description,
            repositories,
            teams,
            languages,
        } => {
            let mut management = ProjectManagement::new(services.clone());
            management.open_add_form();
            if let Some(form) = management.form.as_mut() {
                form.name = name;
                form.description = description;
                if !repositories.is_empty() {
                    form.repositories = repositories
                        .iter()
                        .map(|value| parse_repository(value))
                        .collect::<Result<_, _>>()?;
                }
                for team in &teams {
                    form.toggle_team(team);
                }
                for language in &languages {
                    form.toggle_language(language);
                }
            }

            if !management.submit().await {
                if let Some(form) = management.form.as_ref().filter(|f| !f.errors.is_empty()) {
                    return Err(form_error(&form.errors));
                }
                check_notice(management.notice.as_ref())?;
            }
            out.emit(&management.projects, |projects| {
                format!("Project created. {} project(s) now listed.", projects.len())
            })
        }
    }
}

fn parse_repository(value: &str) -> Result<ProjectRepository, AppError> {
    let (provider, name) = match value.split_once(':') {
        Some((provider, name)) => (provider.parse::<GitProvider>()?, name),
        None => (GitProvider::Github, value),
    };
    Ok(ProjectRepository {
        id: String::new(),
        name: name.trim().to_string(),
        provider,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_repository() {
        let repo = parse_repository("gitlab:acme/payments").unwrap();
        assert_eq!(repo.provider, GitProvider::Gitlab);
        assert_eq!(repo.name, "acme/payments");

        let repo = parse_repository("acme/web").unwrap();
        assert_eq!(repo.provider, GitProvider::Github);

        assert!(parse_repository("svn:acme/old").is_err());
    }
}

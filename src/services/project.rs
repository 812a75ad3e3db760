//! Projects, teams, reviewer routing and project metrics.

use std::sync::Arc;

use crate::api::DataSource;
use crate::error::AppError;
use crate::models::project::{
    CreateProjectResult, NewProject, Project, ProjectFilters, ProjectPerformance, ProjectUpdate,
    RoutingAction, RoutingRule, Team, Timeframe,
};
use crate::models::Ack;
use crate::store::FixtureStore;

#[derive(Clone)]
pub struct ProjectService {
    source: Arc<dyn DataSource>,
    store: FixtureStore,
}

impl ProjectService {
    pub fn new(source: Arc<dyn DataSource>, store: FixtureStore) -> Self {
        Self { source, store }
    }

    /// Projects, optionally limited to those a team works on.
    pub async fn get_projects(&self, filters: &ProjectFilters) -> Result<Vec<Project>, AppError> {
        let remote = self
            .source
            .get_projects(filters)
            .await
            .inspect_err(|e| log::error!("[projects] Failed to get projects: {}", e))?
            .into_data();

        let projects = if remote.is_empty() {
            self.store.projects().await
        } else {
            remote
        };

        Ok(match filters.team.as_deref() {
            Some(team) => projects.into_iter().filter(|p| p.has_team(team)).collect(),
            None => projects,
        })
    }

    /// Project detail including its routing rules.
    ///
    /// Projects without rules of their own get the default rule set.
    pub async fn get_project_by_id(&self, id: &str) -> Result<Project, AppError> {
        let remote = self
            .source
            .get_project_by_id(id)
            .await
            .inspect_err(|e| log::error!("[projects] Failed to get project {}: {}", id, e))?
            .into_data();
        if let Some(project) = remote {
            return Ok(project);
        }

        let mut project = self
            .store
            .project(id)
            .await
            .ok_or_else(|| AppError::not_found_with_id("Project", id))?;
        if project.routing_rules.is_empty() {
            project.routing_rules = self.store.routing_rules().await;
        }
        Ok(project)
    }

    pub async fn create_project(&self, project: &NewProject) -> Result<CreateProjectResult, AppError> {
        self.try_create_project(project)
            .await
            .inspect_err(|e| log::error!("[projects] Failed to create project: {}", e))
    }

    async fn try_create_project(
        &self,
        project: &NewProject,
    ) -> Result<CreateProjectResult, AppError> {
        if project.name.trim().is_empty() {
            return Err(AppError::invalid_input_field("Project name is required", "name"));
        }

        let result = self.source.create_project(project).await?.into_data();
        self.store.add_project(result.project.clone()).await;
        log::info!(
            "[projects] Created project {} ({})",
            result.project.name,
            result.project.id
        );
        Ok(result)
    }

    pub async fn update_project(&self, id: &str, update: &ProjectUpdate) -> Result<Ack, AppError> {
        self.try_update_project(id, update)
            .await
            .inspect_err(|e| log::error!("[projects] Failed to update project {}: {}", id, e))
    }

    async fn try_update_project(&self, id: &str, update: &ProjectUpdate) -> Result<Ack, AppError> {
        if matches!(update.name.as_deref(), Some(name) if name.trim().is_empty()) {
            return Err(AppError::invalid_input_field("Project name is required", "name"));
        }
        if self.store.project(id).await.is_none() {
            return Err(AppError::not_found_with_id("Project", id));
        }

        let ack = self.source.update_project(id, update).await?.into_data();
        self.store.update_project(id, update).await?;
        Ok(ack)
    }

    /// Teams assigned to the project.
    pub async fn get_project_teams(&self, id: &str) -> Result<Vec<Team>, AppError> {
        let project = self.get_project_by_id(id).await?;
        let remote = self
            .source
            .get_project_teams(id)
            .await
            .inspect_err(|e| log::error!("[projects] Failed to get teams for {}: {}", id, e))?
            .into_data();
        if !remote.is_empty() {
            return Ok(remote);
        }

        Ok(self
            .store
            .teams()
            .await
            .into_iter()
            .filter(|team| project.has_team(&team.name))
            .collect())
    }

    pub async fn configure_reviewer_routing(
        &self,
        id: &str,
        rules: Vec<RoutingRule>,
    ) -> Result<Ack, AppError> {
        self.try_configure_routing(id, rules)
            .await
            .inspect_err(|e| log::error!("[projects] Failed to configure routing for {}: {}", id, e))
    }

    async fn try_configure_routing(&self, id: &str, rules: Vec<RoutingRule>) -> Result<Ack, AppError> {
        if self.store.project(id).await.is_none() {
            return Err(AppError::not_found_with_id("Project", id));
        }
        let ack = self.source.configure_routing(id, &rules).await?.into_data();
        self.store.set_routing_rules(id, rules).await?;
        Ok(ack)
    }

    pub async fn get_project_metrics(
        &self,
        id: &str,
        timeframe: &Timeframe,
    ) -> Result<ProjectPerformance, AppError> {
        let remote = self
            .source
            .get_project_metrics(id, timeframe)
            .await
            .inspect_err(|e| log::error!("[projects] Failed to get metrics for {}: {}", id, e))?
            .into_data();

        match remote {
            Some(metrics) => Ok(metrics),
            None => {
                if self.store.project(id).await.is_none() {
                    return Err(AppError::not_found_with_id("Project", id));
                }
                Ok(self.store.project_performance().await)
            }
        }
    }

    /// Pick reviewers for a change set.
    ///
    /// Rules are evaluated in order and the first whose condition matches
    /// any changed path wins. `None` means no rule applies.
    pub async fn route_reviewers<S: AsRef<str>>(
        &self,
        project_id: &str,
        changed_paths: &[S],
    ) -> Result<Option<RoutingAction>, AppError> {
        let project = self.get_project_by_id(project_id).await?;
        let action = project
            .routing_rules
            .into_iter()
            .find(|rule| rule.condition.matches(changed_paths))
            .map(|rule| rule.action);

        match &action {
            Some(action) => log::debug!("[projects] Routed {} to {:?}", project_id, action),
            None => log::debug!("[projects] No routing rule matched in {}", project_id),
        }
        Ok(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockDataSource;
    use crate::models::project::{ReviewPriority, RoutingCondition};

    fn service() -> ProjectService {
        ProjectService::new(
            Arc::new(MockDataSource::new()),
            FixtureStore::new().unwrap(),
        )
    }

    #[tokio::test]
    async fn test_team_filter() {
        let projects = service()
            .get_projects(&ProjectFilters {
                team: Some("Backend Team".to_string()),
            })
            .await
            .unwrap();
        let ids: Vec<_> = projects.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["proj-1", "proj-2"]);
    }

    #[tokio::test]
    async fn test_project_detail_has_rules() {
        let project = service().get_project_by_id("proj-1").await.unwrap();
        assert_eq!(project.routing_rules.len(), 3);
        assert!(service().get_project_by_id("proj-9").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_create_project() {
        let service = service();
        let result = service
            .create_project(&NewProject {
                name: "Search".to_string(),
                description: "Search indexing".to_string(),
                teams: vec!["Backend Team".to_string()],
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(result.project.id.starts_with("proj-"));
        assert_eq!(result.project.metrics.bugs_detected_rate, "0%");
        assert_eq!(service.get_projects(&ProjectFilters::default()).await.unwrap().len(), 4);

        let err = service.create_project(&NewProject::default()).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput { .. }));
    }

    #[tokio::test]
    async fn test_update_project() {
        let service = service();
        service
            .update_project(
                "proj-2",
                &ProjectUpdate {
                    description: Some("Payments".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let project = service.get_project_by_id("proj-2").await.unwrap();
        assert_eq!(project.description, "Payments");
    }

    #[tokio::test]
    async fn test_project_teams() {
        let teams = service().get_project_teams("proj-1").await.unwrap();
        let names: Vec<_> = teams.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Backend Team", "Security Team"]);

        // No fixture team matches the dashboard project's teams.
        assert!(service().get_project_teams("proj-3").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_route_reviewers_first_match_wins() {
        let service = service();
        let ui = service
            .route_reviewers("proj-1", &["src/main/App.jsx"])
            .await
            .unwrap()
            .unwrap();
        assert_eq!(ui.assign_to, vec!["PixelWizard", "SyntaxSamurai"]);

        let auth = service
            .route_reviewers("proj-1", &["README.md", "src/api/auth/token.js"])
            .await
            .unwrap()
            .unwrap();
        assert_eq!(auth.priority, Some(ReviewPriority::Critical));
        assert!(auth.require_secondary_review);

        let other = service
            .route_reviewers("proj-1", &["docs/guide.md"])
            .await
            .unwrap()
            .unwrap();
        assert_eq!(other.assign_to_team.as_deref(), Some("Frontend Team"));
    }

    #[tokio::test]
    async fn test_configured_rules_replace_defaults() {
        let service = service();
        let rules = vec![RoutingRule {
            condition: RoutingCondition {
                file_types: vec![".rs".to_string()],
                ..Default::default()
            },
            action: RoutingAction {
                assign_to: vec!["DevTitan".to_string()],
                ..Default::default()
            },
        }];
        service
            .configure_reviewer_routing("proj-2", rules)
            .await
            .unwrap();

        let hit = service.route_reviewers("proj-2", &["src/lib.rs"]).await.unwrap();
        assert_eq!(hit.unwrap().assign_to, vec!["DevTitan"]);
        let miss = service.route_reviewers("proj-2", &["src/app.js"]).await.unwrap();
        assert!(miss.is_none());
    }

    #[tokio::test]
    async fn test_metrics() {
        let service = service();
        let metrics = service
            .get_project_metrics("proj-1", &Timeframe::default())
            .await
            .unwrap();
        assert_eq!(metrics.review_metrics.total_reviews, 48);
        assert!(service
            .get_project_metrics("proj-9", &Timeframe::default())
            .await
            .is_err());
    }
}

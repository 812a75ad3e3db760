//! Admin project list and the create/edit project form.

use crate::models::project::{
    GitProvider, NewProject, Project, ProjectFilters, ProjectRepository, ProjectUpdate,
};
use crate::pages::Notice;
use crate::services::Services;

use super::users::toggle;
use super::FormErrors;

fn blank_repository() -> ProjectRepository {
    ProjectRepository {
        id: String::new(),
        name: String::new(),
        provider: GitProvider::Github,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectForm {
    /// Id of the project being edited; `None` when creating.
    pub editing: Option<String>,
    pub name: String,
    pub description: String,
    /// Never empty; a blank row is kept for input.
    pub repositories: Vec<ProjectRepository>,
    pub teams: Vec<String>,
    pub primary_languages: Vec<String>,
    pub errors: FormErrors,
}

impl Default for ProjectForm {
    fn default() -> Self {
        Self {
            editing: None,
            name: String::new(),
            description: String::new(),
            repositories: vec![blank_repository()],
            teams: Vec::new(),
            primary_languages: Vec::new(),
            errors: FormErrors::new(),
        }
    }
}

impl ProjectForm {
    pub fn edit(project: &Project) -> Self {
        let repositories = if project.repositories.is_empty() {
            vec![blank_repository()]
        } else {
            project.repositories.clone()
        };
        Self {
            editing: Some(project.id.clone()),
            name: project.name.clone(),
            description: project.description.clone(),
            repositories,
            teams: project.teams.clone(),
            primary_languages: project.primary_languages.clone(),
            errors: FormErrors::new(),
        }
    }

    pub fn title(&self) -> &'static str {
        if self.editing.is_some() {
            "Edit Project"
        } else {
            "Create New Project"
        }
    }

    pub fn add_repository(&mut self) {
        self.repositories.push(blank_repository());
    }

    /// Remove a repository row. Removing the last row leaves a blank one.
    pub fn remove_repository(&mut self, index: usize) {
        if index < self.repositories.len() {
            self.repositories.remove(index);
        }
        if self.repositories.is_empty() {
            self.repositories.push(blank_repository());
        }
    }

    pub fn toggle_team(&mut self, team: &str) {
        toggle(&mut self.teams, team);
    }

    pub fn toggle_language(&mut self, language: &str) {
        toggle(&mut self.primary_languages, language);
    }

    /// Check the form, replacing `errors`. Returns true when valid.
    pub fn validate(&mut self) -> bool {
        self.errors.clear();
        if self.name.trim().is_empty() {
            self.errors.insert("name", "Project name is required");
        }
        if self.description.trim().is_empty() {
            self.errors.insert("description", "Project description is required");
        }
        if self.repositories.iter().any(|r| r.name.trim().is_empty()) {
            self.errors
                .insert("repositories", "All repositories must have a name");
        }
        if self.teams.is_empty() {
            self.errors.insert("teams", "At least one team must be selected");
        }
        self.errors.is_empty()
    }

    pub fn to_new_project(&self) -> NewProject {
        NewProject {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            repositories: self.repositories.clone(),
            teams: self.teams.clone(),
            primary_languages: self.primary_languages.clone(),
            primary_reviewers: Vec::new(),
        }
    }

    pub fn to_update(&self) -> ProjectUpdate {
        ProjectUpdate {
            name: Some(self.name.trim().to_string()),
            description: Some(self.description.trim().to_string()),
            repositories: Some(self.repositories.clone()),
            teams: Some(self.teams.clone()),
            primary_languages: Some(self.primary_languages.clone()),
            primary_reviewers: None,
        }
    }
}

pub struct ProjectManagement {
    services: Services,
    pub projects: Vec<Project>,
    pub loading: bool,
    pub form: Option<ProjectForm>,
    pub notice: Option<Notice>,
}

impl ProjectManagement {
    pub fn new(services: Services) -> Self {
        Self {
            services,
            projects: Vec::new(),
            loading: true,
            form: None,
            notice: None,
        }
    }

    pub async fn load(&mut self) {
        self.loading = true;
        match self
            .services
            .projects
            .get_projects(&ProjectFilters::default())
            .await
        {
            Ok(projects) => self.projects = projects,
            Err(e) => self.notice = Some(Notice::failed("Failed to load projects", &e)),
        }
        self.loading = false;
    }

    pub fn open_add_form(&mut self) {
        self.form = Some(ProjectForm::default());
    }

    /// Load the project detail and open it in the form.
    pub async fn open_edit_form(&mut self, project_id: &str) -> bool {
        match self.services.projects.get_project_by_id(project_id).await {
            Ok(project) => {
                self.form = Some(ProjectForm::edit(&project));
                true
            }
            Err(e) => {
                self.notice = Some(Notice::failed("Error loading project details", &e));
                false
            }
        }
    }

    pub fn close_form(&mut self) {
        self.form = None;
    }

    /// Validate and save the open form, then refresh the list.
    pub async fn submit(&mut self) -> bool {
        let Some(form) = self.form.as_mut() else {
            return false;
        };
        if !form.validate() {
            return false;
        }

        let form = form.clone();
        let saved = match &form.editing {
            Some(id) => self
                .services
                .projects
                .update_project(id, &form.to_update())
                .await
                .map(|_| ()),
            None => self
                .services
                .projects
                .create_project(&form.to_new_project())
                .await
                .map(|_| ()),
        };
        if let Err(e) = saved {
            self.notice = Some(Notice::failed("Failed to save project", &e));
            return false;
        }

        self.load().await;
        self.close_form();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_validation_messages() {
        let mut form = ProjectForm::default();
        assert!(!form.validate());
        assert_eq!(form.errors.get("name"), Some(&"Project name is required"));
        assert_eq!(
            form.errors.get("description"),
            Some(&"Project description is required")
        );
        assert_eq!(
            form.errors.get("repositories"),
            Some(&"All repositories must have a name")
        );
        assert_eq!(
            form.errors.get("teams"),
            Some(&"At least one team must be selected")
        );
    }

    #[test]
    fn test_repository_rows() {
        let mut form = ProjectForm::default();
        form.add_repository();
        assert_eq!(form.repositories.len(), 2);
        form.remove_repository(0);
        form.remove_repository(0);
        assert_eq!(form.repositories.len(), 1);
        assert!(form.repositories[0].name.is_empty());
    }

    #[tokio::test]
    async fn test_create_through_form() {
        let mut page = ProjectManagement::new(Services::mock().unwrap());
        page.load().await;
        assert_eq!(page.projects.len(), 3);

        page.open_add_form();
        let form = page.form.as_mut().unwrap();
        form.name = "Search".to_string();
        form.description = "Search indexing".to_string();
        form.repositories[0].name = "search-service".to_string();
        form.toggle_team("Backend Team");
        form.toggle_language("Rust");

        assert!(page.submit().await);
        assert!(page.form.is_none());
        assert_eq!(page.projects.len(), 4);
    }

    #[tokio::test]
    async fn test_edit_through_form() {
        let mut page = ProjectManagement::new(Services::mock().unwrap());
        page.load().await;
        assert!(page.open_edit_form("proj-3").await);

        let form = page.form.as_mut().unwrap();
        assert_eq!(form.title(), "Edit Project");
        form.description = "Customer dashboard".to_string();
        assert!(page.submit().await);

        let updated = page.projects.iter().find(|p| p.id == "proj-3").unwrap();
        assert_eq!(updated.description, "Customer dashboard");
    }

    #[tokio::test]
    async fn test_unknown_project_sets_notice() {
        let mut page = ProjectManagement::new(Services::mock().unwrap());
        assert!(!page.open_edit_form("proj-9").await);
        assert!(page.notice.as_ref().unwrap().is_error());
    }
}

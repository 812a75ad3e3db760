//! Assign users to the teams of a project.

use std::collections::{BTreeMap, HashSet};

use crate::models::admin::{ManagedUser, UserFilters};
use crate::models::project::{MemberRole, Project, ProjectFilters, Team, TeamMember};
use crate::pages::Notice;
use crate::services::Services;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssignmentLoading {
    pub projects: bool,
    pub users: bool,
    pub teams: bool,
}

impl Default for AssignmentLoading {
    fn default() -> Self {
        Self {
            projects: true,
            users: true,
            teams: false,
        }
    }
}

pub struct AssignmentView {
    services: Services,
    pub projects: Vec<Project>,
    pub users: Vec<ManagedUser>,
    pub selected_project: Option<String>,
    pub teams: Vec<Team>,
    /// Members per team id. Edits are local to the view.
    pub members: BTreeMap<String, Vec<TeamMember>>,
    pub loading: AssignmentLoading,
    pub notice: Option<Notice>,
}

impl AssignmentView {
    pub fn new(services: Services) -> Self {
        Self {
            services,
            projects: Vec::new(),
            users: Vec::new(),
            selected_project: None,
            teams: Vec::new(),
            members: BTreeMap::new(),
            loading: AssignmentLoading::default(),
            notice: None,
        }
    }

    pub async fn load(&mut self) {
        self.loading.projects = true;
        self.loading.users = true;

        let services = &self.services;
        let project_filters = ProjectFilters::default();
        let user_filters = UserFilters::default();
        let (projects, users) = tokio::join!(
            services.projects.get_projects(&project_filters),
            services.admin.get_users(&user_filters),
        );

        match projects {
            Ok(projects) => self.projects = projects,
            Err(e) => self.notice = Some(Notice::failed("Failed to load projects", &e)),
        }
        self.loading.projects = false;

        match users {
            Ok(users) => self.users = users,
            Err(e) => self.notice = Some(Notice::failed("Failed to load users", &e)),
        }
        self.loading.users = false;
    }

    /// Select a project (or clear the selection) and load its teams.
    pub async fn select_project(&mut self, project_id: Option<&str>) {
        self.selected_project = project_id.map(str::to_string);
        self.teams.clear();
        self.members.clear();
        let Some(project_id) = project_id else {
            return;
        };

        self.loading.teams = true;
        match self.services.projects.get_project_teams(project_id).await {
            Ok(teams) => {
                self.members = teams
                    .iter()
                    .map(|team| (team.id.clone(), team.members.clone()))
                    .collect();
                self.teams = teams;
            }
            Err(e) => self.notice = Some(Notice::failed("Failed to load project teams", &e)),
        }
        self.loading.teams = false;
    }

    /// Users that are not a member of any team of the selected project.
    ///
    /// Empty while users or teams are still loading.
    pub fn unassigned_users(&self) -> Vec<&ManagedUser> {
        if self.loading.users || self.loading.teams {
            return Vec::new();
        }
        let assigned: HashSet<&str> = self
            .members
            .values()
            .flatten()
            .map(|member| member.id.as_str())
            .collect();
        self.users
            .iter()
            .filter(|user| !assigned.contains(user.id.as_str()))
            .collect()
    }

    /// Add a user to a team as a reviewer. Returns false for unknown users
    /// or users already on the team.
    pub fn assign_user(&mut self, user_id: &str, team_id: &str) -> bool {
        let Some(user) = self.users.iter().find(|u| u.id == user_id) else {
            return false;
        };
        let members = self.members.entry(team_id.to_string()).or_default();
        if members.iter().any(|m| m.id == user_id) {
            return false;
        }
        members.push(TeamMember {
            id: user.id.clone(),
            name: user.name.clone(),
            role: MemberRole::Reviewer,
        });
        true
    }

    pub fn remove_user(&mut self, user_id: &str, team_id: &str) -> bool {
        match self.members.get_mut(team_id) {
            Some(members) => {
                let before = members.len();
                members.retain(|m| m.id != user_id);
                members.len() != before
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn loaded() -> AssignmentView {
        let mut view = AssignmentView::new(Services::mock().unwrap());
        view.load().await;
        view
    }

    #[tokio::test]
    async fn test_loading_flags() {
        let view = AssignmentView::new(Services::mock().unwrap());
        assert!(view.loading.projects && view.loading.users && !view.loading.teams);
        assert!(view.unassigned_users().is_empty());

        let view = loaded().await;
        assert_eq!(view.loading, AssignmentLoading {
            projects: false,
            users: false,
            teams: false,
        });
        assert_eq!(view.projects.len(), 3);
        assert!(!view.users.is_empty());
        assert!(view.notice.is_none());
    }

    #[tokio::test]
    async fn test_unassigned_follows_team_edits() {
        let mut view = loaded().await;
        view.select_project(Some("proj-1")).await;
        assert_eq!(view.teams.len(), 2);
        assert!(view.unassigned_users().is_empty());

        assert!(view.remove_user("user-3", "team-1"));
        let unassigned: Vec<_> = view.unassigned_users().iter().map(|u| u.id.clone()).collect();
        assert_eq!(unassigned, vec!["user-3"]);

        assert!(view.assign_user("user-3", "team-2"));
        assert!(!view.assign_user("user-3", "team-2"));
        assert!(view.unassigned_users().is_empty());
        let added = view.members["team-2"].last().unwrap();
        assert_eq!(added.role, MemberRole::Reviewer);
    }

    #[tokio::test]
    async fn test_project_without_teams() {
        let mut view = loaded().await;
        view.select_project(Some("proj-3")).await;
        assert!(view.teams.is_empty());
        assert_eq!(view.unassigned_users().len(), 4);

        view.select_project(None).await;
        assert!(view.selected_project.is_none());
    }
}

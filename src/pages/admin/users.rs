//! Admin user list and the add/edit user form.

use crate::models::admin::{ManagedUser, NewManagedUser, UserFilters};
use crate::models::project::MemberRole;
use crate::services::Services;

use super::FormErrors;
use crate::pages::Notice;

#[derive(Debug, Clone, PartialEq)]
pub struct UserForm {
    /// Id of the user being edited; `None` when creating.
    pub editing: Option<String>,
    pub name: String,
    pub email: String,
    pub role: MemberRole,
    pub teams: Vec<String>,
    pub level: u32,
    pub points: i64,
    pub errors: FormErrors,
}

impl Default for UserForm {
    fn default() -> Self {
        let blank = NewManagedUser::default();
        Self {
            editing: None,
            name: blank.name,
            email: blank.email,
            role: blank.role,
            teams: blank.teams,
            level: blank.level,
            points: blank.points,
            errors: FormErrors::new(),
        }
    }
}

impl UserForm {
    pub fn edit(user: &ManagedUser) -> Self {
        Self {
            editing: Some(user.id.clone()),
            name: user.name.clone(),
            email: user.email.clone().unwrap_or_default(),
            role: user.role,
            teams: user.teams.clone(),
            level: user.level,
            points: user.points,
            errors: FormErrors::new(),
        }
    }

    pub fn title(&self) -> &'static str {
        if self.editing.is_some() {
            "Edit User"
        } else {
            "Create New User"
        }
    }

    pub fn toggle_team(&mut self, team: &str) {
        toggle(&mut self.teams, team);
    }

    /// Check the form, replacing `errors`. Returns true when valid.
    pub fn validate(&mut self) -> bool {
        self.errors.clear();
        if self.name.trim().is_empty() {
            self.errors.insert("name", "Name is required");
        }
        if !self.email.contains('@') {
            self.errors.insert("email", "Valid email is required");
        }
        if self.teams.is_empty() {
            self.errors.insert("teams", "At least one team must be selected");
        }
        self.errors.is_empty()
    }

    pub fn to_new_user(&self) -> NewManagedUser {
        NewManagedUser {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            role: self.role,
            teams: self.teams.clone(),
            level: self.level,
            points: self.points,
        }
    }
}

/// Add `item` when absent, remove it when present.
pub(super) fn toggle(items: &mut Vec<String>, item: &str) {
    if let Some(index) = items.iter().position(|i| i == item) {
        items.remove(index);
    } else {
        items.push(item.to_string());
    }
}

pub struct UserManagement {
    services: Services,
    pub users: Vec<ManagedUser>,
    pub loading: bool,
    pub form: Option<UserForm>,
    pub notice: Option<Notice>,
}

impl UserManagement {
    pub fn new(services: Services) -> Self {
        Self {
            services,
            users: Vec::new(),
            loading: true,
            form: None,
            notice: None,
        }
    }

    pub async fn load(&mut self) {
        self.loading = true;
        match self.services.admin.get_users(&UserFilters::default()).await {
            Ok(users) => self.users = users,
            Err(e) => self.notice = Some(Notice::failed("Failed to load users", &e)),
        }
        self.loading = false;
    }

    pub fn open_add_form(&mut self) {
        self.form = Some(UserForm::default());
    }

    pub fn open_edit_form(&mut self, user_id: &str) -> bool {
        self.form = self
            .users
            .iter()
            .find(|u| u.id == user_id)
            .map(UserForm::edit);
        self.form.is_some()
    }

    pub fn close_form(&mut self) {
        self.form = None;
    }

    /// Validate and save the open form. Invalid forms stay open with
    /// their errors set.
    pub async fn submit(&mut self) -> bool {
        let Some(form) = self.form.as_mut() else {
            return false;
        };
        if !form.validate() {
            return false;
        }

        let new_user = form.to_new_user();
        let editing = form.editing.clone();
        if let Some(id) = editing {
            // No update endpoint exists for users yet.
            log::info!("[pages] Updating user {} is not supported, keeping form values", id);
        } else if let Err(e) = self.services.admin.add_user(&new_user).await {
            self.notice = Some(Notice::failed("Failed to save user", &e));
            return false;
        }

        self.load().await;
        self.close_form();
        true
    }
}

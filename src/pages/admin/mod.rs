//! Admin dashboard: analytics plus user, project and assignment tabs.

pub mod assignment;
pub mod projects;
pub mod users;

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::admin::Analytics;
use crate::models::project::Timeframe;
use crate::services::Services;

pub use assignment::AssignmentView;
pub use projects::{ProjectForm, ProjectManagement};
pub use users::{UserForm, UserManagement};

use super::Notice;

/// Field name → validation message.
pub type FormErrors = BTreeMap<&'static str, &'static str>;

/// Team choices offered by the admin forms.
pub const AVAILABLE_TEAMS: [&str; 6] = [
    "Backend Team",
    "Frontend Team",
    "Security Team",
    "UX Team",
    "DevOps Team",
    "Fintech Team",
];

pub const AVAILABLE_LANGUAGES: [&str; 16] = [
    "JavaScript",
    "TypeScript",
    "Python",
    "Java",
    "C#",
    "C++",
    "Ruby",
    "Go",
    "PHP",
    "Swift",
    "Kotlin",
    "Rust",
    "Node.js",
    "React",
    "Angular",
    "Vue.js",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AdminTab {
    #[default]
    Users,
    Projects,
    Assignments,
}

pub struct AdminDashboard {
    services: Services,
    pub tab: AdminTab,
    pub analytics: Option<Analytics>,
    pub loading: bool,
    pub users: UserManagement,
    pub projects: ProjectManagement,
    pub assignment: AssignmentView,
    pub notice: Option<Notice>,
}

impl AdminDashboard {
    pub fn new(services: Services) -> Self {
        Self {
            users: UserManagement::new(services.clone()),
            projects: ProjectManagement::new(services.clone()),
            assignment: AssignmentView::new(services.clone()),
            services,
            tab: AdminTab::default(),
            analytics: None,
            loading: true,
            notice: None,
        }
    }

    /// Load the monthly analytics and the active tab.
    pub async fn load(&mut self) {
        self.loading = true;
        match self.services.admin.get_analytics(&Timeframe::default()).await {
            Ok(analytics) => self.analytics = Some(analytics),
            Err(e) => self.notice = Some(Notice::failed("Failed to load analytics", &e)),
        }
        self.loading = false;
        self.load_tab().await;
    }

    pub async fn set_tab(&mut self, tab: AdminTab) {
        self.tab = tab;
        self.load_tab().await;
    }

    async fn load_tab(&mut self) {
        match self.tab {
            AdminTab::Users => self.users.load().await,
            AdminTab::Projects => self.projects.load().await,
            AdminTab::Assignments => self.assignment.load().await,
        }
    }
}

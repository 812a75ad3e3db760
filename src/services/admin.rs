//! System configuration, managed projects and users, and analytics.

use std::sync::Arc;

use crate::api::DataSource;
use crate::error::AppError;
use crate::models::admin::{
    AddProjectResult, Analytics, ManagedProject, ManagedUser, NewManagedProject, NewManagedUser,
    SystemConfig, UserFilters,
};
use crate::models::project::Timeframe;
use crate::models::Ack;
use crate::store::FixtureStore;

#[derive(Clone)]
pub struct AdminService {
    source: Arc<dyn DataSource>,
    store: FixtureStore,
}

impl AdminService {
    pub fn new(source: Arc<dyn DataSource>, store: FixtureStore) -> Self {
        Self { source, store }
    }

    pub async fn get_system_config(&self) -> Result<SystemConfig, AppError> {
        let remote = self
            .source
            .get_system_config()
            .await
            .inspect_err(|e| log::error!("[admin] Failed to get system config: {}", e))?
            .into_data();

        match remote {
            Some(config) => Ok(config),
            None => Ok(self.store.system_config().await),
        }
    }

    /// Replace the system configuration.
    pub async fn update_system_config(&self, config: SystemConfig) -> Result<Ack, AppError> {
        let ack = self
            .source
            .update_system_config(&config)
            .await
            .inspect_err(|e| log::error!("[admin] Failed to update system config: {}", e))?
            .into_data();

        self.store.update_system_config(config).await;
        log::info!("[admin] System configuration updated");
        Ok(ack)
    }

    pub async fn get_projects(&self) -> Result<Vec<ManagedProject>, AppError> {
        let remote = self
            .source
            .get_managed_projects()
            .await
            .inspect_err(|e| log::error!("[admin] Failed to get projects: {}", e))?
            .into_data();

        if remote.is_empty() {
            Ok(self.store.managed_projects().await)
        } else {
            Ok(remote)
        }
    }

    pub async fn add_project(&self, project: &NewManagedProject) -> Result<AddProjectResult, AppError> {
        self.try_add_project(project)
            .await
            .inspect_err(|e| log::error!("[admin] Failed to add project: {}", e))
    }

    async fn try_add_project(
        &self,
        project: &NewManagedProject,
    ) -> Result<AddProjectResult, AppError> {
        if project.name.trim().is_empty() {
            return Err(AppError::invalid_input_field("Project name is required", "name"));
        }
        if project.repository.trim().is_empty() {
            return Err(AppError::invalid_input_field(
                "Repository is required",
                "repository",
            ));
        }

        let result = self.source.add_managed_project(project).await?.into_data();
        self.store.add_managed_project(result.project.clone()).await;
        log::info!(
            "[admin] Added project {} ({})",
            result.project.name,
            result.project.id
        );
        Ok(result)
    }

    /// Managed users narrowed by role and team.
    pub async fn get_users(&self, filters: &UserFilters) -> Result<Vec<ManagedUser>, AppError> {
        let remote = self
            .source
            .get_managed_users(filters)
            .await
            .inspect_err(|e| log::error!("[admin] Failed to get users: {}", e))?
            .into_data();

        let users = if remote.is_empty() {
            self.store.managed_users().await
        } else {
            remote
        };
        Ok(users.into_iter().filter(|u| filters.matches(u)).collect())
    }

    pub async fn add_user(&self, user: &NewManagedUser) -> Result<ManagedUser, AppError> {
        self.try_add_user(user)
            .await
            .inspect_err(|e| log::error!("[admin] Failed to add user: {}", e))
    }

    async fn try_add_user(&self, user: &NewManagedUser) -> Result<ManagedUser, AppError> {
        if user.name.trim().is_empty() {
            return Err(AppError::invalid_input_field("Name is required", "name"));
        }
        if !user.email.contains('@') {
            return Err(AppError::invalid_input_field("Valid email is required", "email"));
        }
        if user.teams.is_empty() {
            return Err(AppError::invalid_input_field(
                "At least one team must be selected",
                "teams",
            ));
        }

        let created = self.source.add_managed_user(user).await?.into_data();
        self.store.add_managed_user(created.clone()).await;
        log::info!("[admin] Added user {} ({})", created.name, created.id);
        Ok(created)
    }

    pub async fn get_analytics(&self, timeframe: &Timeframe) -> Result<Analytics, AppError> {
        let remote = self
            .source
            .get_analytics(timeframe)
            .await
            .inspect_err(|e| log::error!("[admin] Failed to get analytics: {}", e))?
            .into_data();

        match remote {
            Some(analytics) => Ok(analytics),
            None => Ok(self.store.analytics().await),
        }
    }
}

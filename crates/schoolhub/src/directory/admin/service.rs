use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::access::{AccessDecision, AdminGate};
use super::settings::{SettingsError, SiteSettings};
use super::stats::{AnalyticsReport, DashboardStats};
use super::users::{filter_users, summarize, UserDirectory};
use crate::directory::backend::{BackendError, DirectoryBackend, SessionDirectory};
use crate::directory::domain::{
    SchoolFields, SchoolId, SchoolRecord, SchoolRecordError, SessionUser,
};

pub const CREATE_FAILED: &str = "Failed to create school";
pub const UPDATE_FAILED: &str = "Failed to update school";
pub const DELETE_FAILED: &str = "Failed to delete school";
pub const DELETE_ALL_FAILED: &str = "Failed to delete all schools";
pub const SETTINGS_FAILED: &str = "Failed to save settings";

/// Back-office operations. Every method assumes the caller already passed
/// [`AdminService::authorize`].
pub struct AdminService<B, S> {
    backend: Arc<B>,
    gate: AdminGate<S>,
}

impl<B, S> AdminService<B, S>
where
    B: DirectoryBackend + 'static,
    S: SessionDirectory + 'static,
{
    pub fn new(backend: Arc<B>, sessions: Arc<S>) -> Self {
        Self {
            backend,
            gate: AdminGate::new(sessions),
        }
    }

    pub fn authorize(&self, token: Option<&str>) -> Result<SessionUser, AdminError> {
        match self.gate.check(token) {
            AccessDecision::Granted(user) => Ok(user),
            AccessDecision::Unauthenticated => Err(AdminError::Unauthenticated),
            AccessDecision::Forbidden => Err(AdminError::Forbidden),
        }
    }

    /// Schools whose name, city or district contains `search`, case-insensitively.
    pub fn schools(&self, search: &str) -> Result<Vec<SchoolRecord>, AdminError> {
        let needle = search.to_lowercase();
        let schools = self.backend.fetch_schools()?;
        Ok(schools
            .into_iter()
            .filter(|school| {
                school.name.to_lowercase().contains(&needle)
                    || school.city.to_lowercase().contains(&needle)
                    || school.district.to_lowercase().contains(&needle)
            })
            .collect())
    }

    pub fn create_school(&self, fields: SchoolFields) -> Result<SchoolRecord, AdminError> {
        let draft = fields.into_draft()?;
        let record = self
            .backend
            .insert_school(draft)
            .map_err(|source| mutation_failed(CREATE_FAILED, source))?;
        info!(school_id = %record.id, name = %record.name, "school created");
        Ok(record)
    }

    pub fn update_school(
        &self,
        id: &SchoolId,
        fields: SchoolFields,
    ) -> Result<SchoolRecord, AdminError> {
        let draft = fields.into_draft()?;
        let record = self.backend.update_school(id, draft).map_err(|source| match source {
            BackendError::NotFound => AdminError::NotFound(id.clone()),
            source => mutation_failed(UPDATE_FAILED, source),
        })?;
        info!(school_id = %record.id, "school updated");
        Ok(record)
    }

    pub fn delete_school(&self, id: &SchoolId) -> Result<(), AdminError> {
        self.backend.delete_school(id).map_err(|source| match source {
            BackendError::NotFound => AdminError::NotFound(id.clone()),
            source => mutation_failed(DELETE_FAILED, source),
        })?;
        info!(school_id = %id, "school deleted");
        Ok(())
    }

    pub fn delete_all_schools(&self) -> Result<usize, AdminError> {
        let deleted = self
            .backend
            .delete_all_schools()
            .map_err(|source| mutation_failed(DELETE_ALL_FAILED, source))?;
        info!(deleted, "all schools deleted");
        Ok(deleted)
    }

    pub fn users(&self, search: &str, now: DateTime<Utc>) -> Result<UserDirectory, AdminError> {
        let profiles = self.backend.fetch_profiles()?;
        Ok(UserDirectory {
            users: filter_users(&profiles, search),
            summary: summarize(&profiles, now),
        })
    }

    pub fn dashboard(&self) -> Result<DashboardStats, AdminError> {
        let schools = self.backend.fetch_schools()?;
        self.dashboard_for(&schools)
    }

    pub fn analytics(&self) -> Result<AnalyticsReport, AdminError> {
        let schools = self.backend.fetch_schools()?;
        let dashboard = self.dashboard_for(&schools)?;
        Ok(AnalyticsReport::new(dashboard, &schools))
    }

    fn dashboard_for(&self, schools: &[SchoolRecord]) -> Result<DashboardStats, AdminError> {
        let users = self.backend.fetch_profiles()?;
        let scores = self.backend.fetch_rating_scores()?;
        Ok(DashboardStats::new(schools.len(), users.len(), &scores))
    }

    pub fn settings(&self) -> Result<SiteSettings, AdminError> {
        Ok(self.backend.load_settings()?)
    }

    pub fn save_settings(&self, settings: SiteSettings) -> Result<SiteSettings, AdminError> {
        settings.validate()?;
        let stored = self
            .backend
            .store_settings(settings)
            .map_err(|source| mutation_failed(SETTINGS_FAILED, source))?;
        info!(site_name = %stored.site_name, "site settings saved");
        Ok(stored)
    }

    pub fn reset_settings(&self) -> Result<SiteSettings, AdminError> {
        self.save_settings(SiteSettings::default())
    }
}

fn mutation_failed(notice: &'static str, source: BackendError) -> AdminError {
    warn!(error = %source, notice, "admin mutation rejected by backend");
    AdminError::Mutation { notice, source }
}

/// Error raised by the admin service.
#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    #[error("sign in required")]
    Unauthenticated,
    #[error("You don't have administrator privileges to access this area.")]
    Forbidden,
    #[error(transparent)]
    Validation(#[from] SchoolRecordError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    /// Request body that could not be read as the expected form.
    #[error("{0}")]
    InvalidPayload(String),
    #[error("school {0} not found")]
    NotFound(SchoolId),
    #[error("{notice}")]
    Mutation {
        notice: &'static str,
        #[source]
        source: BackendError,
    },
    #[error(transparent)]
    Backend(#[from] BackendError),
}

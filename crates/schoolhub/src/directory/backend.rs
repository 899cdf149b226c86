use super::admin::settings::SiteSettings;
use super::admin::users::UserProfile;
use super::domain::{City, Role, SchoolDraft, SchoolId, SchoolRecord, SessionUser, UserId};

/// Table access offered by the hosted backend.
///
/// Row-level security lives on the backend side; callers are expected to pass
/// admin mutations through [`crate::directory::admin::AdminService`], which
/// gates them on the admin role first.
pub trait DirectoryBackend: Send + Sync {
    /// All schools, ordered by name.
    fn fetch_schools(&self) -> Result<Vec<SchoolRecord>, BackendError>;
    /// All cities, ordered by name.
    fn fetch_cities(&self) -> Result<Vec<City>, BackendError>;
    fn insert_school(&self, draft: SchoolDraft) -> Result<SchoolRecord, BackendError>;
    fn update_school(&self, id: &SchoolId, draft: SchoolDraft)
        -> Result<SchoolRecord, BackendError>;
    fn delete_school(&self, id: &SchoolId) -> Result<(), BackendError>;
    /// Removes every school row, returning how many were deleted.
    fn delete_all_schools(&self) -> Result<usize, BackendError>;
    /// Overall scores of every submitted review.
    fn fetch_rating_scores(&self) -> Result<Vec<f64>, BackendError>;
    fn fetch_profiles(&self) -> Result<Vec<UserProfile>, BackendError>;
    fn load_settings(&self) -> Result<SiteSettings, BackendError>;
    fn store_settings(&self, settings: SiteSettings) -> Result<SiteSettings, BackendError>;
}

/// Session and role lookups delegated to the backend's auth service.
pub trait SessionDirectory: Send + Sync {
    fn current_user(&self, token: &str) -> Result<Option<SessionUser>, BackendError>;
    fn has_role(&self, user_id: &UserId, role: Role) -> Result<bool, BackendError>;
}

/// Error enumeration for backend failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    #[error("record not found")]
    NotFound,
    #[error("record already exists")]
    Conflict,
    #[error("request rejected: {0}")]
    Rejected(String),
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

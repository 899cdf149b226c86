use serde::{Deserialize, Serialize};

/// Site-wide switches managed from the admin settings screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSettings {
    pub site_name: String,
    pub site_description: String,
    pub admin_email: String,
    pub enable_notifications: bool,
    pub enable_public_registration: bool,
    pub enable_school_ratings: bool,
    pub moderate_reviews: bool,
    pub max_rating_per_user: u32,
    pub enable_email_alerts: bool,
    pub maintenance_mode: bool,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            site_name: "SchoolHub".to_string(),
            site_description: "Find and compare the best schools in your area".to_string(),
            admin_email: "admin@schoolhub.com".to_string(),
            enable_notifications: true,
            enable_public_registration: true,
            enable_school_ratings: true,
            moderate_reviews: false,
            max_rating_per_user: 1,
            enable_email_alerts: true,
            maintenance_mode: false,
        }
    }
}

impl SiteSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.site_name.trim().is_empty() {
            return Err(SettingsError::EmptySiteName);
        }
        let email = self.admin_email.trim();
        if !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
            return Err(SettingsError::InvalidAdminEmail(email.to_string()));
        }
        if self.max_rating_per_user == 0 {
            return Err(SettingsError::RatingLimit);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("site name must not be empty")]
    EmptySiteName,
    #[error("admin email '{0}' is not a valid address")]
    InvalidAdminEmail(String),
    #[error("max ratings per user must be at least 1")]
    RatingLimit,
}

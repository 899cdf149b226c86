//! Admin back office: role gate, school CRUD, user listing, dashboard
//! counters and site settings.

pub mod access;
pub mod router;
pub mod service;
pub mod settings;
pub mod stats;
pub mod users;

pub use access::{bearer_token, AccessDecision, AdminGate};
pub use router::admin_router;
pub use service::{AdminError, AdminService};
pub use settings::{SettingsError, SiteSettings};
pub use stats::{AnalyticsReport, BoardCount, DashboardStats, TypeCount};
pub use users::{UserDirectory, UserProfile, UserSummary};

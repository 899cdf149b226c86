use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::directory::domain::{Role, UserId};

/// Profile row joined with the user's role, as listed in the admin console.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: UserId,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_login_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub role: Role,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UserSummary {
    pub total: usize,
    pub admins: usize,
    pub new_this_week: usize,
    pub active: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserDirectory {
    pub users: Vec<UserProfile>,
    pub summary: UserSummary,
}

/// Case-insensitive match on email or display name.
pub fn filter_users(users: &[UserProfile], search: &str) -> Vec<UserProfile> {
    let needle = search.to_lowercase();
    users
        .iter()
        .filter(|user| {
            user.email.to_lowercase().contains(&needle)
                || user
                    .display_name
                    .as_deref()
                    .is_some_and(|name| name.to_lowercase().contains(&needle))
        })
        .cloned()
        .collect()
}

pub fn summarize(users: &[UserProfile], now: DateTime<Utc>) -> UserSummary {
    let week_ago = now - Duration::days(7);
    UserSummary {
        total: users.len(),
        admins: users.iter().filter(|user| user.role == Role::Admin).count(),
        new_this_week: users
            .iter()
            .filter(|user| user.created_at > week_ago)
            .count(),
        active: users
            .iter()
            .filter(|user| user.last_login_at.is_some())
            .count(),
    }
}

//! User DTO.

use chrono::{DateTime, Utc};
use ideaforge_domain::user::User;
use serde::Serialize;

/// Flattened view of a user account.
#[derive(Debug, Clone, Serialize)]
pub struct UserDto {
    /// User id
    pub id: String,
    /// Tier code
    pub tier: String,
    /// Preferred analysis locale
    pub locale: String,
    /// Transactional email opt-in
    pub email_notifications: bool,
    /// Product-update email opt-in
    pub product_updates: bool,
    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            tier: user.tier.as_str().to_string(),
            locale: user.preferences.locale.as_str().to_string(),
            email_notifications: user.preferences.email_notifications,
            product_updates: user.preferences.product_updates,
            created_at: user.created_at,
        }
    }
}

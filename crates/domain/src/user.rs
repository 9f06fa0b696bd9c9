//! User accounts and tiers.

use crate::errors::InvalidValue;
use crate::identifiers::UserId;
use crate::locale::Locale;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Subscription tier controlling access and credit grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserTier {
    /// Default tier for new accounts
    Free,
    /// Paying subscriber
    Paid,
    /// Platform operator
    Admin,
}

impl UserTier {
    /// Every tier.
    pub fn all() -> &'static [UserTier] {
        &[Self::Free, Self::Paid, Self::Admin]
    }

    /// The wire code for this tier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Paid => "paid",
            Self::Admin => "admin",
        }
    }

    /// Parse a wire code.
    pub fn parse(s: &str) -> Result<Self, InvalidValue> {
        match s {
            "free" => Ok(Self::Free),
            "paid" => Ok(Self::Paid),
            "admin" => Ok(Self::Admin),
            other => Err(InvalidValue::UnknownUserTier(other.to_string())),
        }
    }

    /// Whether this tier may issue admin ledger adjustments.
    pub fn can_adjust_ledgers(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Credits granted when the account enters this tier.
    pub fn signup_credit_grant(&self) -> u32 {
        match self {
            Self::Free => 10,
            Self::Paid => 100,
            Self::Admin => 0,
        }
    }
}

/// Per-user preferences; all defaults are sane and none are required at
/// account creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserPreferences {
    /// Default locale for analyses
    pub locale: Locale,
    /// Transactional email notifications
    pub email_notifications: bool,
    /// Marketing / product-update email
    pub product_updates: bool,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            locale: Locale::default(),
            email_notifications: true,
            product_updates: false,
        }
    }
}

/// A user account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: UserId,
    /// Subscription tier
    pub tier: UserTier,
    /// Derived preferences
    #[serde(default)]
    pub preferences: UserPreferences,
    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create an account on the free tier with default preferences.
    pub fn new(id: UserId) -> Self {
        Self {
            id,
            tier: UserTier::Free,
            preferences: UserPreferences::default(),
            created_at: Utc::now(),
        }
    }

    /// Create an account on a specific tier.
    pub fn with_tier(id: UserId, tier: UserTier) -> Self {
        Self {
            tier,
            ..Self::new(id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_defaults() {
        let user = User::new(UserId::new());
        assert_eq!(user.tier, UserTier::Free);
        assert_eq!(user.preferences.locale, Locale::En);
        assert!(user.preferences.email_notifications);
        assert!(!user.preferences.product_updates);
    }

    #[test]
    fn test_tier_parse_roundtrip() {
        for tier in UserTier::all() {
            assert_eq!(UserTier::parse(tier.as_str()).unwrap(), *tier);
        }
        assert!(UserTier::parse("enterprise").is_err());
    }

    #[test]
    fn test_only_admins_adjust_ledgers() {
        assert!(UserTier::Admin.can_adjust_ledgers());
        assert!(!UserTier::Free.can_adjust_ledgers());
        assert!(!UserTier::Paid.can_adjust_ledgers());
    }

    #[test]
    fn test_preferences_deserialize_with_defaults() {
        let prefs: UserPreferences = serde_json::from_str("{}").unwrap();
        assert_eq!(prefs, UserPreferences::default());
    }
}

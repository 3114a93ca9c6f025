//! Authentication types: roles and JWT claims.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role of an account.
///
/// Admins may manage any account; users may only touch their own profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Ordinary account.
    #[default]
    User,
    /// Administrator account.
    Admin,
}

impl Role {
    /// Convert to database string value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }

    /// Parse from database string value.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Self::User),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    /// Whether this role grants administrative access.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

/// JWT claims for access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (account ID).
    pub sub: Uuid,
    /// Account role.
    pub role: Role,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    /// Creates new claims for an account.
    #[must_use]
    pub fn new(account_id: Uuid, role: Role, expires_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            sub: account_id,
            role,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Returns the account ID from claims.
    #[must_use]
    pub const fn account_id(&self) -> Uuid {
        self.sub
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Role::User, "user")]
    #[case(Role::Admin, "admin")]
    fn test_role_roundtrip(#[case] role: Role, #[case] s: &str) {
        assert_eq!(role.as_str(), s);
        assert_eq!(Role::parse(s), Some(role));
    }

    #[test]
    fn test_role_unknown() {
        assert_eq!(Role::parse("superuser"), None);
    }

    #[test]
    fn test_role_is_admin() {
        assert!(Role::Admin.is_admin());
        assert!(!Role::User.is_admin());
    }

    #[test]
    fn test_claims_carry_subject_and_role() {
        let id = Uuid::new_v4();
        let claims = Claims::new(id, Role::Admin, Utc::now() + chrono::Duration::minutes(15));
        assert_eq!(claims.account_id(), id);
        assert_eq!(claims.role, Role::Admin);
        assert!(claims.exp > claims.iat);
    }
}

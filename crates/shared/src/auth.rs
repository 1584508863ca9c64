//! Authentication types for JWT and tokens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims for bearer tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    pub sub: Uuid,
    /// Company ID (tenant context).
    pub company: Uuid,
    /// User's role in the company.
    pub role: String,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    /// Creates new claims for a user.
    #[must_use]
    pub fn new(user_id: Uuid, company_id: Uuid, role: &str, expires_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            company: company_id,
            role: role.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Returns the user ID from claims.
    #[must_use]
    pub const fn user_id(&self) -> Uuid {
        self.sub
    }

    /// Returns the company ID from claims.
    #[must_use]
    pub const fn company_id(&self) -> Uuid {
        self.company
    }
}

/// Login request payload.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    /// User email.
    pub email: String,
    /// User password.
    pub password: String,
}

/// Registration request payload (tenant setup: company + its admin).
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    /// Admin email.
    pub email: String,
    /// Admin password.
    pub password: String,
    /// Admin full name.
    pub name: String,
    /// Company name.
    pub company_name: String,
    /// Company currency (defaults to USD).
    pub currency: Option<String>,
    /// Auto-approval threshold as a decimal string (defaults to 1000).
    pub approval_threshold: Option<String>,
}

/// User info returned in auth responses.
#[derive(Debug, Clone, Serialize)]
pub struct UserInfo {
    /// User ID.
    pub id: Uuid,
    /// User email.
    pub email: String,
    /// User full name.
    pub name: String,
    /// User role.
    pub role: String,
    /// Company ID.
    pub company_id: Uuid,
    /// Manager user ID, if assigned.
    pub manager_id: Option<Uuid>,
}

/// Login/registration response payload.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    /// Authenticated user info.
    pub user: UserInfo,
    /// Bearer token.
    pub token: String,
    /// Token expiration in seconds.
    pub expires_in: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_claims_accessors() {
        let user_id = Uuid::new_v4();
        let company_id = Uuid::new_v4();
        let claims = Claims::new(user_id, company_id, "manager", Utc::now() + Duration::days(7));

        assert_eq!(claims.user_id(), user_id);
        assert_eq!(claims.company_id(), company_id);
        assert_eq!(claims.role, "manager");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_claims_roundtrip_serde() {
        let claims = Claims::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "admin",
            Utc::now() + Duration::days(1),
        );
        let json = serde_json::to_string(&claims).unwrap();
        let back: Claims = serde_json::from_str(&json).unwrap();
        assert_eq!(back.sub, claims.sub);
        assert_eq!(back.company, claims.company);
        assert_eq!(back.role, claims.role);
    }
}

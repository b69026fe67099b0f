//! User model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::error::AppError;

/// Role granted to a user account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RoleEnum {
    User,
    Admin,
}

impl RoleEnum {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleEnum::User => "user",
            RoleEnum::Admin => "admin",
        }
    }
}

impl std::fmt::Display for RoleEnum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RoleEnum {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(RoleEnum::User),
            "admin" => Ok(RoleEnum::Admin),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

/// Internal row structure for database queries
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: i32,
    pub email: String,
    pub first_name: String,
    pub surname: String,
    pub employee_id: Option<String>,
    pub password_hash: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    /// Role names aggregated by the query (`ARRAY_AGG`)
    #[sqlx(default)]
    pub roles: Option<Vec<String>>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            email: row.email,
            first_name: row.first_name,
            surname: row.surname,
            employee_id: row.employee_id,
            password_hash: row.password_hash,
            active: row.active,
            roles: row
                .roles
                .unwrap_or_default()
                .iter()
                .filter_map(|r| r.parse().ok())
                .collect(),
            created_at: row.created_at,
        }
    }
}

/// Full user model
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: i32,
    pub email: String,
    pub first_name: String,
    pub surname: String,
    /// Identifier of the employee in the corporate directory
    pub employee_id: Option<String>,
    /// Argon2 hash; directory-only accounts have none
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub active: bool,
    pub roles: Vec<RoleEnum>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn has_role(&self, role: RoleEnum) -> bool {
        self.roles.contains(&role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(RoleEnum::Admin)
    }
}

/// Identity fields mirrored from the corporate directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryIdentity {
    pub email: String,
    pub first_name: String,
    pub surname: String,
    pub employee_id: String,
}

impl DirectoryIdentity {
    /// Whether the stored user already carries these values
    pub fn matches(&self, user: &User) -> bool {
        user.email == self.email
            && user.first_name == self.first_name
            && user.surname == self.surname
            && user.employee_id.as_deref() == Some(self.employee_id.as_str())
    }
}

/// New account data, already validated
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub first_name: String,
    pub surname: String,
    pub employee_id: Option<String>,
    pub password_hash: Option<String>,
    pub active: bool,
}

/// JWT Claims for authenticated users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    pub user_id: i32,
    pub roles: Vec<RoleEnum>,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    pub fn is_admin(&self) -> bool {
        self.roles.contains(&RoleEnum::Admin)
    }

    /// Require admin privileges
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Authorization("Administrator privileges required".to_string()))
        }
    }
}

//! User identity records and the inputs that create or authenticate them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use stockroom_core::{DomainError, UserId, Validator};

use crate::Role;

/// A stored user, including the password hash.
///
/// Never serialized directly; clients get a [`UserProfile`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    /// Trimmed + lowercased; unique across users.
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Client-facing view of a user (no password hash).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// A user about to be inserted. The store decides the final role.
#[derive(Debug, Clone)]
pub struct UserDraft {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub requested_role: Role,
    pub created_at: DateTime<Utc>,
}

impl UserDraft {
    /// Materialize the draft with the role the store resolved.
    pub fn into_user(self, role: Role) -> User {
        User {
            id: self.id,
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
            role,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}

/// First-admin rule: `admin` is granted only while no admin exists yet.
pub fn resolve_role(requested: Role, admin_exists: bool) -> Role {
    match requested {
        Role::Admin if !admin_exists => Role::Admin,
        _ => Role::User,
    }
}

pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Structural address check: `local@domain.tld`, no whitespace.
pub fn is_valid_email(raw: &str) -> bool {
    let email = raw.trim();
    if email.is_empty() || email.len() > 254 || email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.rsplit_once('@') else {
        return false;
    };
    !local.is_empty()
        && !local.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains("..")
}

/// Registration input as received from a client.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Registration {
    pub name: Option<Value>,
    pub email: Option<Value>,
    pub password: Option<Value>,
    pub role: Option<Value>,
}

/// Registration input that passed validation.
#[derive(Debug, Clone)]
pub struct ValidRegistration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub requested_role: Role,
}

impl Registration {
    pub fn validate(self) -> Result<ValidRegistration, DomainError> {
        let mut v = Validator::new();

        let name = v.text("name", self.name.as_ref());
        let email = v.text("email", self.email.as_ref()).unwrap_or_default();
        let password = v.text("password", self.password.as_ref()).unwrap_or_default();
        let role = v.text("role", self.role.as_ref());

        let name = v.required_text("name", name.as_deref(), "Name is required");
        if let Some(name) = &name {
            v.ensure(name.chars().count() >= 2, "name", "Name must be at least 2 characters");
        }

        v.ensure(is_valid_email(&email), "email", "Valid email is required");
        v.ensure(
            password.chars().count() >= 8,
            "password",
            "Password must be at least 8 characters",
        );

        let requested_role = match role.as_deref() {
            None => Some(Role::User),
            Some(raw) => raw.parse::<Role>().ok().or_else(|| {
                v.reject("role", "Role must be admin or user");
                None
            }),
        };

        v.finish()?;

        Ok(ValidRegistration {
            name: name.unwrap_or_default(),
            email: normalize_email(&email),
            password,
            requested_role: requested_role.unwrap_or(Role::User),
        })
    }
}

/// Login input as received from a client.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Credentials {
    pub email: Option<Value>,
    pub password: Option<Value>,
}

impl Credentials {
    /// Returns `(normalized_email, password)`.
    pub fn validate(self) -> Result<(String, String), DomainError> {
        let mut v = Validator::new();
        let email = v.text("email", self.email.as_ref()).unwrap_or_default();
        let password = v.text("password", self.password.as_ref()).unwrap_or_default();
        v.ensure(is_valid_email(&email), "email", "Valid email is required");
        v.ensure(!password.is_empty(), "password", "Password is required");
        v.finish()?;
        Ok((normalize_email(&email), password))
    }
}

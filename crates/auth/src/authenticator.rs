//! Authenticator: registration, login, and per-request token verification.

use std::sync::{Arc, OnceLock};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{info, warn};

use stockroom_core::{DomainError, StoreError, UserId};

use crate::credentials::CredentialStore;
use crate::password::PasswordHasher;
use crate::token::TokenCodec;
use crate::user::{Credentials, Registration, User, UserDraft, UserProfile};
use crate::{JwtClaims, Principal, Role};

/// Default token lifetime.
pub fn default_token_ttl() -> Duration {
    Duration::days(1)
}

/// Result of a successful register/login.
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    pub user: UserProfile,
    pub token: String,
}

/// Hashed once per authenticator so unknown-email logins cost one verify too.
const DUMMY_PASSWORD: &str = "stockroom-dummy-password";

pub struct Authenticator {
    users: Arc<dyn CredentialStore>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenCodec>,
    token_ttl: Duration,
    dummy_hash: OnceLock<Option<String>>,
}

impl Authenticator {
    pub fn new(
        users: Arc<dyn CredentialStore>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenCodec>,
    ) -> Self {
        Self {
            users,
            hasher,
            tokens,
            token_ttl: default_token_ttl(),
            dummy_hash: OnceLock::new(),
        }
    }

    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    pub fn token_ttl(&self) -> Duration {
        self.token_ttl
    }

    /// Create a user and mint its first token.
    ///
    /// `admin` is only granted to the first admin-requesting registration;
    /// later ones are downgraded to `user` without an error.
    pub fn register(&self, registration: Registration) -> Result<AuthSession, DomainError> {
        let input = registration.validate()?;

        if self.users.find_by_email(&input.email)?.is_some() {
            return Err(email_taken());
        }

        let password_hash = self.hasher.hash(&input.password)?;
        let draft = UserDraft {
            id: UserId::new(),
            name: input.name,
            email: input.email,
            password_hash,
            requested_role: input.requested_role,
            created_at: Utc::now(),
        };

        // The store's unique index catches a concurrent registration of the same email.
        let user = self.users.insert(draft).map_err(|e| match e {
            StoreError::Duplicate(_) => email_taken(),
            other => other.into(),
        })?;

        if input.requested_role == Role::Admin && user.role != Role::Admin {
            info!(user_id = %user.id, "admin already exists; registered as user");
        }
        info!(user_id = %user.id, role = %user.role, "user registered");

        self.session_for(&user, Utc::now())
    }

    /// Exchange credentials for a token.
    ///
    /// Unknown email and wrong password fail identically, and both pay for
    /// one password verification.
    pub fn login(&self, credentials: Credentials) -> Result<AuthSession, DomainError> {
        let (email, password) = credentials.validate()?;

        let Some(user) = self.users.find_by_email(&email)? else {
            self.burn_verify(&password);
            warn!("login failed: unknown account");
            return Err(invalid_credentials());
        };

        if !self.hasher.verify(&password, &user.password_hash)? {
            warn!(user_id = %user.id, "login failed: password mismatch");
            return Err(invalid_credentials());
        }

        info!(user_id = %user.id, "login succeeded");
        self.session_for(&user, Utc::now())
    }

    /// Turn a raw `Authorization` header into the request's principal.
    pub fn authenticate_request(
        &self,
        authorization: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Principal, DomainError> {
        let token = bearer_token(authorization)?;
        let claims = self.tokens.verify(token, now)?;
        Ok(Principal::from(claims))
    }

    /// The stored record of the current principal.
    pub fn profile(&self, principal: &Principal) -> Result<UserProfile, DomainError> {
        self.users
            .find_by_id(principal.subject_id)?
            .map(|user| UserProfile::from(&user))
            .ok_or_else(|| DomainError::not_found("User not found"))
    }

    fn burn_verify(&self, password: &str) {
        let dummy = self
            .dummy_hash
            .get_or_init(|| self.hasher.hash(DUMMY_PASSWORD).ok());
        if let Some(hash) = dummy {
            let _ = self.hasher.verify(password, hash);
        }
    }

    fn session_for(&self, user: &User, now: DateTime<Utc>) -> Result<AuthSession, DomainError> {
        let claims = JwtClaims::new(
            user.id,
            user.role,
            user.name.clone(),
            user.email.clone(),
            now,
            self.token_ttl,
        );
        let token = self.tokens.issue(&claims)?;
        Ok(AuthSession {
            user: UserProfile::from(user),
            token,
        })
    }
}

/// Extract the token from `Bearer <token>`.
pub fn bearer_token(header: Option<&str>) -> Result<&str, DomainError> {
    let missing = || DomainError::unauthorized("Authentication token missing");

    let token = header
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .ok_or_else(missing)?;

    if token.is_empty() {
        return Err(missing());
    }
    Ok(token)
}

fn invalid_credentials() -> DomainError {
    DomainError::unauthorized("Invalid credentials")
}

fn email_taken() -> DomainError {
    DomainError::conflict("Email already registered")
}

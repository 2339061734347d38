//! Authenticator over the in-memory user store.
//!
//! Verifies:
//! - emails are unique after normalization
//! - only the first admin request is granted
//! - login failures are indistinguishable, in outcome and in hashing work
//! - issued tokens authenticate requests until they expire

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{Duration, Utc};

use stockroom_auth::{
    Authenticator, BcryptHasher, Credentials, Hs256TokenCodec, PasswordHasher, Registration, Role,
};
use stockroom_core::DomainError;
use stockroom_infra::InMemoryUserStore;

fn authenticator() -> Authenticator {
    Authenticator::new(
        Arc::new(InMemoryUserStore::new()),
        Arc::new(BcryptHasher::new(4)),
        Arc::new(Hs256TokenCodec::new("integration-secret")),
    )
}

fn registration(name: &str, email: &str, role: Option<&str>) -> Registration {
    Registration {
        name: Some(name.into()),
        email: Some(email.into()),
        password: Some("correct horse".into()),
        role: role.map(Into::into),
    }
}

fn credentials(email: &str, password: &str) -> Credentials {
    Credentials {
        email: Some(email.into()),
        password: Some(password.into()),
    }
}

#[test]
fn first_admin_then_downgrade() {
    let auth = authenticator();

    let alice = auth
        .register(registration("Alice", "alice@example.com", Some("admin")))
        .unwrap();
    assert_eq!(alice.user.role, Role::Admin);

    let bob = auth
        .register(registration("Bob", "bob@example.com", Some("admin")))
        .unwrap();
    assert_eq!(bob.user.role, Role::User);

    let principal = auth
        .authenticate_request(Some(&format!("Bearer {}", bob.token)), Utc::now())
        .unwrap();
    assert_eq!(principal.role, Role::User);
    assert_eq!(principal.subject_id, bob.user.id);
}

#[test]
fn email_uniqueness_ignores_case_and_whitespace() {
    let auth = authenticator();
    let first = auth
        .register(registration("Alice", "alice@example.com", None))
        .unwrap();
    assert_eq!(first.user.email, "alice@example.com");

    let err = auth
        .register(registration("Alice", "  ALICE@Example.com ", None))
        .unwrap_err();
    assert_eq!(err, DomainError::conflict("Email already registered"));
}

#[test]
fn login_failures_are_indistinguishable() {
    let auth = authenticator();
    auth.register(registration("Alice", "alice@example.com", None))
        .unwrap();

    let unknown = auth
        .login(credentials("nobody@example.com", "correct horse"))
        .unwrap_err();
    let mismatch = auth
        .login(credentials("alice@example.com", "wrong horse"))
        .unwrap_err();
    assert_eq!(unknown, mismatch);
    assert_eq!(unknown, DomainError::unauthorized("Invalid credentials"));

    let session = auth
        .login(credentials(" Alice@Example.COM", "correct horse"))
        .unwrap();
    assert_eq!(session.user.name, "Alice");
}

/// Bcrypt, counting how often a password is verified.
struct CountingHasher {
    inner: BcryptHasher,
    verifies: AtomicUsize,
}

impl PasswordHasher for CountingHasher {
    fn hash(&self, plain: &str) -> Result<String, DomainError> {
        self.inner.hash(plain)
    }

    fn verify(&self, plain: &str, hash: &str) -> Result<bool, DomainError> {
        self.verifies.fetch_add(1, Ordering::SeqCst);
        self.inner.verify(plain, hash)
    }
}

#[test]
fn unknown_email_costs_a_verify_like_a_wrong_password() {
    let hasher = Arc::new(CountingHasher {
        inner: BcryptHasher::new(4),
        verifies: AtomicUsize::new(0),
    });
    let auth = Authenticator::new(
        Arc::new(InMemoryUserStore::new()),
        hasher.clone(),
        Arc::new(Hs256TokenCodec::new("integration-secret")),
    );
    auth.register(registration("Alice", "alice@example.com", None))
        .unwrap();

    auth.login(credentials("nobody@example.com", "correct horse"))
        .unwrap_err();
    assert_eq!(hasher.verifies.load(Ordering::SeqCst), 1);

    auth.login(credentials("alice@example.com", "wrong horse"))
        .unwrap_err();
    assert_eq!(hasher.verifies.load(Ordering::SeqCst), 2);

    auth.login(credentials("ghost@example.com", "correct horse"))
        .unwrap_err();
    assert_eq!(hasher.verifies.load(Ordering::SeqCst), 3);
}

#[test]
fn tokens_expire_after_ttl() {
    let auth = authenticator().with_token_ttl(Duration::minutes(5));
    let session = auth
        .register(registration("Alice", "alice@example.com", None))
        .unwrap();
    let header = format!("Bearer {}", session.token);

    let now = Utc::now();
    assert!(auth.authenticate_request(Some(&header), now).is_ok());
    let err = auth
        .authenticate_request(Some(&header), now + Duration::minutes(6))
        .unwrap_err();
    assert!(matches!(err, DomainError::Unauthorized(_)));
}

#[test]
fn foreign_tokens_are_rejected() {
    let auth = authenticator();
    let other = Authenticator::new(
        Arc::new(InMemoryUserStore::new()),
        Arc::new(BcryptHasher::new(4)),
        Arc::new(Hs256TokenCodec::new("some-other-secret")),
    );
    let session = other
        .register(registration("Mallory", "mallory@example.com", Some("admin")))
        .unwrap();

    let err = auth
        .authenticate_request(Some(&format!("Bearer {}", session.token)), Utc::now())
        .unwrap_err();
    assert!(matches!(err, DomainError::Unauthorized(_)));
}

#[test]
fn profile_reads_the_stored_record() {
    let auth = authenticator();
    let session = auth
        .register(registration("Alice", "alice@example.com", None))
        .unwrap();
    let principal = auth
        .authenticate_request(Some(&format!("Bearer {}", session.token)), Utc::now())
        .unwrap();

    let profile = auth.profile(&principal).unwrap();
    assert_eq!(profile, session.user);
    let json = serde_json::to_value(&profile).unwrap();
    assert!(json.get("passwordHash").is_none());
}

//! `stockroom-auth`: authentication and authorization boundary.
//!
//! This crate is decoupled from HTTP and from any concrete store: the user
//! store and password hashing are ports implemented elsewhere.

pub mod authenticator;
pub mod authorize;
pub mod claims;
pub mod credentials;
pub mod password;
pub mod principal;
pub mod roles;
pub mod token;
pub mod user;

pub use authenticator::{AuthSession, Authenticator, bearer_token, default_token_ttl};
pub use authorize::{
    AuthzError, OwnerScope, authorize_access, authorize_mutation, require_role, scope_for_list,
};
pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use credentials::CredentialStore;
pub use password::{BcryptHasher, DEFAULT_BCRYPT_COST, PasswordHasher};
pub use principal::Principal;
pub use roles::Role;
pub use token::{Hs256TokenCodec, TokenCodec, TokenError};
pub use user::{Credentials, Registration, User, UserDraft, UserProfile, normalize_email, resolve_role};

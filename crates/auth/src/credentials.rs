use stockroom_core::{StoreError, UserId};

use crate::user::{User, UserDraft};

/// Storage port for user identity records.
///
/// Lookups return the full record (password hash included); only the
/// authenticator should hold one.
pub trait CredentialStore: Send + Sync {
    fn find_by_email(&self, normalized_email: &str) -> Result<Option<User>, StoreError>;

    fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError>;

    /// Atomic conditional insert.
    ///
    /// In one critical section: reject with `Duplicate` if the email is taken,
    /// then resolve the role with [`crate::user::resolve_role`] against the
    /// current "any admin exists" state, then persist.
    fn insert(&self, draft: UserDraft) -> Result<User, StoreError>;
}

//! Role gate and ownership resolver.
//!
//! Pure policy checks: no IO, no panics. Callers fetch the resource first and
//! pass its owner in.

use thiserror::Error;
use tracing::debug;

use stockroom_core::{DomainError, Owned, UserId};

use crate::{Principal, Role};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("{0}")]
    Forbidden(String),
}

impl From<AuthzError> for DomainError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::Forbidden(msg) => DomainError::Forbidden(msg),
        }
    }
}

/// Allow the request only if the principal holds one of `allowed`.
pub fn require_role(principal: &Principal, allowed: &[Role]) -> Result<(), AuthzError> {
    if allowed.contains(&principal.role) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(
            "You do not have permission to perform this action".to_string(),
        ))
    }
}

/// Owner filter applied to a list query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerScope {
    /// No owner restriction (admins only).
    AllOwners,
    Owner(UserId),
}

impl OwnerScope {
    pub fn admits(&self, owner: UserId) -> bool {
        match self {
            OwnerScope::AllOwners => true,
            OwnerScope::Owner(id) => *id == owner,
        }
    }
}

/// Decide which owners a list request may see.
///
/// - no `requested_owner`: admins see every owner, users see only themselves;
/// - `requested_owner` set: admin-only, scoped to that owner.
///
/// `resource` names the collection in the denial message ("categories", "products").
pub fn scope_for_list(
    principal: &Principal,
    requested_owner: Option<UserId>,
    resource: &str,
) -> Result<OwnerScope, AuthzError> {
    let scope = match requested_owner {
        None if principal.is_admin() => OwnerScope::AllOwners,
        None => OwnerScope::Owner(principal.subject_id),
        Some(owner) => {
            require_role(principal, &[Role::Admin]).map_err(|_| {
                AuthzError::Forbidden(format!(
                    "Only administrators can view other users' {resource}"
                ))
            })?;
            OwnerScope::Owner(owner)
        }
    };
    debug!(subject = %principal.subject_id, ?scope, resource, "list scope resolved");
    Ok(scope)
}

/// Owner or admin may write (and read) a resource.
pub fn authorize_mutation(principal: &Principal, resource_owner: UserId) -> Result<(), AuthzError> {
    if principal.is(resource_owner) || principal.is_admin() {
        Ok(())
    } else {
        debug!(subject = %principal.subject_id, owner = %resource_owner, "access denied");
        Err(AuthzError::Forbidden("Access denied".to_string()))
    }
}

/// [`authorize_mutation`] against an owned entity.
pub fn authorize_access<T: Owned>(principal: &Principal, resource: &T) -> Result<(), AuthzError> {
    authorize_mutation(principal, resource.owner_id())
}

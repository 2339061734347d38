use std::collections::HashMap;

use tracing::debug;

use stockroom_auth::{CredentialStore, Role, User, UserDraft, resolve_role};
use stockroom_core::{StoreError, UserId};

use super::table::{Documents, Table};

#[derive(Debug, Default)]
struct UserState {
    docs: Documents<UserId, User>,
    /// Unique index: normalized email -> id.
    by_email: HashMap<String, UserId>,
}

impl UserState {
    fn admin_exists(&self) -> bool {
        self.docs.values().any(|user| user.role == Role::Admin)
    }
}

/// In-memory user collection with a unique email index.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    table: Table<UserState>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for InMemoryUserStore {
    fn find_by_email(&self, normalized_email: &str) -> Result<Option<User>, StoreError> {
        let state = self.table.read()?;
        Ok(state
            .by_email
            .get(normalized_email)
            .and_then(|id| state.docs.get(id))
            .cloned())
    }

    fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.table.read()?.docs.get(&id).cloned())
    }

    fn insert(&self, draft: UserDraft) -> Result<User, StoreError> {
        let mut state = self.table.write()?;

        if state.by_email.contains_key(&draft.email) || state.docs.contains(&draft.id) {
            return Err(StoreError::Duplicate("email".to_string()));
        }

        let role = resolve_role(draft.requested_role, state.admin_exists());
        let user = draft.into_user(role);
        debug!(user_id = %user.id, role = %role, "user inserted");

        state.by_email.insert(user.email.clone(), user.id);
        state.docs.insert(user.id, user.clone());
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;

    use super::*;

    fn draft(email: &str, role: Role) -> UserDraft {
        UserDraft {
            id: UserId::new(),
            name: "Someone".into(),
            email: email.into(),
            password_hash: "hash".into(),
            requested_role: role,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn email_is_unique() {
        let store = InMemoryUserStore::new();
        store.insert(draft("a@example.com", Role::User)).unwrap();
        let err = store.insert(draft("a@example.com", Role::User)).unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));
        assert!(store.find_by_email("a@example.com").unwrap().is_some());
        assert!(store.find_by_email("b@example.com").unwrap().is_none());
    }

    #[test]
    fn only_first_admin_request_is_granted() {
        let store = InMemoryUserStore::new();
        let first = store.insert(draft("a@example.com", Role::Admin)).unwrap();
        let second = store.insert(draft("b@example.com", Role::Admin)).unwrap();
        assert_eq!(first.role, Role::Admin);
        assert_eq!(second.role, Role::User);
        assert_eq!(store.find_by_id(second.id).unwrap().unwrap().role, Role::User);
    }

    #[test]
    fn concurrent_admin_requests_yield_one_admin() {
        let store = Arc::new(InMemoryUserStore::new());
        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || {
                    store
                        .insert(draft(&format!("user{i}@example.com"), Role::Admin))
                        .unwrap()
                })
            })
            .collect();
        let admins = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|u| u.role == Role::Admin)
            .count();
        assert_eq!(admins, 1);
    }
}

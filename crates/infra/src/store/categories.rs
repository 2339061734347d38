use std::collections::HashMap;

use stockroom_auth::OwnerScope;
use stockroom_catalog::{Category, CategoryRepository};
use stockroom_core::{CategoryId, StoreError, UserId};

use super::table::{Documents, Table};

#[derive(Debug, Default)]
struct CategoryState {
    docs: Documents<CategoryId, Category>,
    /// Unique index: (owner, name) -> id.
    by_owner_name: HashMap<(UserId, String), CategoryId>,
}

fn duplicate() -> StoreError {
    StoreError::Duplicate("name, owner".to_string())
}

/// In-memory category collection with a unique `(owner, name)` index.
#[derive(Debug, Default)]
pub struct InMemoryCategoryStore {
    table: Table<CategoryState>,
}

impl InMemoryCategoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CategoryRepository for InMemoryCategoryStore {
    fn insert(&self, category: Category) -> Result<Category, StoreError> {
        let mut state = self.table.write()?;
        let key = (category.owner_id, category.name.clone());
        if state.by_owner_name.contains_key(&key) || state.docs.contains(&category.id) {
            return Err(duplicate());
        }
        state.by_owner_name.insert(key, category.id);
        state.docs.insert(category.id, category.clone());
        Ok(category)
    }

    fn get(&self, id: CategoryId) -> Result<Option<Category>, StoreError> {
        Ok(self.table.read()?.docs.get(&id).cloned())
    }

    fn find_by_name(&self, owner: UserId, name: &str) -> Result<Option<Category>, StoreError> {
        let state = self.table.read()?;
        Ok(state
            .by_owner_name
            .get(&(owner, name.to_string()))
            .and_then(|id| state.docs.get(id))
            .cloned())
    }

    fn list(&self, scope: &OwnerScope) -> Result<Vec<Category>, StoreError> {
        let state = self.table.read()?;
        Ok(state
            .docs
            .newest_first()
            .into_iter()
            .filter(|c| scope.admits(c.owner_id))
            .cloned()
            .collect())
    }

    fn update(&self, category: Category) -> Result<Option<Category>, StoreError> {
        let mut state = self.table.write()?;
        let Some(previous) = state.docs.get(&category.id).cloned() else {
            return Ok(None);
        };

        let key = (category.owner_id, category.name.clone());
        if let Some(holder) = state.by_owner_name.get(&key) {
            if *holder != category.id {
                return Err(duplicate());
            }
        }

        state
            .by_owner_name
            .remove(&(previous.owner_id, previous.name.clone()));
        state.by_owner_name.insert(key, category.id);
        state.docs.replace(&category.id, category.clone());
        Ok(Some(category))
    }

    fn delete(&self, id: CategoryId) -> Result<bool, StoreError> {
        let mut state = self.table.write()?;
        match state.docs.remove(&id) {
            Some(category) => {
                state.by_owner_name.remove(&(category.owner_id, category.name));
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn category(owner: UserId, name: &str) -> Category {
        Category::new(owner, name.into(), String::new(), Utc::now())
    }

    #[test]
    fn name_is_unique_per_owner() {
        let store = InMemoryCategoryStore::new();
        let alice = UserId::new();
        let bob = UserId::new();

        store.insert(category(alice, "Tools")).unwrap();
        store.insert(category(bob, "Tools")).unwrap();
        let err = store.insert(category(alice, "Tools")).unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));
    }

    #[test]
    fn rename_moves_the_index_entry() {
        let store = InMemoryCategoryStore::new();
        let owner = UserId::new();
        let mut tools = store.insert(category(owner, "Tools")).unwrap();
        let garden = store.insert(category(owner, "Garden")).unwrap();

        tools.name = "Hardware".into();
        store.update(tools.clone()).unwrap();
        assert!(store.find_by_name(owner, "Tools").unwrap().is_none());
        assert_eq!(store.find_by_name(owner, "Hardware").unwrap().unwrap().id, tools.id);

        let mut clash = garden.clone();
        clash.name = "Hardware".into();
        assert!(matches!(store.update(clash), Err(StoreError::Duplicate(_))));
        store.insert(category(owner, "Tools")).unwrap();
    }

    #[test]
    fn list_is_scoped_and_newest_first() {
        let store = InMemoryCategoryStore::new();
        let alice = UserId::new();
        let bob = UserId::new();
        let a1 = store.insert(category(alice, "A1")).unwrap();
        store.insert(category(bob, "B1")).unwrap();
        let a2 = store.insert(category(alice, "A2")).unwrap();

        let mine: Vec<_> = store
            .list(&OwnerScope::Owner(alice))
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(mine, vec![a2.id, a1.id]);
        assert_eq!(store.list(&OwnerScope::AllOwners).unwrap().len(), 3);
    }

    #[test]
    fn delete_frees_the_name() {
        let store = InMemoryCategoryStore::new();
        let owner = UserId::new();
        let tools = store.insert(category(owner, "Tools")).unwrap();
        assert!(store.delete(tools.id).unwrap());
        assert!(!store.delete(tools.id).unwrap());
        store.insert(category(owner, "Tools")).unwrap();
    }
}

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument};

use stockroom_auth::{Principal, authorize_access, scope_for_list};
use stockroom_core::{CategoryId, DomainError, DomainResult, StoreError};

use crate::category::{Category, CategoryChange, CreateCategory, UpdateCategory};
use crate::query::CategoryListParams;
use crate::repository::{CategoryRepository, ProductRepository};

const DUPLICATE_NAME: &str = "Category with this name already exists";

/// Category use cases: ownership checks and invariants around the store.
#[derive(Clone)]
pub struct CategoryService {
    categories: Arc<dyn CategoryRepository>,
    products: Arc<dyn ProductRepository>,
}

impl CategoryService {
    pub fn new(categories: Arc<dyn CategoryRepository>, products: Arc<dyn ProductRepository>) -> Self {
        Self { categories, products }
    }

    /// Create a category owned by the caller.
    #[instrument(skip_all, fields(subject = %principal.subject_id))]
    pub fn create(&self, principal: &Principal, input: CreateCategory) -> DomainResult<Category> {
        let input = input.validate()?;
        let owner = principal.subject_id;

        if self.categories.find_by_name(owner, &input.name)?.is_some() {
            return Err(DomainError::conflict(DUPLICATE_NAME));
        }

        let category = Category::new(owner, input.name, input.description, Utc::now());
        let category = self.categories.insert(category).map_err(duplicate_name)?;
        info!(category = %category.id, "category created");
        Ok(category)
    }

    pub fn list(&self, principal: &Principal, params: CategoryListParams) -> DomainResult<Vec<Category>> {
        let requested_owner = params.validate()?;
        let scope = scope_for_list(principal, requested_owner, "categories")?;
        Ok(self.categories.list(&scope)?)
    }

    /// Partial update; only the fields present in `patch` change.
    #[instrument(skip_all, fields(subject = %principal.subject_id, category = %id))]
    pub fn update(
        &self,
        principal: &Principal,
        id: CategoryId,
        patch: UpdateCategory,
    ) -> DomainResult<Category> {
        let mut category = self.fetch(id)?;
        authorize_access(principal, &category)?;

        let changes = patch.into_changes()?;
        for change in &changes {
            if let CategoryChange::Name(name) = change {
                let taken = self
                    .categories
                    .find_by_name(category.owner_id, name)?
                    .is_some_and(|other| other.id != category.id);
                if taken {
                    return Err(DomainError::conflict(DUPLICATE_NAME));
                }
            }
        }

        let now = Utc::now();
        for change in changes {
            category.apply(change, now);
        }
        let category = self
            .categories
            .update(category)
            .map_err(duplicate_name)?
            .ok_or_else(|| DomainError::not_found("Category not found"))?;
        info!("category updated");
        Ok(category)
    }

    /// Delete a category no product links to.
    ///
    /// The linked-product count and the delete are two store calls; a product
    /// linked in between is not caught.
    #[instrument(skip_all, fields(subject = %principal.subject_id, category = %id))]
    pub fn delete(&self, principal: &Principal, id: CategoryId) -> DomainResult<()> {
        let category = self.fetch(id)?;
        authorize_access(principal, &category)?;

        if self.products.count_by_category(category.id)? > 0 {
            return Err(DomainError::bad_request(
                "Cannot delete category with associated products",
            ));
        }

        if !self.categories.delete(category.id)? {
            return Err(DomainError::not_found("Category not found"));
        }
        info!("category deleted");
        Ok(())
    }

    fn fetch(&self, id: CategoryId) -> DomainResult<Category> {
        self.categories
            .get(id)?
            .ok_or_else(|| DomainError::not_found("Category not found"))
    }
}

fn duplicate_name(err: StoreError) -> DomainError {
    match err {
        StoreError::Duplicate(_) => DomainError::conflict(DUPLICATE_NAME),
        other => other.into(),
    }
}

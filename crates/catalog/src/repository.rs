//! Store ports for the catalog.
//!
//! Every method is atomic at the single-document level; nothing here composes
//! several documents into one transaction.

use stockroom_auth::OwnerScope;
use stockroom_core::{CategoryId, ProductId, StoreError, UserId};

use crate::category::Category;
use crate::product::Product;
use crate::query::ProductFilter;

pub trait CategoryRepository: Send + Sync {
    /// Fails with `Duplicate` if the owner already has a category of that name.
    fn insert(&self, category: Category) -> Result<Category, StoreError>;

    fn get(&self, id: CategoryId) -> Result<Option<Category>, StoreError>;

    fn find_by_name(&self, owner: UserId, name: &str) -> Result<Option<Category>, StoreError>;

    /// Newest first.
    fn list(&self, scope: &OwnerScope) -> Result<Vec<Category>, StoreError>;

    /// Replace the stored document; `Duplicate` if the new name collides,
    /// `None` if it no longer exists.
    fn update(&self, category: Category) -> Result<Option<Category>, StoreError>;

    /// `false` if nothing was stored under `id`.
    fn delete(&self, id: CategoryId) -> Result<bool, StoreError>;
}

pub trait ProductRepository: Send + Sync {
    fn insert(&self, product: Product) -> Result<Product, StoreError>;

    fn get(&self, id: ProductId) -> Result<Option<Product>, StoreError>;

    /// `None` if the product no longer exists.
    fn update(&self, product: Product) -> Result<Option<Product>, StoreError>;

    fn delete(&self, id: ProductId) -> Result<bool, StoreError>;

    /// Matching products, newest first, after skipping `skip` and keeping at most `limit`.
    fn find(&self, filter: &ProductFilter, skip: u64, limit: u64) -> Result<Vec<Product>, StoreError>;

    fn count(&self, filter: &ProductFilter) -> Result<u64, StoreError>;

    /// Number of products linked to `category`, across all owners.
    fn count_by_category(&self, category: CategoryId) -> Result<u64, StoreError>;
}

use stockroom_catalog::{Product, ProductFilter, ProductRepository};
use stockroom_core::{CategoryId, ProductId, StoreError};

use super::table::{Documents, Table};

/// In-memory product collection.
#[derive(Debug, Default)]
pub struct InMemoryProductStore {
    table: Table<Documents<ProductId, Product>>,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProductRepository for InMemoryProductStore {
    fn insert(&self, product: Product) -> Result<Product, StoreError> {
        let mut docs = self.table.write()?;
        if docs.contains(&product.id) {
            return Err(StoreError::Duplicate("id".to_string()));
        }
        docs.insert(product.id, product.clone());
        Ok(product)
    }

    fn get(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        Ok(self.table.read()?.get(&id).cloned())
    }

    fn update(&self, product: Product) -> Result<Option<Product>, StoreError> {
        let mut docs = self.table.write()?;
        if docs.replace(&product.id, product.clone()) {
            Ok(Some(product))
        } else {
            Ok(None)
        }
    }

    fn delete(&self, id: ProductId) -> Result<bool, StoreError> {
        Ok(self.table.write()?.remove(&id).is_some())
    }

    fn find(&self, filter: &ProductFilter, skip: u64, limit: u64) -> Result<Vec<Product>, StoreError> {
        let docs = self.table.read()?;
        let skip = usize::try_from(skip).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(docs
            .newest_first()
            .into_iter()
            .filter(|p| filter.matches(p))
            .skip(skip)
            .take(limit)
            .cloned()
            .collect())
    }

    fn count(&self, filter: &ProductFilter) -> Result<u64, StoreError> {
        let docs = self.table.read()?;
        Ok(docs.values().filter(|p| filter.matches(p)).count() as u64)
    }

    fn count_by_category(&self, category: CategoryId) -> Result<u64, StoreError> {
        let docs = self.table.read()?;
        Ok(docs
            .values()
            .filter(|p| p.category_id == Some(category))
            .count() as u64)
    }
}

//! Document stores behind the auth and catalog ports: in-memory tables for
//! development and tests, Postgres for durable deployments.

pub mod categories;
pub mod postgres;
pub mod products;
pub mod table;
pub mod users;

use std::sync::Arc;

pub use categories::InMemoryCategoryStore;
pub use postgres::{PostgresCategoryStore, PostgresProductStore, PostgresStore, PostgresUserStore};
pub use products::InMemoryProductStore;
pub use table::{Documents, Table};
pub use users::InMemoryUserStore;

/// The three collections of one process-wide store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    pub users: Arc<InMemoryUserStore>,
    pub categories: Arc<InMemoryCategoryStore>,
    pub products: Arc<InMemoryProductStore>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

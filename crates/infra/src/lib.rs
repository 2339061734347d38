//! Infrastructure layer: store adapters behind the auth and catalog ports.

pub mod store;

pub use store::{
    InMemoryCategoryStore, InMemoryProductStore, InMemoryStore, InMemoryUserStore,
    PostgresCategoryStore, PostgresProductStore, PostgresStore, PostgresUserStore,
};

//! Postgres-backed document store.
//!
//! Implements the same ports as the in-memory store. Uniqueness (user email,
//! category `(owner_id, name)`) is enforced by the database, and list order
//! follows a per-table insertion sequence.
//!
//! The ports are synchronous, so each call drives its query on the runtime
//! the store was connected from. Call them from blocking threads
//! (`spawn_blocking`) or from outside the runtime, never from an async task.

mod categories;
mod products;
mod users;

use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use tokio::runtime::Handle;
use tracing::info;
use uuid::Uuid;

use stockroom_auth::OwnerScope;
use stockroom_core::StoreError;

pub use categories::PostgresCategoryStore;
pub use products::PostgresProductStore;
pub use users::PostgresUserStore;

const MAX_CONNECTIONS: u32 = 10;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id            UUID PRIMARY KEY,
        name          TEXT NOT NULL,
        email         TEXT NOT NULL,
        password_hash TEXT NOT NULL,
        role          TEXT NOT NULL CHECK (role IN ('admin', 'user')),
        created_at    TIMESTAMPTZ NOT NULL,
        updated_at    TIMESTAMPTZ NOT NULL,
        CONSTRAINT users_email_key UNIQUE (email)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS categories (
        seq         BIGSERIAL NOT NULL,
        id          UUID PRIMARY KEY,
        name        TEXT NOT NULL,
        description TEXT NOT NULL,
        owner_id    UUID NOT NULL,
        created_at  TIMESTAMPTZ NOT NULL,
        updated_at  TIMESTAMPTZ NOT NULL,
        CONSTRAINT categories_owner_name_key UNIQUE (owner_id, name)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS products (
        seq         BIGSERIAL NOT NULL,
        id          UUID PRIMARY KEY,
        name        TEXT NOT NULL,
        description TEXT NOT NULL,
        price       DOUBLE PRECISION NOT NULL,
        quantity    BIGINT NOT NULL,
        category_id UUID NULL,
        owner_id    UUID NOT NULL,
        created_at  TIMESTAMPTZ NOT NULL,
        updated_at  TIMESTAMPTZ NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS categories_seq_idx ON categories (seq DESC)",
    "CREATE INDEX IF NOT EXISTS products_owner_seq_idx ON products (owner_id, seq DESC)",
    "CREATE INDEX IF NOT EXISTS products_category_idx ON products (category_id)",
];

/// Pool plus the runtime its connections live on.
#[derive(Debug, Clone)]
struct Db {
    pool: PgPool,
    runtime: Handle,
}

impl Db {
    /// Run one unit of query work to completion on the store's runtime.
    fn run<T, F>(&self, work: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        self.runtime.block_on(work).map_err(store_error)
    }
}

fn store_error(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::Duplicate(db.constraint().unwrap_or("unique key").to_string())
        }
        _ => StoreError::Unavailable(err.to_string()),
    }
}

fn decode_error(message: String) -> sqlx::Error {
    sqlx::Error::Decode(message.into())
}

/// `NULL` binds to "every owner".
fn scope_owner(scope: &OwnerScope) -> Option<Uuid> {
    match scope {
        OwnerScope::AllOwners => None,
        OwnerScope::Owner(id) => Some(Uuid::from(*id)),
    }
}

/// The three collections, sharing one connection pool.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pub users: Arc<PostgresUserStore>,
    pub categories: Arc<PostgresCategoryStore>,
    pub products: Arc<PostgresProductStore>,
}

impl PostgresStore {
    /// Connect to `url` and create the tables if they are missing.
    ///
    /// Must be awaited on the runtime that will serve the store's queries.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let options = PgConnectOptions::from_str(url).map_err(store_error)?;
        Self::connect_with(options).await
    }

    pub async fn connect_with(options: PgConnectOptions) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .acquire_timeout(Duration::from_secs(5))
            .connect_with(options)
            .await
            .map_err(store_error)?;

        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&pool)
                .await
                .map_err(store_error)?;
        }
        info!("postgres store ready");

        let db = Db {
            pool,
            runtime: Handle::current(),
        };
        Ok(Self {
            users: Arc::new(PostgresUserStore::new(db.clone())),
            categories: Arc::new(PostgresCategoryStore::new(db.clone())),
            products: Arc::new(PostgresProductStore::new(db)),
        })
    }
}

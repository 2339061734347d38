//! Service wiring: the configured store behind the auth and catalog services.

use std::sync::Arc;

use tracing::{info, warn};

use stockroom_auth::{Authenticator, BcryptHasher, CredentialStore, Hs256TokenCodec};
use stockroom_catalog::{CategoryRepository, CategoryService, ProductRepository, ProductService};
use stockroom_core::StoreError;
use stockroom_infra::{InMemoryStore, PostgresStore};

use crate::config::ApiConfig;

pub struct AppServices {
    pub authenticator: Arc<Authenticator>,
    pub categories: CategoryService,
    pub products: ProductService,
}

/// One adapter's three collections, seen through the ports.
struct Stores {
    users: Arc<dyn CredentialStore>,
    categories: Arc<dyn CategoryRepository>,
    products: Arc<dyn ProductRepository>,
}

impl From<InMemoryStore> for Stores {
    fn from(store: InMemoryStore) -> Self {
        Self {
            users: store.users,
            categories: store.categories,
            products: store.products,
        }
    }
}

impl From<PostgresStore> for Stores {
    fn from(store: PostgresStore) -> Self {
        Self {
            users: store.users,
            categories: store.categories,
            products: store.products,
        }
    }
}

/// Postgres when `DATABASE_URL` is configured, the in-memory store otherwise.
async fn open_stores(config: &ApiConfig) -> Result<Stores, StoreError> {
    match &config.database_url {
        Some(url) => {
            let store = PostgresStore::connect(url).await?;
            info!("using postgres store");
            Ok(store.into())
        }
        None => {
            warn!("DATABASE_URL not set; using the in-memory store, data will not survive restarts");
            Ok(InMemoryStore::new().into())
        }
    }
}

pub async fn build_services(config: &ApiConfig) -> Result<AppServices, StoreError> {
    let stores = open_stores(config).await?;

    let authenticator = Authenticator::new(
        stores.users,
        Arc::new(BcryptHasher::new(config.bcrypt_cost)),
        Arc::new(Hs256TokenCodec::new(config.jwt_secret.as_bytes())),
    )
    .with_token_ttl(config.token_ttl);

    info!(
        bcrypt_cost = config.bcrypt_cost,
        token_ttl_secs = config.token_ttl.num_seconds(),
        "services wired"
    );

    Ok(AppServices {
        authenticator: Arc::new(authenticator),
        categories: CategoryService::new(stores.categories.clone(), stores.products.clone()),
        products: ProductService::new(stores.categories, stores.products),
    })
}

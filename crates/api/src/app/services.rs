//! Service wiring: stores, search orchestrator, user directory, session codec.
//!
//! `DATABASE_URL` selects Postgres; without it everything runs in memory with
//! a seeded development user and a small demo catalog.

use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

use stocklookup_auth::{Hs256JwtCodec, JwtCodec, Role, User, UserDirectory};
use stocklookup_catalog::{Price, Product, Stock};
use stocklookup_core::{ProductId, UserId};
use stocklookup_infra::AppConfig;
use stocklookup_infra::catalog_store::postgres::ensure_schema;
use stocklookup_infra::catalog_store::{InMemoryEquivalenceStore, InMemoryProductStore, PostgresCatalogStore};
use stocklookup_infra::user_store::{InMemoryUserDirectory, PostgresUserDirectory};
use stocklookup_search::{EquivalenceStore, ProductStore, SearchConfig, SearchOrchestrator};

/// Search over type-erased stores, so both backends share one router type.
pub type CatalogSearch = SearchOrchestrator<Arc<dyn ProductStore>, Arc<dyn EquivalenceStore>>;

pub struct AppServices {
    search: CatalogSearch,
    users: Arc<dyn UserDirectory>,
    sessions: Arc<dyn JwtCodec>,
    session_ttl: chrono::Duration,
}

impl AppServices {
    pub fn new(
        products: Arc<dyn ProductStore>,
        equivalences: Arc<dyn EquivalenceStore>,
        users: Arc<dyn UserDirectory>,
        sessions: Arc<dyn JwtCodec>,
        search_config: SearchConfig,
        session_ttl: chrono::Duration,
    ) -> Self {
        Self {
            search: SearchOrchestrator::new(products, equivalences, search_config),
            users,
            sessions,
            session_ttl,
        }
    }

    pub fn search(&self) -> &CatalogSearch {
        &self.search
    }

    pub fn users(&self) -> &dyn UserDirectory {
        self.users.as_ref()
    }

    pub fn sessions(&self) -> Arc<dyn JwtCodec> {
        Arc::clone(&self.sessions)
    }

    pub fn session_ttl(&self) -> chrono::Duration {
        self.session_ttl
    }
}

pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    match config.database_url.as_deref() {
        Some(url) => build_persistent_services(config, url).await,
        None => Ok(build_in_memory_services(config)),
    }
}

pub fn build_in_memory_services(config: &AppConfig) -> AppServices {
    let products = Arc::new(InMemoryProductStore::new());
    let equivalences = Arc::new(InMemoryEquivalenceStore::new());
    seed_demo_catalog(&products, &equivalences);

    let users = Arc::new(InMemoryUserDirectory::new());
    match User::new(UserId::new(), config.dev_user.name.as_str(), true, vec![Role::ADMIN]) {
        Ok(user) => {
            tracing::info!(user = %user.name(), "seeded development user");
            users.add_user(user, config.dev_user.password.as_str());
        }
        Err(e) => tracing::warn!(error = %e, "DEV_USER_NAME rejected; no development user seeded"),
    }

    tracing::info!(products = products.len(), "using in-memory stores");

    AppServices::new(
        products,
        equivalences,
        users,
        Arc::new(Hs256JwtCodec::new(config.jwt_secret.as_bytes())),
        SearchConfig {
            store_timeout: config.store_timeout,
        },
        config.session_ttl,
    )
}

async fn build_persistent_services(config: &AppConfig, database_url: &str) -> anyhow::Result<AppServices> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(config.store_timeout)
        .connect(database_url)
        .await
        .context("failed to connect to DATABASE_URL")?;

    ensure_schema(&pool).await.context("failed to apply catalog schema")?;
    tracing::info!("using postgres stores");

    let catalog = Arc::new(PostgresCatalogStore::new(pool.clone()));

    Ok(AppServices::new(
        catalog.clone(),
        catalog,
        Arc::new(PostgresUserDirectory::new(pool)),
        Arc::new(Hs256JwtCodec::new(config.jwt_secret.as_bytes())),
        SearchConfig {
            store_timeout: config.store_timeout,
        },
        config.session_ttl,
    ))
}

/// Three parts, one equivalence: enough to exercise search by hand.
fn seed_demo_catalog(products: &InMemoryProductStore, equivalences: &InMemoryEquivalenceStore) {
    let demo = [
        ("13E", 12, 4_590, Some("Fiat Uno 1.0")),
        ("14E", 0, 5_120, None),
        ("EQV13E", 3, 3_990, Some("Fiat Uno 1.0 / Palio 1.0")),
    ];

    for (code, stock, cents, application) in demo {
        let product = Stock::new(stock).and_then(|stock| {
            let price = Price::from_cents(cents)?;
            Product::new(ProductId::new(), code, stock, price, application.map(str::to_string))
        });
        match product {
            Ok(product) => products.insert(product),
            Err(e) => tracing::warn!(code, error = %e, "skipping demo product"),
        }
    }

    if let Err(e) = equivalences.insert("13E", "EQV13E") {
        tracing::warn!(error = %e, "skipping demo equivalence");
    }
}

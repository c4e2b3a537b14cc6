pub mod aggregation;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod controllers;
pub mod error;
pub mod export;
pub mod models;
pub mod occupancy;
pub mod selection;
pub mod session;
pub mod store;

use axum::{routing::get, Router};
use std::sync::Arc;
use tracing::info;

pub use error::{ReservationError, Result};

use crate::cache::CachedStore;
use crate::store::{InMemoryStore, PgReservationStore, ReservationStore};

// Shared state for the whole application
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ReservationStore>,
    pub config: config::Config,
}

impl AppState {
    /// Picks the backend from config: Postgres when `DATABASE_URL` is set,
    /// in-memory otherwise, with a Redis seat cache in front when
    /// `REDIS_URL` is set.
    pub async fn new(config: config::Config) -> anyhow::Result<Arc<Self>> {
        let policy = config.reservation.contact;

        let store = match &config.database.url {
            Some(url) => {
                let store = PgReservationStore::connect(url, config.database.pool_size, policy).await?;
                store.run_migrations().await?;
                with_cache(store, &config.redis).await?
            }
            None => {
                info!("DATABASE_URL not set, reservations are kept in memory");
                with_cache(InMemoryStore::new(policy), &config.redis).await?
            }
        };

        Ok(Arc::new(Self { store, config }))
    }

    /// State over an explicit store, e.g. in tests.
    pub fn with_store(store: Arc<dyn ReservationStore>, config: config::Config) -> Arc<Self> {
        Arc::new(Self { store, config })
    }
}

/// HTTP routes over `state`, without middleware layers.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { "Cinema reservations v1.0" }))
        .route("/health", get(|| async { "OK" }))
        .nest("/api", controllers::routes())
        .with_state(state)
}

async fn with_cache<S>(store: S, redis: &config::RedisConfig) -> anyhow::Result<Arc<dyn ReservationStore>>
where
    S: ReservationStore + 'static,
{
    match &redis.url {
        Some(url) => Ok(Arc::new(
            CachedStore::connect(store, url, redis.seat_cache_ttl_seconds).await?,
        )),
        None => Ok(Arc::new(store)),
    }
}

//! HTTP server initialization and runtime setup.
//!
//! Handles database connections, cache and object store setup, and the Axum
//! server lifecycle.

use crate::application::services::{ResolutionOptions, ResolutionService};
use crate::config::{CacheBackend, Config};
use crate::infrastructure::cache::{
    CacheService, MemoryCache, MemoryCacheOptions, NullCache, RedisCache,
};
use crate::infrastructure::captcha::TurnstileVerifier;
use crate::infrastructure::object_store::FsObjectStore;
use crate::infrastructure::persistence::PgAliasRepository;
use crate::routes::{HttpOptions, app_router};
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};

/// Connection attempts before startup gives up on the database.
const DB_CONNECT_ATTEMPTS: usize = 5;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool (with retry)
/// - Apply migrations
/// - Cache backend (memory, Redis, or NullCache)
/// - Object store for uploads
/// - Axum HTTP server with graceful shutdown
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let pool = connect_pool(&config).await?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    let state = build_state(&config, pool.clone()).await?;
    let app = app_router(state, &HttpOptions::from(&config))?;

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid LISTEN address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped, closing database pool");
    if tokio::time::timeout(config.shutdown_timeout(), pool.close())
        .await
        .is_err()
    {
        tracing::warn!(
            "Database pool did not close within {}s",
            config.shutdown_timeout_seconds
        );
    }

    Ok(())
}

/// Connects to PostgreSQL, retrying with jittered exponential backoff.
///
/// # Errors
///
/// Returns the last connection error once all attempts are exhausted.
pub async fn connect_pool(config: &Config) -> Result<PgPool> {
    let strategy = ExponentialBackoff::from_millis(200)
        .max_delay(Duration::from_secs(5))
        .map(jitter)
        .take(DB_CONNECT_ATTEMPTS - 1);

    let options = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout));

    Retry::start(strategy, || {
        let options = options.clone();
        async move {
            options
                .connect(&config.database_url)
                .await
                .inspect_err(|e| tracing::warn!("Database connection failed: {e}"))
        }
    })
    .await
    .context("Failed to connect to database")
}

/// Wires repositories, cache, object store and captcha into [`AppState`].
///
/// # Errors
///
/// Fails if the storage directory cannot be created or the captcha client
/// cannot be built.
pub async fn build_state(config: &Config, pool: PgPool) -> Result<AppState> {
    let cache = build_cache(config).await;

    let objects = FsObjectStore::open(&config.storage_dir)
        .await
        .context("Failed to open object store")?;
    tracing::info!("Object store at {}", config.storage_dir.display());

    let store = PgAliasRepository::new(Arc::new(pool));

    let service = ResolutionService::new(
        Arc::new(store),
        Arc::new(objects),
        cache,
        ResolutionOptions {
            operation_timeout: config.request_timeout(),
            write_back_on_miss: config.cache_write_back_on_miss,
        },
    );

    let state = AppState::new(Arc::new(service));

    match &config.turnstile_secret {
        Some(secret) => {
            let verifier = TurnstileVerifier::new(secret.clone(), config.request_timeout())
                .context("Failed to build captcha client")?;
            tracing::info!("Captcha verification enabled");
            Ok(state.with_captcha(Arc::new(verifier)))
        }
        None => Ok(state),
    }
}

/// Builds the configured cache backend.
///
/// An unreachable Redis degrades to [`NullCache`] instead of failing startup.
async fn build_cache(config: &Config) -> Arc<dyn CacheService> {
    match (config.cache_backend, &config.redis_url) {
        (CacheBackend::Memory, _) => {
            tracing::info!("Cache enabled (memory)");
            Arc::new(MemoryCache::new(memory_cache_options(config)))
        }
        (CacheBackend::Redis, Some(redis_url)) => {
            match RedisCache::connect(
                redis_url,
                Duration::from_secs(config.cache_life_window_seconds),
                config.cache_max_entry_bytes,
            )
            .await
            {
                Ok(redis) => {
                    tracing::info!("Cache enabled (Redis)");
                    Arc::new(redis)
                }
                Err(e) => {
                    tracing::warn!("Failed to connect to Redis: {}. Using NullCache.", e);
                    Arc::new(NullCache::new())
                }
            }
        }
        (CacheBackend::Redis, None) => {
            tracing::warn!("CACHE_BACKEND=redis without a Redis URL. Using NullCache.");
            Arc::new(NullCache::new())
        }
        (CacheBackend::None, _) => {
            tracing::info!("Cache disabled (NullCache)");
            Arc::new(NullCache::new())
        }
    }
}

pub fn memory_cache_options(config: &Config) -> MemoryCacheOptions {
    MemoryCacheOptions {
        shards: config.cache_shards,
        life_window: Duration::from_secs(config.cache_life_window_seconds),
        clean_window: Duration::from_secs(config.cache_clean_window_seconds),
        max_entry_size: config.cache_max_entry_bytes,
        hard_max_bytes: (config.cache_hard_max_mb as u64) * 1024 * 1024,
        on_evict: None,
    }
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context};
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::PgConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use tracing::{info, warn};

use crate::config::{Config, StorageBackend};
use crate::database::local::LocalStore;
use crate::database::postgres::{DbPool, PgStore};
use crate::database::{Repository, StoreError};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

// create database connection pool with the database url using diesel
pub fn create_db_connection_pool(database_url: &str) -> Result<DbPool, StoreError> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    Ok(Pool::builder()
        .test_on_check_out(true)
        .connection_timeout(Duration::from_secs(5))
        .build(manager)?)
}

// run diesel migrations
pub fn run_migrations(pool: &DbPool) -> anyhow::Result<()> {
    let mut conn = pool.get()?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| anyhow!("failed to run migrations: {e}"))?;
    info!("applied {} pending migrations", applied.len());
    Ok(())
}

fn open_postgres(database_url: &str) -> anyhow::Result<PgStore> {
    let pool = create_db_connection_pool(database_url).context("failed to create db connection pool")?;
    run_migrations(&pool)?;
    Ok(PgStore::new(pool))
}

fn open_local(config: &Config) -> anyhow::Result<LocalStore> {
    match &config.local_store_path {
        Some(path) => {
            let store = LocalStore::open(path).with_context(|| format!("failed to open {}", path.display()))?;
            info!("using local store at {}", path.display());
            Ok(store)
        }
        None => {
            info!("LOCAL_STORE_PATH not set, using in-memory local store");
            Ok(LocalStore::in_memory())
        }
    }
}

/// Picks the storage backend. In `auto` mode a configured database that
/// cannot be reached falls back to the local store.
pub fn open_repository(config: &Config) -> anyhow::Result<Arc<dyn Repository>> {
    let repository: Arc<dyn Repository> = match config.storage {
        StorageBackend::Local => Arc::new(open_local(config)?),
        StorageBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL must be set for the postgres backend")?;
            Arc::new(open_postgres(database_url)?)
        }
        StorageBackend::Auto => match config.database_url.as_deref() {
            Some(database_url) => match open_postgres(database_url) {
                Ok(store) => Arc::new(store),
                Err(e) => {
                    warn!("postgres is unavailable, falling back to local store: {e:#}");
                    Arc::new(open_local(config)?)
                }
            },
            None => Arc::new(open_local(config)?),
        },
    };
    info!("storage backend: {}", repository.backend());
    Ok(repository)
}

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;

use moat_core::StoreResult;

use crate::config::{MoatConfig, ACCOUNTING_DATABASE, DEFAULT_DATABASE};
use crate::migration::{AcctMigrator, Migrator};
use crate::store::db_err;

/// Owns one shared pool handle per logical database. Handles are created
/// lazily on first use and live until `reconnect` discards them; cloning a
/// `DatabaseConnection` shares the underlying pool, so every caller of a
/// given name sees the same connection.
pub struct ConnectionManager {
    config: MoatConfig,
    base_dir: PathBuf,
    handles: HashMap<String, DatabaseConnection>,
}

impl ConnectionManager {
    pub fn new(config: MoatConfig, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            config,
            base_dir: base_dir.into(),
            handles: HashMap::new(),
        }
    }

    pub fn config(&self) -> &MoatConfig {
        &self.config
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Resolve a logical database name (default when omitted) to its shared
    /// handle, opening and migrating it on first use.
    pub async fn connect(&mut self, name: Option<&str>) -> StoreResult<DatabaseConnection> {
        let name = name.unwrap_or(DEFAULT_DATABASE);
        if let Some(handle) = self.handles.get(name) {
            return Ok(handle.clone());
        }
        let handle = self.open(name).await?;
        self.handles.insert(name.to_string(), handle.clone());
        Ok(handle)
    }

    /// Close and discard the cached handle for a logical database, then open
    /// a fresh one. Close failures on the stale handle are logged, not fatal.
    pub async fn reconnect(&mut self, name: Option<&str>) -> StoreResult<DatabaseConnection> {
        let name = name.unwrap_or(DEFAULT_DATABASE);
        if let Some(stale) = self.handles.remove(name) {
            if let Err(err) = stale.close().await {
                log::warn!("closing stale {name} handle: {err}");
            }
        }
        self.connect(Some(name)).await
    }

    async fn open(&self, name: &str) -> StoreResult<DatabaseConnection> {
        let database = self.config.database_for(name)?;
        let url = database.connection_url(&self.base_dir)?;
        let mut options = ConnectOptions::new(url);
        if let Some(pool) = &self.config.pool {
            if let Some(max) = pool.max_connections {
                options.max_connections(max);
            }
            if let Some(min) = pool.min_connections {
                options.min_connections(min);
            }
            if let Some(timeout_ms) = pool.connect_timeout_ms {
                options.connect_timeout(Duration::from_millis(timeout_ms));
            }
            if let Some(timeout_ms) = pool.acquire_timeout_ms {
                options.acquire_timeout(Duration::from_millis(timeout_ms));
            }
            if let Some(timeout_ms) = pool.idle_timeout_ms {
                options.idle_timeout(Duration::from_millis(timeout_ms));
            }
        }
        let conn = Database::connect(options).await.map_err(db_err)?;
        match name {
            ACCOUNTING_DATABASE => AcctMigrator::up(&conn, None).await.map_err(db_err)?,
            _ => Migrator::up(&conn, None).await.map_err(db_err)?,
        }
        Ok(conn)
    }
}

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use moat_core::{StoreError, StoreResult};

const DEFAULT_CONFIG_NAME: &str = "moat.json";

/// Logical name of the default aggregate database.
pub const DEFAULT_DATABASE: &str = "moat";
/// Logical name of the flow-accounting database.
pub const ACCOUNTING_DATABASE: &str = "accounting";

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum DatabaseConfig {
    Sqlite { path: Option<String> },
    Postgres { url: String },
    Mysql { url: String },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PoolConfig {
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub connect_timeout_ms: Option<u64>,
    pub acquire_timeout_ms: Option<u64>,
    pub idle_timeout_ms: Option<u64>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MoatConfig {
    pub database: DatabaseConfig,
    /// Separate flow-accounting database. When absent the accounting tables
    /// are expected in the default database.
    pub accounting: Option<DatabaseConfig>,
    pub pool: Option<PoolConfig>,
}

impl MoatConfig {
    pub fn default_sqlite(path: impl Into<String>) -> Self {
        Self {
            database: DatabaseConfig::Sqlite {
                path: Some(path.into()),
            },
            accounting: None,
            pool: None,
        }
    }

    pub fn load_or_init(base_dir: &Path, default_sqlite_path: &Path) -> StoreResult<Self> {
        fs::create_dir_all(base_dir)
            .map_err(|err| StoreError::storage(format!("create config dir: {err}")))?;
        let config_path = base_dir.join(DEFAULT_CONFIG_NAME);
        if config_path.exists() {
            let raw = fs::read_to_string(&config_path)
                .map_err(|err| StoreError::storage(format!("read config: {err}")))?;
            let config: MoatConfig =
                serde_json::from_str(&raw).map_err(|err| StoreError::invalid(err.to_string()))?;
            return Ok(config);
        }
        let default = MoatConfig::default_sqlite(default_sqlite_path.to_string_lossy());
        let payload = serde_json::to_string_pretty(&default)
            .map_err(|err| StoreError::storage(format!("serialize config: {err}")))?;
        fs::write(&config_path, payload)
            .map_err(|err| StoreError::storage(format!("write config: {err}")))?;
        Ok(default)
    }

    /// Resolve a logical database name to its configuration. The accounting
    /// name falls back to the default database when no dedicated block is
    /// configured.
    pub fn database_for(&self, name: &str) -> StoreResult<&DatabaseConfig> {
        match name {
            DEFAULT_DATABASE => Ok(&self.database),
            ACCOUNTING_DATABASE => Ok(self.accounting.as_ref().unwrap_or(&self.database)),
            other => Err(StoreError::invalid(format!(
                "unknown logical database: {other}"
            ))),
        }
    }

    pub fn backend_name(&self) -> &'static str {
        match self.database {
            DatabaseConfig::Sqlite { .. } => "sqlite",
            DatabaseConfig::Postgres { .. } => "postgres",
            DatabaseConfig::Mysql { .. } => "mysql",
        }
    }
}

impl DatabaseConfig {
    pub fn sqlite_path(&self, base_dir: &Path) -> StoreResult<PathBuf> {
        match self {
            DatabaseConfig::Sqlite { path } => {
                let path = path.clone().unwrap_or_else(|| "moat.sqlite".to_string());
                let candidate = PathBuf::from(path);
                if candidate.is_absolute() {
                    Ok(candidate)
                } else {
                    Ok(base_dir.join(candidate))
                }
            }
            _ => Err(StoreError::invalid("config is not sqlite backend")),
        }
    }

    pub fn connection_url(&self, base_dir: &Path) -> StoreResult<String> {
        match self {
            DatabaseConfig::Sqlite { .. } => {
                let path = self.sqlite_path(base_dir)?;
                Ok(format!("sqlite://{}?mode=rwc", path.display()))
            }
            DatabaseConfig::Postgres { url } | DatabaseConfig::Mysql { url } => Ok(url.clone()),
        }
    }
}

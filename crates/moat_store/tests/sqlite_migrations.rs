use std::collections::HashSet;

use moat_store::{
    AcctStore, ConnectionManager, DatabaseConfig, MoatConfig, MoatStore, StoreResult,
};
use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, Statement};
use tempfile::tempdir;

async fn list_tables(conn: &DatabaseConnection) -> StoreResult<HashSet<String>> {
    let rows = conn
        .query_all(Statement::from_string(
            DatabaseBackend::Sqlite,
            "SELECT name FROM sqlite_master WHERE type = 'table'",
        ))
        .await
        .map_err(|err| moat_store::StoreError::storage(err.to_string()))?;
    let mut tables = HashSet::new();
    for row in rows {
        let name: String = row
            .try_get("", "name")
            .map_err(|err| moat_store::StoreError::storage(err.to_string()))?;
        tables.insert(name);
    }
    Ok(tables)
}

#[tokio::test]
async fn migrations_create_aggregate_tables() -> StoreResult<()> {
    let dir = tempdir().expect("tempdir");
    let base = dir.path();
    let config = MoatConfig::default_sqlite(base.join("moat.sqlite").to_string_lossy());
    let store = MoatStore::connect(&config, base).await?;
    let tables = list_tables(store.connection()).await?;
    for table in [
        "customer",
        "customer_common_name",
        "identifier",
        "mitigation_scope",
        "signal_session_configuration",
        "parameter_value",
        "prefix",
        "port_range",
        "access_control_list",
        "access_control_list_entry",
        "acl_rule_action",
    ] {
        assert!(tables.contains(table), "missing table {table}");
    }
    Ok(())
}

#[tokio::test]
async fn accounting_database_gets_its_own_schema() -> StoreResult<()> {
    let dir = tempdir().expect("tempdir");
    let base = dir.path();
    let config = MoatConfig {
        database: DatabaseConfig::Sqlite {
            path: Some("moat.sqlite".to_string()),
        },
        accounting: Some(DatabaseConfig::Sqlite {
            path: Some("acct.sqlite".to_string()),
        }),
        pool: None,
    };
    let mut manager = ConnectionManager::new(config, base);
    let acct = AcctStore::from_manager(&mut manager).await?;
    let tables = list_tables(acct.connection()).await?;
    assert!(tables.contains("acct_v5"));
    assert!(!tables.contains("customer"));
    Ok(())
}

#[tokio::test]
async fn migrations_are_idempotent_across_reconnects() -> StoreResult<()> {
    let dir = tempdir().expect("tempdir");
    let base = dir.path();
    let config = MoatConfig::default_sqlite(base.join("moat.sqlite").to_string_lossy());
    let mut manager = ConnectionManager::new(config, base);
    let first = manager.connect(None).await?;
    let before = list_tables(&first).await?;
    let second = manager.reconnect(None).await?;
    let after = list_tables(&second).await?;
    assert_eq!(before, after);
    Ok(())
}

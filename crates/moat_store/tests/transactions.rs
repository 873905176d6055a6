use moat_core::Customer;
use moat_store::{MoatConfig, MoatStore, StoreError, StoreResult};
use sea_orm::{ConnectionTrait, DatabaseBackend, Statement};
use tempfile::tempdir;

async fn open_store(base: &std::path::Path) -> StoreResult<MoatStore> {
    let config = MoatConfig::default_sqlite(base.join("moat.sqlite").to_string_lossy());
    MoatStore::connect(&config, base).await
}

fn insert_root(id: i32, name: &str) -> Statement {
    Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        "INSERT INTO customer (id, name) VALUES (?, ?)",
        [id.into(), name.into()],
    )
}

#[tokio::test]
async fn committed_work_is_visible() -> StoreResult<()> {
    let dir = tempdir().expect("tempdir");
    let store = open_store(dir.path()).await?;
    let count = store
        .with_transaction(|tx| {
            Box::pin(async move {
                tx.execute(insert_root(7, "acme"))
                    .await
                    .map_err(|err| StoreError::storage(err.to_string()))?;
                tx.execute(insert_root(8, "globex"))
                    .await
                    .map_err(|err| StoreError::storage(err.to_string()))?;
                Ok(2)
            })
        })
        .await?;
    assert_eq!(count, 2);
    assert_eq!(store.get_customer(7).await?.name, "acme");
    assert_eq!(store.get_customer(8).await?.name, "globex");
    Ok(())
}

#[tokio::test]
async fn failed_work_rolls_back() -> StoreResult<()> {
    let dir = tempdir().expect("tempdir");
    let store = open_store(dir.path()).await?;
    let result: StoreResult<()> = store
        .with_transaction(|tx| {
            Box::pin(async move {
                tx.execute(insert_root(7, "acme"))
                    .await
                    .map_err(|err| StoreError::storage(err.to_string()))?;
                Err(StoreError::invalid("boom"))
            })
        })
        .await;
    assert!(result.is_err());
    assert_eq!(store.get_customer(7).await?, Customer::default());
    Ok(())
}

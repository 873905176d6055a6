use moat_core::{MitigationScope, MitigationStatus, PortRange, Prefix};
use moat_store::{MoatConfig, MoatStore, StoreResult, UpdateOutcome};
use tempfile::tempdir;

fn sample_scope(mitigation_id: i32) -> MitigationScope {
    let mut scope = MitigationScope {
        customer_id: 42,
        mitigation_id,
        lifetime: 3600,
        status: MitigationStatus::InProgress,
        ..MitigationScope::default()
    };
    scope.fqdn.insert("victim.example.com".to_string());
    scope.alias.insert("web-tier".to_string());
    scope.target_protocol.extend([6, 17]);
    scope.target_ip = vec![Prefix::parse("192.0.2.10/32").expect("prefix")];
    scope.target_prefix = vec![Prefix::parse("192.0.2.0/24").expect("prefix")];
    scope.target_port_ranges = vec![PortRange::new(80, 443).expect("range")];
    scope
}

async fn open_store(base: &std::path::Path) -> StoreResult<MoatStore> {
    let config = MoatConfig::default_sqlite(base.join("moat.sqlite").to_string_lossy());
    MoatStore::connect(&config, base).await
}

#[tokio::test]
async fn create_and_read_back() -> StoreResult<()> {
    let dir = tempdir().expect("tempdir");
    let store = open_store(dir.path()).await?;
    let scope = sample_scope(1);
    store.create_mitigation_scope(&scope).await?;
    let loaded = store.get_mitigation_scope(scope.customer_id, scope.mitigation_id).await?;
    assert_eq!(loaded, scope);
    Ok(())
}

#[tokio::test]
async fn missing_scope_reads_as_empty() -> StoreResult<()> {
    let dir = tempdir().expect("tempdir");
    let store = open_store(dir.path()).await?;
    assert_eq!(
        store.get_mitigation_scope(42, 1).await?,
        MitigationScope::default()
    );
    Ok(())
}

#[tokio::test]
async fn ids_list_in_creation_order() -> StoreResult<()> {
    let dir = tempdir().expect("tempdir");
    let store = open_store(dir.path()).await?;
    store.create_mitigation_scope(&sample_scope(5)).await?;
    store.create_mitigation_scope(&sample_scope(2)).await?;
    store.create_mitigation_scope(&sample_scope(9)).await?;
    assert_eq!(store.mitigation_ids(42).await?, vec![5, 2, 9]);
    assert!(store.mitigation_ids(43).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn update_replaces_children() -> StoreResult<()> {
    let dir = tempdir().expect("tempdir");
    let store = open_store(dir.path()).await?;
    let mut scope = sample_scope(1);
    store.create_mitigation_scope(&scope).await?;

    scope.lifetime = 60;
    scope.status = MitigationStatus::ActiveButTerminating;
    scope.target_ip.clear();
    scope.target_prefix = vec![Prefix::parse("198.51.100.0/24").expect("prefix")];
    scope.target_port_ranges = vec![PortRange::new(53, 53).expect("range")];
    assert_eq!(
        store.update_mitigation_scope(&scope).await?,
        UpdateOutcome::Updated
    );

    let loaded = store.get_mitigation_scope(scope.customer_id, scope.mitigation_id).await?;
    assert_eq!(loaded, scope);
    Ok(())
}

#[tokio::test]
async fn status_update_leaves_children_alone() -> StoreResult<()> {
    let dir = tempdir().expect("tempdir");
    let store = open_store(dir.path()).await?;
    let scope = sample_scope(1);
    store.create_mitigation_scope(&scope).await?;

    assert_eq!(
        store
            .update_mitigation_scope_status(42, 1, MitigationStatus::Terminated)
            .await?,
        UpdateOutcome::Updated
    );
    let loaded = store.get_mitigation_scope(42, 1).await?;
    assert_eq!(loaded.status, MitigationStatus::Terminated);
    assert_eq!(loaded.target_prefix, scope.target_prefix);

    assert_eq!(
        store
            .update_mitigation_scope_status(42, 99, MitigationStatus::Terminated)
            .await?,
        UpdateOutcome::NotFound
    );
    Ok(())
}

#[tokio::test]
async fn update_of_missing_scope_reports_not_found() -> StoreResult<()> {
    let dir = tempdir().expect("tempdir");
    let store = open_store(dir.path()).await?;
    assert_eq!(
        store.update_mitigation_scope(&sample_scope(1)).await?,
        UpdateOutcome::NotFound
    );
    Ok(())
}

#[tokio::test]
async fn delete_is_idempotent_and_scoped_to_one_key() -> StoreResult<()> {
    let dir = tempdir().expect("tempdir");
    let store = open_store(dir.path()).await?;
    store.create_mitigation_scope(&sample_scope(1)).await?;
    store.create_mitigation_scope(&sample_scope(2)).await?;

    store.delete_mitigation_scope(42, 1).await?;
    assert_eq!(
        store.get_mitigation_scope(42, 1).await?,
        MitigationScope::default()
    );
    // the sibling scope survives
    assert_eq!(store.get_mitigation_scope(42, 2).await?, sample_scope(2));
    store.delete_mitigation_scope(42, 1).await?;
    Ok(())
}

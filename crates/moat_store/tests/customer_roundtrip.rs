use moat_core::{Customer, Prefix};
use moat_store::{MoatConfig, MoatStore, StoreResult, UpdateOutcome};
use tempfile::tempdir;

fn sample_customer() -> Customer {
    let mut customer = Customer {
        id: 128,
        name: "transit-provider".to_string(),
        ..Customer::default()
    };
    customer.common_names.insert("client.example.com".to_string());
    customer.common_names.insert("spare.example.com".to_string());
    customer
        .network_info
        .fqdn
        .insert("www.example.com".to_string());
    customer
        .network_info
        .uri
        .insert("https://www.example.com".to_string());
    customer.network_info.address_ranges = vec![
        Prefix::parse("192.0.2.0/24").expect("prefix"),
        Prefix::parse("2001:db8::/32").expect("prefix"),
    ];
    customer
}

async fn open_store(base: &std::path::Path) -> StoreResult<MoatStore> {
    let config = MoatConfig::default_sqlite(base.join("moat.sqlite").to_string_lossy());
    MoatStore::connect(&config, base).await
}

#[tokio::test]
async fn create_and_read_back() -> StoreResult<()> {
    let dir = tempdir().expect("tempdir");
    let store = open_store(dir.path()).await?;
    let customer = sample_customer();
    store.create_customer(&customer).await?;
    let loaded = store.get_customer(customer.id).await?;
    assert_eq!(loaded, customer);
    Ok(())
}

#[tokio::test]
async fn lookup_by_common_name() -> StoreResult<()> {
    let dir = tempdir().expect("tempdir");
    let store = open_store(dir.path()).await?;
    let customer = sample_customer();
    store.create_customer(&customer).await?;
    let loaded = store.get_customer_by_common_name("spare.example.com").await?;
    assert_eq!(loaded.id, customer.id);
    let missing = store.get_customer_by_common_name("nobody.example.com").await?;
    assert_eq!(missing, Customer::default());
    Ok(())
}

#[tokio::test]
async fn missing_customer_reads_as_empty() -> StoreResult<()> {
    let dir = tempdir().expect("tempdir");
    let store = open_store(dir.path()).await?;
    let loaded = store.get_customer(999).await?;
    assert_eq!(loaded, Customer::default());
    Ok(())
}

#[tokio::test]
async fn create_on_existing_id_rewrites() -> StoreResult<()> {
    let dir = tempdir().expect("tempdir");
    let store = open_store(dir.path()).await?;
    let customer = sample_customer();
    store.create_customer(&customer).await?;

    let mut replacement = Customer {
        id: customer.id,
        name: "renamed".to_string(),
        ..Customer::default()
    };
    replacement.common_names.insert("only.example.com".to_string());
    replacement.network_info.address_ranges =
        vec![Prefix::parse("198.51.100.0/24").expect("prefix")];
    store.create_customer(&replacement).await?;

    let loaded = store.get_customer(customer.id).await?;
    assert_eq!(loaded, replacement);
    // stale children are gone
    assert!(!loaded.common_names.contains(&"client.example.com".to_string()));
    Ok(())
}

#[tokio::test]
async fn update_of_missing_customer_reports_not_found() -> StoreResult<()> {
    let dir = tempdir().expect("tempdir");
    let store = open_store(dir.path()).await?;
    let outcome = store.update_customer(&sample_customer()).await?;
    assert_eq!(outcome, UpdateOutcome::NotFound);
    Ok(())
}

#[tokio::test]
async fn delete_is_idempotent() -> StoreResult<()> {
    let dir = tempdir().expect("tempdir");
    let store = open_store(dir.path()).await?;
    let customer = sample_customer();
    store.create_customer(&customer).await?;
    store.delete_customer(customer.id).await?;
    assert_eq!(store.get_customer(customer.id).await?, Customer::default());
    store.delete_customer(customer.id).await?;
    Ok(())
}

use moat_core::SignalSessionConfiguration;
use moat_store::{MoatConfig, MoatStore, StoreResult, UpdateOutcome};
use tempfile::tempdir;

fn sample_config(session_id: i32) -> SignalSessionConfiguration {
    SignalSessionConfiguration {
        customer_id: 11,
        session_id,
        heartbeat_interval: 30,
        missing_hb_allowed: 5,
        max_retransmit: 3,
        ack_timeout: 2.0,
        ack_random_factor: 1.5,
        trigger_mitigation: true,
    }
}

async fn open_store(base: &std::path::Path) -> StoreResult<MoatStore> {
    let config = MoatConfig::default_sqlite(base.join("moat.sqlite").to_string_lossy());
    MoatStore::connect(&config, base).await
}

#[tokio::test]
async fn create_and_read_back() -> StoreResult<()> {
    let dir = tempdir().expect("tempdir");
    let store = open_store(dir.path()).await?;
    let config = sample_config(1);
    store.create_signal_session_configuration(&config).await?;
    let loaded = store.get_signal_session_configuration(11, 1).await?;
    assert_eq!(loaded, config);
    Ok(())
}

#[tokio::test]
async fn missing_configuration_reads_as_empty() -> StoreResult<()> {
    let dir = tempdir().expect("tempdir");
    let store = open_store(dir.path()).await?;
    assert_eq!(
        store.get_signal_session_configuration(11, 1).await?,
        SignalSessionConfiguration::default()
    );
    Ok(())
}

#[tokio::test]
async fn create_on_existing_key_rewrites() -> StoreResult<()> {
    let dir = tempdir().expect("tempdir");
    let store = open_store(dir.path()).await?;
    store.create_signal_session_configuration(&sample_config(1)).await?;

    let mut replacement = sample_config(1);
    replacement.heartbeat_interval = 60;
    replacement.trigger_mitigation = false;
    store.create_signal_session_configuration(&replacement).await?;

    let loaded = store.get_signal_session_configuration(11, 1).await?;
    assert_eq!(loaded, replacement);
    Ok(())
}

#[tokio::test]
async fn sessions_are_keyed_independently() -> StoreResult<()> {
    let dir = tempdir().expect("tempdir");
    let store = open_store(dir.path()).await?;
    store.create_signal_session_configuration(&sample_config(1)).await?;
    store.create_signal_session_configuration(&sample_config(2)).await?;

    let mut updated = sample_config(2);
    updated.max_retransmit = 9;
    assert_eq!(
        store.update_signal_session_configuration(&updated).await?,
        UpdateOutcome::Updated
    );
    assert_eq!(store.get_signal_session_configuration(11, 1).await?, sample_config(1));
    assert_eq!(store.get_signal_session_configuration(11, 2).await?, updated);
    Ok(())
}

#[tokio::test]
async fn update_of_missing_configuration_reports_not_found() -> StoreResult<()> {
    let dir = tempdir().expect("tempdir");
    let store = open_store(dir.path()).await?;
    assert_eq!(
        store.update_signal_session_configuration(&sample_config(1)).await?,
        UpdateOutcome::NotFound
    );
    Ok(())
}

#[tokio::test]
async fn delete_removes_every_session_for_the_customer() -> StoreResult<()> {
    let dir = tempdir().expect("tempdir");
    let store = open_store(dir.path()).await?;
    store.create_signal_session_configuration(&sample_config(1)).await?;
    store.create_signal_session_configuration(&sample_config(2)).await?;

    store.delete_signal_session_configurations(11).await?;
    assert_eq!(
        store.get_signal_session_configuration(11, 1).await?,
        SignalSessionConfiguration::default()
    );
    assert_eq!(
        store.get_signal_session_configuration(11, 2).await?,
        SignalSessionConfiguration::default()
    );
    store.delete_signal_session_configurations(11).await?;
    Ok(())
}

use domain::communication::{BootNotification, Protocol};
use domain::device::{Device, DeviceStore, Ownership, SettingsUpdate};
use domain::installation::{InstallationProcess, InstallationState, ProcessStore, WorkOrder};
use domain::intervals::{IntervalRules, IntervalRulesRepository};
use domain::{Aggregate, DomainError};
use infrastructure::{InMemoryDeviceStore, InMemoryIntervalRulesRepository, InMemoryProcessStore};

fn order(order_id: &str) -> WorkOrder {
    WorkOrder::new(order_id, Ownership::new("Devicex.nl", "public-devices"))
}

fn boot(device_id: &str) -> BootNotification {
    BootNotification {
        device_id: device_id.to_string(),
        protocol: Protocol::IoT16,
        vendor: "Garo".to_string(),
        model: "CPF25 Family".to_string(),
        serial: "891234A56711".to_string(),
        firmware: "1.1".to_string(),
    }
}

#[tokio::test]
async fn test_save_bumps_version_and_logs_events() {
    let store = InMemoryProcessStore::new();
    let mut process = InstallationProcess::start(order("k56gj"));
    process.assign_device("EVB-P4562137").unwrap();

    let events = store.save(&mut process).await.unwrap();

    assert_eq!(events.len(), 2);
    assert_eq!(process.version(), 1);
    assert!(process.pending_events().is_empty());

    let log = store.events("k56gj").await;
    let types: Vec<&str> = log.iter().map(|e| e.event_type.as_str()).collect();
    assert_eq!(types, vec!["InstallationStarted", "DeviceAssigned"]);

    let loaded = store.get_by_order_id("k56gj").await.unwrap().unwrap();
    assert_eq!(loaded.version(), 1);
    assert_eq!(loaded.state(), InstallationState::DeviceAssigned);
}

#[tokio::test]
async fn test_duplicate_order_is_rejected() {
    let store = InMemoryProcessStore::new();
    store
        .save(&mut InstallationProcess::start(order("k56gj")))
        .await
        .unwrap();

    let result = store
        .save(&mut InstallationProcess::start(order("k56gj")))
        .await;

    assert_eq!(result, Err(DomainError::AlreadyExists("k56gj".to_string())));
}

#[tokio::test]
async fn test_stale_writer_gets_version_conflict() {
    let store = InMemoryProcessStore::new();
    store
        .save(&mut InstallationProcess::start(order("k56gj")))
        .await
        .unwrap();

    let mut first = store.get_by_order_id("k56gj").await.unwrap().unwrap();
    let mut second = store.get_by_order_id("k56gj").await.unwrap().unwrap();

    first.assign_device("D1").unwrap();
    store.save(&mut first).await.unwrap();

    second.assign_device("D2").unwrap();
    let err = store.save(&mut second).await.unwrap_err();

    assert!(err.is_conflict());
    // Failed save keeps the buffer and the stored state untouched
    assert_eq!(second.pending_events().len(), 1);
    let stored = store.get_by_order_id("k56gj").await.unwrap().unwrap();
    assert_eq!(stored.device_id(), Some("D1"));
    assert_eq!(store.events("k56gj").await.len(), 2);
}

#[tokio::test]
async fn test_get_by_device_id_prefers_open_process() {
    let store = InMemoryProcessStore::new();

    let mut done = InstallationProcess::start(order("first"));
    done.assign_device("D1").unwrap();
    done.handle_boot_notification(&boot("D1"));
    done.confirm_boot_data().unwrap();
    done.complete().unwrap();
    store.save(&mut done).await.unwrap();

    let mut open = InstallationProcess::start(order("second"));
    open.assign_device("D1").unwrap();
    store.save(&mut open).await.unwrap();

    let found = store.get_by_device_id("D1").await.unwrap().unwrap();
    assert_eq!(found.order_id(), "second");

    assert!(store.get_by_device_id("D9").await.unwrap().is_none());
}

#[tokio::test]
async fn test_find_by_states() {
    let store = InMemoryProcessStore::new();
    store
        .save(&mut InstallationProcess::start(order("a")))
        .await
        .unwrap();
    let mut assigned = InstallationProcess::start(order("b"));
    assigned.assign_device("D1").unwrap();
    store.save(&mut assigned).await.unwrap();

    let pending = store
        .find_by_states(&[InstallationState::Pending])
        .await
        .unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].order_id, "a");

    let all = store.find_by_states(&[]).await.unwrap();
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn test_device_store_round_trip() {
    let store = InMemoryDeviceStore::new();
    let mut device = Device::create(
        "EVB-P4562137".to_string(),
        Ownership::new("Devicex.nl", "public-devices"),
        None,
    );
    store.save(&mut device).await.unwrap();

    let mut loaded = store.get("EVB-P4562137").await.unwrap().unwrap();
    loaded.update_settings(&SettingsUpdate {
        public_access: Some(true),
        ..Default::default()
    });
    store.save(&mut loaded).await.unwrap();

    let reloaded = store.get("EVB-P4562137").await.unwrap().unwrap();
    assert!(reloaded.settings().public_access);
    assert_eq!(reloaded.version(), 2);
    assert_eq!(store.events("EVB-P4562137").await.len(), 2);

    let owned = store.find_by_operator("Devicex.nl").await.unwrap();
    assert_eq!(owned.len(), 1);
    assert!(store.find_by_operator("Other").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_interval_rules_blob() {
    let repository = InMemoryIntervalRulesRepository::new();
    assert_eq!(repository.get().await.unwrap(), None);

    repository
        .save(&IntervalRules::default_rules(600))
        .await
        .unwrap();

    assert_eq!(
        repository.get().await.unwrap(),
        Some(IntervalRules::default_rules(600))
    );
}

#[tokio::test]
async fn test_interval_rules_blob_seeded() {
    let repository = InMemoryIntervalRulesRepository::with_rules(IntervalRules::default_rules(900));
    assert_eq!(
        repository.get().await.unwrap(),
        Some(IntervalRules::default_rules(900))
    );

    repository
        .save(&IntervalRules::default_rules(60))
        .await
        .unwrap();
    assert_eq!(
        repository.get().await.unwrap(),
        Some(IntervalRules::default_rules(60))
    );
}

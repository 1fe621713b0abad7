use anyhow::Result;
use application::{
    CommunicationService, DeviceService, DevicesReadModel, InstallationService, IntervalsService,
    KnownDevicesReadModel, MessageRouter, ProjectionPublisher, RetryPolicy, UnitOfWork,
};
use domain::{DeviceStore, EventPublisher, IntervalRulesRepository, ProcessStore};
use infrastructure::{
    CompositeEventPublisher, InMemoryDeviceStore, InMemoryIntervalRulesRepository,
    InMemoryProcessStore, SeaOrmDeviceStore, SeaOrmIntervalRulesRepository, SeaOrmProcessStore,
    ServerConfig,
};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database};
use std::sync::Arc;
use tracing::info;

/// Storage backends behind the services
#[derive(Clone)]
pub struct Stores {
    pub processes: Arc<dyn ProcessStore>,
    pub devices: Arc<dyn DeviceStore>,
    pub interval_rules: Arc<dyn IntervalRulesRepository>,
}

impl Stores {
    pub fn in_memory() -> Self {
        Self {
            processes: Arc::new(InMemoryProcessStore::new()),
            devices: Arc::new(InMemoryDeviceStore::new()),
            interval_rules: Arc::new(InMemoryIntervalRulesRepository::new()),
        }
    }

    /// Connect and bring the schema up to date
    pub async fn connect(url: &str) -> Result<Self> {
        let mut options = ConnectOptions::new(url);
        options.sqlx_logging(false);
        let db = Database::connect(options).await?;

        info!("Running database migrations...");
        Migrator::up(&db, None).await?;
        info!("✅ Migrations applied successfully");

        Ok(Self {
            processes: Arc::new(SeaOrmProcessStore::new(db.clone())),
            devices: Arc::new(SeaOrmDeviceStore::new(db.clone())),
            interval_rules: Arc::new(SeaOrmIntervalRulesRepository::new(db)),
        })
    }
}

pub struct AppState {
    pub installations: Arc<InstallationService>,
    pub devices: DeviceService,
    pub intervals: Arc<IntervalsService>,
    pub communication: CommunicationService,
    pub known_devices: Arc<KnownDevicesReadModel>,
    pub devices_read_model: Arc<DevicesReadModel>,
    pub router: Arc<MessageRouter>,
}

impl AppState {
    /// Wire services over `stores`. Events always reach the local read
    /// models; `bus` adds outbound publication.
    pub async fn new(
        config: &ServerConfig,
        stores: Stores,
        bus: Option<Arc<dyn EventPublisher>>,
    ) -> Result<Self> {
        let known_devices = Arc::new(KnownDevicesReadModel::new());
        let devices_read_model = Arc::new(DevicesReadModel::new());

        let mut publishers: Vec<Arc<dyn EventPublisher>> = vec![Arc::new(
            ProjectionPublisher::new(known_devices.clone(), devices_read_model.clone()),
        )];
        publishers.extend(bus);
        let publisher: Arc<dyn EventPublisher> = Arc::new(CompositeEventPublisher::new(publishers));

        let uow = Arc::new(UnitOfWork::new(
            publisher.clone(),
            RetryPolicy::new(config.retry.max_attempts),
        ));

        let installations = Arc::new(InstallationService::new(
            stores.processes.clone(),
            stores.devices.clone(),
            uow.clone(),
        ));
        let devices = DeviceService::new(stores.devices.clone(), uow);

        let intervals = Arc::new(IntervalsService::new(
            stores.interval_rules.clone(),
            config.intervals.default_seconds,
        ));
        intervals.load().await?;

        let communication = CommunicationService::new(
            installations.clone(),
            intervals.clone(),
            known_devices.clone(),
            publisher,
        );
        let router = Arc::new(MessageRouter::new(
            installations.clone(),
            known_devices.clone(),
        ));

        Ok(Self {
            installations,
            devices,
            intervals,
            communication,
            known_devices,
            devices_read_model,
            router,
        })
    }
}

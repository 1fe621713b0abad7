use crate::database::entities::{device_events, devices};
use crate::database::{db_err, event_models, from_json, to_json};
use crate::memory::EventLogEntry;
use async_trait::async_trait;
use chrono::Utc;
use domain::device::{Device, DeviceRecord, DeviceStore, Ownership};
use domain::{Aggregate, DomainError, DomainEvent};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set, SqlErr,
    TransactionTrait,
};

pub struct SeaOrmDeviceStore {
    db: DatabaseConnection,
}

impl SeaOrmDeviceStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn model_to_device(model: devices::Model) -> Result<Device, DomainError> {
        Ok(Device::from_record(DeviceRecord {
            device_id: model.device_id,
            ownership: Ownership {
                operator: model.operator,
                provider: model.provider,
            },
            location: model.location.map(from_json).transpose()?,
            opening_hours: from_json(model.opening_hours)?,
            settings: from_json(model.settings)?,
            version: u64::try_from(model.version).map_err(|_| {
                DomainError::Repository(format!("Negative version {}", model.version))
            })?,
        }))
    }

    fn to_active_model(device: &Device, version: u64) -> Result<devices::ActiveModel, DomainError> {
        let record = device.to_record();
        Ok(devices::ActiveModel {
            device_id: Set(record.device_id),
            operator: Set(record.ownership.operator),
            provider: Set(record.ownership.provider),
            location: Set(record.location.as_ref().map(to_json).transpose()?),
            opening_hours: Set(to_json(&record.opening_hours)?),
            settings: Set(to_json(&record.settings)?),
            version: Set(version as i64),
            updated_at: Set(Utc::now().fixed_offset()),
        })
    }

    /// Event log of one device, oldest first
    pub async fn events(&self, device_id: &str) -> Result<Vec<EventLogEntry>, DomainError> {
        let models = device_events::Entity::find()
            .filter(device_events::Column::DeviceId.eq(device_id))
            .order_by_asc(device_events::Column::OccurredAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        models
            .into_iter()
            .map(|m| {
                Ok(EventLogEntry {
                    id: m.id,
                    aggregate_id: m.device_id,
                    event_type: m.event_type,
                    time: m.occurred_at.with_timezone(&Utc),
                    event: from_json(m.payload)?,
                })
            })
            .collect()
    }
}

#[async_trait]
impl DeviceStore for SeaOrmDeviceStore {
    async fn get(&self, device_id: &str) -> Result<Option<Device>, DomainError> {
        let model = devices::Entity::find_by_id(device_id.to_string())
            .one(&self.db)
            .await
            .map_err(db_err)?;

        model.map(Self::model_to_device).transpose()
    }

    async fn save(&self, device: &mut Device) -> Result<Vec<DomainEvent>, DomainError> {
        let device_id = device.device_id().to_string();
        let expected = device.version();
        let next = expected + 1;
        let model = Self::to_active_model(device, next)?;

        let txn = self.db.begin().await.map_err(db_err)?;

        if device.is_new() {
            devices::Entity::insert(model)
                .exec(&txn)
                .await
                .map_err(|e| match e.sql_err() {
                    Some(SqlErr::UniqueConstraintViolation(_)) => {
                        DomainError::AlreadyExists(device_id.clone())
                    }
                    _ => db_err(e),
                })?;
        } else {
            let result = devices::Entity::update_many()
                .set(model)
                .filter(devices::Column::DeviceId.eq(device_id.as_str()))
                .filter(devices::Column::Version.eq(expected as i64))
                .exec(&txn)
                .await
                .map_err(db_err)?;

            if result.rows_affected == 0 {
                return Err(DomainError::VersionConflict {
                    id: device_id,
                    expected,
                });
            }
        }

        let events = event_models(device.pending_events())?;
        if !events.is_empty() {
            let models = events.into_iter().map(|(id, event_type, occurred_at, payload)| {
                device_events::ActiveModel {
                    id: Set(id),
                    device_id: Set(device_id.clone()),
                    event_type: Set(event_type),
                    occurred_at: Set(occurred_at),
                    payload: Set(payload),
                }
            });
            device_events::Entity::insert_many(models)
                .exec(&txn)
                .await
                .map_err(db_err)?;
        }

        txn.commit().await.map_err(db_err)?;
        Ok(device.committed(next))
    }

    async fn find_by_operator(&self, operator: &str) -> Result<Vec<Device>, DomainError> {
        let models = devices::Entity::find()
            .filter(devices::Column::Operator.eq(operator))
            .order_by_asc(devices::Column::DeviceId)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        models.into_iter().map(Self::model_to_device).collect()
    }
}

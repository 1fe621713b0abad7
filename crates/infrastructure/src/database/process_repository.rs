use crate::database::entities::{installation_events, installation_processes};
use crate::database::{db_err, event_models, from_json, to_json};
use crate::memory::EventLogEntry;
use async_trait::async_trait;
use chrono::Utc;
use domain::installation::{
    InstallationProcess, InstallationProcessState, InstallationState, ProcessRecord, ProcessStore,
};
use domain::{Aggregate, DomainError, DomainEvent, Ownership};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set, SqlErr,
    TransactionTrait,
};

pub struct SeaOrmProcessStore {
    db: DatabaseConnection,
}

impl SeaOrmProcessStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn model_to_process(
        model: installation_processes::Model,
    ) -> Result<InstallationProcess, DomainError> {
        let state: InstallationState = model.state.parse()?;
        let record = ProcessRecord {
            order_id: model.order_id,
            device_id: model.device_id,
            ownership: Ownership {
                operator: model.operator,
                provider: model.provider,
            },
            location: model.location.map(from_json).transpose()?,
            boot: model.boot.map(from_json).transpose()?,
            confirmed: model.confirmed,
            completed: model.completed,
            state,
            version: u64::try_from(model.version).map_err(|_| {
                DomainError::Repository(format!("Negative version {}", model.version))
            })?,
        };
        Ok(InstallationProcess::from_record(record))
    }

    fn to_active_model(
        process: &InstallationProcess,
        version: u64,
    ) -> Result<installation_processes::ActiveModel, DomainError> {
        let record = process.to_record();
        Ok(installation_processes::ActiveModel {
            order_id: Set(record.order_id),
            device_id: Set(record.device_id),
            operator: Set(record.ownership.operator),
            provider: Set(record.ownership.provider),
            location: Set(record.location.as_ref().map(to_json).transpose()?),
            boot: Set(record.boot.as_ref().map(to_json).transpose()?),
            confirmed: Set(record.confirmed),
            completed: Set(record.completed),
            state: Set(record.state.as_str().to_string()),
            version: Set(version as i64),
            updated_at: Set(Utc::now().fixed_offset()),
        })
    }

    /// Event log of one order, oldest first
    pub async fn events(&self, order_id: &str) -> Result<Vec<EventLogEntry>, DomainError> {
        let models = installation_events::Entity::find()
            .filter(installation_events::Column::OrderId.eq(order_id))
            .order_by_asc(installation_events::Column::OccurredAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        models
            .into_iter()
            .map(|m| {
                Ok(EventLogEntry {
                    id: m.id,
                    aggregate_id: m.order_id,
                    event_type: m.event_type,
                    time: m.occurred_at.with_timezone(&Utc),
                    event: from_json(m.payload)?,
                })
            })
            .collect()
    }
}

#[async_trait]
impl ProcessStore for SeaOrmProcessStore {
    async fn save(
        &self,
        process: &mut InstallationProcess,
    ) -> Result<Vec<DomainEvent>, DomainError> {
        let order_id = process.order_id().to_string();
        let expected = process.version();
        let next = expected + 1;
        let model = Self::to_active_model(process, next)?;

        let txn = self.db.begin().await.map_err(db_err)?;

        if process.is_new() {
            installation_processes::Entity::insert(model)
                .exec(&txn)
                .await
                .map_err(|e| match e.sql_err() {
                    Some(SqlErr::UniqueConstraintViolation(_)) => {
                        DomainError::AlreadyExists(order_id.clone())
                    }
                    _ => db_err(e),
                })?;
        } else {
            let result = installation_processes::Entity::update_many()
                .set(model)
                .filter(installation_processes::Column::OrderId.eq(order_id.as_str()))
                .filter(installation_processes::Column::Version.eq(expected as i64))
                .exec(&txn)
                .await
                .map_err(db_err)?;

            if result.rows_affected == 0 {
                return Err(DomainError::VersionConflict {
                    id: order_id,
                    expected,
                });
            }
        }

        let events = event_models(process.pending_events())?;
        if !events.is_empty() {
            let models = events.into_iter().map(|(id, event_type, occurred_at, payload)| {
                installation_events::ActiveModel {
                    id: Set(id),
                    order_id: Set(order_id.clone()),
                    event_type: Set(event_type),
                    occurred_at: Set(occurred_at),
                    payload: Set(payload),
                }
            });
            installation_events::Entity::insert_many(models)
                .exec(&txn)
                .await
                .map_err(db_err)?;
        }

        txn.commit().await.map_err(db_err)?;
        Ok(process.committed(next))
    }

    async fn get_by_order_id(
        &self,
        order_id: &str,
    ) -> Result<Option<InstallationProcess>, DomainError> {
        let model = installation_processes::Entity::find_by_id(order_id.to_string())
            .one(&self.db)
            .await
            .map_err(db_err)?;

        model.map(Self::model_to_process).transpose()
    }

    async fn get_by_device_id(
        &self,
        device_id: &str,
    ) -> Result<Option<InstallationProcess>, DomainError> {
        // Open process first, then the most recently touched completed one
        let model = installation_processes::Entity::find()
            .filter(installation_processes::Column::DeviceId.eq(device_id))
            .order_by_asc(installation_processes::Column::Completed)
            .order_by_desc(installation_processes::Column::UpdatedAt)
            .one(&self.db)
            .await
            .map_err(db_err)?;

        model.map(Self::model_to_process).transpose()
    }

    async fn find_by_states(
        &self,
        states: &[InstallationState],
    ) -> Result<Vec<InstallationProcessState>, DomainError> {
        let mut query = installation_processes::Entity::find();
        if !states.is_empty() {
            query = query.filter(
                installation_processes::Column::State.is_in(states.iter().map(|s| s.as_str())),
            );
        }

        let models = query
            .order_by_asc(installation_processes::Column::OrderId)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        models
            .into_iter()
            .map(|m| {
                Ok(InstallationProcessState {
                    state: m.state.parse()?,
                    order_id: m.order_id,
                    device_id: m.device_id,
                })
            })
            .collect()
    }
}

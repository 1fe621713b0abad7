use crate::database::entities::configs;
use crate::database::{db_err, from_json, to_json};
use async_trait::async_trait;
use chrono::Utc;
use domain::DomainError;
use domain::intervals::{IntervalRules, IntervalRulesRepository};
use sea_orm::{DatabaseConnection, EntityTrait, Set};

pub const INTERVAL_RULES_CONFIG: &str = "IntervalRules";

/// Interval rules stored as a named JSON blob in the `configs` table
pub struct SeaOrmIntervalRulesRepository {
    db: DatabaseConnection,
}

impl SeaOrmIntervalRulesRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl IntervalRulesRepository for SeaOrmIntervalRulesRepository {
    async fn get(&self) -> Result<Option<IntervalRules>, DomainError> {
        let model = configs::Entity::find_by_id(INTERVAL_RULES_CONFIG.to_string())
            .one(&self.db)
            .await
            .map_err(db_err)?;

        model.map(|m| from_json(m.value)).transpose()
    }

    async fn save(&self, rules: &IntervalRules) -> Result<(), DomainError> {
        let active_model = configs::ActiveModel {
            name: Set(INTERVAL_RULES_CONFIG.to_string()),
            value: Set(to_json(rules)?),
            updated_at: Set(Utc::now().fixed_offset()),
        };

        // Upsert
        configs::Entity::insert(active_model)
            .on_conflict(
                sea_orm::sea_query::OnConflict::column(configs::Column::Name)
                    .update_columns([configs::Column::Value, configs::Column::UpdatedAt])
                    .to_owned(),
            )
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        Ok(())
    }
}

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "devices")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub device_id: String,
    pub operator: Option<String>,
    pub provider: Option<String>,
    pub location: Option<Json>,
    pub opening_hours: Json,
    pub settings: Json,
    pub version: i64,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::device_events::Entity")]
    DeviceEvents,
}

impl Related<super::device_events::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DeviceEvents.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "installation_processes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub order_id: String,
    pub device_id: Option<String>,
    pub operator: Option<String>,
    pub provider: Option<String>,
    pub location: Option<Json>,
    pub boot: Option<Json>,
    pub confirmed: bool,
    pub completed: bool,
    pub state: String, // Derived from the other columns, kept for querying
    pub version: i64,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::installation_events::Entity")]
    InstallationEvents,
}

impl Related<super::installation_events::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InstallationEvents.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

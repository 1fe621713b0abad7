use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "installation_events")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub order_id: String,
    pub event_type: String,
    pub occurred_at: DateTimeWithTimeZone,
    pub payload: Json,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::installation_processes::Entity",
        from = "Column::OrderId",
        to = "super::installation_processes::Column::OrderId",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    InstallationProcess,
}

impl Related<super::installation_processes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InstallationProcess.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

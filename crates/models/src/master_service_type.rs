//! Link table between masters and the service types they perform.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{master, service_type};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "master_service_type")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub master_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub service_type_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Master, ServiceType }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Master => Entity::belongs_to(master::Entity)
                .from(Column::MasterId)
                .to(master::Column::Id)
                .on_delete(ForeignKeyAction::Cascade)
                .into(),
            Relation::ServiceType => Entity::belongs_to(service_type::Entity)
                .from(Column::ServiceTypeId)
                .to(service_type::Column::Id)
                .on_delete(ForeignKeyAction::Cascade)
                .into(),
        }
    }
}

impl Related<master::Entity> for Entity {
    fn to() -> RelationDef { Relation::Master.def() }
}

impl Related<service_type::Entity> for Entity {
    fn to() -> RelationDef { Relation::ServiceType.def() }
}

impl ActiveModelBehavior for ActiveModel {}

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{errors, master_service_type, product, service_type, validators};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "master")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub image: Option<String>,
    pub job_title: String,
    pub favorite_product_id: Option<i32>,
    pub experience: i32,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { FavoriteProduct, ServiceTypeLinks }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::FavoriteProduct => Entity::belongs_to(product::Entity)
                .from(Column::FavoriteProductId)
                .to(product::Column::Id)
                .on_delete(ForeignKeyAction::SetNull)
                .into(),
            Relation::ServiceTypeLinks => Entity::has_many(master_service_type::Entity).into(),
        }
    }
}

impl Related<product::Entity> for Entity {
    fn to() -> RelationDef { Relation::FavoriteProduct.def() }
}

impl Related<master_service_type::Entity> for Entity {
    fn to() -> RelationDef { Relation::ServiceTypeLinks.def() }
}

impl Related<service_type::Entity> for Entity {
    fn to() -> RelationDef { master_service_type::Relation::ServiceType.def() }
    fn via() -> Option<RelationDef> { Some(master_service_type::Relation::Master.def().rev()) }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_fields(name: &str, job_title: &str, experience: i32, image: Option<&str>) -> Result<(), errors::ModelError> {
    validators::validate_required("name", name, 200)?;
    validators::validate_required("job_title", job_title, 200)?;
    validators::validate_non_negative("experience", experience)?;
    if let Some(url) = image {
        validators::validate_http_url("image", url)?;
    }
    Ok(())
}

/// A master must be linked to at least one service type.
pub fn validate_service_type_ids(ids: &[i32]) -> Result<(), errors::ModelError> {
    if ids.is_empty() {
        return Err(errors::ModelError::Validation("service_types_ids must contain at least one id".into()));
    }
    Ok(())
}

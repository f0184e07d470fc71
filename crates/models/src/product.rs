use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{errors, validators};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub brand: String,
    pub name: String,
    pub image: Option<String>,
    pub purpose: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { FavoredBy }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::FavoredBy => Entity::has_many(crate::master::Entity).into(),
        }
    }
}

impl Related<crate::master::Entity> for Entity {
    fn to() -> RelationDef { Relation::FavoredBy.def() }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// `"<brand> - <name>"`, as shown next to a master.
    pub fn display_name(&self) -> String { format!("{} - {}", self.brand, self.name) }
}

pub fn validate_fields(brand: &str, name: &str, purpose: &str, image: Option<&str>) -> Result<(), errors::ModelError> {
    validators::validate_required("brand", brand, 200)?;
    validators::validate_required("name", name, 200)?;
    validators::validate_required("purpose", purpose, 300)?;
    if let Some(url) = image {
        validators::validate_http_url("image", url)?;
    }
    Ok(())
}

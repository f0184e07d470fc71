use sea_orm::{entity::prelude::*, Set, DatabaseConnection};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{errors, validators};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "quote")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub author: String,
    #[sea_orm(column_type = "Text")]
    pub text: String,
    pub is_used: bool,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Daily }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self { Relation::Daily => Entity::has_many(crate::daily_quote::Entity).into() }
    }
}

impl Related<crate::daily_quote::Entity> for Entity {
    fn to() -> RelationDef { Relation::Daily.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_fields(author: &str, text: &str) -> Result<(), errors::ModelError> {
    validators::validate_max_len("author", author, 100)?;
    if text.trim().is_empty() {
        return Err(errors::ModelError::Validation("text is required".into()));
    }
    Ok(())
}

pub async fn create(db: &DatabaseConnection, author: &str, text: &str) -> Result<Model, errors::ModelError> {
    validate_fields(author, text)?;
    let am = ActiveModel {
        author: Set(author.trim().to_string()),
        text: Set(text.trim().to_string()),
        is_used: Set(false),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

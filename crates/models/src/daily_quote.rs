use sea_orm::{entity::prelude::*, ConnectionTrait, QueryFilter};
use serde::{Deserialize, Serialize};

use crate::{errors, quote};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "daily_quote")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub quote_id: i32,
    #[sea_orm(unique)]
    pub date: Date,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Quote }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Quote => Entity::belongs_to(quote::Entity)
                .from(Column::QuoteId)
                .to(quote::Column::Id)
                .on_delete(ForeignKeyAction::Cascade)
                .into(),
        }
    }
}

impl Related<quote::Entity> for Entity {
    fn to() -> RelationDef { Relation::Quote.def() }
}

impl ActiveModelBehavior for ActiveModel {}

/// The quote assigned to `date`, if any.
pub async fn find_for_date<C: ConnectionTrait>(db: &C, date: Date) -> Result<Option<(Model, Option<quote::Model>)>, errors::ModelError> {
    Entity::find()
        .filter(Column::Date.eq(date))
        .find_also_related(quote::Entity)
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

use sea_orm::{entity::prelude::*, Set, DatabaseConnection, QueryFilter, SqlErr};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{errors, user};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "token_blacklist")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub jti: String,
    pub user_id: i32,
    pub expires_at: DateTimeWithTimeZone,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { User }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::User => Entity::belongs_to(user::Entity).from(Column::UserId).to(user::Column::Id).into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub async fn is_blacklisted(db: &DatabaseConnection, jti: &str) -> Result<bool, errors::ModelError> {
    let found = Entity::find()
        .filter(Column::Jti.eq(jti))
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))?;
    Ok(found.is_some())
}

/// Record `jti`; returns `false` when it was already present.
pub async fn blacklist(
    db: &DatabaseConnection,
    jti: &str,
    user_id: i32,
    expires_at: DateTimeWithTimeZone,
) -> Result<bool, errors::ModelError> {
    if jti.trim().is_empty() {
        return Err(errors::ModelError::Validation("jti required".into()));
    }
    let am = ActiveModel {
        jti: Set(jti.to_string()),
        user_id: Set(user_id),
        expires_at: Set(expires_at),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    };
    match am.insert(db).await {
        Ok(_) => Ok(true),
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => Ok(false),
        Err(e) => Err(errors::ModelError::Db(e.to_string())),
    }
}

/// Drop entries whose token would have expired anyway.
pub async fn purge_expired(db: &DatabaseConnection) -> Result<u64, errors::ModelError> {
    let now: DateTimeWithTimeZone = Utc::now().into();
    let res = Entity::delete_many()
        .filter(Column::ExpiresAt.lt(now))
        .exec(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))?;
    Ok(res.rows_affected)
}

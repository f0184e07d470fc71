//! Quote of the day plus quote management.

pub mod rotation;
pub mod scheduler;

use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder};
use serde::{Deserialize, Serialize};
use tracing::info;

use models::{daily_quote, quote};

use crate::catalog::ListParams;
use crate::errors::ServiceError;
use crate::pagination::{fetch_page, Page};

pub use rotation::today_quote;
pub use scheduler::{duration_until_next_midnight, spawn_daily_rotation};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuoteInput {
    #[serde(default)]
    pub author: Option<String>,
    pub text: Option<String>,
}

/// Public payload of `/api/random-quote/`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RandomQuote {
    pub author: String,
    pub text: String,
}

impl From<quote::Model> for RandomQuote {
    fn from(q: quote::Model) -> Self { Self { author: q.author, text: q.text } }
}

#[derive(Debug, Clone, Serialize)]
pub struct DailyQuoteView {
    pub id: i32,
    pub quote_text: Option<String>,
    pub quote_author: Option<String>,
    pub date: chrono::NaiveDate,
    pub created_at: chrono::DateTime<chrono::FixedOffset>,
}

pub async fn list(db: &DatabaseConnection, params: &ListParams) -> Result<Page<quote::Model>, ServiceError> {
    let select = quote::Entity::find()
        .order_by_desc(quote::Column::CreatedAt)
        .order_by_asc(quote::Column::Id);
    fetch_page(db, select, params.pagination).await
}

pub async fn get(db: &DatabaseConnection, id: i32) -> Result<quote::Model, ServiceError> {
    quote::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("quote"))
}

pub async fn create(db: &DatabaseConnection, input: QuoteInput) -> Result<quote::Model, ServiceError> {
    let text = input.text.ok_or_else(|| ServiceError::validation("text is required"))?;
    let created = quote::create(db, input.author.as_deref().unwrap_or_default(), &text).await?;
    info!(id = created.id, "created quote");
    Ok(created)
}

/// Deleting a quote also drops its daily assignments.
pub async fn delete(db: &DatabaseConnection, id: i32) -> Result<bool, ServiceError> {
    let res = quote::Entity::delete_by_id(id).exec(db).await?;
    Ok(res.rows_affected > 0)
}

/// Daily assignments, most recent date first.
pub async fn daily_history(db: &DatabaseConnection, params: &ListParams) -> Result<Page<DailyQuoteView>, ServiceError> {
    let select = daily_quote::Entity::find()
        .order_by_desc(daily_quote::Column::Date)
        .find_also_related(quote::Entity);
    let page = fetch_page(db, select, params.pagination).await?;
    Ok(page.map(|(d, q)| DailyQuoteView {
        id: d.id,
        quote_text: q.as_ref().map(|q| q.text.clone()),
        quote_author: q.map(|q| q.author),
        date: d.date,
        created_at: d.created_at,
    }))
}

//! Picks the quote of the day. Quotes are drawn at random without repetition
//! until every quote has been used, then the pool resets.

use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use common::metrics::QUOTE_ROTATIONS;
use rand::Rng;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set, SqlErr, TransactionTrait,
};
use tracing::{debug, info};

use models::{daily_quote, quote};

use crate::errors::ServiceError;

/// Today's date in `tz`.
pub fn local_today(tz: Tz) -> NaiveDate {
    Utc::now().with_timezone(&tz).date_naive()
}

pub async fn today_quote(db: &DatabaseConnection, tz: Tz) -> Result<Option<quote::Model>, ServiceError> {
    quote_for_date(db, local_today(tz)).await
}

fn is_unique_violation(e: &DbErr) -> bool {
    matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// The quote assigned to `date`, assigning one if needed. `None` only when
/// there are no quotes at all.
pub async fn quote_for_date(db: &DatabaseConnection, date: NaiveDate) -> Result<Option<quote::Model>, ServiceError> {
    if let Some((_, Some(q))) = daily_quote::find_for_date(db, date).await? {
        return Ok(Some(q));
    }

    let txn = db.begin().await?;
    if let Some((_, Some(q))) = daily_quote::find_for_date(&txn, date).await? {
        txn.commit().await?;
        return Ok(Some(q));
    }

    let mut pool = quote::Entity::find().filter(quote::Column::IsUsed.eq(false)).all(&txn).await?;
    if pool.is_empty() {
        let reset = quote::Entity::update_many()
            .col_expr(quote::Column::IsUsed, Expr::value(false))
            .exec(&txn)
            .await?;
        debug!(rows = reset.rows_affected, "quote pool exhausted; reset");
        pool = quote::Entity::find().all(&txn).await?;
    }
    if pool.is_empty() {
        txn.rollback().await?;
        return Ok(None);
    }

    let idx = rand::thread_rng().gen_range(0..pool.len());
    let chosen = pool.swap_remove(idx);
    let mut am: quote::ActiveModel = chosen.into();
    am.is_used = Set(true);
    let chosen = am.update(&txn).await?;

    let inserted = daily_quote::ActiveModel {
        quote_id: Set(chosen.id),
        date: Set(date),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    }
    .insert(&txn)
    .await;

    match inserted {
        Ok(_) => {
            txn.commit().await?;
            QUOTE_ROTATIONS.inc();
            info!(event = "quote_rotated", %date, quote_id = chosen.id, "daily quote assigned");
            Ok(Some(chosen))
        }
        Err(e) if is_unique_violation(&e) => {
            // another writer assigned this date first
            txn.rollback().await?;
            debug!(%date, "daily quote already assigned concurrently");
            Ok(daily_quote::find_for_date(db, date).await?.and_then(|(_, q)| q))
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;
    use chrono::Duration;
    use sea_orm::PaginatorTrait;

    /// A date far from today that no other test touches.
    fn scratch_date() -> NaiveDate {
        let offset = (uuid::Uuid::new_v4().as_u128() % 300_000) as i64;
        NaiveDate::from_ymd_opt(2300, 1, 1).unwrap_or_default() + Duration::days(offset)
    }

    #[test]
    fn today_depends_on_zone() {
        let kiev: Tz = "Europe/Kyiv".parse().unwrap();
        let apia: Tz = "Pacific/Apia".parse().unwrap();
        let a = local_today(kiev);
        let b = local_today(apia);
        assert!((b - a).num_days().abs() <= 1);
    }

    #[tokio::test]
    async fn same_date_returns_same_quote() -> Result<(), anyhow::Error> {
        let Some(db) = get_db().await else { return Ok(()) };
        models::quote::create(&db, "Coco Chanel", "Beauty begins the moment you decide to be yourself.").await?;

        let date = scratch_date();
        let first = quote_for_date(&db, date).await?.expect("a quote exists");
        let again = quote_for_date(&db, date).await?.expect("a quote exists");
        assert_eq!(first.id, again.id);
        assert!(first.is_used);

        let assigned = daily_quote::Entity::find().filter(daily_quote::Column::Date.eq(date)).count(&db).await?;
        assert_eq!(assigned, 1);
        daily_quote::Entity::delete_many().filter(daily_quote::Column::Date.eq(date)).exec(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn concurrent_first_requests_agree() -> Result<(), anyhow::Error> {
        let Some(db) = get_db().await else { return Ok(()) };
        models::quote::create(&db, "", "Style is a way to say who you are without having to speak.").await?;

        let date = scratch_date();
        let (a, b) = tokio::join!(quote_for_date(&db, date), quote_for_date(&db, date));
        let (a, b) = (a?.expect("quote"), b?.expect("quote"));
        assert_eq!(a.id, b.id);
        daily_quote::Entity::delete_many().filter(daily_quote::Column::Date.eq(date)).exec(&db).await?;
        Ok(())
    }
}

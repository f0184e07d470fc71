use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use models::{service as service_entity, service_type};

use super::{double_option, require, ListParams, WriteMode};
use crate::errors::ServiceError;
use crate::listing::{icontains, iexact, json_icontains};
use crate::pagination::{fetch_page, Page};
use crate::slug::insert_with_unique_slug;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceInput {
    pub name: Option<String>,
    /// service type id
    pub service_type: Option<i32>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub price_from: Option<Option<i32>>,
    #[serde(default, deserialize_with = "double_option")]
    pub price_to: Option<Option<i32>>,
    pub main_images: Option<Value>,
    #[serde(default, deserialize_with = "double_option")]
    pub duration: Option<Option<String>>,
    pub steps: Option<Value>,
    pub target: Option<String>,
    pub client_types: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceFilter {
    pub service_type_id: Option<i32>,
    pub price_from_min: Option<i32>,
    pub price_from_max: Option<i32>,
    pub price_to_min: Option<i32>,
    pub price_to_max: Option<i32>,
    /// icontains
    pub duration: Option<String>,
    /// iexact
    pub target: Option<String>,
    /// comma-separated; a service matches if its client types contain any entry
    pub client_types: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceView {
    pub id: i32,
    pub name: String,
    pub service_type: i32,
    pub service_type_name: Option<String>,
    pub service_type_target: Option<String>,
    pub description: Option<String>,
    pub price_from: Option<i32>,
    pub price_to: Option<i32>,
    pub main_images: Value,
    pub duration: Option<String>,
    pub steps: Value,
    pub target: String,
    pub client_types: Value,
    pub slug: String,
    pub created_at: chrono::DateTime<chrono::FixedOffset>,
    pub updated_at: chrono::DateTime<chrono::FixedOffset>,
}

impl ServiceView {
    fn new(s: service_entity::Model, st: Option<service_type::Model>) -> Self {
        Self {
            id: s.id,
            name: s.name,
            service_type: s.service_type_id,
            service_type_name: st.as_ref().map(|t| t.name.clone()),
            service_type_target: st.map(|t| t.target),
            description: s.description,
            price_from: s.price_from,
            price_to: s.price_to,
            main_images: s.main_images,
            duration: s.duration,
            steps: s.steps,
            target: s.target,
            client_types: s.client_types,
            slug: s.slug,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

fn filter_condition(filter: &ServiceFilter) -> Condition {
    use service_entity::{Column, Entity};

    let mut cond = Condition::all();
    if let Some(id) = filter.service_type_id {
        cond = cond.add(Column::ServiceTypeId.eq(id));
    }
    if let Some(v) = filter.price_from_min { cond = cond.add(Column::PriceFrom.gte(v)); }
    if let Some(v) = filter.price_from_max { cond = cond.add(Column::PriceFrom.lte(v)); }
    if let Some(v) = filter.price_to_min { cond = cond.add(Column::PriceTo.gte(v)); }
    if let Some(v) = filter.price_to_max { cond = cond.add(Column::PriceTo.lte(v)); }
    if let Some(d) = filter.duration.as_deref().filter(|s| !s.is_empty()) {
        cond = cond.add(icontains((Entity, Column::Duration), d));
    }
    if let Some(t) = filter.target.as_deref().filter(|s| !s.is_empty()) {
        cond = cond.add(iexact((Entity, Column::Target), t));
    }
    if let Some(raw) = filter.client_types.as_deref() {
        let wanted: Vec<&str> = raw.split(',').map(str::trim).filter(|s| !s.is_empty()).collect();
        if !wanted.is_empty() {
            let mut any = Condition::any();
            for ct in wanted {
                any = any.add(json_icontains((Entity, Column::ClientTypes), ct));
            }
            cond = cond.add(any);
        }
    }
    cond
}

/// List services in insertion order.
pub async fn list(db: &DatabaseConnection, filter: &ServiceFilter, params: &ListParams) -> Result<Page<ServiceView>, ServiceError> {
    let select = service_entity::Entity::find()
        .filter(filter_condition(filter))
        .order_by_asc(service_entity::Column::Id)
        .find_also_related(service_type::Entity);
    let page = fetch_page(db, select, params.pagination).await?;
    Ok(page.map(|(s, st)| ServiceView::new(s, st)))
}

pub async fn get(db: &DatabaseConnection, id: i32) -> Result<ServiceView, ServiceError> {
    let (s, st) = service_entity::Entity::find_by_id(id)
        .find_also_related(service_type::Entity)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("service"))?;
    Ok(ServiceView::new(s, st))
}

async fn ensure_service_type(db: &DatabaseConnection, id: i32) -> Result<service_type::Model, ServiceError> {
    service_type::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::validation("service type not found"))
}

/// Validate `input` against the stored row (if any) and copy it into `am`.
fn apply(
    am: &mut service_entity::ActiveModel,
    existing: Option<&service_entity::Model>,
    input: ServiceInput,
    mode: WriteMode,
) -> Result<(), ServiceError> {
    if let Some(name) = require(mode, "name", input.name)? {
        service_entity::validate_name(&name)?;
        am.name = Set(name.trim().to_string());
    }
    if let Some(id) = require(mode, "service_type", input.service_type)? {
        am.service_type_id = Set(id);
    }
    if let Some(description) = input.description {
        am.description = Set(description);
    }

    let price_from = input.price_from.unwrap_or_else(|| existing.and_then(|e| e.price_from));
    let price_to = input.price_to.unwrap_or_else(|| existing.and_then(|e| e.price_to));
    service_entity::validate_prices(price_from, price_to)?;
    if input.price_from.is_some() { am.price_from = Set(price_from); }
    if input.price_to.is_some() { am.price_to = Set(price_to); }

    if let Some(v) = input.main_images {
        service_entity::validate_main_images(&v)?;
        am.main_images = Set(v);
    }
    if let Some(duration) = input.duration {
        service_entity::validate_duration(duration.as_deref())?;
        am.duration = Set(duration.map(|d| d.trim().to_string()));
    }
    if let Some(v) = input.steps {
        service_entity::validate_steps(&v)?;
        am.steps = Set(v);
    }
    if let Some(target) = input.target {
        service_entity::validate_target(&target)?;
        am.target = Set(target);
    }
    if let Some(v) = input.client_types {
        service_entity::validate_client_types(&v)?;
        am.client_types = Set(v);
    }
    Ok(())
}

pub async fn create(db: &DatabaseConnection, input: ServiceInput) -> Result<ServiceView, ServiceError> {
    let now = Utc::now();
    let mut am = service_entity::ActiveModel {
        description: Set(None),
        price_from: Set(None),
        price_to: Set(None),
        main_images: Set(json!([])),
        duration: Set(None),
        steps: Set(json!([])),
        target: Set(String::new()),
        client_types: Set(json!([])),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    };
    let name = input.name.clone().unwrap_or_default();
    let type_id = input.service_type;
    apply(&mut am, None, input, WriteMode::Create)?;
    let st = match type_id {
        Some(id) => ensure_service_type(db, id).await?,
        None => return Err(ServiceError::validation("service_type is required")),
    };
    let created = insert_with_unique_slug(db, &name, service_entity::Column::Slug, am).await?;
    info!(id = created.id, slug = %created.slug, service_type_id = st.id, "created service");
    Ok(ServiceView::new(created, Some(st)))
}

pub async fn update(db: &DatabaseConnection, id: i32, input: ServiceInput, mode: WriteMode) -> Result<ServiceView, ServiceError> {
    let existing = service_entity::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("service"))?;
    if let Some(type_id) = input.service_type {
        ensure_service_type(db, type_id).await?;
    }
    let mut am: service_entity::ActiveModel = existing.clone().into();
    apply(&mut am, Some(&existing), input, mode)?;
    am.updated_at = Set(Utc::now().into());
    let updated = am.update(db).await?;
    let st = service_type::Entity::find_by_id(updated.service_type_id).one(db).await?;
    Ok(ServiceView::new(updated, st))
}

/// Delete a service; returns true if deleted.
pub async fn delete(db: &DatabaseConnection, id: i32) -> Result<bool, ServiceError> {
    let res = service_entity::Entity::delete_by_id(id).exec(db).await?;
    Ok(res.rows_affected > 0)
}

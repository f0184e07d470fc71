use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use sea_orm::sea_query::Expr;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use models::{service, service_type};

use super::{double_option, require, ListParams, WriteMode};
use crate::errors::ServiceError;
use crate::listing::json_icontains;
use crate::pagination::{fetch_page, Page};
use crate::slug::insert_with_unique_slug;

/// Writable service-type fields. `slug` is generated, never accepted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceTypeInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub client_types: Option<Value>,
    #[serde(default, deserialize_with = "double_option")]
    pub main_image: Option<Option<String>>,
    pub benefits: Option<Value>,
    pub benefits_images: Option<Value>,
    pub target: Option<String>,
    pub products: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceTypeFilter {
    /// exact match
    pub target: Option<String>,
    /// case-insensitive containment in the JSON text
    pub client_types: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceTypeView {
    #[serde(flatten)]
    pub service_type: service_type::Model,
    pub services_count: u64,
}

/// Number of services per service type, for the given ids.
pub(crate) async fn services_counts(db: &DatabaseConnection, ids: &[i32]) -> Result<HashMap<i32, u64>, ServiceError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows: Vec<(i32, i64)> = service::Entity::find()
        .select_only()
        .column(service::Column::ServiceTypeId)
        .column_as(Expr::col(service::Column::Id).count(), "count")
        .filter(service::Column::ServiceTypeId.is_in(ids.to_vec()))
        .group_by(service::Column::ServiceTypeId)
        .into_tuple()
        .all(db)
        .await?;
    Ok(rows.into_iter().map(|(id, n)| (id, n.max(0) as u64)).collect())
}

pub(crate) async fn with_counts(db: &DatabaseConnection, rows: Vec<service_type::Model>) -> Result<Vec<ServiceTypeView>, ServiceError> {
    let ids: Vec<i32> = rows.iter().map(|r| r.id).collect();
    let counts = services_counts(db, &ids).await?;
    Ok(rows
        .into_iter()
        .map(|st| {
            let services_count = counts.get(&st.id).copied().unwrap_or(0);
            ServiceTypeView { service_type: st, services_count }
        })
        .collect())
}

fn filter_condition(filter: &ServiceTypeFilter) -> Condition {
    let mut cond = Condition::all();
    if let Some(target) = filter.target.as_deref() {
        cond = cond.add(service_type::Column::Target.eq(target));
    }
    if let Some(ct) = filter.client_types.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        cond = cond.add(json_icontains(service_type::Column::ClientTypes, ct));
    }
    cond
}

/// List service types, oldest first.
pub async fn list(db: &DatabaseConnection, filter: &ServiceTypeFilter, params: &ListParams) -> Result<Page<ServiceTypeView>, ServiceError> {
    let select = service_type::Entity::find()
        .filter(filter_condition(filter))
        .order_by_asc(service_type::Column::Id);
    let page = fetch_page(db, select, params.pagination).await?;
    let Page { items, total, page, per_page } = page;
    let items = with_counts(db, items).await?;
    Ok(Page { items, total, page, per_page })
}

pub async fn get(db: &DatabaseConnection, id: i32) -> Result<ServiceTypeView, ServiceError> {
    let found = service_type::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("service type"))?;
    let mut views = with_counts(db, vec![found]).await?;
    views.pop().ok_or_else(|| ServiceError::not_found("service type"))
}

fn apply(am: &mut service_type::ActiveModel, input: ServiceTypeInput, mode: WriteMode) -> Result<(), ServiceError> {
    if let Some(name) = require(mode, "name", input.name)? {
        service_type::validate_name(&name)?;
        am.name = Set(name.trim().to_string());
    }
    if let Some(description) = require(mode, "description", input.description)? {
        service_type::validate_description(&description)?;
        am.description = Set(description);
    }
    if let Some(target) = require(mode, "target", input.target)? {
        service_type::validate_target(&target)?;
        am.target = Set(target.trim().to_string());
    }
    if let Some(v) = input.client_types {
        service_type::validate_client_types(&v)?;
        am.client_types = Set(v);
    }
    if let Some(image) = input.main_image {
        let image = image.filter(|s| !s.trim().is_empty());
        service_type::validate_main_image(image.as_deref())?;
        am.main_image = Set(image);
    }
    if let Some(v) = input.benefits {
        service_type::validate_benefits(&v)?;
        am.benefits = Set(v);
    }
    if let Some(v) = input.benefits_images {
        service_type::validate_benefits_images(&v)?;
        am.benefits_images = Set(v);
    }
    if let Some(v) = input.products {
        service_type::validate_products(&v)?;
        am.products = Set(v);
    }
    Ok(())
}

pub async fn create(db: &DatabaseConnection, input: ServiceTypeInput) -> Result<ServiceTypeView, ServiceError> {
    let now = Utc::now();
    let mut am = service_type::ActiveModel {
        client_types: Set(json!([])),
        main_image: Set(None),
        benefits: Set(json!([])),
        benefits_images: Set(json!([])),
        products: Set(json!([])),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    };
    let name = input.name.clone().unwrap_or_default();
    apply(&mut am, input, WriteMode::Create)?;
    let created = insert_with_unique_slug(db, &name, service_type::Column::Slug, am).await?;
    info!(id = created.id, slug = %created.slug, "created service type");
    Ok(ServiceTypeView { service_type: created, services_count: 0 })
}

pub async fn update(db: &DatabaseConnection, id: i32, input: ServiceTypeInput, mode: WriteMode) -> Result<ServiceTypeView, ServiceError> {
    let mut am: service_type::ActiveModel = service_type::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("service type"))?
        .into();
    apply(&mut am, input, mode)?;
    am.updated_at = Set(Utc::now().into());
    let updated = am.update(db).await?;
    let mut views = with_counts(db, vec![updated]).await?;
    views.pop().ok_or_else(|| ServiceError::not_found("service type"))
}

/// Delete a service type (its services and portfolio items cascade); returns true if deleted.
pub async fn delete(db: &DatabaseConnection, id: i32) -> Result<bool, ServiceError> {
    let res = service_type::Entity::delete_by_id(id).exec(db).await?;
    Ok(res.rows_affected > 0)
}

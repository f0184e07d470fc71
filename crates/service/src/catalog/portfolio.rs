use std::collections::HashMap;

use chrono::Utc;
use sea_orm::sea_query::{Expr, Query, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, Set,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use models::{portfolio, service, service_type};

use super::{require, ListParams, WriteMode};
use crate::errors::ServiceError;
use crate::listing::{apply_ordering, escape_like, icontains, newest_first, parse_ordering, search_condition, search_terms};
use crate::pagination::{fetch_page, Page};

pub const ORDERING_FIELDS: &[&str] = &["created_at"];

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PortfolioInput {
    pub image: Option<String>,
    pub master: Option<Value>,
    pub service_type: Option<i32>,
    pub service: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PortfolioFilter {
    pub service_type_id: Option<i32>,
    pub service_id: Option<i32>,
    pub master_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PortfolioDetail {
    pub id: i32,
    pub image: String,
    pub master: Value,
    pub master_name: String,
    pub service_type: i32,
    pub service_type_name: Option<String>,
    pub service_type_target: Option<String>,
    pub service: i32,
    pub service_name: Option<String>,
    pub created_at: chrono::DateTime<chrono::FixedOffset>,
    pub updated_at: chrono::DateTime<chrono::FixedOffset>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PortfolioListItem {
    pub id: i32,
    pub image: String,
    pub master_name: String,
    pub service_type: i32,
    pub service_type_name: Option<String>,
    pub service: i32,
    pub service_name: Option<String>,
    pub created_at: chrono::DateTime<chrono::FixedOffset>,
}

/// `LOWER(master ->> 'name')`
fn master_name_expr() -> SimpleExpr {
    Expr::cust(r#"LOWER("portfolio"."master" ->> 'name')"#)
}

fn master_name_exact(name: &str) -> SimpleExpr {
    Expr::expr(master_name_expr()).eq(name.to_lowercase())
}

fn master_name_contains(name: &str) -> SimpleExpr {
    Expr::expr(master_name_expr()).like(format!("%{}%", escape_like(&name.to_lowercase())))
}

fn ordering_column(name: &str) -> Option<portfolio::Column> {
    match name {
        "created_at" => Some(portfolio::Column::CreatedAt),
        _ => None,
    }
}

/// Exact master-name match when any row has it, substring match otherwise.
async fn filter_condition(db: &DatabaseConnection, filter: &PortfolioFilter) -> Result<Condition, ServiceError> {
    let mut cond = Condition::all();
    if let Some(id) = filter.service_type_id {
        cond = cond.add(portfolio::Column::ServiceTypeId.eq(id));
    }
    if let Some(id) = filter.service_id {
        cond = cond.add(portfolio::Column::ServiceId.eq(id));
    }
    if let Some(name) = filter.master_name.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let exact = portfolio::Entity::find().filter(master_name_exact(name)).count(db).await? > 0;
        cond = cond.add(if exact { master_name_exact(name) } else { master_name_contains(name) });
    }
    Ok(cond)
}

fn search_fields(term: &str) -> Vec<SimpleExpr> {
    vec![
        master_name_contains(term),
        portfolio::Column::ServiceTypeId.in_subquery(
            Query::select()
                .column(service_type::Column::Id)
                .from(service_type::Entity)
                .and_where(icontains(service_type::Column::Name, term))
                .to_owned(),
        ),
        portfolio::Column::ServiceId.in_subquery(
            Query::select()
                .column(service::Column::Id)
                .from(service::Entity)
                .and_where(icontains(service::Column::Name, term))
                .to_owned(),
        ),
    ]
}

struct Names {
    service_types: HashMap<i32, service_type::Model>,
    services: HashMap<i32, String>,
}

async fn load_names(db: &DatabaseConnection, rows: &[portfolio::Model]) -> Result<Names, ServiceError> {
    let type_ids: Vec<i32> = rows.iter().map(|r| r.service_type_id).collect();
    let service_ids: Vec<i32> = rows.iter().map(|r| r.service_id).collect();
    let service_types = service_type::Entity::find()
        .filter(service_type::Column::Id.is_in(type_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|st| (st.id, st))
        .collect();
    let services = service::Entity::find()
        .filter(service::Column::Id.is_in(service_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|s| (s.id, s.name))
        .collect();
    Ok(Names { service_types, services })
}

impl PortfolioDetail {
    fn new(p: portfolio::Model, names: &Names) -> Self {
        let st = names.service_types.get(&p.service_type_id);
        Self {
            master_name: p.master_name(),
            service_type_name: st.map(|t| t.name.clone()),
            service_type_target: st.map(|t| t.target.clone()),
            service_name: names.services.get(&p.service_id).cloned(),
            id: p.id,
            image: p.image,
            master: p.master,
            service_type: p.service_type_id,
            service: p.service_id,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

impl PortfolioListItem {
    fn new(p: portfolio::Model, names: &Names) -> Self {
        Self {
            master_name: p.master_name(),
            service_type_name: names.service_types.get(&p.service_type_id).map(|t| t.name.clone()),
            service_name: names.services.get(&p.service_id).cloned(),
            id: p.id,
            image: p.image,
            service_type: p.service_type_id,
            service: p.service_id,
            created_at: p.created_at,
        }
    }
}

pub async fn list(db: &DatabaseConnection, filter: &PortfolioFilter, params: &ListParams) -> Result<Page<PortfolioListItem>, ServiceError> {
    let mut select = portfolio::Entity::find().filter(filter_condition(db, filter).await?);
    let terms = search_terms(params.search.as_deref());
    if let Some(search) = search_condition(&terms, search_fields) {
        select = select.filter(search);
    }
    let ordering = parse_ordering(params.ordering.as_deref(), ORDERING_FIELDS);
    let select = apply_ordering(select, &ordering, &newest_first(), ordering_column, portfolio::Column::Id);

    let page = fetch_page(db, select, params.pagination).await?;
    let names = load_names(db, &page.items).await?;
    Ok(page.map(|p| PortfolioListItem::new(p, &names)))
}

async fn detail(db: &DatabaseConnection, p: portfolio::Model) -> Result<PortfolioDetail, ServiceError> {
    let names = load_names(db, std::slice::from_ref(&p)).await?;
    Ok(PortfolioDetail::new(p, &names))
}

pub async fn get(db: &DatabaseConnection, id: i32) -> Result<PortfolioDetail, ServiceError> {
    let p = portfolio::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("portfolio item"))?;
    detail(db, p).await
}

async fn check_references(db: &DatabaseConnection, input: &PortfolioInput) -> Result<(), ServiceError> {
    if let Some(id) = input.service_type {
        if service_type::Entity::find_by_id(id).one(db).await?.is_none() {
            return Err(ServiceError::validation("service type not found"));
        }
    }
    if let Some(id) = input.service {
        if service::Entity::find_by_id(id).one(db).await?.is_none() {
            return Err(ServiceError::validation("service not found"));
        }
    }
    Ok(())
}

fn apply(am: &mut portfolio::ActiveModel, input: PortfolioInput, mode: WriteMode) -> Result<(), ServiceError> {
    if let Some(image) = require(mode, "image", input.image)? {
        portfolio::validate_image(&image)?;
        am.image = Set(image.trim().to_string());
    }
    if let Some(master) = require(mode, "master", input.master)? {
        portfolio::validate_master(&master)?;
        am.master = Set(master);
    }
    if let Some(id) = require(mode, "service_type", input.service_type)? {
        am.service_type_id = Set(id);
    }
    if let Some(id) = require(mode, "service", input.service)? {
        am.service_id = Set(id);
    }
    Ok(())
}

pub async fn create(db: &DatabaseConnection, input: PortfolioInput) -> Result<PortfolioDetail, ServiceError> {
    let now = Utc::now();
    let mut am = portfolio::ActiveModel {
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    };
    check_references(db, &input).await?;
    apply(&mut am, input, WriteMode::Create)?;
    let created = am.insert(db).await?;
    info!(id = created.id, master = %created.master_name(), "created portfolio item");
    detail(db, created).await
}

pub async fn update(db: &DatabaseConnection, id: i32, input: PortfolioInput, mode: WriteMode) -> Result<PortfolioDetail, ServiceError> {
    let mut am: portfolio::ActiveModel = portfolio::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("portfolio item"))?
        .into();
    check_references(db, &input).await?;
    apply(&mut am, input, mode)?;
    am.updated_at = Set(Utc::now().into());
    let updated = am.update(db).await?;
    detail(db, updated).await
}

pub async fn delete(db: &DatabaseConnection, id: i32) -> Result<bool, ServiceError> {
    let res = portfolio::Entity::delete_by_id(id).exec(db).await?;
    Ok(res.rows_affected > 0)
}

use std::collections::{BTreeSet, HashMap};

use chrono::Utc;
use sea_orm::sea_query::{Expr, Query};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use models::errors::ModelError;
use models::{master, master_service_type, product, service_type};

use super::{double_option, require, ListParams, WriteMode};
use crate::errors::ServiceError;
use crate::listing::{apply_ordering, icontains, iexact, newest_first, parse_id_list, parse_ordering, search_condition, search_terms};
use crate::pagination::{fetch_page, Page};

pub const ORDERING_FIELDS: &[&str] = &["name", "experience", "created_at"];

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MasterInput {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub image: Option<Option<String>>,
    pub job_title: Option<String>,
    /// product id, or `null` to clear
    #[serde(default, deserialize_with = "double_option")]
    pub favorite_product: Option<Option<i32>>,
    pub experience: Option<i32>,
    pub service_types_ids: Option<Vec<i32>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MasterFilter {
    /// comma-separated service type ids
    pub service_types_ids: Option<String>,
    pub experience_min: Option<i32>,
    pub experience_max: Option<i32>,
    /// iexact on a linked service type's target
    pub target: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MasterDetail {
    pub id: i32,
    pub name: String,
    pub image: Option<String>,
    pub job_title: String,
    pub favorite_product: Option<i32>,
    pub favorite_product_detail: Option<product::Model>,
    pub service_types: Vec<i32>,
    pub service_types_detail: Vec<service_type::Model>,
    pub experience: i32,
    pub created_at: chrono::DateTime<chrono::FixedOffset>,
    pub updated_at: chrono::DateTime<chrono::FixedOffset>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MasterListItem {
    pub id: i32,
    pub name: String,
    pub image: Option<String>,
    pub job_title: String,
    pub experience: i32,
    pub service_types_names: Vec<String>,
    pub favorite_product_name: Option<String>,
    pub favorite_product_id: Option<i32>,
}

fn ordering_column(name: &str) -> Option<master::Column> {
    match name {
        "name" => Some(master::Column::Name),
        "experience" => Some(master::Column::Experience),
        "created_at" => Some(master::Column::CreatedAt),
        _ => None,
    }
}

/// `None` when the id list cannot be parsed: the listing is then empty.
fn filter_condition(filter: &MasterFilter) -> Option<Condition> {
    let mut cond = Condition::all();
    if let Some(raw) = filter.service_types_ids.as_deref() {
        let ids = parse_id_list(raw)?;
        if !ids.is_empty() {
            cond = cond.add(
                master::Column::Id.in_subquery(
                    Query::select()
                        .column(master_service_type::Column::MasterId)
                        .from(master_service_type::Entity)
                        .and_where(master_service_type::Column::ServiceTypeId.is_in(ids))
                        .to_owned(),
                ),
            );
        }
    }
    if let Some(v) = filter.experience_min {
        cond = cond.add(master::Column::Experience.gte(v));
    }
    if let Some(v) = filter.experience_max {
        cond = cond.add(master::Column::Experience.lte(v));
    }
    if let Some(target) = filter.target.as_deref().filter(|s| !s.is_empty()) {
        cond = cond.add(
            master::Column::Id.in_subquery(
                Query::select()
                    .column((master_service_type::Entity, master_service_type::Column::MasterId))
                    .from(master_service_type::Entity)
                    .inner_join(
                        service_type::Entity,
                        Expr::col((service_type::Entity, service_type::Column::Id))
                            .equals((master_service_type::Entity, master_service_type::Column::ServiceTypeId)),
                    )
                    .and_where(iexact((service_type::Entity, service_type::Column::Target), target))
                    .to_owned(),
            ),
        );
    }
    Some(cond)
}

async fn list_items<C: ConnectionTrait>(db: &C, rows: Vec<master::Model>) -> Result<Vec<MasterListItem>, ServiceError> {
    let ids: Vec<i32> = rows.iter().map(|m| m.id).collect();
    let mut names: HashMap<i32, Vec<String>> = HashMap::new();
    if !ids.is_empty() {
        let links = master_service_type::Entity::find()
            .filter(master_service_type::Column::MasterId.is_in(ids))
            .order_by_asc(master_service_type::Column::ServiceTypeId)
            .find_also_related(service_type::Entity)
            .all(db)
            .await?;
        for (link, st) in links {
            if let Some(st) = st {
                names.entry(link.master_id).or_default().push(st.name);
            }
        }
    }

    let product_ids: Vec<i32> = rows.iter().filter_map(|m| m.favorite_product_id).collect();
    let products: HashMap<i32, product::Model> = if product_ids.is_empty() {
        HashMap::new()
    } else {
        product::Entity::find()
            .filter(product::Column::Id.is_in(product_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect()
    };

    Ok(rows
        .into_iter()
        .map(|m| MasterListItem {
            service_types_names: names.remove(&m.id).unwrap_or_default(),
            favorite_product_name: m.favorite_product_id.and_then(|id| products.get(&id)).map(product::Model::display_name),
            favorite_product_id: m.favorite_product_id,
            id: m.id,
            name: m.name,
            image: m.image,
            job_title: m.job_title,
            experience: m.experience,
        })
        .collect())
}

async fn detail<C: ConnectionTrait>(db: &C, m: master::Model) -> Result<MasterDetail, ServiceError> {
    let service_types_detail = m
        .find_related(service_type::Entity)
        .order_by_asc(service_type::Column::Id)
        .all(db)
        .await?;
    let favorite_product_detail = match m.favorite_product_id {
        Some(id) => product::Entity::find_by_id(id).one(db).await?,
        None => None,
    };
    Ok(MasterDetail {
        id: m.id,
        name: m.name,
        image: m.image,
        job_title: m.job_title,
        favorite_product: m.favorite_product_id,
        favorite_product_detail,
        service_types: service_types_detail.iter().map(|st| st.id).collect(),
        service_types_detail,
        experience: m.experience,
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

pub async fn list(db: &DatabaseConnection, filter: &MasterFilter, params: &ListParams) -> Result<Page<MasterListItem>, ServiceError> {
    let Some(cond) = filter_condition(filter) else {
        return Ok(Page::empty(params.pagination));
    };
    let mut select = master::Entity::find().filter(cond);
    let terms = search_terms(params.search.as_deref());
    if let Some(search) = search_condition(&terms, |t| {
        vec![
            icontains((master::Entity, master::Column::Name), t),
            icontains((master::Entity, master::Column::JobTitle), t),
        ]
    }) {
        select = select.filter(search);
    }
    let ordering = parse_ordering(params.ordering.as_deref(), ORDERING_FIELDS);
    let select = apply_ordering(select, &ordering, &newest_first(), ordering_column, master::Column::Id);

    let page = fetch_page(db, select, params.pagination).await?;
    let Page { items, total, page, per_page } = page;
    let items = list_items(db, items).await?;
    Ok(Page { items, total, page, per_page })
}

pub async fn get(db: &DatabaseConnection, id: i32) -> Result<MasterDetail, ServiceError> {
    let m = master::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("master"))?;
    detail(db, m).await
}

/// Deduplicate and check that every service type exists.
async fn check_service_types<C: ConnectionTrait>(db: &C, ids: &[i32]) -> Result<Vec<i32>, ServiceError> {
    master::validate_service_type_ids(ids).map_err(|e| match e {
        ModelError::Validation(msg) => ServiceError::Validation(msg),
        other => ServiceError::Model(other),
    })?;
    let unique: Vec<i32> = ids.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();
    let found = service_type::Entity::find()
        .filter(service_type::Column::Id.is_in(unique.clone()))
        .count(db)
        .await?;
    if found != unique.len() as u64 {
        return Err(ServiceError::validation("service type not found"));
    }
    Ok(unique)
}

async fn check_product<C: ConnectionTrait>(db: &C, id: Option<i32>) -> Result<(), ServiceError> {
    if let Some(id) = id {
        if product::Entity::find_by_id(id).one(db).await?.is_none() {
            return Err(ServiceError::validation("favorite product not found"));
        }
    }
    Ok(())
}

async fn replace_links<C: ConnectionTrait>(db: &C, master_id: i32, ids: &[i32]) -> Result<(), ServiceError> {
    master_service_type::Entity::delete_many()
        .filter(master_service_type::Column::MasterId.eq(master_id))
        .exec(db)
        .await?;
    let links = ids.iter().map(|&service_type_id| master_service_type::ActiveModel {
        master_id: Set(master_id),
        service_type_id: Set(service_type_id),
    });
    master_service_type::Entity::insert_many(links).exec(db).await?;
    Ok(())
}

/// Copy the scalar fields of `input` into `am`, validating the merged result.
fn apply(
    am: &mut master::ActiveModel,
    existing: Option<&master::Model>,
    input: MasterInput,
    mode: WriteMode,
) -> Result<(), ServiceError> {
    let name = require(mode, "name", input.name)?.map(|s| s.trim().to_string());
    let job_title = require(mode, "job_title", input.job_title)?.map(|s| s.trim().to_string());
    let image = input.image.map(|i| i.filter(|s| !s.trim().is_empty()));

    let merged_name = name.clone().or_else(|| existing.map(|e| e.name.clone())).unwrap_or_default();
    let merged_job = job_title.clone().or_else(|| existing.map(|e| e.job_title.clone())).unwrap_or_default();
    let merged_experience = input.experience.or(existing.map(|e| e.experience)).unwrap_or(0);
    let merged_image = match &image {
        Some(v) => v.clone(),
        None => existing.and_then(|e| e.image.clone()),
    };
    master::validate_fields(&merged_name, &merged_job, merged_experience, merged_image.as_deref())?;

    if let Some(v) = name { am.name = Set(v); }
    if let Some(v) = job_title { am.job_title = Set(v); }
    if let Some(v) = input.experience { am.experience = Set(v); }
    if let Some(v) = image { am.image = Set(v); }
    if let Some(v) = input.favorite_product { am.favorite_product_id = Set(v); }
    Ok(())
}

pub async fn create(db: &DatabaseConnection, mut input: MasterInput) -> Result<MasterDetail, ServiceError> {
    let ids = require(WriteMode::Create, "service_types_ids", input.service_types_ids.take())?.unwrap_or_default();
    let ids = check_service_types(db, &ids).await?;
    check_product(db, input.favorite_product.flatten()).await?;

    let now = Utc::now();
    let mut am = master::ActiveModel {
        image: Set(None),
        favorite_product_id: Set(None),
        experience: Set(0),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    };
    apply(&mut am, None, input, WriteMode::Create)?;

    let txn = db.begin().await?;
    let created = am.insert(&txn).await?;
    replace_links(&txn, created.id, &ids).await?;
    let view = detail(&txn, created).await?;
    txn.commit().await?;
    info!(id = view.id, service_types = ?view.service_types, "created master");
    Ok(view)
}

pub async fn update(db: &DatabaseConnection, id: i32, mut input: MasterInput, mode: WriteMode) -> Result<MasterDetail, ServiceError> {
    let existing = master::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("master"))?;
    let ids = match require(mode, "service_types_ids", input.service_types_ids.take())? {
        Some(ids) => Some(check_service_types(db, &ids).await?),
        None => None,
    };
    check_product(db, input.favorite_product.flatten()).await?;

    let mut am: master::ActiveModel = existing.clone().into();
    apply(&mut am, Some(&existing), input, mode)?;
    am.updated_at = Set(Utc::now().into());

    let txn = db.begin().await?;
    let updated = am.update(&txn).await?;
    if let Some(ids) = ids {
        replace_links(&txn, updated.id, &ids).await?;
    }
    let view = detail(&txn, updated).await?;
    txn.commit().await?;
    Ok(view)
}

/// Delete a master (its service-type links cascade); returns true if deleted.
pub async fn delete(db: &DatabaseConnection, id: i32) -> Result<bool, ServiceError> {
    let res = master::Entity::delete_by_id(id).exec(db).await?;
    Ok(res.rows_affected > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{products, service_types};
    use crate::pagination::Pagination;
    use crate::test_support::get_db;
    use uuid::Uuid;

    #[tokio::test]
    async fn service_type_ids_are_checked_before_the_lookup() {
        let db = DatabaseConnection::Disconnected;
        assert!(matches!(check_service_types(&db, &[]).await, Err(ServiceError::Validation(_))));
    }

    fn sample(name: &str, ids: Vec<i32>) -> MasterInput {
        MasterInput {
            name: Some(name.into()),
            image: Some(Some("https://cdn.example.com/anna.jpg".into())),
            job_title: Some("Stylist".into()),
            favorite_product: None,
            experience: Some(5),
            service_types_ids: Some(ids),
        }
    }

    #[test]
    fn unparsable_id_list_yields_no_condition() {
        let filter = MasterFilter { service_types_ids: Some("1,abc".into()), ..Default::default() };
        assert!(filter_condition(&filter).is_none());
        let filter = MasterFilter { service_types_ids: Some("1, 2".into()), ..Default::default() };
        assert!(filter_condition(&filter).is_some());
    }

    #[test]
    fn patch_validates_merged_values() {
        let now = Utc::now();
        let stored = master::Model {
            id: 1,
            name: "Anna".into(),
            image: None,
            job_title: "Stylist".into(),
            favorite_product_id: None,
            experience: 3,
            created_at: now.into(),
            updated_at: now.into(),
        };
        let mut am: master::ActiveModel = stored.clone().into();
        let patch = MasterInput { experience: Some(-1), ..Default::default() };
        assert!(apply(&mut am, Some(&stored), patch, WriteMode::Patch).is_err());
        let patch = MasterInput { image: Some(Some("ftp://x".into())), ..Default::default() };
        assert!(apply(&mut am, Some(&stored), patch, WriteMode::Patch).is_err());
        let patch = MasterInput { experience: Some(10), ..Default::default() };
        assert!(apply(&mut am, Some(&stored), patch, WriteMode::Patch).is_ok());
        let replace = MasterInput { name: Some("Anna".into()), ..Default::default() };
        assert!(apply(&mut am, Some(&stored), replace, WriteMode::Replace).is_err());
    }

    #[tokio::test]
    async fn master_links_filters_and_views() -> Result<(), anyhow::Error> {
        let Some(db) = get_db().await else { return Ok(()) };
        let st_a = service_types::create(&db, service_types::tests::sample("Nails")).await?;
        let st_b = service_types::create(&db, service_types::tests::sample("Brows")).await?;
        let (a, b) = (st_a.service_type.id, st_b.service_type.id);
        let product = products::create(&db, products::ProductInput {
            brand: Some("Davines".into()),
            name: Some("OI Oil".into()),
            image: None,
            purpose: Some("shine".into()),
        })
        .await?;

        let mut input = sample(&format!("Anna {}", Uuid::new_v4().simple()), vec![a, b, a]);
        input.favorite_product = Some(Some(product.id));
        let created = create(&db, input).await?;
        assert_eq!(created.service_types, vec![a, b]);
        assert_eq!(created.favorite_product_detail.as_ref().map(|p| p.id), Some(product.id));

        assert!(matches!(create(&db, sample("Ghost", vec![i32::MAX])).await, Err(ServiceError::Validation(_))));
        assert!(matches!(create(&db, sample("Empty", vec![])).await, Err(ServiceError::Validation(_))));

        let filter = MasterFilter {
            service_types_ids: Some(format!("{a},{b}")),
            target: Some(st_a.service_type.target.to_uppercase()),
            ..Default::default()
        };
        let params = ListParams { search: Some(created.name.clone()), ..Default::default() };
        let page = list(&db, &filter, &params).await?;
        assert_eq!(page.total, 1);
        let item = &page.items[0];
        assert_eq!(item.favorite_product_name.as_deref(), Some("Davines - OI Oil"));
        assert_eq!(item.service_types_names, vec!["Nails".to_string(), "Brows".to_string()]);

        let bad = MasterFilter { service_types_ids: Some("x".into()), ..Default::default() };
        let params = ListParams { pagination: Pagination::new(Some(1), Some(5)), ..Default::default() };
        assert_eq!(list(&db, &bad, &params).await?.total, 0);

        let patched = update(&db, created.id, MasterInput { service_types_ids: Some(vec![b]), ..Default::default() }, WriteMode::Patch).await?;
        assert_eq!(patched.service_types, vec![b]);
        assert_eq!(patched.experience, 5);

        // deleting the product clears the favorite
        products::delete(&db, product.id).await?;
        assert_eq!(get(&db, created.id).await?.favorite_product, None);

        assert!(delete(&db, created.id).await?);
        service_types::delete(&db, a).await?;
        service_types::delete(&db, b).await?;
        Ok(())
    }
}

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use tracing::info;

use models::product;

use crate::errors::ServiceError;
use crate::listing::{apply_ordering, icontains, newest_first, parse_ordering, search_condition, search_terms};
use crate::pagination::{fetch_page, Page};

use super::ListParams;

pub const ORDERING_FIELDS: &[&str] = &["brand", "name", "created_at"];

/// Products are immutable once created.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductInput {
    pub brand: Option<String>,
    pub name: Option<String>,
    pub image: Option<String>,
    pub purpose: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductFilter {
    pub purpose: Option<String>,
    pub brand: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductListItem {
    pub id: i32,
    pub brand: String,
    pub name: String,
    pub purpose: String,
}

impl From<product::Model> for ProductListItem {
    fn from(p: product::Model) -> Self {
        Self { id: p.id, brand: p.brand, name: p.name, purpose: p.purpose }
    }
}

fn ordering_column(name: &str) -> Option<product::Column> {
    match name {
        "brand" => Some(product::Column::Brand),
        "name" => Some(product::Column::Name),
        "created_at" => Some(product::Column::CreatedAt),
        _ => None,
    }
}

fn filter_condition(filter: &ProductFilter) -> Condition {
    let mut cond = Condition::all();
    if let Some(v) = filter.purpose.as_deref() { cond = cond.add(product::Column::Purpose.eq(v)); }
    if let Some(v) = filter.brand.as_deref() { cond = cond.add(product::Column::Brand.eq(v)); }
    if let Some(v) = filter.name.as_deref() { cond = cond.add(product::Column::Name.eq(v)); }
    cond
}

pub async fn list(db: &DatabaseConnection, filter: &ProductFilter, params: &ListParams) -> Result<Page<ProductListItem>, ServiceError> {
    let mut select = product::Entity::find().filter(filter_condition(filter));
    let terms = search_terms(params.search.as_deref());
    if let Some(search) = search_condition(&terms, |t| {
        vec![
            icontains(product::Column::Brand, t),
            icontains(product::Column::Name, t),
            icontains(product::Column::Purpose, t),
        ]
    }) {
        select = select.filter(search);
    }
    let ordering = parse_ordering(params.ordering.as_deref(), ORDERING_FIELDS);
    let select = apply_ordering(select, &ordering, &newest_first(), ordering_column, product::Column::Id);
    Ok(fetch_page(db, select, params.pagination).await?.map(ProductListItem::from))
}

pub async fn get(db: &DatabaseConnection, id: i32) -> Result<product::Model, ServiceError> {
    product::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("product"))
}

pub async fn create(db: &DatabaseConnection, input: ProductInput) -> Result<product::Model, ServiceError> {
    let brand = input.brand.unwrap_or_default().trim().to_string();
    let name = input.name.unwrap_or_default().trim().to_string();
    let purpose = input.purpose.unwrap_or_default().trim().to_string();
    let image = input.image.filter(|s| !s.trim().is_empty());
    product::validate_fields(&brand, &name, &purpose, image.as_deref())?;

    let now = Utc::now();
    let created = product::ActiveModel {
        brand: Set(brand),
        name: Set(name),
        image: Set(image),
        purpose: Set(purpose),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    info!(id = created.id, product = %created.display_name(), "created product");
    Ok(created)
}

/// Masters referencing the product keep existing with a null favorite.
pub async fn delete(db: &DatabaseConnection, id: i32) -> Result<bool, ServiceError> {
    let res = product::Entity::delete_by_id(id).exec(db).await?;
    Ok(res.rows_affected > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::Pagination;
    use crate::test_support::get_db;
    use uuid::Uuid;

    #[tokio::test]
    async fn rejects_missing_fields_before_touching_the_db() {
        let db = sea_orm::DatabaseConnection::Disconnected;
        let err = create(&db, ProductInput { brand: Some("Davines".into()), ..Default::default() }).await;
        assert!(matches!(err, Err(ServiceError::Model(_))));
        let err = create(&db, ProductInput {
            brand: Some("Davines".into()),
            name: Some("Oil".into()),
            purpose: Some("shine".into()),
            image: Some("not a url".into()),
        })
        .await;
        assert!(matches!(err, Err(ServiceError::Model(_))));
    }

    #[tokio::test]
    async fn product_search_ordering_and_filters() -> Result<(), anyhow::Error> {
        let Some(db) = get_db().await else { return Ok(()) };
        let brand = format!("Brand{}", Uuid::new_v4().simple());
        for (name, purpose) in [("Alpha shampoo", "wash"), ("Beta oil", "shine"), ("Gamma oil", "shine")] {
            create(&db, ProductInput {
                brand: Some(brand.clone()),
                name: Some(name.into()),
                purpose: Some(purpose.into()),
                image: None,
            })
            .await?;
        }

        let params = ListParams { search: Some(format!("{} OIL", brand.to_lowercase())), ordering: Some("-name".into()), ..Default::default() };
        let page = list(&db, &ProductFilter::default(), &params).await?;
        let names: Vec<_> = page.items.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Gamma oil", "Beta oil"]);

        let filter = ProductFilter { brand: Some(brand.clone()), purpose: Some("wash".into()), ..Default::default() };
        let page = list(&db, &filter, &ListParams::default()).await?;
        assert_eq!(page.total, 1);

        let filter = ProductFilter { brand: Some(brand.clone()), ..Default::default() };
        let past_end = ListParams { pagination: Pagination::new(Some(3), Some(2)), ..Default::default() };
        assert!(matches!(list(&db, &filter, &past_end).await, Err(ServiceError::NotFound(_))));

        let all = list(&db, &filter, &ListParams::default()).await?;
        for p in all.items {
            assert!(delete(&db, p.id).await?);
        }
        Ok(())
    }
}

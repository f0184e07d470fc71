//! The salon's contact card. A single row, created on first write.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, Set, SqlErr};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use models::{contact, validators};

use super::{require, WriteMode};
use crate::errors::ServiceError;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactInput {
    pub email: Option<String>,
    pub phones: Option<Value>,
    pub instagram: Option<String>,
    pub telegram: Option<String>,
    pub whatsapp: Option<String>,
    pub schedule: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactView {
    pub email: String,
    pub phones: Value,
    pub instagram: String,
    pub telegram: String,
    pub whatsapp: String,
    pub schedule: Value,
}

impl Default for ContactView {
    fn default() -> Self {
        Self {
            email: String::new(),
            phones: json!([]),
            instagram: String::new(),
            telegram: String::new(),
            whatsapp: String::new(),
            schedule: json!([]),
        }
    }
}

impl From<contact::Model> for ContactView {
    fn from(c: contact::Model) -> Self {
        Self {
            email: c.email,
            phones: c.phones,
            instagram: c.instagram,
            telegram: c.telegram,
            whatsapp: c.whatsapp,
            schedule: c.schedule,
        }
    }
}

const ALREADY_EXISTS: &str = "contacts already exist, use PUT to update";

async fn current(db: &DatabaseConnection) -> Result<Option<contact::Model>, ServiceError> {
    Ok(contact::Entity::find_by_id(contact::SINGLETON_ID).one(db).await?)
}

fn is_duplicate(e: &DbErr) -> bool {
    matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// The stored contacts, or an empty card when none exist yet.
pub async fn get(db: &DatabaseConnection) -> Result<ContactView, ServiceError> {
    Ok(current(db).await?.map(ContactView::from).unwrap_or_default())
}

fn apply(am: &mut contact::ActiveModel, existing: Option<&contact::Model>, input: ContactInput, mode: WriteMode) -> Result<(), ServiceError> {
    if let Some(email) = require(mode, "email", input.email)? {
        let email = email.trim().to_string();
        validators::validate_email(&email)?;
        am.email = Set(email);
    }
    if let Some(phones) = require(mode, "phones", input.phones)? {
        contact::validate_phones(&phones)?;
        am.phones = Set(phones);
    }
    if let Some(schedule) = input.schedule {
        contact::validate_schedule(&schedule)?;
        am.schedule = Set(schedule);
    }

    let pick = |new: &Option<String>, old: Option<&String>| new.clone().or_else(|| old.cloned()).unwrap_or_default();
    let instagram = pick(&input.instagram, existing.map(|e| &e.instagram));
    let telegram = pick(&input.telegram, existing.map(|e| &e.telegram));
    let whatsapp = pick(&input.whatsapp, existing.map(|e| &e.whatsapp));
    contact::validate_links(&instagram, &telegram, &whatsapp)?;
    if input.instagram.is_some() { am.instagram = Set(instagram); }
    if input.telegram.is_some() { am.telegram = Set(telegram); }
    if input.whatsapp.is_some() { am.whatsapp = Set(whatsapp); }
    Ok(())
}

async fn insert(db: &DatabaseConnection, input: ContactInput) -> Result<ContactView, ServiceError> {
    let now = Utc::now();
    let mut am = contact::ActiveModel {
        id: Set(contact::SINGLETON_ID),
        instagram: Set(String::new()),
        telegram: Set(String::new()),
        whatsapp: Set(String::new()),
        schedule: Set(json!([])),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    };
    apply(&mut am, None, input, WriteMode::Create)?;
    let created = match am.insert(db).await {
        Ok(created) => created,
        Err(e) if is_duplicate(&e) => return Err(ServiceError::Conflict(ALREADY_EXISTS.into())),
        Err(e) => return Err(e.into()),
    };
    info!(id = created.id, "created contacts");
    Ok(created.into())
}

/// POST: fails when the card already exists. The fixed primary key settles
/// concurrent first writes.
pub async fn create(db: &DatabaseConnection, input: ContactInput) -> Result<ContactView, ServiceError> {
    if current(db).await?.is_some() {
        return Err(ServiceError::Conflict(ALREADY_EXISTS.into()));
    }
    insert(db, input).await
}

/// PUT/PATCH. Returns the card and whether it had to be created.
pub async fn upsert(db: &DatabaseConnection, input: ContactInput, mode: WriteMode) -> Result<(ContactView, bool), ServiceError> {
    if current(db).await?.is_none() {
        match insert(db, input.clone()).await {
            Ok(created) => return Ok((created, true)),
            // another request created the card first; update it instead
            Err(ServiceError::Conflict(_)) => {}
            Err(e) => return Err(e),
        }
    }
    let existing = current(db).await?.ok_or_else(|| ServiceError::not_found("contacts"))?;
    let mut am: contact::ActiveModel = existing.clone().into();
    apply(&mut am, Some(&existing), input, mode)?;
    am.updated_at = Set(Utc::now().into());
    Ok((am.update(db).await?.into(), false))
}

//! End-to-end tests against a real server on an ephemeral port. They need a
//! PostgreSQL database (`DATABASE_URL`) and are skipped without one.

use std::net::SocketAddr;
use std::sync::Arc;

use migration::MigratorTrait;
use reqwest::StatusCode;
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use server::routes::{self, auth::ServerState};
use service::auth::domain::RegisterInput;
use service::auth::repo::seaorm::SeaOrmAuthRepository;
use service::auth::repository::AuthRepository;
use service::auth::service::{AuthConfig, AuthService};
use service::images::MediaStore;

struct TestApp {
    base_url: String,
    client: reqwest::Client,
    access: String,
}

impl TestApp {
    fn url(&self, path: &str) -> String { format!("{}{}", self.base_url, path) }

    async fn get(&self, path: &str) -> anyhow::Result<(StatusCode, Value)> {
        let res = self.client.get(self.url(path)).bearer_auth(&self.access).send().await?;
        Ok((res.status(), res.json().await.unwrap_or(Value::Null)))
    }

    async fn send_json(&self, method: reqwest::Method, path: &str, body: Value) -> anyhow::Result<(StatusCode, Value)> {
        let res = self.client.request(method, self.url(path)).bearer_auth(&self.access).json(&body).send().await?;
        Ok((res.status(), res.json().await.unwrap_or(Value::Null)))
    }

    async fn post(&self, path: &str, body: Value) -> anyhow::Result<(StatusCode, Value)> {
        self.send_json(reqwest::Method::POST, path, body).await
    }

    async fn delete(&self, path: &str) -> anyhow::Result<StatusCode> {
        Ok(self.client.delete(self.url(path)).bearer_auth(&self.access).send().await?.status())
    }
}

async fn database() -> Option<DatabaseConnection> {
    if std::env::var("SKIP_DB_TESTS").is_ok() || std::env::var("DATABASE_URL").is_err() {
        eprintln!("DATABASE_URL missing; skip e2e tests");
        return None;
    }
    let db = models::db::connect().await.ok()?;
    if let Err(e) = migration::Migrator::up(&db, None).await {
        eprintln!("skip: migrate up failed: {e}");
        return None;
    }
    Some(db)
}

async fn start_server() -> anyhow::Result<Option<TestApp>> {
    let Some(db) = database().await else { return Ok(None) };

    let repo: Arc<dyn AuthRepository> = Arc::new(SeaOrmAuthRepository { db: db.clone() });
    let auth = Arc::new(AuthService::new(repo, AuthConfig::with_secret("e2e-secret")));
    let email = format!("staff_{}@salon.test", Uuid::new_v4().simple());
    let password = "E2ePassw0rd";
    auth.register(RegisterInput { email: email.clone(), name: "Staff".into(), password: password.into(), is_staff: true })
        .await?;

    let media_root = std::env::temp_dir().join(format!("salon-e2e-{}", Uuid::new_v4()));
    let state = ServerState {
        db,
        auth,
        media: MediaStore::new(media_root, "/media/", None),
        public_url: None,
        quotes_tz: chrono_tz::Europe::Moscow,
    };
    let app = routes::build_app(state, CorsLayer::very_permissive());
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            eprintln!("server error: {e}");
        }
    });

    let base_url = format!("http://{addr}");
    let client = reqwest::Client::new();
    let tokens: Value = client
        .post(format!("{base_url}/api/auth/"))
        .json(&json!({"login": email, "password": password}))
        .send()
        .await?
        .json()
        .await?;
    let access = tokens["access_token"].as_str().unwrap_or_default().to_string();
    assert!(!access.is_empty(), "login failed: {tokens}");
    Ok(Some(TestApp { base_url, client, access }))
}

fn unique(prefix: &str) -> String { format!("{prefix} {}", &Uuid::new_v4().simple().to_string()[..8]) }

async fn create_service_type(app: &TestApp) -> anyhow::Result<Value> {
    let (status, body) = app
        .post(
            "/api/service_types/",
            json!({
                "name": unique("Стрижки"),
                "description": "Haircuts",
                "target": unique("hair"),
                "client_types": ["for men"],
                "benefits": [{"title": "Fast", "text": "30 min"}],
            }),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    Ok(body)
}

#[tokio::test]
async fn service_types_and_services() -> anyhow::Result<()> {
    let Some(app) = start_server().await? else { return Ok(()) };
    let st = create_service_type(&app).await?;
    let st_id = st["id"].as_i64().unwrap_or_default();
    assert!(st["slug"].as_str().is_some_and(|s| s.starts_with("strizhki")));
    assert_eq!(st["services_count"], 0);

    let (status, svc) = app
        .post(
            "/api/services/",
            json!({"name": unique("Fade"), "service_type": st_id, "price_from": 1000, "price_to": 2000, "client_types": ["for men"]}),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{svc}");
    assert_eq!(svc["service_type"], st_id);
    let svc_id = svc["id"].as_i64().unwrap_or_default();

    // price_from above the stored price_to
    let (status, _) = app.send_json(reqwest::Method::PATCH, &format!("/api/services/{svc_id}/"), json!({"price_from": 5000})).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, page) = app.get(&format!("/api/services/?service_type_id={st_id}")).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["count"], 1);
    assert_eq!(page["full_count"], 1);
    assert_eq!(page["result"][0]["id"], svc_id);

    let (_, st_detail) = app.get(&format!("/api/service_types/{st_id}")).await?;
    assert_eq!(st_detail["services_count"], 1);

    let (status, _) = app.post("/api/services/", json!({"name": "Orphan", "service_type": i32::MAX})).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(app.delete(&format!("/api/service_types/{st_id}/")).await?, StatusCode::NO_CONTENT);
    let (status, _) = app.get(&format!("/api/services/{svc_id}/")).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn masters_products_and_portfolio() -> anyhow::Result<()> {
    let Some(app) = start_server().await? else { return Ok(()) };
    let st = create_service_type(&app).await?;
    let st_id = st["id"].as_i64().unwrap_or_default();

    let (status, product) = app.post("/api/products/", json!({"brand": "Davines", "name": unique("Oi"), "purpose": "shine"})).await?;
    assert_eq!(status, StatusCode::CREATED, "{product}");
    let product_id = product["id"].as_i64().unwrap_or_default();

    let master_name = unique("Anna");
    let (status, master) = app
        .post(
            "/api/masters/",
            json!({"name": master_name, "job_title": "Stylist", "experience": 5, "favorite_product": product_id, "service_types_ids": [st_id]}),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{master}");
    assert_eq!(master["service_types"], json!([st_id]));
    assert_eq!(master["favorite_product_detail"]["id"], product_id);

    let (_, page) = app.get(&format!("/api/masters/?service_types_ids={st_id}")).await?;
    assert_eq!(page["count"], 1);
    assert!(page["results"][0]["favorite_product_name"].as_str().is_some_and(|n| n.starts_with("Davines - ")));

    let (_, page) = app.get("/api/masters/?service_types_ids=abc").await?;
    assert_eq!(page["count"], 0);

    let (status, svc) = app.post("/api/services/", json!({"name": unique("Bob"), "service_type": st_id})).await?;
    assert_eq!(status, StatusCode::CREATED);
    let (status, item) = app
        .post(
            "/api/portfolio/",
            json!({"image": "https://cdn.example.com/p.jpg", "master": {"name": master_name}, "service_type": st_id, "service": svc["id"]}),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{item}");
    assert_eq!(item["master_name"], master_name.as_str());

    let (_, page) = app.get(&format!("/api/portfolio/?master_name={}", master_name.to_uppercase().replace(' ', "%20"))).await?;
    assert_eq!(page["count"], 1);

    let (status, _) = app.post("/api/portfolio/", json!({"image": "x", "master": {"name": ""}, "service_type": st_id, "service": svc["id"]})).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(app.delete(&format!("/api/products/{product_id}/")).await?, StatusCode::NO_CONTENT);
    let (_, master) = app.get(&format!("/api/masters/{}/", master["id"])).await?;
    assert!(master["favorite_product"].is_null());
    Ok(())
}

#[tokio::test]
async fn contacts_singleton() -> anyhow::Result<()> {
    let Some(app) = start_server().await? else { return Ok(()) };
    let body = json!({
        "email": "hello@salon.test",
        "phones": ["+7 900 000-00-00"],
        "instagram": "https://instagram.com/salon",
        "telegram": "",
        "whatsapp": "",
        "schedule": [{"week_day": "Mon-Fri", "hours": "10-21"}],
    });
    let (status, saved) = app.send_json(reqwest::Method::PUT, "/api/contacts/", body).await?;
    assert!(status == StatusCode::OK || status == StatusCode::CREATED, "{saved}");

    let (status, body) = app.post("/api/contacts/", json!({"email": "other@salon.test", "phones": ["1"]})).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "contacts already exist, use PUT to update");

    let (status, _) = app.send_json(reqwest::Method::PATCH, "/api/contacts/", json!({"phones": []})).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, current) = app.get("/api/contacts/").await?;
    assert_eq!(current["email"], "hello@salon.test");
    Ok(())
}

fn png(width: u32, height: u32) -> anyhow::Result<Vec<u8>> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([200, 30, 60]));
    let mut out = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img).write_to(&mut out, image::ImageFormat::Png)?;
    Ok(out.into_inner())
}

#[tokio::test]
async fn image_upload_and_media() -> anyhow::Result<()> {
    let Some(app) = start_server().await? else { return Ok(()) };
    let form = reqwest::multipart::Form::new()
        .part("original_image", reqwest::multipart::Part::bytes(png(800, 400)?).file_name("Photo 1.PNG"))
        .text("crop", "true");
    let res = app.client.post(app.url("/api/images/")).bearer_auth(&app.access).multipart(form).send().await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Value = res.json().await?;
    assert_eq!(created["is_compressed"], true);
    assert_eq!(created["is_cropped"], true);
    let cropped_url = created["cropped_url"].as_str().unwrap_or_default().to_string();
    assert!(cropped_url.starts_with("/media/images/cropped/Photo_1_"));

    let media = app.client.get(app.url(&cropped_url)).send().await?;
    assert_eq!(media.status(), StatusCode::OK);
    let cropped = image::load_from_memory(&media.bytes().await?)?;
    assert_eq!((cropped.width(), cropped.height()), (600, 600));

    let id = created["id"].as_i64().unwrap_or_default();
    let (_, detail) = app.get(&format!("/api/images/{id}/")).await?;
    assert!(detail["processed_image"].as_str().is_some_and(|p| p.ends_with("_processed.webp")));

    assert_eq!(app.delete(&format!("/api/images/{id}/")).await?, StatusCode::NO_CONTENT);
    assert_eq!(app.client.get(app.url(&cropped_url)).send().await?.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn quote_of_the_day_is_stable() -> anyhow::Result<()> {
    let Some(app) = start_server().await? else { return Ok(()) };
    let (status, _) = app.post("/api/quotes/", json!({"author": "Coco Chanel", "text": unique("Beauty begins")})).await?;
    assert_eq!(status, StatusCode::CREATED);

    let first: Value = app.client.get(app.url("/api/random-quote/")).send().await?.json().await?;
    let second: Value = app.client.get(app.url("/api/random-quote")).send().await?.json().await?;
    assert!(first["text"].is_string());
    assert_eq!(first, second);

    let (status, history) = app.get("/api/quotes/daily/").await?;
    assert_eq!(status, StatusCode::OK);
    assert!(history["count"].as_u64().is_some_and(|c| c >= 1));
    Ok(())
}

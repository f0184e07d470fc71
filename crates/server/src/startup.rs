use std::{net::SocketAddr, sync::Arc};

use axum::http::HeaderValue;
use axum::Router;
use common::utils::logging::init_logging_from_env;
use configs::{AppConfig, CorsConfig};
use dotenvy::dotenv;
use migration::{Migrator, MigratorTrait};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::routes::{self, auth::ServerState};
use service::{
    auth::{
        maintenance::{spawn_blacklist_purge, BLACKLIST_PURGE_PERIOD},
        repo::seaorm::SeaOrmAuthRepository,
        repository::AuthRepository,
        service::AuthConfig,
        AuthService,
    },
    images::MediaStore,
    quotes,
};

/// Permissive when no origins are configured, otherwise only the listed ones.
pub fn build_cors(cfg: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = cfg
        .allowed_origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o.trim()) {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %o, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    if origins.is_empty() {
        CorsLayer::very_permissive()
    } else {
        CorsLayer::new().allow_origin(origins).allow_methods(Any).allow_headers(Any)
    }
}

/// Public entry: prepare storage, database and accounts, then serve HTTP.
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging_from_env();

    let cfg = AppConfig::load_or_env()?;
    common::env::ensure_env(&cfg.media.root).await?;

    let db = models::db::connect_with_config(&cfg.database).await?;
    Migrator::up(&db, None).await?;
    info!(event = "migrations_applied", "database schema is up to date");

    let repo: Arc<dyn AuthRepository> = Arc::new(SeaOrmAuthRepository { db: db.clone() });
    let auth = Arc::new(AuthService::new(repo, AuthConfig::from_config(&cfg.auth)));
    if let (Some(email), Some(password)) = (cfg.auth.admin_email.as_deref(), cfg.auth.admin_password.as_deref()) {
        if let Some(admin) = auth.ensure_admin(email, password).await? {
            info!(event = "admin_seeded", user_id = admin.id, "admin account created");
        }
    }
    // first purge runs immediately, then hourly
    spawn_blacklist_purge(db.clone(), BLACKLIST_PURGE_PERIOD);

    let tz = cfg.quotes.tz()?;
    match quotes::today_quote(&db, tz).await {
        Ok(Some(q)) => info!(event = "quote_of_the_day", quote_id = q.id, "quote of the day ready"),
        Ok(None) => info!(event = "quote_of_the_day", "no quotes yet"),
        Err(e) => warn!(event = "quote_of_the_day", err = %e, "cannot pick quote of the day"),
    }
    if cfg.quotes.rotate_daily {
        quotes::spawn_daily_rotation(db.clone(), tz);
    }

    let media = MediaStore::from_config(&cfg.media, cfg.server.public_url.as_deref());
    let state = ServerState { db, auth, media, public_url: cfg.server.public_url.clone(), quotes_tz: tz };
    let app: Router = routes::build_app(state, build_cors(&cfg.cors));

    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port).parse()?;
    info!(event = "listening", %addr, "starting salon api");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

//! Background upkeep for auth tables.

use std::time::Duration;

use sea_orm::DatabaseConnection;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// How often expired blacklist rows are deleted.
pub const BLACKLIST_PURGE_PERIOD: Duration = Duration::from_secs(60 * 60);

/// Delete expired refresh-token blacklist rows every `period`, starting now.
pub fn spawn_blacklist_purge(db: DatabaseConnection, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match models::token_blacklist::purge_expired(&db).await {
                Ok(0) => {}
                Ok(purged) => info!(event = "blacklist_purged", purged, "expired blacklist entries removed"),
                Err(e) => error!(event = "blacklist_purge_failed", err = %e, "cannot purge token blacklist"),
            }
        }
    })
}

//! Background task that rotates the daily quote at local midnight.

use std::time::Duration;

use chrono::{DateTime, Days, LocalResult, TimeZone, Utc};
use chrono_tz::Tz;
use sea_orm::DatabaseConnection;
use tokio::task::JoinHandle;
use tracing::{error, info};

use super::rotation;

const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Time from `now` until the next midnight in `tz`, within `(0, 24h]`.
pub fn duration_until_next_midnight(now: DateTime<Utc>, tz: Tz) -> Duration {
    let local = now.with_timezone(&tz);
    let next_midnight = local
        .date_naive()
        .checked_add_days(Days::new(1))
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .and_then(|naive| match tz.from_local_datetime(&naive) {
            LocalResult::Single(t) => Some(t),
            LocalResult::Ambiguous(earliest, _) => Some(earliest),
            // midnight skipped by a DST jump: the day starts an hour later
            LocalResult::None => tz.from_local_datetime(&(naive + chrono::Duration::hours(1))).earliest(),
        });
    let wait = next_midnight
        .and_then(|t| (t.with_timezone(&Utc) - now).to_std().ok())
        .unwrap_or(DAY);
    wait.clamp(Duration::from_secs(1), DAY)
}

/// Rotate at every local midnight, forever.
pub fn spawn_daily_rotation(db: DatabaseConnection, tz: Tz) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let wait = duration_until_next_midnight(Utc::now(), tz);
            info!(event = "quote_rotation_scheduled", wait_secs = wait.as_secs(), timezone = %tz, "next daily quote rotation");
            tokio::time::sleep(wait).await;
            match rotation::today_quote(&db, tz).await {
                Ok(Some(q)) => info!(event = "quote_rotation", quote_id = q.id, "daily quote rotated"),
                Ok(None) => info!(event = "quote_rotation", "no quotes to rotate"),
                Err(e) => error!(event = "quote_rotation_failed", err = %e, "daily quote rotation failed"),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn wait_is_positive_and_at_most_a_day() {
        let tz: Tz = "Europe/Moscow".parse().unwrap();
        // 23:30 in Moscow (UTC+3)
        assert_eq!(duration_until_next_midnight(utc("2025-03-10T20:30:00Z"), tz), Duration::from_secs(30 * 60));
        // exactly midnight waits a full day
        assert_eq!(duration_until_next_midnight(utc("2025-03-10T21:00:00Z"), tz), DAY);
        for h in 0..24 {
            let now = utc("2025-06-01T00:00:00Z") + chrono::Duration::hours(h);
            let wait = duration_until_next_midnight(now, tz);
            assert!(wait > Duration::ZERO && wait <= DAY);
        }
    }

    #[test]
    fn handles_dst_transitions() {
        let tz: Tz = "America/Sao_Paulo".parse().unwrap();
        // Santiago-style midnight gaps: Chile skips 00:00 on DST start
        let santiago: Tz = "America/Santiago".parse().unwrap();
        for now in ["2019-09-07T12:00:00Z", "2019-11-02T12:00:00Z", "2024-09-07T12:00:00Z"] {
            let wait = duration_until_next_midnight(utc(now), santiago);
            assert!(wait > Duration::ZERO && wait <= DAY, "{now}: {wait:?}");
            let wait = duration_until_next_midnight(utc(now), tz);
            assert!(wait > Duration::ZERO && wait <= DAY, "{now}: {wait:?}");
        }
    }
}

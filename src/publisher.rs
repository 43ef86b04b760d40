use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;

use crate::db::publication_repository::PublicationRepository;

/// `publishTime` value that defers publication to `scheduledPublishTime`.
pub const SCHEDULED: &str = "Scheduled";

/// Whether a post written at `now` is visible immediately.
///
/// Only a post explicitly marked `Scheduled` with a future time is held back.
pub fn is_published_now(
    publish_time: Option<&str>,
    scheduled_publish_time: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> bool {
    match (publish_time, scheduled_publish_time) {
        (Some(SCHEDULED), Some(at)) => at <= now,
        _ => true,
    }
}

/// Run one sweep, logging the outcome. Failures are logged and retried on the
/// next tick.
pub async fn sweep(repo: &dyn PublicationRepository, now: DateTime<Utc>) -> u64 {
    match repo.publish_due(now).await {
        Ok(0) => 0,
        Ok(count) => {
            tracing::info!(count, "published scheduled posts");
            count
        }
        Err(e) => {
            tracing::error!(error = %e, "scheduled publication sweep failed");
            0
        }
    }
}

/// Spawn the periodic sweep. The first tick fires immediately so posts that
/// came due while the server was down are published on startup.
pub fn spawn(repo: Arc<dyn PublicationRepository>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            sweep(repo.as_ref(), Utc::now()).await;
        }
    })
}

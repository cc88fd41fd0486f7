//! Background worker that runs the audit event sweeper on an interval.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::{AuditEventSweeper, RetentionError, SweepOutcome};
use crate::{config::RetentionConfig, db::DbPool};

/// Starts the retention worker.
///
/// Sweeps immediately, then once per `interval_hours`, until `shutdown` is
/// cancelled. A failed sweep is logged and the loop carries on. Shutdown is
/// only observed between sweeps.
pub async fn start_retention_worker(
    db: Arc<DbPool>,
    config: RetentionConfig,
    shutdown: CancellationToken,
) {
    if !config.enabled {
        tracing::info!("Retention worker disabled by configuration");
        return;
    }

    let dry_run_msg = if config.dry_run { " (DRY RUN)" } else { "" };

    tracing::info!(
        interval_hours = config.interval_hours,
        audit_events_days = config.audit_events_days,
        dry_run = config.dry_run,
        "Starting retention worker{}",
        dry_run_msg
    );

    let sweeper = AuditEventSweeper::from_config(db.audit_events(), &config);
    let interval = config.interval();

    loop {
        match sweeper.remove_old_audit_events().await {
            Ok(SweepOutcome::Completed(report)) if report.deleted > 0 => {
                tracing::info!(
                    audit_events = report.deleted,
                    cutoff = %report.cutoff,
                    dry_run = report.dry_run,
                    "Retention run complete{}",
                    dry_run_msg
                );
            }
            Ok(SweepOutcome::Completed(_)) => {
                tracing::debug!("Retention run complete, no records to delete");
            }
            Ok(SweepOutcome::Skipped) => {}
            Err(RetentionError::InvalidConfiguration(msg)) => {
                tracing::error!(error = %msg, "Invalid retention configuration, nothing deleted");
            }
            Err(e) => {
                tracing::error!(error = %e, kind = e.kind(), "Error running retention");
            }
        }

        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }

    tracing::info!("Retention worker stopped");
}

#[cfg(all(test, feature = "database-sqlite"))]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::{
        db::tests::harness::create_sqlite_db,
        models::{AuditEventQuery, CreateAuditEvent},
    };

    async fn seed_old_and_new(db: &DbPool) {
        let repo = db.audit_events();
        repo.save(CreateAuditEvent {
            event_date: Utc::now() - Duration::days(60),
            ..CreateAuditEvent::now("old", "AUTHENTICATION_SUCCESS")
        })
        .await
        .unwrap();
        repo.save(CreateAuditEvent::now("new", "AUTHENTICATION_SUCCESS"))
            .await
            .unwrap();
    }

    async fn total(db: &DbPool) -> i64 {
        db.audit_events()
            .count(AuditEventQuery::default())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_disabled_worker_returns_without_sweeping() {
        let db = Arc::new(create_sqlite_db().await);
        seed_old_and_new(&db).await;

        let config = RetentionConfig {
            enabled: false,
            ..Default::default()
        };
        start_retention_worker(db.clone(), config, CancellationToken::new()).await;

        assert_eq!(total(&db).await, 2);
    }

    #[tokio::test]
    async fn test_worker_sweeps_then_stops_on_shutdown() {
        let db = Arc::new(create_sqlite_db().await);
        seed_old_and_new(&db).await;

        let shutdown = CancellationToken::new();
        shutdown.cancel();
        start_retention_worker(db.clone(), RetentionConfig::default(), shutdown).await;

        assert_eq!(total(&db).await, 1);
        assert!(
            db.audit_events()
                .find_by_principal("old")
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_worker_survives_invalid_period() {
        let db = Arc::new(create_sqlite_db().await);
        seed_old_and_new(&db).await;

        let config = RetentionConfig {
            audit_events_days: 0,
            ..Default::default()
        };
        let shutdown = CancellationToken::new();
        shutdown.cancel();
        start_retention_worker(db.clone(), config, shutdown).await;

        assert_eq!(total(&db).await, 2);
    }

    #[tokio::test]
    async fn test_worker_stops_while_sleeping() {
        let db = Arc::new(create_sqlite_db().await);
        let shutdown = CancellationToken::new();

        let handle = tokio::spawn(start_retention_worker(
            db,
            RetentionConfig::default(),
            shutdown.clone(),
        ));
        shutdown.cancel();

        tokio::time::timeout(std::time::Duration::from_secs(5), handle)
            .await
            .expect("Worker did not stop")
            .unwrap();
    }
}

//! Audit event sweeper: deletes every event older than the retention period.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::Mutex;

use super::RetentionError;
use crate::{
    config::RetentionConfig,
    db::{AuditEventRepo, truncate_to_millis},
    observability::metrics,
};

/// Result of a sweep that actually ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepReport {
    /// Events dated strictly before this instant were targeted.
    pub cutoff: DateTime<Utc>,
    /// Events deleted, or in dry-run mode, events that would have been.
    pub deleted: u64,
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SweepOutcome {
    Completed(SweepReport),
    /// Another sweep on the same sweeper was still running.
    Skipped,
}

impl SweepOutcome {
    pub fn report(&self) -> Option<&SweepReport> {
        match self {
            SweepOutcome::Completed(report) => Some(report),
            SweepOutcome::Skipped => None,
        }
    }
}

/// Compute `now - days`, truncated to the precision event dates are stored at.
pub fn retention_cutoff(now: DateTime<Utc>, days: i64) -> Result<DateTime<Utc>, RetentionError> {
    if days <= 0 {
        return Err(RetentionError::InvalidConfiguration(format!(
            "retention period must be a positive number of days, got {days}"
        )));
    }
    let period = TimeDelta::try_days(days).ok_or_else(|| {
        RetentionError::InvalidConfiguration(format!("retention period of {days} days is too large"))
    })?;
    let cutoff = now.checked_sub_signed(period).ok_or_else(|| {
        RetentionError::InvalidConfiguration(format!(
            "retention period of {days} days reaches before the earliest representable date"
        ))
    })?;
    Ok(truncate_to_millis(cutoff))
}

pub struct AuditEventSweeper {
    repo: Arc<dyn AuditEventRepo>,
    retention_days: i64,
    dry_run: bool,
    in_flight: Mutex<()>,
}

impl AuditEventSweeper {
    /// The period is checked when a sweep runs, not here, so a bad value
    /// surfaces as `InvalidConfiguration` on every invocation.
    pub fn new(repo: Arc<dyn AuditEventRepo>, retention_days: i64) -> Self {
        Self {
            repo,
            retention_days,
            dry_run: false,
            in_flight: Mutex::new(()),
        }
    }

    pub fn from_config(repo: Arc<dyn AuditEventRepo>, config: &RetentionConfig) -> Self {
        Self::new(repo, config.audit_events_days).with_dry_run(config.dry_run)
    }

    /// Count matching events instead of deleting them.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn retention_days(&self) -> i64 {
        self.retention_days
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Delete every audit event dated before `now - retention_days`.
    pub async fn remove_old_audit_events(&self) -> Result<SweepOutcome, RetentionError> {
        self.remove_old_audit_events_at(Utc::now()).await
    }

    /// Same as [`remove_old_audit_events`](Self::remove_old_audit_events)
    /// with an explicit clock reading.
    pub async fn remove_old_audit_events_at(
        &self,
        now: DateTime<Utc>,
    ) -> Result<SweepOutcome, RetentionError> {
        let result = self.sweep(now).await;

        let status = match &result {
            Ok(SweepOutcome::Completed(report)) if report.dry_run => "dry_run",
            Ok(SweepOutcome::Completed(_)) => "success",
            Ok(SweepOutcome::Skipped) => "skipped",
            Err(e) => e.kind(),
        };
        metrics::record_retention_run(status);

        result
    }

    async fn sweep(&self, now: DateTime<Utc>) -> Result<SweepOutcome, RetentionError> {
        let cutoff = retention_cutoff(now, self.retention_days)?;

        let Ok(_guard) = self.in_flight.try_lock() else {
            tracing::warn!(
                cutoff = %cutoff,
                "Audit event sweep already in progress, skipping"
            );
            return Ok(SweepOutcome::Skipped);
        };

        if self.dry_run {
            let would_delete = self.repo.count_before(cutoff).await?;
            tracing::info!(
                cutoff = %cutoff,
                would_delete,
                "DRY RUN: Would delete audit events before {}",
                cutoff
            );
            return Ok(SweepOutcome::Completed(SweepReport {
                cutoff,
                deleted: would_delete,
                dry_run: true,
            }));
        }

        let deleted = self.repo.delete_before(cutoff).await?;

        if deleted > 0 {
            tracing::debug!(deleted, cutoff = %cutoff, "Deleted audit events");
            metrics::record_retention_deletion("audit_events", deleted);
        }

        Ok(SweepOutcome::Completed(SweepReport {
            cutoff,
            deleted,
            dry_run: false,
        }))
    }
}

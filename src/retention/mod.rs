//! Audit event retention.
//!
//! The [`AuditEventSweeper`] removes audit events dated before
//! `now - retention_days` with a single store call. The background worker
//! runs it on the configured interval until shutdown; the `sweep` CLI
//! command runs it once.

mod error;
mod sweeper;
mod worker;

pub use error::RetentionError;
pub use sweeper::{AuditEventSweeper, SweepOutcome, SweepReport, retention_cutoff};
pub use worker::start_retention_worker;

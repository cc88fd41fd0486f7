mod audit_events;
mod common;

pub use audit_events::SqliteAuditEventRepo;

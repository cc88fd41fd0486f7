mod audit_events;

pub use audit_events::PostgresAuditEventRepo;

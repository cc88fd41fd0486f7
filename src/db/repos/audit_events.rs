use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    db::error::DbResult,
    models::{AuditEvent, AuditEventQuery, CreateAuditEvent},
};

#[async_trait]
pub trait AuditEventRepo: Send + Sync {
    /// Persist a new audit event. The store assigns the id.
    async fn save(&self, input: CreateAuditEvent) -> DbResult<AuditEvent>;

    /// Get an audit event by ID
    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<AuditEvent>>;

    /// All events recorded for a principal, newest first
    async fn find_by_principal(&self, principal: &str) -> DbResult<Vec<AuditEvent>>;

    /// List audit events matching the query, newest first
    async fn list(&self, query: AuditEventQuery) -> DbResult<Vec<AuditEvent>>;

    /// Count audit events matching the query (ignores `limit`)
    async fn count(&self, query: AuditEventQuery) -> DbResult<i64>;

    // ==================== Retention Operations ====================

    /// Delete every event dated strictly before `cutoff` in one statement.
    ///
    /// Returns the number of records deleted.
    async fn delete_before(&self, cutoff: DateTime<Utc>) -> DbResult<u64>;

    /// Number of events `delete_before` would remove for the same cutoff
    async fn count_before(&self, cutoff: DateTime<Utc>) -> DbResult<u64>;
}

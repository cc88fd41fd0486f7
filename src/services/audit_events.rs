use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::{
    db::{DbError, DbPool, DbResult},
    models::{AuditEvent, AuditEventQuery, CreateAuditEvent},
};

/// Service layer for audit event operations
#[derive(Clone)]
pub struct AuditEventService {
    db: Arc<DbPool>,
}

impl AuditEventService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Validate and persist a new audit event
    pub async fn record(&self, input: CreateAuditEvent) -> DbResult<AuditEvent> {
        input
            .validate()
            .map_err(|e| DbError::Validation(e.to_string()))?;

        let event = self.db.audit_events().save(input).await?;
        tracing::debug!(
            id = %event.id,
            principal = %event.principal,
            event_type = %event.event_type,
            "Audit event recorded"
        );
        Ok(event)
    }

    /// Get an audit event by ID
    pub async fn get_by_id(&self, id: Uuid) -> DbResult<Option<AuditEvent>> {
        self.db.audit_events().get_by_id(id).await
    }

    /// All events recorded for a principal, newest first
    pub async fn find_by_principal(&self, principal: &str) -> DbResult<Vec<AuditEvent>> {
        self.db.audit_events().find_by_principal(principal).await
    }

    /// List audit events with optional filtering
    pub async fn list(&self, query: AuditEventQuery) -> DbResult<Vec<AuditEvent>> {
        self.db.audit_events().list(query).await
    }

    /// Count audit events matching the query (ignores `limit`)
    pub async fn count(&self, query: AuditEventQuery) -> DbResult<i64> {
        self.db.audit_events().count(query).await
    }
}

#[cfg(all(test, feature = "database-sqlite"))]
mod tests {
    use chrono::{TimeDelta, Utc};

    use super::*;
    use crate::db::tests::harness::create_sqlite_db;

    async fn service() -> AuditEventService {
        AuditEventService::new(Arc::new(create_sqlite_db().await))
    }

    #[tokio::test]
    async fn test_record_and_find() {
        let service = service().await;

        let event = service
            .record(
                CreateAuditEvent::now("admin", "AUTHENTICATION_SUCCESS")
                    .with_data("remoteAddress", "127.0.0.1"),
            )
            .await
            .expect("Failed to record event");

        let found = service.find_by_principal("admin").await.unwrap();
        assert_eq!(found, vec![event.clone()]);

        let fetched = service.get_by_id(event.id).await.unwrap();
        assert_eq!(fetched, Some(event));
    }

    #[tokio::test]
    async fn test_record_rejects_invalid_input() {
        let service = service().await;

        let err = service
            .record(CreateAuditEvent::now("", "AUTHENTICATION_SUCCESS"))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));

        assert_eq!(service.count(AuditEventQuery::default()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_and_count_filter_by_type() {
        let service = service().await;
        let now = Utc::now();

        for (offset, event_type) in [
            (3, "AUTHENTICATION_SUCCESS"),
            (2, "AUTHENTICATION_FAILURE"),
            (1, "AUTHENTICATION_SUCCESS"),
        ] {
            let mut input = CreateAuditEvent::now("user", event_type);
            input.event_date = now - TimeDelta::minutes(offset);
            service.record(input).await.unwrap();
        }

        let query = AuditEventQuery {
            event_type: Some("AUTHENTICATION_SUCCESS".to_string()),
            ..Default::default()
        };
        let events = service.list(query.clone()).await.unwrap();
        assert_eq!(events.len(), 2);
        assert!(events[0].event_date > events[1].event_date);
        assert_eq!(service.count(query).await.unwrap(), 2);
    }
}

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool, sqlite::SqliteRow};
use uuid::Uuid;

use super::common::parse_uuid;
use crate::{
    db::{
        error::DbResult,
        repos::{AuditEventRepo, truncate_to_millis},
    },
    models::{AuditEvent, AuditEventQuery, CreateAuditEvent},
};

pub struct SqliteAuditEventRepo {
    pool: SqlitePool,
}

impl SqliteAuditEventRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn event_from_row(row: &SqliteRow) -> DbResult<AuditEvent> {
        let data: String = row.get("data");
        Ok(AuditEvent {
            id: parse_uuid(&row.get::<String, _>("id"))?,
            principal: row.get("principal"),
            event_type: row.get("event_type"),
            event_date: row.get("event_date"),
            data: serde_json::from_str(&data)?,
        })
    }

    /// Build the WHERE clause for a query. Dates are bound separately from
    /// the string params so they keep their stored text format.
    fn filters(query: &AuditEventQuery) -> (String, Vec<String>, Vec<DateTime<Utc>>) {
        let mut conditions = Vec::new();
        let mut params = Vec::new();
        let mut dates = Vec::new();

        if let Some(principal) = &query.principal {
            conditions.push("principal = ?");
            params.push(principal.clone());
        }
        if let Some(event_type) = &query.event_type {
            conditions.push("event_type = ?");
            params.push(event_type.clone());
        }
        if let Some(from) = query.from {
            conditions.push("event_date >= ?");
            dates.push(truncate_to_millis(from));
        }
        if let Some(to) = query.to {
            conditions.push("event_date < ?");
            dates.push(truncate_to_millis(to));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        (where_clause, params, dates)
    }
}

#[async_trait]
impl AuditEventRepo for SqliteAuditEventRepo {
    async fn save(&self, input: CreateAuditEvent) -> DbResult<AuditEvent> {
        let id = Uuid::new_v4();
        let event_date = truncate_to_millis(input.event_date);
        let data_json = serde_json::to_string(&input.data)?;

        sqlx::query(
            r#"
            INSERT INTO audit_events (id, principal, event_type, event_date, data)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(&input.principal)
        .bind(&input.event_type)
        .bind(event_date)
        .bind(&data_json)
        .execute(&self.pool)
        .await?;

        Ok(AuditEvent {
            id,
            principal: input.principal,
            event_type: input.event_type,
            event_date,
            data: input.data,
        })
    }

    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<AuditEvent>> {
        let row = sqlx::query(
            r#"
            SELECT id, principal, event_type, event_date, data
            FROM audit_events
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::event_from_row).transpose()
    }

    async fn find_by_principal(&self, principal: &str) -> DbResult<Vec<AuditEvent>> {
        let rows = sqlx::query(
            r#"
            SELECT id, principal, event_type, event_date, data
            FROM audit_events
            WHERE principal = ?
            ORDER BY event_date DESC, id DESC
            "#,
        )
        .bind(principal)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::event_from_row).collect()
    }

    async fn list(&self, query: AuditEventQuery) -> DbResult<Vec<AuditEvent>> {
        // Negative limits mean "unbounded" on SQLite and are an error on Postgres
        let limit = query.limit.unwrap_or(100).max(0);
        let (where_clause, params, dates) = Self::filters(&query);

        let sql = format!(
            r#"
            SELECT id, principal, event_type, event_date, data
            FROM audit_events
            {}
            ORDER BY event_date DESC, id DESC
            LIMIT ?
            "#,
            where_clause
        );

        let mut query_builder = sqlx::query(&sql);
        for param in &params {
            query_builder = query_builder.bind(param);
        }
        for date in dates {
            query_builder = query_builder.bind(date);
        }
        query_builder = query_builder.bind(limit);

        let rows = query_builder.fetch_all(&self.pool).await?;
        rows.iter().map(Self::event_from_row).collect()
    }

    async fn count(&self, query: AuditEventQuery) -> DbResult<i64> {
        let (where_clause, params, dates) = Self::filters(&query);
        let sql = format!(
            "SELECT COUNT(*) as count FROM audit_events {}",
            where_clause
        );

        let mut query_builder = sqlx::query(&sql);
        for param in &params {
            query_builder = query_builder.bind(param);
        }
        for date in dates {
            query_builder = query_builder.bind(date);
        }

        let row = query_builder.fetch_one(&self.pool).await?;
        Ok(row.get::<i64, _>("count"))
    }

    // ==================== Retention Operations ====================

    async fn delete_before(&self, cutoff: DateTime<Utc>) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM audit_events WHERE event_date < ?")
            .bind(truncate_to_millis(cutoff))
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn count_before(&self, cutoff: DateTime<Utc>) -> DbResult<u64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM audit_events WHERE event_date < ?")
            .bind(truncate_to_millis(cutoff))
            .fetch_one(&self.pool)
            .await?;

        Ok(row.get::<i64, _>("count").max(0) as u64)
    }
}

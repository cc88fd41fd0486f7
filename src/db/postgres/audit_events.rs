use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow, types::Json};
use uuid::Uuid;

use crate::{
    db::{
        error::DbResult,
        repos::{AuditEventRepo, truncate_to_millis},
    },
    models::{AuditEvent, AuditEventQuery, CreateAuditEvent},
};

pub struct PostgresAuditEventRepo {
    write_pool: PgPool,
    read_pool: PgPool,
}

impl PostgresAuditEventRepo {
    pub fn new(write_pool: PgPool, read_pool: Option<PgPool>) -> Self {
        let read_pool = read_pool.unwrap_or_else(|| write_pool.clone());
        Self {
            write_pool,
            read_pool,
        }
    }

    fn event_from_row(row: &PgRow) -> AuditEvent {
        let data: Json<BTreeMap<String, String>> = row.get("data");
        AuditEvent {
            id: row.get("id"),
            principal: row.get("principal"),
            event_type: row.get("event_type"),
            event_date: row.get("event_date"),
            data: data.0,
        }
    }

    /// Build a WHERE clause with numbered placeholders, starting at `$1`.
    fn filters(query: &AuditEventQuery) -> (String, Vec<String>, Vec<DateTime<Utc>>) {
        let mut conditions = Vec::new();
        let mut params = Vec::new();
        let mut dates = Vec::new();

        if let Some(principal) = &query.principal {
            params.push(principal.clone());
            conditions.push(format!("principal = ${}", params.len()));
        }
        if let Some(event_type) = &query.event_type {
            params.push(event_type.clone());
            conditions.push(format!("event_type = ${}", params.len()));
        }
        if let Some(from) = query.from {
            dates.push(truncate_to_millis(from));
            conditions.push(format!("event_date >= ${}", params.len() + dates.len()));
        }
        if let Some(to) = query.to {
            dates.push(truncate_to_millis(to));
            conditions.push(format!("event_date < ${}", params.len() + dates.len()));
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
impl AuditEventRepo for PostgresAuditEventRepo {
    async fn save(&self, input: CreateAuditEvent) -> DbResult<AuditEvent> {
        let id = Uuid::new_v4();
        let event_date = truncate_to_millis(input.event_date);

        let row = sqlx::query(
            r#"
            INSERT INTO audit_events (id, principal, event_type, event_date, data)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, principal, event_type, event_date, data
            "#,
        )
        .bind(id)
        .bind(&input.principal)
        .bind(&input.event_type)
        .bind(event_date)
        .bind(Json(&input.data))
        .fetch_one(&self.write_pool)
        .await?;

        Ok(Self::event_from_row(&row))
    }

    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<AuditEvent>> {
        let row = sqlx::query(
            r#"
            SELECT id, principal, event_type, event_date, data
            FROM audit_events
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.read_pool)
        .await?;

        Ok(row.as_ref().map(Self::event_from_row))
    }

    async fn find_by_principal(&self, principal: &str) -> DbResult<Vec<AuditEvent>> {
        let rows = sqlx::query(
            r#"
            SELECT id, principal, event_type, event_date, data
            FROM audit_events
            WHERE principal = $1
            ORDER BY event_date DESC, id DESC
            "#,
        )
        .bind(principal)
        .fetch_all(&self.read_pool)
        .await?;

        Ok(rows.iter().map(Self::event_from_row).collect())
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
            LIMIT ${}
            "#,
            where_clause,
            params.len() + dates.len() + 1
        );

        let mut query_builder = sqlx::query(&sql);
        for param in &params {
            query_builder = query_builder.bind(param);
        }
        for date in dates {
            query_builder = query_builder.bind(date);
        }
        query_builder = query_builder.bind(limit);

        let rows = query_builder.fetch_all(&self.read_pool).await?;
        Ok(rows.iter().map(Self::event_from_row).collect())
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

        let row = query_builder.fetch_one(&self.read_pool).await?;
        Ok(row.get::<i64, _>("count"))
    }

    // ==================== Retention Operations ====================

    async fn delete_before(&self, cutoff: DateTime<Utc>) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM audit_events WHERE event_date < $1")
            .bind(truncate_to_millis(cutoff))
            .execute(&self.write_pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn count_before(&self, cutoff: DateTime<Utc>) -> DbResult<u64> {
        // Must see the same rows as delete_before, so no replica here.
        let row = sqlx::query("SELECT COUNT(*) as count FROM audit_events WHERE event_date < $1")
            .bind(truncate_to_millis(cutoff))
            .fetch_one(&self.write_pool)
            .await?;

        Ok(row.get::<i64, _>("count").max(0) as u64)
    }
}

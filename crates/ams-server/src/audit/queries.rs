//! Database queries for the audit trail

use sqlx::{PgPool, Postgres};
use tracing::debug;

use super::models::{
    AuditEntry, AuditQuery, NewAuditEntry, DEFAULT_AUDIT_QUERY_LIMIT, MAX_AUDIT_QUERY_LIMIT,
};

/// Insert a new audit trail entry.
///
/// Generic over the executor so the workflow coordinator can write inside
/// an open transaction while the recorder middleware writes on the pool.
pub async fn insert_audit_entry<'e, E>(
    executor: E,
    entry: NewAuditEntry,
) -> Result<AuditEntry, sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Postgres>,
{
    let record = sqlx::query_as::<_, AuditEntry>(
        r#"
        INSERT INTO audit_trail (
            user_id, username, user_email, full_name,
            action, table_name, record_id,
            old_values, new_values,
            ip_address, user_agent, request_method, request_path,
            response_status, duration_ms, error_message, extra
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
        RETURNING id, user_id, username, user_email, full_name,
                  action, table_name, record_id, old_values, new_values,
                  ip_address, user_agent, request_method, request_path,
                  response_status, duration_ms, error_message, extra, created_at
        "#,
    )
    .bind(entry.actor.user_id)
    .bind(&entry.actor.username)
    .bind(&entry.actor.user_email)
    .bind(&entry.actor.full_name)
    .bind(entry.action.as_str())
    .bind(entry.table_name.map(|t| t.as_str()))
    .bind(entry.record_id)
    .bind(&entry.old_values)
    .bind(&entry.new_values)
    .bind(&entry.ip_address)
    .bind(&entry.user_agent)
    .bind(&entry.request_method)
    .bind(&entry.request_path)
    .bind(entry.response_status)
    .bind(entry.duration_ms)
    .bind(&entry.error_message)
    .bind(&entry.extra)
    .fetch_one(executor)
    .await?;

    debug!(
        audit_id = %record.id,
        action = %record.action,
        table = ?record.table_name,
        "Created audit trail entry"
    );

    Ok(record)
}

/// Query the audit trail with filters.
pub async fn query_audit_entries(
    pool: &PgPool,
    query: AuditQuery,
) -> Result<Vec<AuditEntry>, sqlx::Error> {
    let limit = query.limit.clamp(1, MAX_AUDIT_QUERY_LIMIT);

    let mut sql = String::from(
        r#"
        SELECT id, user_id, username, user_email, full_name,
               action, table_name, record_id, old_values, new_values,
               ip_address, user_agent, request_method, request_path,
               response_status, duration_ms, error_message, extra, created_at
        FROM audit_trail
        WHERE 1=1
        "#,
    );

    let mut bind_count = 1;
    let mut conditions = Vec::new();

    if query.user_id.is_some() {
        conditions.push(format!("user_id = ${}", bind_count));
        bind_count += 1;
    }
    if query.action.is_some() {
        conditions.push(format!("action = ${}", bind_count));
        bind_count += 1;
    }
    if query.table_name.is_some() {
        conditions.push(format!("table_name = ${}", bind_count));
        bind_count += 1;
    }
    if query.record_id.is_some() {
        conditions.push(format!("record_id = ${}", bind_count));
        bind_count += 1;
    }
    if query.start_time.is_some() {
        conditions.push(format!("created_at >= ${}", bind_count));
        bind_count += 1;
    }
    if query.end_time.is_some() {
        conditions.push(format!("created_at <= ${}", bind_count));
        bind_count += 1;
    }

    for condition in conditions {
        sql.push_str(" AND ");
        sql.push_str(&condition);
    }

    sql.push_str(" ORDER BY created_at DESC");
    sql.push_str(&format!(" LIMIT ${}", bind_count));
    bind_count += 1;
    sql.push_str(&format!(" OFFSET ${}", bind_count));

    let mut query_builder = sqlx::query_as::<_, AuditEntry>(&sql);

    if let Some(user_id) = query.user_id {
        query_builder = query_builder.bind(user_id);
    }
    if let Some(action) = query.action {
        query_builder = query_builder.bind(action);
    }
    if let Some(table_name) = query.table_name {
        query_builder = query_builder.bind(table_name);
    }
    if let Some(record_id) = query.record_id {
        query_builder = query_builder.bind(record_id);
    }
    if let Some(start_time) = query.start_time {
        query_builder = query_builder.bind(start_time);
    }
    if let Some(end_time) = query.end_time {
        query_builder = query_builder.bind(end_time);
    }

    let records = query_builder
        .bind(limit)
        .bind(query.offset.max(0))
        .fetch_all(pool)
        .await?;

    debug!(count = records.len(), "Queried audit trail");

    Ok(records)
}

/// All audit entries for a single record, newest first.
pub async fn record_trail(
    pool: &PgPool,
    table_name: &str,
    record_id: i64,
    limit: Option<i64>,
) -> Result<Vec<AuditEntry>, sqlx::Error> {
    let limit = limit
        .unwrap_or(DEFAULT_AUDIT_QUERY_LIMIT)
        .clamp(1, MAX_AUDIT_QUERY_LIMIT);

    let records = sqlx::query_as::<_, AuditEntry>(
        r#"
        SELECT id, user_id, username, user_email, full_name,
               action, table_name, record_id, old_values, new_values,
               ip_address, user_agent, request_method, request_path,
               response_status, duration_ms, error_message, extra, created_at
        FROM audit_trail
        WHERE table_name = $1 AND record_id = $2
        ORDER BY created_at DESC
        LIMIT $3
        "#,
    )
    .bind(table_name)
    .bind(record_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    debug!(
        table = table_name,
        record_id,
        count = records.len(),
        "Retrieved record audit trail"
    );

    Ok(records)
}

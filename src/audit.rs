//! Append-only trail of privileged and money-affecting actions.

use serde_json::Value;
use uuid::Uuid;

use crate::{db::DbPool, error::AppResult};

async fn insert_entry(
    pool: &DbPool,
    actor_id: Uuid,
    action: &str,
    resource: &str,
    metadata: &Value,
) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO audit_logs (id, user_id, action, resource, metadata)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(actor_id)
    .bind(action)
    .bind(resource)
    .bind(metadata)
    .execute(pool)
    .await?;
    Ok(())
}

/// Writes an audit entry. A failure is logged and never reaches the caller.
pub async fn record(pool: &DbPool, actor_id: Uuid, action: &str, resource: &str, metadata: Value) {
    if let Err(err) = insert_entry(pool, actor_id, action, resource, &metadata).await {
        tracing::warn!(error = %err, %actor_id, action, resource, "audit log failed");
    }
}

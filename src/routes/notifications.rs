// src/routes/notifications.rs

use axum::{extract::{Query, State}, Json};
use serde::Deserialize;
use sqlx::query_as;
use crate::{AppState, models::Notification};
use super::internal_error;

#[derive(Deserialize)]
pub struct ListQ {
    pub employee_id: Option<i64>,
    pub unconsumed_only: Option<bool>,
}

/// Outbox inspection. Delivery is owned by a separate worker that stamps
/// consumed_at; this endpoint only reads.
pub async fn list_notifications(
    State(state): State<AppState>,
    Query(q): Query<ListQ>,
) -> Result<Json<Vec<Notification>>, (axum::http::StatusCode, String)> {
    let unconsumed_only = q.unconsumed_only.unwrap_or(false);
    let rows = query_as::<_, Notification>(
        r#"
        SELECT notification_id, target_employee_id, notification_type, payload, created_at, consumed_at
        FROM public.notifications
        WHERE ($1::bigint IS NULL OR target_employee_id = $1)
          AND (NOT $2 OR consumed_at IS NULL)
        ORDER BY notification_id DESC
        "#
    )
    .bind(q.employee_id)
    .bind(unconsumed_only)
    .fetch_all(&state.pool)
    .await
    .map_err(internal_error)?;
    Ok(Json(rows))
}

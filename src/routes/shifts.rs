// src/routes/shifts.rs

use axum::{extract::{Query, State}, Json};
use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::query_as;
use crate::{AppState, models::Shift};
use super::internal_error;

#[derive(Deserialize)]
pub struct ListQ {
    pub branch_id: i64,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

pub async fn list_shifts(
    State(state): State<AppState>,
    Query(q): Query<ListQ>,
) -> Result<Json<Vec<Shift>>, (axum::http::StatusCode, String)> {
    let rows = query_as::<_, Shift>(
        r#"
        SELECT shift_id, branch_id, employee_id, role_key, start_at, end_at, schedule_run_id, created_at
        FROM public.shifts
        WHERE branch_id = $1
          AND ($2::date IS NULL OR start_at >= $2::date)
          AND ($3::date IS NULL OR start_at < ($3::date + 1))
        ORDER BY start_at, employee_id
        "#
    )
    .bind(q.branch_id)
    .bind(q.from)
    .bind(q.to)
    .fetch_all(&state.pool)
    .await
    .map_err(internal_error)?;
    Ok(Json(rows))
}

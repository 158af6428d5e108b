// src/routes/availability.rs

use axum::{extract::State, Json};
use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::query;
use crate::AppState;
use super::{bad_request, internal_error};

#[derive(Deserialize)]
pub struct RuleUpsertItem {
    pub employee_id: i64,
    pub weekday: i16, // 0 = Monday .. 6 = Sunday
    pub start_hour: i32,
    pub end_hour: i32,
}

pub async fn bulk_upsert_rules(
    State(state): State<AppState>,
    Json(items): Json<Vec<RuleUpsertItem>>,
) -> Result<Json<serde_json::Value>, (axum::http::StatusCode, String)> {
    for it in &items {
        if !(0..7).contains(&it.weekday) {
            return Err(bad_request(format!("weekday {} out of range 0..7", it.weekday)));
        }
        if !(0..24).contains(&it.start_hour) || !(1..=24).contains(&it.end_hour) || it.end_hour <= it.start_hour {
            return Err(bad_request(format!(
                "invalid window [{},{})", it.start_hour, it.end_hour
            )));
        }
    }

    let mut tx = state.pool.begin().await.map_err(internal_error)?;
    for it in &items {
        query(
            r#"
            INSERT INTO public.availability_rules(employee_id, weekday, start_hour, end_hour)
            VALUES ($1,$2,$3,$4)
            ON CONFLICT (employee_id, weekday, start_hour)
            DO UPDATE SET end_hour = EXCLUDED.end_hour
            "#
        )
        .bind(it.employee_id)
        .bind(it.weekday)
        .bind(it.start_hour)
        .bind(it.end_hour)
        .execute(&mut *tx).await.map_err(internal_error)?;
    }
    tx.commit().await.map_err(internal_error)?;
    Ok(Json(serde_json::json!({"upserted": true, "count": items.len()})))
}

#[derive(Deserialize)]
pub struct ExceptionUpsertItem {
    pub employee_id: i64,
    pub day: NaiveDate,
    pub is_available: bool,
}

pub async fn bulk_upsert_exceptions(
    State(state): State<AppState>,
    Json(items): Json<Vec<ExceptionUpsertItem>>,
) -> Result<Json<serde_json::Value>, (axum::http::StatusCode, String)> {
    let mut tx = state.pool.begin().await.map_err(internal_error)?;
    for it in &items {
        query(
            r#"
            INSERT INTO public.availability_exceptions(employee_id, day, is_available)
            VALUES ($1,$2,$3)
            ON CONFLICT (employee_id, day)
            DO UPDATE SET is_available = EXCLUDED.is_available
            "#
        )
        .bind(it.employee_id)
        .bind(it.day)
        .bind(it.is_available)
        .execute(&mut *tx).await.map_err(internal_error)?;
    }
    tx.commit().await.map_err(internal_error)?;
    Ok(Json(serde_json::json!({"upserted": true, "count": items.len()})))
}

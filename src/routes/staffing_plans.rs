// src/routes/staffing_plans.rs

use axum::{extract::{Path, Query, State}, Json};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{query, query_as};
use crate::{AppState, models::{PlanStatus, StaffingPlan, StaffingPlanLine}};
use super::{bad_request, internal_error, not_found};

#[derive(Deserialize)]
pub struct PlanLineItem {
    pub hour: i32,
    pub role_key: String,
    pub suggested_headcount: i32,
}

#[derive(Deserialize)]
pub struct UpsertPlanBody {
    pub day: NaiveDate,
    pub status: PlanStatus,
    pub lines: Vec<PlanLineItem>,
}

#[derive(Serialize)]
pub struct PlanEnvelope {
    pub plan: StaffingPlan,
    pub lines: Vec<StaffingPlanLine>,
}

/// Replaces the branch-day plan for the given status wholesale: one plan row,
/// all lines swapped in a single transaction.
pub async fn upsert_plan(
    State(state): State<AppState>,
    Path(branch_id): Path<i64>,
    Json(b): Json<UpsertPlanBody>,
) -> Result<Json<PlanEnvelope>, (axum::http::StatusCode, String)> {
    for l in &b.lines {
        if !(0..24).contains(&l.hour) {
            return Err(bad_request(format!("hour {} out of range 0..24", l.hour)));
        }
        if l.suggested_headcount < 0 {
            return Err(bad_request("suggested_headcount must be >= 0"));
        }
    }

    let mut tx = state.pool.begin().await.map_err(internal_error)?;

    let plan = query_as::<_, StaffingPlan>(
        r#"
        INSERT INTO public.staffing_plans(branch_id, day, status)
        VALUES ($1,$2,$3)
        ON CONFLICT (branch_id, day, status) DO UPDATE SET status = EXCLUDED.status
        RETURNING staffing_plan_id, branch_id, day, status, created_at
        "#
    )
    .bind(branch_id).bind(b.day).bind(b.status)
    .fetch_one(&mut *tx).await.map_err(internal_error)?;

    query(r#"DELETE FROM public.staffing_plan_lines WHERE staffing_plan_id=$1"#)
        .bind(plan.staffing_plan_id)
        .execute(&mut *tx).await.map_err(internal_error)?;

    for l in &b.lines {
        query(
            r#"
            INSERT INTO public.staffing_plan_lines(staffing_plan_id, hour, role_key, suggested_headcount)
            VALUES ($1,$2,$3,$4)
            "#
        )
        .bind(plan.staffing_plan_id)
        .bind(l.hour)
        .bind(&l.role_key)
        .bind(l.suggested_headcount)
        .execute(&mut *tx).await.map_err(internal_error)?;
    }

    tx.commit().await.map_err(internal_error)?;

    let lines = query_as::<_, StaffingPlanLine>(
        r#"SELECT * FROM public.staffing_plan_lines WHERE staffing_plan_id=$1 ORDER BY hour, role_key"#
    )
    .bind(plan.staffing_plan_id)
    .fetch_all(&state.pool).await.map_err(internal_error)?;

    Ok(Json(PlanEnvelope { plan, lines }))
}

#[derive(Deserialize)]
pub struct GetPlanQ {
    pub day: NaiveDate,
}

/// The plan the generator would consume: PUBLISHED preferred over DRAFT.
pub async fn get_plan(
    State(state): State<AppState>,
    Path(branch_id): Path<i64>,
    Query(q): Query<GetPlanQ>,
) -> Result<Json<PlanEnvelope>, (axum::http::StatusCode, String)> {
    let plan = query_as::<_, StaffingPlan>(
        r#"
        SELECT * FROM public.staffing_plans
        WHERE branch_id=$1 AND day=$2
        ORDER BY (status = 'PUBLISHED') DESC, staffing_plan_id DESC
        LIMIT 1
        "#
    )
    .bind(branch_id).bind(q.day)
    .fetch_optional(&state.pool).await.map_err(internal_error)?
    .ok_or_else(|| not_found(format!("staffing plan for branch {branch_id} on {}", q.day)))?;

    let lines = query_as::<_, StaffingPlanLine>(
        r#"SELECT * FROM public.staffing_plan_lines WHERE staffing_plan_id=$1 ORDER BY hour, role_key"#
    )
    .bind(plan.staffing_plan_id)
    .fetch_all(&state.pool).await.map_err(internal_error)?;

    Ok(Json(PlanEnvelope { plan, lines }))
}

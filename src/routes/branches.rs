// src/routes/branches.rs

use axum::{extract::{Path, State}, Json};
use serde::Deserialize;
use sqlx::query_as;
use crate::{AppState, models::Branch};
use super::internal_error;

#[derive(Deserialize)]
pub struct CreateBranchBody {
    pub name: String,
    pub time_zone: Option<String>, // IANA name, e.g. "Africa/Kampala"
}

pub async fn create_branch(
    State(state): State<AppState>,
    Path(org_id): Path<i64>,
    Json(body): Json<CreateBranchBody>,
) -> Result<Json<Branch>, (axum::http::StatusCode, String)> {
    let row = query_as::<_, Branch>(
        r#"
        INSERT INTO public.branches(organization_id, name, time_zone)
        VALUES ($1,$2,$3)
        RETURNING branch_id, organization_id, name, time_zone
        "#
    )
    .bind(org_id)
    .bind(&body.name)
    .bind(&body.time_zone)
    .fetch_one(&state.pool).await.map_err(internal_error)?;
    Ok(Json(row))
}

pub async fn list_branches_for_org(
    State(state): State<AppState>,
    Path(org_id): Path<i64>,
) -> Result<Json<Vec<Branch>>, (axum::http::StatusCode, String)> {
    let rows = query_as::<_, Branch>(
        r#"
        SELECT branch_id, organization_id, name, time_zone
        FROM public.branches
        WHERE organization_id = $1
        ORDER BY branch_id DESC
        "#
    )
    .bind(org_id)
    .fetch_all(&state.pool).await.map_err(internal_error)?;
    Ok(Json(rows))
}

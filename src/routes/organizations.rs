// src/routes/organizations.rs

use axum::{extract::{Query, State}, Json};
use serde::Deserialize;
use sqlx::query_as;
use crate::AppState;
use crate::models::Organization;
use super::internal_error;

#[derive(Deserialize)]
pub struct ListQ {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Deserialize)]
pub struct CreateOrgBody {
    pub name: String,
}

pub async fn list_orgs(
    State(state): State<AppState>,
    Query(q): Query<ListQ>,
) -> Result<Json<Vec<Organization>>, (axum::http::StatusCode, String)> {
    let limit = q.limit.unwrap_or(50).clamp(1, 500);
    let offset = q.offset.unwrap_or(0).max(0);
    let rows = query_as::<_, Organization>(
        r#"SELECT * FROM public.organizations ORDER BY created_at DESC LIMIT $1 OFFSET $2"#
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(&state.pool).await.map_err(internal_error)?;
    Ok(Json(rows))
}

pub async fn create_org(
    State(state): State<AppState>,
    Json(body): Json<CreateOrgBody>,
) -> Result<Json<Organization>, (axum::http::StatusCode, String)> {
    let row = query_as::<_, Organization>(
        r#"
        INSERT INTO public.organizations(name)
        VALUES ($1)
        RETURNING organization_id, name, created_at
        "#
    )
    .bind(&body.name)
    .fetch_one(&state.pool).await.map_err(internal_error)?;
    Ok(Json(row))
}

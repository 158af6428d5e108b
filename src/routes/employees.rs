// src/routes/employees.rs

use axum::{extract::{Path, State}, Json};
use serde::Deserialize;
use sqlx::query_as;
use crate::{AppState, models::Employee};
use super::internal_error;

#[derive(Deserialize)]
pub struct CreateEmployeeBody {
    pub full_name: String,
    pub role_key: String,
    pub is_active: Option<bool>,
}

pub async fn create_employee(
    State(state): State<AppState>,
    Path(branch_id): Path<i64>,
    Json(b): Json<CreateEmployeeBody>,
) -> Result<Json<Employee>, (axum::http::StatusCode, String)> {
    let row = query_as::<_, Employee>(
        r#"
        INSERT INTO public.employees(branch_id, full_name, role_key, is_active)
        VALUES ($1,$2,$3, COALESCE($4, TRUE))
        RETURNING employee_id, branch_id, full_name, role_key, is_active
        "#
    )
    .bind(branch_id).bind(b.full_name).bind(b.role_key).bind(b.is_active)
    .fetch_one(&state.pool).await.map_err(internal_error)?;
    Ok(Json(row))
}

pub async fn list_employees_by_branch(
    State(state): State<AppState>,
    Path(branch_id): Path<i64>,
) -> Result<Json<Vec<Employee>>, (axum::http::StatusCode, String)> {
    let rows = query_as::<_, Employee>(
        r#"SELECT * FROM public.employees WHERE branch_id=$1 ORDER BY employee_id"#)
        .bind(branch_id).fetch_all(&state.pool).await.map_err(internal_error)?;
    Ok(Json(rows))
}

#[derive(Deserialize)]
pub struct PatchEmployeeBody {
    pub full_name: Option<String>,
    pub role_key: Option<String>,
    pub is_active: Option<bool>,
}

pub async fn patch_employee(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(b): Json<PatchEmployeeBody>,
) -> Result<Json<Employee>, (axum::http::StatusCode, String)> {
    let row = query_as::<_, Employee>(
        r#"
        UPDATE public.employees SET
          full_name = COALESCE($2, full_name),
          role_key = COALESCE($3, role_key),
          is_active = COALESCE($4, is_active)
        WHERE employee_id = $1
        RETURNING employee_id, branch_id, full_name, role_key, is_active
        "#
    )
    .bind(id).bind(b.full_name).bind(b.role_key).bind(b.is_active)
    .fetch_one(&state.pool).await.map_err(internal_error)?;
    Ok(Json(row))
}

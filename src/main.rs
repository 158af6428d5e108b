// src/main.rs

use std::env;

use axum::{
    routing::{get, patch, post, put},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::EnvFilter;

use shiftgen_api::{db, routes, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from .env if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Initialize DB pool
    let pool = db::connect().await?;
    let state = AppState { pool };

    // Very permissive CORS for local dev (tighten for prod)
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Root API router
    let api = Router::new()
        // health
        .route("/health", get(routes::health::health))
        // organizations
        .route(
            "/api/v1/organizations",
            post(routes::organizations::create_org).get(routes::organizations::list_orgs),
        )
        // branches
        .route(
            "/api/v1/organizations/:org_id/branches",
            post(routes::branches::create_branch).get(routes::branches::list_branches_for_org),
        )
        // employees
        .route(
            "/api/v1/branches/:branch_id/employees",
            post(routes::employees::create_employee)
                .get(routes::employees::list_employees_by_branch),
        )
        .route(
            "/api/v1/employees/:id",
            patch(routes::employees::patch_employee),
        )
        // availability
        .route(
            "/api/v1/availability-rules/bulk",
            post(routes::availability::bulk_upsert_rules),
        )
        .route(
            "/api/v1/availability-exceptions/bulk",
            post(routes::availability::bulk_upsert_exceptions),
        )
        // staffing plans
        .route(
            "/api/v1/branches/:branch_id/staffing-plans",
            put(routes::staffing_plans::upsert_plan).get(routes::staffing_plans::get_plan),
        )
        // schedule runs
        .route(
            "/api/v1/branches/:branch_id/schedule-runs",
            post(routes::runs::generate_run).get(routes::runs::latest_run),
        )
        .route("/api/v1/schedule-runs", get(routes::runs::list_runs))
        .route("/api/v1/schedule-runs/:id", get(routes::runs::get_run))
        .route("/api/v1/schedule-runs/:id/void", post(routes::runs::void_run))
        .route("/api/v1/schedule-runs/:id/apply", post(routes::runs::apply_run))
        .route(
            "/api/v1/schedule-runs/:id/publish",
            post(routes::runs::publish_run),
        )
        // outputs
        .route("/api/v1/shifts", get(routes::shifts::list_shifts))
        .route(
            "/api/v1/notifications",
            get(routes::notifications::list_notifications),
        )
        // state & middleware
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8080);

    let addr = format!("0.0.0.0:{port}");
    let listener = TcpListener::bind(&addr).await?;

    tracing::info!("API listening on http://127.0.0.1:{port}");

    axum::serve(listener, api.into_make_service()).await?;
    Ok(())
}

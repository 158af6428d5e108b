// src/lib.rs

use sqlx::{Pool, Postgres};

pub mod db;
pub mod engine;
pub mod models;
pub mod routes;

#[derive(Clone)]
pub struct AppState {
    pub pool: Pool<Postgres>,
}

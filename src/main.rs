use std::sync::Arc;

use anyhow::Result;
use askama::Template;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Router,
};
use config::{builder::DefaultState, ConfigBuilder, ConfigError, Environment, File};
use log::{error, info};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_http::services::ServeDir;

use routes::{RouteTable, ROUTES};

mod api;
mod database;
mod models;
mod routes;
mod util;
mod views;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub bind_address: String,
    /// Deployment prefix for every page URL.
    pub base_url: String,
}

impl AppConfig {
    pub fn new() -> Result<Self, ConfigError> {
        let builder = ConfigBuilder::<DefaultState>::default()
            .set_default("database_url", "sqlite://data/posts.db?mode=rwc")?
            .set_default("database_max_connections", 5_i64)?
            .set_default("bind_address", "0.0.0.0:3000")?
            .set_default("base_url", "/")?
            .add_source(File::with_name("config/default.toml").required(false))
            .add_source(Environment::with_prefix("APP").separator("__"))
            .build()?;

        builder.try_deserialize::<AppConfig>()
    }
}

pub struct AppState {
    pub pool: SqlitePool,
    pub routes: RouteTable,
}

// Make our own error that wraps `anyhow::Error`.
pub struct AppError(anyhow::Error);

#[derive(Template)]
#[template(path = "error.html")]
struct ErrorPageTemplate {
    message: String,
    status_code: StatusCode,
}

// Tell axum how to convert `AppError` into a response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!("request failed: {:#}", self.0);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorPageTemplate {
                status_code: StatusCode::INTERNAL_SERVER_ERROR,
                message: self.0.to_string(),
            },
        )
            .into_response()
    }
}

// This enables using `?` on functions that return `Result<_, anyhow::Error>` to turn them into
// `Result<_, AppError>`. That way you don't need to do that manually.
impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

fn build_app(state: Arc<AppState>) -> Router {
    let static_path = format!("{}/static", state.routes.base());
    Router::new()
        .merge(api::get_routes())
        .nest_service(&static_path, ServeDir::new("static"))
        .fallback(views::dispatch)
        .layer(Extension(state))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    pretty_env_logger::init();

    let config = AppConfig::new()?;
    let routes = RouteTable::new(&config.base_url, ROUTES)?;
    for route in routes.routes() {
        info!("route {:<8} {}{} -> {}", route.name, routes.base(), route.path, route.page);
    }
    let pool = database::init_pool(&config.database_url, config.database_max_connections).await?;

    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    let state = Arc::new(AppState { pool, routes });
    let app = build_app(state);

    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_open_database_read_write_create() {
        let config = AppConfig::new().unwrap();
        assert_eq!(config.database_url, "sqlite://data/posts.db?mode=rwc");
        assert_eq!(config.database_max_connections, 5);
        assert_eq!(config.base_url, "/");
    }
}

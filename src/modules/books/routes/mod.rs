use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::Html,
    routing::get,
    Json, Router,
};
use lendtable_http::error::AppError;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::RwLock;

use super::models::{QueryError, TableQuery};
use super::table::{LendingTable, TablePage};
use super::view;

/// The mounted table shared by every request; each request works on a clone.
pub type SharedTable = Arc<RwLock<LendingTable>>;

/// Query parameters as they arrive from a header link or the search form.
#[derive(Debug, Default, Deserialize)]
pub struct TableParams {
    pub sort: Option<String>,
    pub dir: Option<String>,
    pub q: Option<String>,
}

pub fn router(table: SharedTable) -> Router {
    Router::new()
        .route("/", get(list_books))
        .route("/table", get(table_page))
        .route("/health", get(health_check))
        .with_state(table)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "books module is healthy"
}

/// Displayed records as JSON
async fn list_books(
    State(table): State<SharedTable>,
    Query(params): Query<TableParams>,
) -> Result<Json<TablePage>, AppError> {
    let session = session(&table, &params).await?;
    Ok(Json(session.page()))
}

/// The table as an HTML page
async fn table_page(
    State(table): State<SharedTable>,
    Query(params): Query<TableParams>,
) -> Result<Html<String>, AppError> {
    let session = session(&table, &params).await?;
    Ok(Html(view::render_page(&session)))
}

async fn session(table: &SharedTable, params: &TableParams) -> Result<LendingTable, AppError> {
    let query = TableQuery::parse(
        params.sort.as_deref(),
        params.dir.as_deref(),
        params.q.as_deref(),
    )
    .map_err(invalid_query)?;

    let mut session = table.read().await.clone();
    session.apply(&query);
    Ok(session)
}

fn invalid_query(err: QueryError) -> AppError {
    AppError::validation(
        vec![json!({"field": err.field(), "error": err.to_string()})],
        "invalid table query",
    )
}

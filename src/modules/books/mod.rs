pub mod filter;
pub mod loader;
pub mod models;
pub mod routes;
pub mod sort;
pub mod table;
pub mod view;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use lendtable_kernel::{settings::DataSettings, InitCtx, Module};
use serde_json::json;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;

use crate::utils;
use loader::BookSource;
use routes::SharedTable;
use table::LendingTable;

/// Serves the lending table, loading its records once in the background at start
pub struct BooksModule {
    source: Arc<dyn BookSource>,
    table: SharedTable,
    loader: Mutex<Option<JoinHandle<()>>>,
}

impl BooksModule {
    pub fn new(source: Arc<dyn BookSource>) -> Self {
        Self {
            source,
            table: Arc::new(RwLock::new(LendingTable::new())),
            loader: Mutex::new(None),
        }
    }

    /// Handle on the shared table, for embedding and tests
    pub fn table(&self) -> SharedTable {
        self.table.clone()
    }

    /// Wait for the background load, if one is running
    pub async fn loaded(&self) {
        if let Some(handle) = self.loader.lock().await.take() {
            if let Err(err) = handle.await {
                tracing::error!(%err, "book loader task failed");
            }
        }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            prefix = %utils::log_prefix(self.name()),
            environment = ?ctx.settings.environment,
            source = self.source.location(),
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.table.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let params = json!([
            {
                "name": "sort",
                "in": "query",
                "required": false,
                "schema": { "$ref": "#/components/schemas/SortKey" }
            },
            {
                "name": "dir",
                "in": "query",
                "required": false,
                "schema": { "type": "string", "enum": ["asc", "desc"] }
            },
            {
                "name": "q",
                "in": "query",
                "required": false,
                "description": "Case-insensitive match on title or author",
                "schema": { "type": "string" }
            }
        ]);
        let validation_error = json!({
            "description": "Unknown sort key or direction",
            "content": {
                "application/json": {
                    "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                }
            }
        });

        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "Displayed books",
                        "tags": ["Books"],
                        "parameters": params.clone(),
                        "responses": {
                            "200": {
                                "description": "Table state and displayed books",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/TablePage" }
                                    }
                                }
                            },
                            "422": validation_error.clone()
                        }
                    }
                },
                "/table": {
                    "get": {
                        "summary": "Lending table page",
                        "tags": ["Books"],
                        "parameters": params,
                        "responses": {
                            "200": {
                                "description": "HTML table with sort triggers and search",
                                "content": { "text/html": { "schema": { "type": "string" } } }
                            },
                            "422": validation_error
                        }
                    }
                },
                "/health": {
                    "get": {
                        "summary": "Books health check",
                        "tags": ["Books"],
                        "responses": {
                            "200": {
                                "description": "OK",
                                "content": { "text/plain": { "schema": { "type": "string" } } }
                            }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "SortKey": {
                        "type": "string",
                        "enum": [
                            "id",
                            "title",
                            "author",
                            "publicationYear",
                            "dateBorrowed",
                            "borrowStatus"
                        ]
                    },
                    "Book": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer" },
                            "title": { "type": "string" },
                            "author": { "type": "string" },
                            "publicationYear": { "type": "integer" },
                            "dateBorrowed": { "type": "string", "format": "date" },
                            "borrowStatus": { "type": "string", "enum": ["Available", "On loan"] }
                        },
                        "required": [
                            "id",
                            "title",
                            "author",
                            "publicationYear",
                            "dateBorrowed",
                            "borrowStatus"
                        ]
                    },
                    "TablePage": {
                        "type": "object",
                        "properties": {
                            "loading": { "type": "boolean" },
                            "sort": {
                                "type": "object",
                                "properties": {
                                    "key": { "$ref": "#/components/schemas/SortKey" },
                                    "direction": { "type": "string", "enum": ["asc", "desc"] }
                                }
                            },
                            "keyword": { "type": "string" },
                            "books": {
                                "type": "array",
                                "items": { "$ref": "#/components/schemas/Book" }
                            }
                        },
                        "required": ["loading", "keyword", "books"]
                    }
                }
            }
        }))
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let source = self.source.clone();
        let table = self.table.clone();

        // Fetch outside the lock so requests see the loading state meanwhile.
        let handle = tokio::spawn(async move {
            let result = loader::load_books(source.as_ref()).await;
            table.write().await.complete_load(source.location(), result);
        });
        *self.loader.lock().await = Some(handle);

        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        if let Some(handle) = self.loader.lock().await.take() {
            handle.abort();
        }
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Create a books module reading from the configured data source
pub fn create_module(settings: &DataSettings) -> anyhow::Result<Arc<BooksModule>> {
    let source = loader::source_for(
        &settings.source,
        Duration::from_millis(settings.fetch_timeout_ms),
    )?;
    Ok(Arc::new(BooksModule::new(Arc::from(source))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lendtable_kernel::settings::Settings;

    const DOCUMENT: &str = r#"[
        {"id":2,"title":"Waterworld","author":"Jenny Spikes","publicationYear":2004,"dateBorrowed":"2025-10-01","borrowStatus":"On loan"},
        {"id":1,"title":"Daisies in the field","author":"Alex Johnson","publicationYear":1992,"dateBorrowed":"2025-09-06","borrowStatus":"Available"}
    ]"#;

    #[tokio::test]
    async fn start_loads_table_in_background() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("books.json");
        std::fs::write(&file, DOCUMENT).unwrap();

        let module = BooksModule::new(Arc::new(loader::FileSource::new(&file)));
        assert!(module.table().read().await.is_loading());

        let settings = Settings::default();
        let ctx = InitCtx {
            settings: &settings,
        };
        module.init(&ctx).await.unwrap();
        module.start(&ctx).await.unwrap();
        module.loaded().await;

        let table = module.table();
        let table = table.read().await;
        assert!(!table.is_loading());
        assert_eq!(table.displayed().len(), 2);
        module.stop().await.unwrap();
    }

    #[tokio::test]
    async fn failed_background_load_leaves_empty_table() {
        let dir = tempfile::tempdir().unwrap();
        let module = BooksModule::new(Arc::new(loader::FileSource::new(
            dir.path().join("missing.json"),
        )));

        let settings = Settings::default();
        let ctx = InitCtx {
            settings: &settings,
        };
        module.start(&ctx).await.unwrap();
        module.loaded().await;

        let table = module.table();
        let table = table.read().await;
        assert!(!table.is_loading());
        assert!(table.displayed().is_empty());
    }

    #[test]
    fn openapi_fragment_declares_table_page() {
        let module = create_module(&DataSettings::default()).unwrap();
        let spec = module.openapi().unwrap();
        assert!(spec["paths"]["/table"]["get"].is_object());
        assert!(spec["components"]["schemas"]["TablePage"].is_object());
    }
}

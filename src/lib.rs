//! lendtable application library
//!
//! The book-lending table module plus the bootstrap that wires it into the
//! kernel registry and the HTTP server.

pub mod modules;
pub mod utils;

use anyhow::Context;
use lendtable_kernel::{settings::Settings, InitCtx, ModuleRegistry};

/// Re-export commonly used types
pub use modules::books::{
    loader::{BookSource, FileSource, HttpSource, LoadError},
    models::{Book, BorrowStatus, SortDirection, SortKey, SortState, TableQuery},
    table::LendingTable,
};

/// Build the registry with every project module registered
pub fn build_registry(settings: &Settings) -> anyhow::Result<ModuleRegistry> {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, settings)
        .with_context(|| "failed to register modules")?;
    Ok(registry)
}

/// Run the full server lifecycle: init, start, serve until ctrl-c, stop
pub async fn serve(settings: &Settings) -> anyhow::Result<()> {
    let registry = build_registry(settings)?;
    let ctx = InitCtx { settings };

    registry.init_modules(&ctx).await?;
    registry.start_modules(&ctx).await?;

    let served = lendtable_http::start_server(&registry, settings).await;

    registry.stop_modules().await?;
    served
}

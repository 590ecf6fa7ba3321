//! # Safra TUI
//!
//! Terminal front end for the Safra farm-planning client: the cascading
//! state → city → crop selection with the rendered technical sheet, and the
//! dashboard step that selects a plot and starts a planting plan.
//!
//! The architecture follows a message/update/effect loop: `app` holds all
//! state and pure update logic, `ui` renders it, and `runtime` owns the
//! terminal, routes input, and executes effects as background tasks.

mod app;
mod runtime;
mod ui;

use std::sync::Arc;

use anyhow::Result;
use safra_api::AgroClient;
use safra_engine::CatalogProvider;

/// Runs the TUI until the user quits.
///
/// `catalog` performs all backend fetches; `client` is consulted for the
/// anti-forgery token before mutating actions.
pub async fn run(catalog: Arc<dyn CatalogProvider>, client: AgroClient) -> Result<()> {
    runtime::run_app(catalog, client).await
}

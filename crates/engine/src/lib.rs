//! Decision logic for the Safra client.
//!
//! Everything that decides *what* happens — the selection cascade, the
//! technical-sheet view model, the plot-selection wizard state machine, and
//! the catalog of backend fetch operations — lives here, behind plain types
//! the front ends (TUI and CLI) render. The only I/O in this crate is the
//! [`catalog::HttpCatalog`] implementation of the [`catalog::CatalogProvider`]
//! seam; all state transitions are synchronous and fully testable in memory.

pub mod cascade;
pub mod catalog;
pub mod endpoints;
pub mod error;
pub mod ficha_view;
pub mod plan;
pub mod planos;

pub use cascade::{Cascade, DetailPanel, Level, LoadTicket, SelectorPhase};
pub use catalog::{CatalogProvider, HttpCatalog};
pub use endpoints::Endpoints;
pub use error::FetchError;
pub use ficha_view::{FichaField, FichaSection, FichaView};
pub use plan::{PlanWizard, Redirect, StatusLine, SubmitOrder, Submission, TerrenoDetail};
pub use planos::{PlanoStatusRole, PlanoView, PlanosPanel};

//! Utility helpers shared across the Safra crates.

mod paths;

pub use paths::{TemplateError, fill_path, validate_template};

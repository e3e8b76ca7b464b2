//! Request handlers for the catalog back-office.
//!
//! Each submodule provides async handler functions for one resource.
//! Handlers check shape with `validator`, domain rules with `catalog_core`,
//! then delegate to the corresponding repository in `catalog_db`; errors
//! map to the action envelope via [`AppError`](crate::error::AppError).

pub mod brands;
pub mod categories;
pub mod product_templates;
pub mod products;
pub mod templates;

//! Domain logic for the catalog back-office.
//!
//! Everything here is pure: no database access, no HTTP. The `catalog-db`
//! crate persists what these modules validate and plan, and `catalog-api`
//! wires both behind HTTP handlers.

pub mod category;
pub mod error;
pub mod listing;
pub mod product_template;
pub mod reconcile;
pub mod template;
pub mod types;
pub mod upload;

//! # Shoplens Loader
//!
//! This crate turns the six raw CSV exports (orders, order items, products,
//! customers, reviews, payments) into the typed, joined table the metrics run on.
//!
//! ## Architectural Principles
//!
//! - **Adapter:** All file-format knowledge lives here: column names, timestamp
//!   layouts, decimal parsing. The rest of the application only sees
//!   `core-types` records.
//! - **Typed Joins:** Rows are deserialized into structs and joined on explicit keys
//!   with explicit `Option`s for left-joined attributes.
//! - **Read-Only:** Files are never written, and nothing is cached between calls.
//!
//! ## Public API
//!
//! - `DataLoader`: locates and reads the files (`load`, `load_sales`).
//! - `Dataset`: the in-memory tables, with the join (`sales`) and the period lists
//!   the filter selectors are built from.
//! - `Table`: names one of the six inputs.
//! - `LoaderError`: `DataUnavailable`, `MalformedInput` and I/O failures.

// Declare the modules that constitute this crate.
pub mod dataset;
pub mod error;
mod reader;
pub mod schema;
pub mod source;

// Re-export the key components to create a clean, public-facing API.
pub use dataset::Dataset;
pub use error::LoaderError;
pub use schema::Table;
pub use source::DataLoader;

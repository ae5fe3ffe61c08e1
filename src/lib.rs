//! Fabric catalog cleanup toolkit.
//!
//! Two stages that share one record format:
//! - `clean`: extract structured metadata from scraped product rows with a
//!   chat model, details-block fields winning over model output
//! - `propose` / `apply`: reconcile free-text `fabric_type` labels against
//!   persistent knowledge bases, with a human review sheet between the
//!   automatic pass and the rewrite

pub mod cleaner;
pub mod cli;
pub mod config;
pub mod error;
pub mod library;
pub mod mapper;
pub mod pipeline;
pub mod records;
pub mod review;

pub use config::Config;
pub use error::{FabricMapError, Result};
pub use library::{CategoryCatalog, VariantLibrary};
pub use mapper::{auto_map_label, extract_labels, normalize_label, Resolution};
pub use pipeline::{apply, fold_review, propose, ReconcileContext};
pub use records::ProductRecord;

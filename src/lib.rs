// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod config;
pub mod error;
pub mod metrics;
pub mod rolling;

// Record loading (CSV, synthetic fallback, GKG pre-filter)
pub mod ingest;

// Feature derivation, cleaning and rollups
pub mod aggregate;
pub mod analyze;
pub mod clean;

// Outputs
pub mod export;
pub mod report;
pub mod store;

pub mod pipeline;

// ---- Re-exports for stable public API ----
pub use crate::analyze::{EsgCategory, SentimentCategory};
pub use crate::clean::CleanedArticle;
pub use crate::config::PipelineConfig;
pub use crate::error::{PipelineError, Result};
pub use crate::ingest::types::Article;
pub use crate::pipeline::{run, RunReport};

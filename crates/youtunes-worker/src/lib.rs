//! Trending-to-music pipeline.
//!
//! This crate provides:
//! - The run orchestrator ([`Pipeline`])
//! - Seams to the catalog, store, generation and notification services
//! - Bounded polling of audio generation jobs
//! - The in-process run lease
//! - Structured run logging

pub mod adapters;
pub mod config;
pub mod error;
pub mod events;
pub mod lease;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod poller;
pub mod traits;


pub use config::PipelineConfig;
pub use error::{PipelineError, PipelineResult};
pub use events::RunEvent;
pub use lease::{RunGuard, RunLease};
pub use logging::RunLogger;
pub use pipeline::{Pipeline, Services};

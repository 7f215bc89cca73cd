//! Supabase REST (PostgREST) client.
//!
//! This crate provides:
//! - Typed repositories for videos and tracks
//! - Service-key authentication
//! - Replay with backoff for the reads it serves
//! - Observability (tracing spans, metrics)

pub mod client;
pub mod error;
pub mod metrics;
pub mod repos;
pub mod retry;

#[cfg(test)]
mod client_tests;

pub use client::{SupabaseClient, SupabaseConfig};
pub use error::{DbError, DbResult};
pub use repos::{TrackRepository, VideoRepository};
pub use retry::{Read, ReadRetry};

//! Cloudflare R2 storage client.
//!
//! This crate provides:
//! - Audio upload to R2 under collision-resistant keys
//! - Object retrieval for the public file proxy
//! - Public URL construction for stored tracks

pub mod client;
pub mod error;
pub mod operations;

pub use client::{R2Client, R2Config, StoredObject};
pub use error::{StorageError, StorageResult};
pub use operations::AUDIO_CONTENT_TYPE;

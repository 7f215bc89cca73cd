//! Application state.

use std::sync::Arc;

use youtunes_db::{SupabaseClient, TrackRepository, VideoRepository};
use youtunes_storage::R2Client;
use youtunes_worker::{Pipeline, PipelineConfig, RunLease, Services};

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub storage: Arc<R2Client>,
    pub db: SupabaseClient,
    pub videos: VideoRepository,
    pub tracks: TrackRepository,
    pub pipeline: Arc<Pipeline>,
    pub lease: RunLease,
}

impl AppState {
    /// Create new application state.
    pub async fn new(config: ApiConfig) -> Result<Self, Box<dyn std::error::Error>> {
        if config.cron_secret.is_none() {
            return Err("CRON_SECRET not set".into());
        }

        let storage = R2Client::from_env().await?;
        let db = SupabaseClient::from_env()?;

        let services = Services::with_clients(storage.clone(), db.clone())?;
        let pipeline = Pipeline::new(PipelineConfig::from_env(), services);

        Ok(Self::from_parts(config, storage, db, pipeline))
    }

    /// Assemble state from already-built clients.
    pub fn from_parts(config: ApiConfig, storage: R2Client, db: SupabaseClient, pipeline: Pipeline) -> Self {
        Self {
            config,
            storage: Arc::new(storage),
            videos: VideoRepository::new(db.clone()),
            tracks: TrackRepository::new(db.clone()),
            db,
            pipeline: Arc::new(pipeline),
            lease: RunLease::new(),
        }
    }
}

//! Run orchestration.
//!
//! One run fetches the trending chart, takes the top `batch_size`
//! candidates and walks them in order: dedup, store the video, generate
//! metadata, generate and store audio, store the track. Item failures are
//! recorded and the batch continues; only a failed fetch aborts the run.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::Instrument;

use youtunes_db::SupabaseClient;
use youtunes_models::{
    is_valid_audio_url, track_object_key, Candidate, ItemOutcome, NewTrack, RunOutcome,
};
use youtunes_providers::{DiscordWebhook, OpenAiClient, ReplicateClient, YoutubeClient};
use youtunes_storage::R2Client;

use crate::adapters::{DiscordNotifier, NoopNotifier, SupabaseStore};
use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::events::RunEvent;
use crate::logging::RunLogger;
use crate::metrics::{record_item, record_run, record_upload_fallback};
use crate::poller::{wait_for_prediction, PollPolicy};
use crate::traits::{AudioGenerator, AudioStore, MetadataGenerator, Notifier, TrendingSource, VideoStore};

/// Everything a run talks to.
#[derive(Clone)]
pub struct Services {
    pub source: Arc<dyn TrendingSource>,
    pub store: Arc<dyn VideoStore>,
    pub metadata: Arc<dyn MetadataGenerator>,
    pub audio: Arc<dyn AudioGenerator>,
    pub audio_store: Arc<dyn AudioStore>,
    pub notifier: Arc<dyn Notifier>,
}

impl Services {
    /// Wire the production clients. Provider clients are configured from the
    /// environment; storage and store clients are passed in so callers that
    /// also serve stored audio can share them.
    pub fn with_clients(r2: R2Client, db: SupabaseClient) -> PipelineResult<Self> {
        let youtube = YoutubeClient::from_env().map_err(|e| PipelineError::config_error(e.to_string()))?;
        let openai = OpenAiClient::from_env().map_err(|e| PipelineError::config_error(e.to_string()))?;
        let replicate =
            ReplicateClient::from_env().map_err(|e| PipelineError::config_error(e.to_string()))?;

        let notifier: Arc<dyn Notifier> = match DiscordWebhook::from_env()
            .map_err(|e| PipelineError::config_error(e.to_string()))?
        {
            Some(webhook) => Arc::new(DiscordNotifier::new(webhook)),
            None => Arc::new(NoopNotifier),
        };

        Ok(Self {
            source: Arc::new(youtube),
            store: Arc::new(SupabaseStore::new(db)),
            metadata: Arc::new(openai),
            audio: Arc::new(replicate),
            audio_store: Arc::new(r2),
            notifier,
        })
    }
}

/// The batch orchestrator.
pub struct Pipeline {
    config: PipelineConfig,
    services: Services,
}

impl Pipeline {
    pub fn new(config: PipelineConfig, services: Services) -> Self {
        Self { config, services }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            interval: self.config.poll_interval,
            max_attempts: self.config.max_poll_attempts,
            deadline: self.config.poll_deadline,
        }
    }

    async fn emit(&self, logger: &RunLogger, event: RunEvent) {
        logger.log_event(&event);
        self.services.notifier.notify(&event).await;
    }

    /// Execute one run.
    ///
    /// Fails only when the trending fetch fails; every item error is
    /// captured in the returned outcome.
    pub async fn run(&self) -> PipelineResult<RunOutcome> {
        let logger = RunLogger::new();
        let span = logger.create_span();
        self.run_inner(&logger).instrument(span).await
    }

    async fn run_inner(&self, logger: &RunLogger) -> PipelineResult<RunOutcome> {
        let started = Instant::now();
        self.emit(logger, RunEvent::Started).await;

        let candidates = match self.services.source.fetch_trending().await {
            Ok(candidates) => candidates,
            Err(e) => {
                self.emit(logger, RunEvent::FetchFailed { error: e.to_string() }).await;
                record_run("failed", started.elapsed().as_secs_f64());
                return Err(e);
            }
        };

        self.emit(
            logger,
            RunEvent::Found {
                count: candidates.len(),
                batch: self.config.batch_size,
            },
        )
        .await;

        let mut outcome = RunOutcome::new(candidates.len());

        for candidate in candidates.iter().take(self.config.batch_size) {
            let item = self.process_candidate(logger, candidate, &mut outcome).await;
            record_item(item.outcome);
            outcome.record(item);
        }

        self.emit(
            logger,
            RunEvent::Completed {
                processed: outcome.processed,
                total: outcome.total,
                next_run: self.config.next_run.clone(),
                site_url: self.config.site_url.clone(),
            },
        )
        .await;

        logger.log_completion(outcome.processed, outcome.total, outcome.attempted);
        record_run("completed", started.elapsed().as_secs_f64());
        Ok(outcome)
    }

    async fn process_candidate(
        &self,
        logger: &RunLogger,
        candidate: &Candidate,
        outcome: &mut RunOutcome,
    ) -> ItemOutcome {
        match self.services.store.video_exists(&candidate.video_id).await {
            Ok(true) => {
                self.emit(
                    logger,
                    RunEvent::SkippedDuplicate {
                        title: candidate.title.clone(),
                    },
                )
                .await;
                return ItemOutcome::skipped(candidate);
            }
            Ok(false) => {}
            Err(e) => return self.fail_item(logger, candidate, e).await,
        }

        outcome.mark_attempted();

        self.emit(
            logger,
            RunEvent::Processing {
                title: candidate.title.clone(),
                view_count: candidate.view_count,
            },
        )
        .await;

        let video = match self.services.store.insert_video(candidate).await {
            Ok(video) => video,
            Err(e) => return self.fail_item(logger, candidate, e).await,
        };

        self.emit(logger, RunEvent::GeneratingMetadata).await;
        let metadata = match self.services.metadata.generate_metadata(candidate).await {
            Ok(metadata) => metadata,
            Err(e) => return self.fail_item(logger, candidate, e).await,
        };
        self.emit(
            logger,
            RunEvent::MetadataReady {
                track: metadata.title.clone(),
                genre: metadata.genre.clone(),
                mood: metadata.mood.clone(),
            },
        )
        .await;

        self.emit(logger, RunEvent::GeneratingAudio).await;
        // Generation failures keep the track without audio; anything else fails the item
        let audio = match self.generate_audio(logger, candidate).await {
            Ok(url) => Ok(url),
            Err(e) if e.is_audio_failure() => {
                self.emit(logger, RunEvent::AudioFailed { error: e.to_string() }).await;
                Err(e)
            }
            Err(e) => return self.fail_item(logger, candidate, e).await,
        };

        let new_track = NewTrack::from_metadata(video.id, metadata, audio.as_ref().ok().cloned());
        let track = match self.services.store.insert_track(&new_track).await {
            Ok(track) => track,
            Err(e) => return self.fail_item(logger, candidate, e).await,
        };

        self.emit(
            logger,
            RunEvent::TrackSaved {
                track: track.title.clone(),
            },
        )
        .await;

        match audio {
            Ok(url) => ItemOutcome::success(candidate, track.title, url),
            Err(e) => ItemOutcome::partial(candidate, track.title, e.to_string()),
        }
    }

    /// Generate, download and store audio. Returns the location to persist.
    async fn generate_audio(&self, logger: &RunLogger, candidate: &Candidate) -> PipelineResult<String> {
        let audio = self.services.audio.as_ref();

        let created = audio.start(candidate).await?;
        let finished = wait_for_prediction(audio, created, &self.poll_policy()).await?;

        if !finished.status.is_success() {
            return Err(PipelineError::generation(format!(
                "Music generation failed: {}",
                finished.error_message()
            )));
        }

        let output_url = finished
            .output_url()
            .ok_or_else(|| PipelineError::generation("prediction succeeded without output"))?
            .to_string();
        if !is_valid_audio_url(&output_url) {
            return Err(PipelineError::generation(format!(
                "prediction returned an invalid output URL: {}",
                output_url
            )));
        }

        self.emit(logger, RunEvent::AudioReady).await;

        let bytes = audio.download(&output_url).await?;
        let key = track_object_key(Utc::now().timestamp_millis(), &candidate.video_id);

        match self.services.audio_store.upload(&key, bytes).await {
            Ok(url) if is_valid_audio_url(&url) => {
                self.emit(logger, RunEvent::Uploaded).await;
                Ok(url)
            }
            Ok(url) => self.upload_fallback(logger, output_url, format!("invalid public URL {}", url)).await,
            Err(e) => self.upload_fallback(logger, output_url, e.to_string()).await,
        }
    }

    async fn upload_fallback(
        &self,
        logger: &RunLogger,
        output_url: String,
        error: String,
    ) -> PipelineResult<String> {
        logger.log_warning(&format!("upload failed, keeping transient URL: {}", error));
        record_upload_fallback();
        self.emit(logger, RunEvent::UploadFallback { error }).await;
        Ok(output_url)
    }

    async fn fail_item(&self, logger: &RunLogger, candidate: &Candidate, error: PipelineError) -> ItemOutcome {
        let error = error.to_string();
        self.emit(logger, RunEvent::ItemFailed { error: error.clone() }).await;
        ItemOutcome::failed(candidate, error)
    }
}

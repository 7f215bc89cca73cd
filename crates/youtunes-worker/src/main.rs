//! One-shot pipeline binary.
//!
//! Executes a single run and prints the run outcome as JSON, for schedulers
//! that prefer launching a process over calling the HTTP trigger.

use anyhow::Context;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use youtunes_db::SupabaseClient;
use youtunes_storage::R2Client;
use youtunes_worker::{Pipeline, PipelineConfig, Services};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Install rustls crypto provider (required for TLS/HTTPS)
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install rustls crypto provider"))?;

    dotenvy::dotenv().ok();

    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env().add_directive("youtunes=info".parse()?);

    // Logs go to stderr so stdout carries only the outcome JSON
    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .with(env_filter)
            .init();
    }

    info!("Starting youtunes-worker");

    let config = PipelineConfig::from_env();
    info!("Pipeline config: {:?}", config);

    let r2 = R2Client::from_env().await.context("Failed to create R2 client")?;
    let db = SupabaseClient::from_env().context("Failed to create Supabase client")?;
    let services = Services::with_clients(r2, db).context("Failed to configure services")?;

    let pipeline = Pipeline::new(config, services);

    match pipeline.run().await {
        Ok(outcome) => {
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            Ok(())
        }
        Err(e) => {
            error!("Run failed: {}", e);
            Err(e.into())
        }
    }
}

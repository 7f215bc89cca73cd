//! Typed clients for the third-party services a run talks to.
//!
//! - [`YoutubeClient`]: trending catalog
//! - [`OpenAiClient`]: track metadata via chat completions
//! - [`ReplicateClient`]: asynchronous audio generation
//! - [`DiscordWebhook`]: progress notifications

pub mod discord;
pub mod error;
mod http;
pub mod openai;
pub mod replicate;
pub mod youtube;

pub use discord::{DiscordWebhook, Embed, Footer};
pub use error::{ProviderError, ProviderResult};
pub use openai::{OpenAiClient, OpenAiConfig};
pub use replicate::{ReplicateClient, ReplicateConfig};
pub use youtube::{YoutubeClient, YoutubeConfig};

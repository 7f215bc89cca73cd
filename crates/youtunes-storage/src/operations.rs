//! High-level storage operations for generated tracks.

use tracing::info;

use crate::client::{R2Client, StoredObject};
use crate::error::{StorageError, StorageResult};

/// Content type of generated audio.
pub const AUDIO_CONTENT_TYPE: &str = "audio/mpeg";

/// Public path prefix served by the file proxy.
const MUSIC_PATH: &str = "music";

impl R2Client {
    /// Public URL of a stored track, served through the `/music` proxy.
    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{}/{}", self.public_base_url(), MUSIC_PATH, key)
    }

    /// Upload generated audio and return its public URL.
    pub async fn upload_track(&self, key: &str, audio: Vec<u8>) -> StorageResult<String> {
        validate_key(key)?;
        let size = audio.len();
        self.upload_bytes(audio, key, AUDIO_CONTENT_TYPE).await?;
        info!(key = %key, bytes = size, "Stored generated track");
        Ok(self.public_url(key))
    }

    /// Fetch a stored track by file name.
    pub async fn get_track(&self, key: &str) -> StorageResult<StoredObject> {
        validate_key(key)?;
        self.get_object(key).await
    }
}

/// Track keys are flat: one segment, no traversal.
fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() || key.contains('/') || key.contains("..") || key.contains('\\') {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::R2Config;

    fn test_config() -> R2Config {
        R2Config {
            endpoint_url: "http://127.0.0.1:9".to_string(),
            access_key_id: "key".to_string(),
            secret_access_key: "secret".to_string(),
            bucket_name: "bucket".to_string(),
            region: "auto".to_string(),
            public_base_url: "https://youtunes.lol".to_string(),
        }
    }

    #[tokio::test]
    async fn test_public_url() {
        let client = R2Client::new(test_config()).await.unwrap();
        assert_eq!(
            client.public_url("1700000000000-abc.mp3"),
            "https://youtunes.lol/music/1700000000000-abc.mp3"
        );
    }

    #[tokio::test]
    async fn test_upload_rejects_nested_key() {
        let client = R2Client::new(test_config()).await.unwrap();
        let err = client.upload_track("a/b.mp3", vec![1, 2, 3]).await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidKey(_)));
    }

    #[test]
    fn test_validate_key() {
        assert!(validate_key("1-abc.mp3").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key("../x").is_err());
    }
}

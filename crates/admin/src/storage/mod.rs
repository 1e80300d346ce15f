//! Object-store client for listing media.
//!
//! Files are PUT to `{endpoint}/object/{bucket}/{path}` with a bearer
//! service credential and are publicly resolvable at
//! `{endpoint}/object/public/{bucket}/{path}`. Object names are generated as
//! `{timestamp}-{random}.{ext}` to avoid collisions.

use rand::Rng;
use secrecy::ExposeSecret;
use tracing::instrument;

use crate::config::StorageConfig;

/// Bucket prefix for listing images.
const IMAGE_PREFIX: &str = "pets/";

/// Bucket prefix for listing videos.
const VIDEO_PREFIX: &str = "pets/videos/";

/// Length of the random component of generated object names.
const RANDOM_SUFFIX_LENGTH: usize = 8;

/// Errors from object-store operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// HTTP transport failure.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The store rejected the upload.
    #[error("upload rejected ({status}): {body}")]
    Rejected {
        status: reqwest::StatusCode,
        body: String,
    },
}

/// The kind of media being stored; selects the bucket prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Bucket prefix for this kind of media.
    #[must_use]
    pub const fn storage_prefix(self) -> &'static str {
        match self {
            Self::Image => IMAGE_PREFIX,
            Self::Video => VIDEO_PREFIX,
        }
    }
}

/// Client for the media object store.
#[derive(Clone)]
pub struct StorageClient {
    http: reqwest::Client,
    config: StorageConfig,
}

impl StorageClient {
    /// Create a new client from configuration.
    #[must_use]
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config: config.clone(),
        }
    }

    /// Upload a file and return its public URL.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Rejected` if the store refuses the upload, or
    /// `StorageError::Http` on transport failure.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn upload(
        &self,
        kind: MediaKind,
        original_filename: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, StorageError> {
        let path = format!(
            "{}{}",
            kind.storage_prefix(),
            generate_object_name(original_filename)
        );

        let response = self
            .http
            .put(format!(
                "{}/object/{}/{path}",
                self.config.endpoint, self.config.bucket
            ))
            .bearer_auth(self.config.service_key.expose_secret())
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Rejected { status, body });
        }

        Ok(self.public_url(&path))
    }

    /// Public URL for an object path within the bucket.
    #[must_use]
    pub fn public_url(&self, path: &str) -> String {
        format!(
            "{}/object/public/{}/{path}",
            self.config.endpoint, self.config.bucket
        )
    }
}

/// Generate a collision-resistant object name, keeping the original
/// extension.
fn generate_object_name(original_filename: &str) -> String {
    let ext = original_filename
        .rsplit('.')
        .next()
        .filter(|ext| !ext.is_empty() && ext.len() <= 8 && *ext != original_filename)
        .unwrap_or("bin");

    const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::rng();
    let random: String = (0..RANDOM_SUFFIX_LENGTH)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            // SAFETY: idx is always within bounds since random_range returns 0..CHARSET.len()
            char::from(*CHARSET.get(idx).expect("idx within bounds"))
        })
        .collect();

    format!(
        "{}-{random}.{}",
        chrono::Utc::now().timestamp_millis(),
        ext.to_lowercase()
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_object_name_keeps_extension() {
        let name = generate_object_name("fluffy portrait.JPG");
        assert!(name.ends_with(".jpg"));
        assert!(!name.contains(' '));
    }

    #[test]
    fn test_object_name_without_extension_falls_back() {
        let name = generate_object_name("noextension");
        assert!(name.ends_with(".bin"));
    }

    #[test]
    fn test_object_names_are_unique() {
        let a = generate_object_name("a.png");
        let b = generate_object_name("a.png");
        assert_ne!(a, b);
    }

    #[test]
    fn test_prefixes_by_kind() {
        assert_eq!(MediaKind::Image.storage_prefix(), "pets/");
        assert_eq!(MediaKind::Video.storage_prefix(), "pets/videos/");
    }
}

//! Multi-media upload staging.
//!
//! A staging list reconciles two item kinds: **already-uploaded** media
//! (durable URL) and **pending** media (an in-memory file waiting for
//! upload). The first image in the list is the designated cover; ordering is
//! significant and preserved through save.
//!
//! Re-initialization from externally supplied state goes through an explicit
//! revision counter, so "the parent handed me genuinely new data" and "the
//! parent is echoing my own last emission" are distinguished by a testable
//! predicate instead of call ordering.

use futures::future::try_join_all;

use crate::storage::{MediaKind, StorageClient, StorageError};

/// Maximum accepted image size (5 MB).
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Maximum accepted video size (50 MB).
pub const MAX_VIDEO_BYTES: usize = 50 * 1024 * 1024;

/// Accepted video MIME types.
const ALLOWED_VIDEO_TYPES: &[&str] = &[
    "video/mp4",
    "video/webm",
    "video/ogg",
    "video/quicktime",
    "video/x-msvideo",
];

/// Why a file was rejected from staging.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MediaValidationError {
    /// MIME type not on the allow-list for this media kind.
    #[error("unsupported file type: {content_type}")]
    UnsupportedType { content_type: String },

    /// File exceeds the size ceiling for this media kind.
    #[error("file too large: {size} bytes (limit {limit})")]
    TooLarge { size: usize, limit: usize },
}

/// Validate a file against the allow-list and size ceiling of its kind.
///
/// # Errors
///
/// Returns the specific [`MediaValidationError`] describing the rejection.
pub fn validate_file(
    kind: MediaKind,
    content_type: &str,
    size: usize,
) -> Result<(), MediaValidationError> {
    match kind {
        MediaKind::Image => {
            if !content_type.starts_with("image/") {
                return Err(MediaValidationError::UnsupportedType {
                    content_type: content_type.to_owned(),
                });
            }
            if size > MAX_IMAGE_BYTES {
                return Err(MediaValidationError::TooLarge {
                    size,
                    limit: MAX_IMAGE_BYTES,
                });
            }
        }
        MediaKind::Video => {
            if !ALLOWED_VIDEO_TYPES.contains(&content_type) {
                return Err(MediaValidationError::UnsupportedType {
                    content_type: content_type.to_owned(),
                });
            }
            if size > MAX_VIDEO_BYTES {
                return Err(MediaValidationError::TooLarge {
                    size,
                    limit: MAX_VIDEO_BYTES,
                });
            }
        }
    }
    Ok(())
}

/// A file waiting for upload.
///
/// The byte buffer doubles as the local preview resource; dropping the item
/// releases it immediately.
#[derive(Debug, Clone)]
pub struct PendingFile {
    /// Original filename, used to derive the stored object name.
    pub filename: String,
    /// Declared MIME type.
    pub content_type: String,
    /// File contents.
    pub bytes: Vec<u8>,
}

/// One entry of the staging list.
#[derive(Debug, Clone)]
pub enum StagedItem {
    /// Already uploaded; has a durable URL.
    Uploaded { url: String },
    /// Pending local file, not yet uploaded.
    Pending(PendingFile),
}

/// A file that failed validation, with its reported reason.
#[derive(Debug, Clone)]
pub struct RejectedFile {
    pub filename: String,
    pub reason: MediaValidationError,
}

/// Staging list for one media kind of one listing form.
#[derive(Debug)]
pub struct MediaStaging {
    kind: MediaKind,
    items: Vec<StagedItem>,
    revision: u64,
}

impl MediaStaging {
    /// Create an empty staging list.
    #[must_use]
    pub const fn new(kind: MediaKind) -> Self {
        Self {
            kind,
            items: Vec::new(),
            revision: 0,
        }
    }

    /// Create a staging list seeded with already-uploaded URLs.
    #[must_use]
    pub fn from_existing(kind: MediaKind, urls: Vec<String>, revision: u64) -> Self {
        Self {
            kind,
            items: urls
                .into_iter()
                .map(|url| StagedItem::Uploaded { url })
                .collect(),
            revision,
        }
    }

    /// The staged items, in cover-first order.
    #[must_use]
    pub fn items(&self) -> &[StagedItem] {
        &self.items
    }

    /// Number of staged items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Revision of the last externally applied state.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Add a batch of files, validating each one independently.
    ///
    /// Valid files are appended in batch order; invalid files are returned
    /// with their reasons. A bad file never blocks its batch.
    pub fn add_files(&mut self, files: Vec<PendingFile>) -> Vec<RejectedFile> {
        let mut rejected = Vec::new();

        for file in files {
            match validate_file(self.kind, &file.content_type, file.bytes.len()) {
                Ok(()) => self.items.push(StagedItem::Pending(file)),
                Err(reason) => rejected.push(RejectedFile {
                    filename: file.filename,
                    reason,
                }),
            }
        }

        rejected
    }

    /// Move the item at `index` to position 0, making it the cover.
    ///
    /// Returns `false` (and leaves the list untouched) when `index` is out
    /// of range.
    pub fn set_cover(&mut self, index: usize) -> bool {
        if index >= self.items.len() {
            return false;
        }
        let item = self.items.remove(index);
        self.items.insert(0, item);
        true
    }

    /// Remove the item at `index`, releasing any pending file buffer
    /// immediately.
    ///
    /// Returns `false` when `index` is out of range.
    pub fn remove(&mut self, index: usize) -> bool {
        if index >= self.items.len() {
            return false;
        }
        drop(self.items.remove(index));
        true
    }

    /// Re-initialize from externally supplied URLs, if `revision` is newer
    /// than the list's own.
    ///
    /// A stale or equal revision means the parent is echoing state this list
    /// already emitted; applying it would clobber in-progress local edits,
    /// so it is ignored. Returns whether the state was applied.
    pub fn reset_from(&mut self, urls: Vec<String>, revision: u64) -> bool {
        if revision <= self.revision {
            return false;
        }
        self.items = urls
            .into_iter()
            .map(|url| StagedItem::Uploaded { url })
            .collect();
        self.revision = revision;
        true
    }

    /// Upload all pending files and return the full URL list in staging
    /// order.
    ///
    /// Uploads run concurrently; every one must succeed before the parent
    /// record may be written. On failure the staging list is left intact so
    /// the caller can retry; uploads that already completed are not rolled
    /// back.
    ///
    /// # Errors
    ///
    /// Returns the first [`StorageError`] encountered.
    pub async fn upload_pending(
        &self,
        storage: &StorageClient,
    ) -> Result<Vec<String>, StorageError> {
        let uploads = self.items.iter().map(|item| async move {
            match item {
                StagedItem::Uploaded { url } => Ok(url.clone()),
                StagedItem::Pending(file) => {
                    storage
                        .upload(
                            self.kind,
                            &file.filename,
                            &file.content_type,
                            file.bytes.clone(),
                        )
                        .await
                }
            }
        });

        try_join_all(uploads).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn image(filename: &str, size: usize) -> PendingFile {
        PendingFile {
            filename: filename.to_owned(),
            content_type: "image/jpeg".to_owned(),
            bytes: vec![0; size],
        }
    }

    fn urls(staging: &MediaStaging) -> Vec<&str> {
        staging
            .items()
            .iter()
            .map(|item| match item {
                StagedItem::Uploaded { url } => url.as_str(),
                StagedItem::Pending(file) => file.filename.as_str(),
            })
            .collect()
    }

    #[test]
    fn test_oversized_image_rejected_valid_sibling_accepted() {
        let mut staging = MediaStaging::new(MediaKind::Image);

        let rejected = staging.add_files(vec![
            image("too-big.jpg", 6 * 1024 * 1024),
            image("fine.jpg", 2 * 1024 * 1024),
        ]);

        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].filename, "too-big.jpg");
        assert!(matches!(
            rejected[0].reason,
            MediaValidationError::TooLarge { .. }
        ));
        assert_eq!(staging.len(), 1);
        assert_eq!(urls(&staging), vec!["fine.jpg"]);
    }

    #[test]
    fn test_non_image_mime_rejected() {
        let mut staging = MediaStaging::new(MediaKind::Image);
        let rejected = staging.add_files(vec![PendingFile {
            filename: "script.exe".to_owned(),
            content_type: "application/octet-stream".to_owned(),
            bytes: vec![0; 100],
        }]);

        assert_eq!(rejected.len(), 1);
        assert!(staging.is_empty());
    }

    #[test]
    fn test_video_allow_list() {
        assert!(validate_file(MediaKind::Video, "video/mp4", 1024).is_ok());
        assert!(validate_file(MediaKind::Video, "video/quicktime", 1024).is_ok());
        assert!(validate_file(MediaKind::Video, "video/x-matroska", 1024).is_err());
        assert!(matches!(
            validate_file(MediaKind::Video, "video/mp4", MAX_VIDEO_BYTES + 1),
            Err(MediaValidationError::TooLarge { .. })
        ));
    }

    #[test]
    fn test_set_cover_moves_index_to_front() {
        let mut staging = MediaStaging::from_existing(
            MediaKind::Image,
            vec!["a.jpg".to_owned(), "b.jpg".to_owned(), "c.jpg".to_owned()],
            1,
        );

        assert!(staging.set_cover(2));
        assert_eq!(urls(&staging), vec!["c.jpg", "a.jpg", "b.jpg"]);
    }

    #[test]
    fn test_set_cover_out_of_range_is_noop() {
        let mut staging =
            MediaStaging::from_existing(MediaKind::Image, vec!["a.jpg".to_owned()], 1);
        assert!(!staging.set_cover(5));
        assert_eq!(urls(&staging), vec!["a.jpg"]);
    }

    #[test]
    fn test_remove_drops_item_immediately() {
        let mut staging = MediaStaging::new(MediaKind::Image);
        staging.add_files(vec![image("a.jpg", 10), image("b.jpg", 10)]);

        assert!(staging.remove(0));
        assert_eq!(urls(&staging), vec!["b.jpg"]);
        assert!(!staging.remove(7));
    }

    #[test]
    fn test_reset_from_ignores_echoed_revision() {
        let mut staging =
            MediaStaging::from_existing(MediaKind::Image, vec!["a.jpg".to_owned()], 3);
        staging.add_files(vec![image("local-edit.jpg", 10)]);

        // Parent echoes the state this list last emitted: same revision.
        assert!(!staging.reset_from(vec!["a.jpg".to_owned()], 3));
        assert_eq!(urls(&staging), vec!["a.jpg", "local-edit.jpg"]);

        // Genuinely new external data: newer revision wins.
        assert!(staging.reset_from(vec!["z.jpg".to_owned()], 4));
        assert_eq!(urls(&staging), vec!["z.jpg"]);
        assert_eq!(staging.revision(), 4);
    }
}

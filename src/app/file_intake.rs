// File intake - Validates a selection and allocates its preview locator

use std::sync::Arc;

use tracing::{info, warn};

use crate::app::locators::LocatorStore;
use crate::domain::errors::DomainError;
use crate::domain::model::{SelectedFile, SourceVideo};
use crate::domain::rules::MediaTypeRules;
use crate::utils::format_file_size;

/// Default soft size limit shown to users (100 MB)
pub const DEFAULT_MAX_SIZE_BYTES: u64 = 100 * 1024 * 1024;

/// Accepts video selections
#[derive(Debug, Clone)]
pub struct FileIntake {
    max_size_bytes: u64,
}

impl Default for FileIntake {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SIZE_BYTES)
    }
}

impl FileIntake {
    pub fn new(max_size_bytes: u64) -> Self {
        Self { max_size_bytes }
    }

    /// Validate the selection and register its preview locator.
    ///
    /// Nothing is allocated when validation fails. The size limit is guidance
    /// only: oversized files are accepted with a warning.
    pub fn accept(
        &self,
        selected: SelectedFile,
        locators: &LocatorStore,
    ) -> Result<SourceVideo, DomainError> {
        if !MediaTypeRules::is_video(&selected.media_type) {
            return Err(DomainError::Validation("not a video".to_string()));
        }
        if selected.payload.is_empty() {
            return Err(DomainError::Validation("empty file".to_string()));
        }
        if selected.size() > self.max_size_bytes {
            warn!(
                name = %selected.name,
                "Selected file is {}, above the suggested {}",
                format_file_size(selected.size()),
                format_file_size(self.max_size_bytes)
            );
        }

        let preview_locator = locators.create(Arc::clone(&selected.payload), &selected.media_type);
        info!(
            name = %selected.name,
            media_type = %selected.media_type,
            size = selected.size(),
            "Accepted video"
        );

        Ok(SourceVideo {
            file: selected,
            preview_locator,
            duration: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_video() {
        let store = LocatorStore::new();
        let intake = FileIntake::default();
        let file = SelectedFile::new("clip.mp4", "video/mp4", vec![1, 2, 3]);

        let source = intake.accept(file, &store).unwrap();
        assert_eq!(source.name(), "clip.mp4");
        assert!(source.duration.is_none());
        assert_eq!(&*store.resolve(&source.preview_locator).unwrap(), &[1, 2, 3]);
    }

    #[test]
    fn test_rejects_text_file_without_allocating() {
        let store = LocatorStore::new();
        let intake = FileIntake::default();
        let file = SelectedFile::new("notes.txt", "text/plain", b"hello".to_vec());

        let err = intake.accept(file, &store).unwrap_err();
        assert_eq!(err, DomainError::Validation("not a video".to_string()));
        assert_eq!(store.live_count(), 0);
    }

    #[test]
    fn test_rejects_empty_payload() {
        let store = LocatorStore::new();
        let intake = FileIntake::default();
        let file = SelectedFile::new("empty.mp4", "video/mp4", Vec::new());

        assert!(matches!(
            intake.accept(file, &store),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn test_oversized_is_soft_limit() {
        let store = LocatorStore::new();
        let intake = FileIntake::new(2);
        let file = SelectedFile::new("big.mov", "video/quicktime", vec![0; 16]);

        assert!(intake.accept(file, &store).is_ok());
    }
}

// File selection adapter - Turns a path on disk into a user selection

use std::path::Path;

use tracing::debug;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::MediaTypeRules;

/// Read `path` and classify it by extension, the way a file picker reports
/// name, type and contents.
pub async fn select_file(path: &Path) -> Result<SelectedFile, DomainError> {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| DomainError::BadArgs(format!("Not a file path: {}", path.display())))?;

    let media_type = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(MediaTypeRules::for_extension)
        .unwrap_or("application/octet-stream");

    let payload = tokio::fs::read(path)
        .await
        .map_err(|e| DomainError::FsFail(format!("Failed to read {}: {}", path.display(), e)))?;

    debug!(%name, media_type, size = payload.len(), "Selected file");
    Ok(SelectedFile::new(name, media_type, payload))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_select_classifies_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Holiday.MOV");
        std::fs::write(&path, b"movie").unwrap();

        let file = select_file(&path).await.unwrap();
        assert_eq!(file.name, "Holiday.MOV");
        assert_eq!(file.media_type, "video/quicktime");
        assert_eq!(file.size(), 5);
    }

    #[tokio::test]
    async fn test_unknown_extension_is_octet_stream() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blob");
        std::fs::write(&path, b"x").unwrap();

        let file = select_file(&path).await.unwrap();
        assert_eq!(file.media_type, "application/octet-stream");
    }

    #[tokio::test]
    async fn test_missing_file_is_fs_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            select_file(&dir.path().join("gone.mp4")).await,
            Err(DomainError::FsFail(_))
        ));
    }
}

//! Download writer for trimmed clips

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::domain::model::Artifact;
use crate::error::{TrimmerError, TrimmerResult};
use crate::utils::format_file_size;

/// Saves artifacts to disk atomically
#[derive(Debug, Clone, Default)]
pub struct DownloadWriter {
    overwrite: bool,
}

impl DownloadWriter {
    pub fn new(overwrite: bool) -> Self {
        Self { overwrite }
    }

    /// Final path for `artifact` at `dest`: directories get the artifact's own
    /// file name appended.
    pub fn target_path(&self, artifact: &Artifact, dest: &Path) -> PathBuf {
        if dest.is_dir() {
            dest.join(&artifact.file_name)
        } else {
            dest.to_path_buf()
        }
    }

    /// Write `artifact` to `dest` and return where it landed.
    ///
    /// Bytes go to a temporary file next to the target first, so a reader never
    /// sees a partial clip. An existing target is an error unless overwriting
    /// was requested.
    pub fn write(&self, artifact: &Artifact, dest: &Path) -> TrimmerResult<PathBuf> {
        let target = self.target_path(artifact, dest);
        if target.exists() && !self.overwrite {
            return Err(output_error(format!(
                "{} already exists (use --force to replace it)",
                target.display()
            )));
        }

        let parent = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&parent)?;

        let mut temp = NamedTempFile::new_in(&parent)?;
        debug!(temp = %temp.path().display(), "Writing clip to temporary file");
        temp.write_all(&artifact.bytes)?;
        temp.flush()?;
        temp.as_file().sync_all()?;

        let persisted = if self.overwrite {
            temp.persist(&target)
        } else {
            temp.persist_noclobber(&target)
        };
        persisted.map_err(|e| {
            output_error(format!("Failed to save {}: {}", target.display(), e.error))
        })?;

        info!(
            path = %target.display(),
            media_type = %artifact.media_type,
            "Saved clip ({})",
            format_file_size(artifact.bytes.len() as u64)
        );
        Ok(target)
    }
}

fn output_error(message: String) -> TrimmerError {
    TrimmerError::OutputError { message }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn artifact() -> Artifact {
        Artifact {
            file_name: "output.mp4".to_string(),
            media_type: "video/mp4".to_string(),
            bytes: Arc::from(b"clip-bytes".to_vec()),
        }
    }

    #[test]
    fn test_directory_gets_artifact_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = DownloadWriter::default().write(&artifact(), dir.path()).unwrap();

        assert_eq!(path, dir.path().join("output.mp4"));
        assert_eq!(std::fs::read(&path).unwrap(), b"clip-bytes");
    }

    #[test]
    fn test_explicit_path_and_parent_creation() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("clips").join("holiday.mp4");
        let path = DownloadWriter::default().write(&artifact(), &dest).unwrap();

        assert_eq!(path, dest);
        assert!(dest.exists());
    }

    #[test]
    fn test_refuses_to_clobber() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("output.mp4");
        std::fs::write(&dest, b"keep me").unwrap();

        let err = DownloadWriter::new(false).write(&artifact(), &dest).unwrap_err();
        assert!(matches!(err, TrimmerError::OutputError { .. }));
        assert_eq!(std::fs::read(&dest).unwrap(), b"keep me");
    }

    #[test]
    fn test_overwrite_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("output.mp4");
        std::fs::write(&dest, b"old").unwrap();

        DownloadWriter::new(true).write(&artifact(), &dest).unwrap();
        assert_eq!(std::fs::read(&dest).unwrap(), b"clip-bytes");
    }
}

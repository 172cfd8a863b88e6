// Range selector - Binds the trim range to the preview's position and duration

use tracing::{debug, warn};

use crate::domain::errors::DomainError;
use crate::domain::model::{PlaybackState, SourceVideo, TrimRange};
use crate::domain::rules::RangePolicy;
use crate::ports::PreviewPort;

/// Stateless binding between controller-owned range data and the preview.
#[derive(Debug, Clone, Copy, Default)]
pub struct RangeSelector {
    policy: RangePolicy,
}

impl RangeSelector {
    pub fn new(policy: RangePolicy) -> Self {
        Self { policy }
    }

    /// Record the duration and reset the range to the whole video.
    ///
    /// Firing again with the same duration reproduces the same range without
    /// disturbing the preview.
    pub fn on_metadata_resolved(
        &self,
        source: &mut SourceVideo,
        range: &mut Option<TrimRange>,
        preview: &mut dyn PreviewPort,
        duration: f64,
    ) -> Result<TrimRange, DomainError> {
        if !duration.is_finite() || duration < 0.0 {
            return Err(DomainError::Validation(format!(
                "Invalid video duration: {}",
                duration
            )));
        }

        match source.duration {
            Some(known) if known == duration => {
                let initial = TrimRange::full(duration);
                *range = Some(initial);
                return Ok(initial);
            }
            Some(known) => {
                return Err(DomainError::Validation(format!(
                    "Duration already resolved as {}, got {}",
                    known, duration
                )));
            }
            None => {}
        }

        preview.attach(&source.preview_locator, duration)?;
        source.duration = Some(duration);
        let initial = TrimRange::full(duration);
        *range = Some(initial);
        debug!(name = %source.name(), duration, "Metadata resolved");
        Ok(initial)
    }

    /// Store the clamped range and seek the preview to its start
    pub fn on_range_changed(
        &self,
        source: &SourceVideo,
        range: &mut Option<TrimRange>,
        preview: &mut dyn PreviewPort,
        requested: [f64; 2],
    ) -> Result<TrimRange, DomainError> {
        let duration = source.duration.ok_or_else(|| {
            DomainError::Precondition("Video duration is not known yet".to_string())
        })?;

        let updated = self.policy.clamp(requested, duration)?;
        *range = Some(updated);

        if let Err(e) = preview.seek(updated.start) {
            warn!("Failed to seek preview to {}: {}", updated.start, e);
        }
        debug!(start = updated.start, end = updated.end, "Range changed");
        Ok(updated)
    }

    /// Flip between playing and paused, reporting what the preview actually does
    pub fn on_play_toggle(&self, preview: &mut dyn PreviewPort) -> Result<PlaybackState, DomainError> {
        match preview.state() {
            PlaybackState::Playing => preview.pause()?,
            PlaybackState::Paused => preview.play()?,
        }
        Ok(preview.state())
    }
}

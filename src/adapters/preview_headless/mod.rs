// Headless preview adapter - Player state without rendering

use tracing::trace;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

/// Tracks what a video element would: attached media, position and whether
/// it is playing.
#[derive(Debug, Default)]
pub struct HeadlessPreview {
    attached: Option<Locator>,
    duration: f64,
    position: f64,
    playing: bool,
}

impl HeadlessPreview {
    pub fn new() -> Self {
        Self::default()
    }

    /// Locator of the attached media
    pub fn attached(&self) -> Option<&Locator> {
        self.attached.as_ref()
    }

    fn require_media(&self) -> Result<(), DomainError> {
        if self.attached.is_none() {
            return Err(DomainError::Precondition("No media attached".to_string()));
        }
        Ok(())
    }
}

impl PreviewPort for HeadlessPreview {
    fn attach(&mut self, locator: &Locator, duration: f64) -> Result<(), DomainError> {
        if !duration.is_finite() || duration < 0.0 {
            return Err(DomainError::Validation(format!(
                "Invalid media duration: {}",
                duration
            )));
        }
        self.attached = Some(locator.clone());
        self.duration = duration;
        self.position = 0.0;
        self.playing = false;
        trace!(%locator, duration, "Preview attached");
        Ok(())
    }

    fn detach(&mut self) {
        *self = Self::default();
    }

    fn seek(&mut self, position: f64) -> Result<(), DomainError> {
        self.require_media()?;
        if !position.is_finite() {
            return Err(DomainError::BadArgs(format!("Invalid position: {}", position)));
        }
        self.position = position.clamp(0.0, self.duration);
        Ok(())
    }

    fn play(&mut self) -> Result<(), DomainError> {
        self.require_media()?;
        self.playing = true;
        Ok(())
    }

    fn pause(&mut self) -> Result<(), DomainError> {
        self.playing = false;
        Ok(())
    }

    fn state(&self) -> PlaybackState {
        if self.playing {
            PlaybackState::Playing
        } else {
            PlaybackState::Paused
        }
    }

    fn position(&self) -> f64 {
        self.position
    }
}

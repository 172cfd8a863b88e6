// Domain rules - Business logic and policies

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::utils::time::format_timestamp;

/// Name the engine writes the produced clip under
pub const OUTPUT_FILE_NAME: &str = "output.mp4";

/// Media type of the produced clip
pub const OUTPUT_MEDIA_TYPE: &str = "video/mp4";

/// Media type classification rules
pub struct MediaTypeRules;

impl MediaTypeRules {
    /// True when the media type's top-level category is `video`
    pub fn is_video(media_type: &str) -> bool {
        media_type
            .trim()
            .split('/')
            .next()
            .map(|category| category.eq_ignore_ascii_case("video"))
            .unwrap_or(false)
    }

    /// Media type for a file extension, `application/octet-stream` when unknown
    pub fn for_extension(extension: &str) -> &'static str {
        match extension.to_ascii_lowercase().as_str() {
            "mp4" | "m4v" => "video/mp4",
            "mov" | "qt" => "video/quicktime",
            "avi" => "video/x-msvideo",
            "mkv" => "video/x-matroska",
            "webm" => "video/webm",
            "mpg" | "mpeg" => "video/mpeg",
            "ts" | "mts" | "m2ts" => "video/mp2t",
            "3gp" => "video/3gpp",
            "ogv" => "video/ogg",
            "mp3" => "audio/mpeg",
            "wav" => "audio/wav",
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            "txt" => "text/plain",
            "json" => "application/json",
            _ => "application/octet-stream",
        }
    }
}

/// How user-supplied ranges are brought back inside the invariant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangePolicy {
    /// Slider granularity in seconds
    pub step: f64,
}

impl Default for RangePolicy {
    fn default() -> Self {
        Self { step: 1.0 }
    }
}

impl RangePolicy {
    pub fn new(step: f64) -> Result<Self, DomainError> {
        if !step.is_finite() || step <= 0.0 {
            return Err(DomainError::BadArgs(format!(
                "Range step must be positive, got {}",
                step
            )));
        }
        Ok(Self { step })
    }

    /// Snap to the step grid, clamp to `[0, duration]` and pull `start` down to `end`
    /// when the pair arrives out of order.
    ///
    /// A bound at or past `duration` lands on `duration` itself, unsnapped, so the
    /// real end stays reachable when the duration is not a step multiple.
    pub fn clamp(&self, requested: [f64; 2], duration: f64) -> Result<TrimRange, DomainError> {
        let [start, end] = requested;
        if !start.is_finite() || !end.is_finite() {
            return Err(DomainError::Validation(
                "Range bounds must be finite numbers".to_string(),
            ));
        }

        let start = self.bound(start, duration);
        let end = self.bound(end, duration);
        let start = start.min(end);

        Ok(TrimRange { start, end })
    }

    fn bound(&self, value: f64, duration: f64) -> f64 {
        if value >= duration {
            return duration.max(0.0);
        }
        self.snap(value).clamp(0.0, duration)
    }

    fn snap(&self, value: f64) -> f64 {
        (value / self.step).round() * self.step
    }
}

/// Builds the engine's stream-copy trim command
pub struct TrimCommand;

impl TrimCommand {
    /// `-i <input> -ss <start> -to <end> -acodec copy -vcodec copy <output>`
    pub fn build(input_name: &str, range: &TrimRange, output_name: &str) -> Vec<String> {
        vec![
            "-i".to_string(),
            input_name.to_string(),
            "-ss".to_string(),
            format_timestamp(range.start),
            "-to".to_string(),
            format_timestamp(range.end),
            "-acodec".to_string(),
            "copy".to_string(),
            "-vcodec".to_string(),
            "copy".to_string(),
            output_name.to_string(),
        ]
    }
}

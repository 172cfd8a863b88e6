//! Time parsing and formatting utilities

use crate::error::{TrimmerError, TrimmerResult};

/// Format a seconds offset as a clock reading.
///
/// `MM:SS` while the hours component is zero, `H:MM:SS` otherwise. Fractional
/// seconds are floored; negative and non-finite input reads as zero.
pub fn format_clock(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{:02}:{:02}", minutes, secs)
    }
}

/// Format a seconds offset as the engine's `HH:MM:SS.mmm` timestamp.
///
/// Rounded to the millisecond so sub-second ranges reach the engine intact.
/// Negative and non-finite input reads as zero.
pub fn format_timestamp(seconds: f64) -> String {
    let millis = if seconds.is_finite() && seconds > 0.0 {
        (seconds * 1000.0).round() as u64
    } else {
        0
    };
    let total = millis / 1000;

    format!(
        "{:02}:{:02}:{:02}.{:03}",
        total / 3600,
        (total % 3600) / 60,
        total % 60,
        millis % 1000
    )
}

/// Time parser for range input
pub struct TimeParser;

impl TimeParser {
    /// Create a new time parser
    pub fn new() -> Self {
        Self
    }
}

impl Default for TimeParser {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeParser {
    /// Parse `SS[.ms]`, `MM:SS[.ms]` or `HH:MM:SS[.ms]` to seconds
    pub fn parse_time(&self, time_str: &str) -> TrimmerResult<f64> {
        let time_str = time_str.trim();
        let invalid = || TrimmerError::InvalidTimeFormat {
            time: time_str.to_string(),
        };

        let parts: Vec<&str> = time_str.split(':').collect();
        let seconds = match parts.as_slice() {
            [secs] => self.parse_field(secs, None).ok_or_else(invalid)?,
            [mins, secs] => {
                let minutes = self.parse_whole(mins).ok_or_else(invalid)?;
                let seconds = self.parse_field(secs, Some(60.0)).ok_or_else(invalid)?;
                minutes * 60.0 + seconds
            }
            [hours, mins, secs] => {
                let hours = self.parse_whole(hours).ok_or_else(invalid)?;
                let minutes = self.parse_whole(mins).ok_or_else(invalid)?;
                if minutes >= 60.0 {
                    return Err(invalid());
                }
                let seconds = self.parse_field(secs, Some(60.0)).ok_or_else(invalid)?;
                hours * 3600.0 + minutes * 60.0 + seconds
            }
            _ => return Err(invalid()),
        };

        Ok(seconds)
    }

    /// Non-negative decimal field, strictly below `limit` when given
    fn parse_field(&self, field: &str, limit: Option<f64>) -> Option<f64> {
        let value: f64 = field.parse().ok()?;
        if !value.is_finite() || value < 0.0 {
            return None;
        }
        match limit {
            Some(limit) if value >= limit => None,
            _ => Some(value),
        }
    }

    /// Non-negative whole-number field
    fn parse_whole(&self, field: &str) -> Option<f64> {
        field.parse::<u32>().ok().map(f64::from)
    }
}

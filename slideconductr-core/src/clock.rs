//! Elapsed-time clock
//!
//! Turns a start timestamp and the current wall-clock time into a
//! non-negative duration and its `MM:SS` rendering. Minutes are unbounded:
//! an hour and one second reads `61:01`, there is no hour rollover.

use core::fmt::Write;

use heapless::String;

/// Capacity of a rendered duration; fits `u64::MAX / 60` minutes
pub const DURATION_TEXT_LEN: usize = 24;

/// Rendered `MM:SS` duration
pub type DurationText = String<DURATION_TEXT_LEN>;

/// Formatting errors for bounded display text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FormatError {
    /// Output did not fit the fixed buffer
    Overflow,
}

/// Seconds elapsed between `start` and `now`, clamped at zero
///
/// `start` may lie ahead of `now` when the controller's clock is skewed
/// relative to the watch's.
pub fn elapsed(now: i64, start: i64) -> u64 {
    now.saturating_sub(start).max(0) as u64
}

/// Like [`elapsed`], but a start of zero or below means "not synced yet"
/// and reads as zero
pub fn elapsed_since(now: i64, start: i64) -> u64 {
    if start <= 0 {
        return 0;
    }
    elapsed(now, start)
}

/// Render `seconds` as zero-padded `MM:SS`
pub fn format_mm_ss(seconds: u64) -> Result<DurationText, FormatError> {
    let mut text = DurationText::new();
    write_mm_ss(&mut text, seconds).map_err(|_| FormatError::Overflow)?;
    Ok(text)
}

/// Write `seconds` as zero-padded `MM:SS` to any formatter
pub fn write_mm_ss<W: Write>(out: &mut W, seconds: u64) -> core::fmt::Result {
    write!(out, "{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Slide and presentation durations, refreshed once per tick
#[derive(Debug, Clone)]
pub struct DurationClock {
    slide_seconds: u64,
    presentation_seconds: u64,
    slide_text: DurationText,
    presentation_text: DurationText,
}

impl Default for DurationClock {
    fn default() -> Self {
        Self::new()
    }
}

impl DurationClock {
    /// Create a clock reading `00:00` for both durations
    pub fn new() -> Self {
        let mut zero = DurationText::new();
        // Cannot fail: "00:00" fits
        let _ = write_mm_ss(&mut zero, 0);
        Self {
            slide_seconds: 0,
            presentation_seconds: 0,
            slide_text: zero.clone(),
            presentation_text: zero,
        }
    }

    /// Recompute both durations against their own start timestamps
    ///
    /// Returns true if either rendered string changed. On error the
    /// previous strings are kept.
    pub fn tick(
        &mut self,
        now: i64,
        slide_start: i32,
        presentation_start: i32,
    ) -> Result<bool, FormatError> {
        let slide_seconds = elapsed_since(now, slide_start as i64);
        let presentation_seconds = elapsed_since(now, presentation_start as i64);

        let slide_text = format_mm_ss(slide_seconds)?;
        let presentation_text = format_mm_ss(presentation_seconds)?;

        let changed =
            slide_text != self.slide_text || presentation_text != self.presentation_text;

        self.slide_seconds = slide_seconds;
        self.presentation_seconds = presentation_seconds;
        self.slide_text = slide_text;
        self.presentation_text = presentation_text;

        Ok(changed)
    }

    /// Seconds on the current slide
    pub fn slide_seconds(&self) -> u64 {
        self.slide_seconds
    }

    /// Seconds since the presentation started
    pub fn presentation_seconds(&self) -> u64 {
        self.presentation_seconds
    }

    /// Slide duration as `MM:SS`
    pub fn slide_text(&self) -> &str {
        &self.slide_text
    }

    /// Presentation duration as `MM:SS`
    pub fn presentation_text(&self) -> &str {
        &self.presentation_text
    }
}

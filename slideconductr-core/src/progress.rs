//! Progress text derivation
//!
//! `Slide {id} / {count}`, built from the raw synced text. No numeric
//! validation: whatever the controller sent is shown, including empty
//! strings before the first sync.

use core::fmt::Write;

use heapless::String;

use crate::clock::FormatError;
use crate::state::presentation::SLIDE_TEXT_LEN;
use crate::state::PresentationState;

/// Capacity of the progress text: "Slide " + id + " / " + count
pub const PROGRESS_TEXT_LEN: usize = 6 + SLIDE_TEXT_LEN + 3 + SLIDE_TEXT_LEN;

/// Rendered progress text
pub type ProgressText = String<PROGRESS_TEXT_LEN>;

/// Render the progress text for a slide number and count
pub fn format_progress(slide_id: &str, slide_count: &str) -> Result<ProgressText, FormatError> {
    let mut text = ProgressText::new();
    write!(text, "Slide {} / {}", slide_id, slide_count).map_err(|_| FormatError::Overflow)?;
    Ok(text)
}

/// Derived progress text, recomputed only when slide id or count changed
#[derive(Debug, Clone)]
pub struct Progress {
    text: ProgressText,
    revision: u32,
}

impl Default for Progress {
    fn default() -> Self {
        Self::new()
    }
}

impl Progress {
    /// Create the progress text for an unsynced state (`Slide  / `)
    pub fn new() -> Self {
        Self {
            text: format_progress("", "").unwrap_or_default(),
            revision: 0,
        }
    }

    /// Recompute the text if the state marked it dirty
    ///
    /// Returns true if the rendered text differs from before. On error the
    /// state stays dirty and the previous text is kept.
    pub fn refresh(&mut self, state: &mut PresentationState) -> Result<bool, FormatError> {
        if !state.is_progress_dirty() {
            return Ok(false);
        }

        let text = format_progress(state.slide_id(), state.slide_count())?;
        state.take_progress_dirty();
        if text == self.text {
            return Ok(false);
        }

        self.text = text;
        self.revision = self.revision.wrapping_add(1);
        Ok(true)
    }

    /// Current progress text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of times the text has changed
    pub fn revision(&self) -> u32 {
        self.revision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slideconductr_protocol::{SyncKey, TupleValue};

    #[test]
    fn test_format() {
        assert_eq!(format_progress("2", "10").unwrap().as_str(), "Slide 2 / 10");
    }

    #[test]
    fn test_format_before_sync() {
        assert_eq!(format_progress("", "").unwrap().as_str(), "Slide  / ");
    }

    #[test]
    fn test_format_verbatim() {
        assert_eq!(
            format_progress("intro", "?").unwrap().as_str(),
            "Slide intro / ?"
        );
    }

    #[test]
    fn test_format_full_width_fields_fit() {
        let wide = "0123456789abcdef";
        let text = format_progress(wide, wide).unwrap();
        assert_eq!(text.len(), PROGRESS_TEXT_LEN);
    }

    #[test]
    fn test_refresh_after_id_then_count() {
        let mut state = PresentationState::default();
        let mut progress = Progress::new();

        state.apply(SyncKey::SlideId, TupleValue::Text("2")).unwrap();
        assert!(progress.refresh(&mut state).unwrap());
        assert_eq!(progress.text(), "Slide 2 / ");

        state.apply(SyncKey::SlideCount, TupleValue::Text("10")).unwrap();
        assert!(progress.refresh(&mut state).unwrap());
        assert_eq!(progress.text(), "Slide 2 / 10");
        assert_eq!(progress.revision(), 2);
    }

    #[test]
    fn test_no_refresh_for_other_fields() {
        let mut state = PresentationState::default();
        let mut progress = Progress::new();

        state
            .apply(SyncKey::PresentationTitle, TupleValue::Text("Deck"))
            .unwrap();
        state.apply(SyncKey::SlideStart, TupleValue::Int(10)).unwrap();

        assert!(!progress.refresh(&mut state).unwrap());
        assert_eq!(progress.text(), "Slide  / ");
        assert_eq!(progress.revision(), 0);
    }

    #[test]
    fn test_initial_text_before_sync() {
        let progress = Progress::new();
        assert_eq!(progress.text(), "Slide  / ");
        assert_eq!(progress.revision(), 0);
    }

    #[test]
    fn test_resent_slide_id_is_not_a_change() {
        let mut state = PresentationState::default();
        let mut progress = Progress::new();

        state.apply(SyncKey::SlideId, TupleValue::Text("4")).unwrap();
        assert!(progress.refresh(&mut state).unwrap());

        state.apply(SyncKey::SlideId, TupleValue::Text("4")).unwrap();
        assert!(state.is_progress_dirty());
        assert!(!progress.refresh(&mut state).unwrap());
        assert!(!state.is_progress_dirty());
        assert_eq!(progress.text(), "Slide 4 / ");
        assert_eq!(progress.revision(), 1);
    }

    #[test]
    fn test_empty_update_before_sync_is_not_a_change() {
        let mut state = PresentationState::default();
        let mut progress = Progress::new();

        state.apply(SyncKey::SlideId, TupleValue::Text("")).unwrap();
        assert!(!progress.refresh(&mut state).unwrap());
        assert_eq!(progress.revision(), 0);
    }

    #[test]
    fn test_refresh_is_idempotent() {
        let mut state = PresentationState::default();
        let mut progress = Progress::new();

        state.apply(SyncKey::SlideId, TupleValue::Text("1")).unwrap();
        assert!(progress.refresh(&mut state).unwrap());
        assert!(!progress.refresh(&mut state).unwrap());
        assert_eq!(progress.revision(), 1);
    }
}

//! Synchronized presentation state
//!
//! Every synchronized key maps to a typed handler that validates the value
//! and updates exactly one field. A value of the wrong type is rejected
//! without touching anything.

use heapless::String;

use slideconductr_protocol::{FieldType, SyncKey, TupleValue};

use crate::config::LatchPolicy;
use crate::text::assign_truncated;

/// Capacity of the slide number and slide count fields
pub const SLIDE_TEXT_LEN: usize = 16;

/// Capacity of the presentation title
pub const TITLE_LEN: usize = 96;

/// Capacity of the slide notes
pub const NOTES_LEN: usize = 512;

/// Capacity of the intent and configured marker fields
pub const MARKER_LEN: usize = 16;

/// Errors applying a single field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ApplyError {
    /// Value type does not match what the key carries
    TypeMismatch { key: SyncKey, expected: FieldType },
}

/// Latched readiness flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Latches {
    /// A non-empty presentation title has been seen
    pub loaded: bool,
    /// A non-empty configured marker has been seen
    pub configured: bool,
}

/// Outcome of applying one field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FieldChange {
    pub key: SyncKey,
    /// Text was cut to the field's capacity
    pub truncated: bool,
    /// The progress text needs to be recomputed
    pub progress_dirty: bool,
    /// The loaded or configured latch flipped
    pub latches_changed: bool,
}

type Handler = fn(&mut PresentationState, TupleValue<'_>) -> Result<bool, ApplyError>;

/// Current value of every synchronized field
///
/// Text fields start empty and timestamps start at zero ("not synced").
#[derive(Debug, Clone)]
pub struct PresentationState {
    slide_id: String<SLIDE_TEXT_LEN>,
    slide_count: String<SLIDE_TEXT_LEN>,
    next_intent: String<MARKER_LEN>,
    prev_intent: String<MARKER_LEN>,
    title: String<TITLE_LEN>,
    notes: String<NOTES_LEN>,
    configured_marker: String<MARKER_LEN>,
    presentation_start: i32,
    slide_start: i32,
    latches: Latches,
    latch_policy: LatchPolicy,
    progress_dirty: bool,
}

impl Default for PresentationState {
    fn default() -> Self {
        Self::new(LatchPolicy::default())
    }
}

impl PresentationState {
    /// Create an empty state
    pub fn new(latch_policy: LatchPolicy) -> Self {
        Self {
            slide_id: String::new(),
            slide_count: String::new(),
            next_intent: String::new(),
            prev_intent: String::new(),
            title: String::new(),
            notes: String::new(),
            configured_marker: String::new(),
            presentation_start: 0,
            slide_start: 0,
            latches: Latches::default(),
            latch_policy,
            progress_dirty: false,
        }
    }

    /// Apply one field update
    ///
    /// Updates exactly the field named by `key`. On error nothing changes.
    pub fn apply(&mut self, key: SyncKey, value: TupleValue<'_>) -> Result<FieldChange, ApplyError> {
        let before = self.latches;
        let truncated = Self::handler(key)(self, value)?;

        let progress_dirty = key.affects_progress();
        if progress_dirty {
            self.progress_dirty = true;
        }

        Ok(FieldChange {
            key,
            truncated,
            progress_dirty,
            latches_changed: self.latches != before,
        })
    }

    fn handler(key: SyncKey) -> Handler {
        match key {
            SyncKey::SlideId => Self::apply_slide_id,
            SyncKey::NextIntent => Self::apply_next_intent,
            SyncKey::PrevIntent => Self::apply_prev_intent,
            SyncKey::PresentationTitle => Self::apply_title,
            SyncKey::SlideCount => Self::apply_slide_count,
            SyncKey::SlideNotes => Self::apply_notes,
            SyncKey::PresentationStart => Self::apply_presentation_start,
            SyncKey::SlideStart => Self::apply_slide_start,
            SyncKey::IsConfigured => Self::apply_configured,
        }
    }

    fn apply_slide_id(&mut self, value: TupleValue<'_>) -> Result<bool, ApplyError> {
        let text = expect_text(SyncKey::SlideId, value)?;
        Ok(assign_truncated(&mut self.slide_id, text))
    }

    fn apply_slide_count(&mut self, value: TupleValue<'_>) -> Result<bool, ApplyError> {
        let text = expect_text(SyncKey::SlideCount, value)?;
        Ok(assign_truncated(&mut self.slide_count, text))
    }

    fn apply_next_intent(&mut self, value: TupleValue<'_>) -> Result<bool, ApplyError> {
        let text = expect_text(SyncKey::NextIntent, value)?;
        Ok(assign_truncated(&mut self.next_intent, text))
    }

    fn apply_prev_intent(&mut self, value: TupleValue<'_>) -> Result<bool, ApplyError> {
        let text = expect_text(SyncKey::PrevIntent, value)?;
        Ok(assign_truncated(&mut self.prev_intent, text))
    }

    fn apply_notes(&mut self, value: TupleValue<'_>) -> Result<bool, ApplyError> {
        let text = expect_text(SyncKey::SlideNotes, value)?;
        Ok(assign_truncated(&mut self.notes, text))
    }

    fn apply_title(&mut self, value: TupleValue<'_>) -> Result<bool, ApplyError> {
        let text = expect_text(SyncKey::PresentationTitle, value)?;
        let truncated = assign_truncated(&mut self.title, text);
        self.latches.loaded = self.latch_policy.next(self.latches.loaded, !text.is_empty());
        Ok(truncated)
    }

    fn apply_configured(&mut self, value: TupleValue<'_>) -> Result<bool, ApplyError> {
        let text = expect_text(SyncKey::IsConfigured, value)?;
        let truncated = assign_truncated(&mut self.configured_marker, text);
        self.latches.configured = self
            .latch_policy
            .next(self.latches.configured, !text.is_empty());
        Ok(truncated)
    }

    fn apply_presentation_start(&mut self, value: TupleValue<'_>) -> Result<bool, ApplyError> {
        self.presentation_start = expect_int(SyncKey::PresentationStart, value)?;
        Ok(false)
    }

    fn apply_slide_start(&mut self, value: TupleValue<'_>) -> Result<bool, ApplyError> {
        self.slide_start = expect_int(SyncKey::SlideStart, value)?;
        Ok(false)
    }

    /// Current slide number, verbatim
    pub fn slide_id(&self) -> &str {
        &self.slide_id
    }

    /// Total slide count, verbatim
    pub fn slide_count(&self) -> &str {
        &self.slide_count
    }

    /// Presentation title
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Notes for the current slide
    pub fn notes(&self) -> &str {
        &self.notes
    }

    /// Last next-intent value mirrored by the controller
    pub fn next_intent(&self) -> &str {
        &self.next_intent
    }

    /// Last prev-intent value mirrored by the controller
    pub fn prev_intent(&self) -> &str {
        &self.prev_intent
    }

    /// Epoch seconds when the presentation began (0 before sync)
    pub fn presentation_start(&self) -> i32 {
        self.presentation_start
    }

    /// Epoch seconds when the current slide began (0 before sync)
    pub fn slide_start(&self) -> i32 {
        self.slide_start
    }

    /// Returns true once a presentation has been loaded
    pub fn is_loaded(&self) -> bool {
        self.latches.loaded
    }

    /// Returns true once the controller has been configured
    pub fn is_configured(&self) -> bool {
        self.latches.configured
    }

    /// Both latches
    pub fn latches(&self) -> Latches {
        self.latches
    }

    /// Returns true if slide id or count changed since the progress text
    /// was last derived
    pub fn is_progress_dirty(&self) -> bool {
        self.progress_dirty
    }

    /// Clear the progress flag, returning its previous value
    pub(crate) fn take_progress_dirty(&mut self) -> bool {
        core::mem::replace(&mut self.progress_dirty, false)
    }
}

fn expect_text(key: SyncKey, value: TupleValue<'_>) -> Result<&str, ApplyError> {
    value.as_text().ok_or(ApplyError::TypeMismatch {
        key,
        expected: FieldType::Text,
    })
}

fn expect_int(key: SyncKey, value: TupleValue<'_>) -> Result<i32, ApplyError> {
    value.as_i32().ok_or(ApplyError::TypeMismatch {
        key,
        expected: FieldType::Integer,
    })
}

//! Sync channel implementation

use slideconductr_protocol::{
    DictError, Dictionary, SyncField, SyncKey, TupleValue, INBOUND_CAPACITY,
};

use crate::clock::FormatError;
use crate::config::{EngineConfig, LatchPolicy};
use crate::progress::Progress;
use crate::state::{ApplyError, DisplayStatus, FieldChange, PresentationState, StatusInputs};

/// Errors applying inbound updates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SyncError {
    /// Batch exceeds the inbound capacity; nothing was applied
    Overflow { len: usize, capacity: usize },
    /// Batch is not a well-formed dictionary; nothing was applied
    Malformed(DictError),
    /// Single field rejected; nothing was applied
    Rejected(ApplyError),
    /// Progress text could not be rendered; fields were applied
    Format(FormatError),
}

impl From<DictError> for SyncError {
    fn from(e: DictError) -> Self {
        SyncError::Malformed(e)
    }
}

impl From<ApplyError> for SyncError {
    fn from(e: ApplyError) -> Self {
        SyncError::Rejected(e)
    }
}

impl From<FormatError> for SyncError {
    fn from(e: FormatError) -> Self {
        SyncError::Format(e)
    }
}

/// Summary of one applied batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BatchReport {
    /// Fields applied
    pub applied: u8,
    /// Tuples with unknown keys
    pub ignored: u8,
    /// Known keys with a value of the wrong type
    pub rejected: u8,
    /// Applied text fields that were cut to capacity
    pub truncated: u8,
    /// First rejection, if any
    pub first_rejection: Option<ApplyError>,
    /// Progress text changed
    pub progress_changed: bool,
    /// Display status differs from before the batch
    pub status_changed: bool,
}

/// Adapter between the phone link and the presentation state
///
/// Owns the state: nothing else can mutate it. Every entry point leaves the
/// progress text in sync with the fields before returning.
#[derive(Debug, Clone)]
pub struct SyncChannel {
    state: PresentationState,
    progress: Progress,
    connected: bool,
    inbound_capacity: usize,
}

impl Default for SyncChannel {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl SyncChannel {
    /// Create a channel with empty state and no link
    ///
    /// `inbound_capacity` is capped at [`INBOUND_CAPACITY`].
    pub fn new(inbound_capacity: usize, latch_policy: LatchPolicy) -> Self {
        Self {
            state: PresentationState::new(latch_policy),
            progress: Progress::new(),
            connected: false,
            inbound_capacity: inbound_capacity.min(INBOUND_CAPACITY),
        }
    }

    /// Create a channel from engine configuration
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.inbound_capacity as usize, config.latch_policy)
    }

    /// Apply an encoded batch of field updates
    ///
    /// An oversized or malformed batch is rejected in full and the state is
    /// left as it was. Within a well-formed batch each field is applied on
    /// its own: unknown keys are skipped and mistyped values are rejected
    /// without affecting their neighbours.
    pub fn apply_batch(&mut self, bytes: &[u8]) -> Result<BatchReport, SyncError> {
        if bytes.len() > self.inbound_capacity {
            return Err(SyncError::Overflow {
                len: bytes.len(),
                capacity: self.inbound_capacity,
            });
        }

        let dict = Dictionary::parse(bytes)?;
        let status_before = self.status();
        let mut report = BatchReport::default();

        for tuple in dict.iter() {
            let Some(field) = SyncField::from_tuple(&tuple) else {
                report.ignored += 1;
                continue;
            };

            match self.state.apply(field.key, field.value) {
                Ok(change) => {
                    report.applied += 1;
                    if change.truncated {
                        report.truncated += 1;
                    }
                }
                Err(e) => {
                    report.rejected += 1;
                    report.first_rejection.get_or_insert(e);
                }
            }
        }

        report.progress_changed = self.progress.refresh(&mut self.state)?;
        report.status_changed = self.status() != status_before;
        Ok(report)
    }

    /// Apply a single decoded field
    pub fn apply_field(
        &mut self,
        key: SyncKey,
        value: TupleValue<'_>,
    ) -> Result<FieldChange, SyncError> {
        let change = self.state.apply(key, value)?;
        self.progress.refresh(&mut self.state)?;
        Ok(change)
    }

    /// Record a link change
    ///
    /// Returns true if the display status changed as a result.
    pub fn set_connected(&mut self, connected: bool) -> bool {
        let before = self.status();
        self.connected = connected;
        self.status() != before
    }

    /// Check if the phone link is up
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Inputs to status resolution
    pub fn status_inputs(&self) -> StatusInputs {
        StatusInputs {
            connected: self.connected,
            configured: self.state.is_configured(),
            loaded: self.state.is_loaded(),
        }
    }

    /// Current display status, resolved on demand
    pub fn status(&self) -> DisplayStatus {
        self.status_inputs().resolve()
    }

    /// Read-only view of the synchronized fields
    pub fn state(&self) -> &PresentationState {
        &self.state
    }

    /// Current progress text
    pub fn progress_text(&self) -> &str {
        self.progress.text()
    }

    /// Number of times the progress text has changed
    pub fn progress_revision(&self) -> u32 {
        self.progress.revision()
    }

    /// Largest batch accepted, in bytes
    pub fn inbound_capacity(&self) -> usize {
        self.inbound_capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heapless::Vec;
    use slideconductr_protocol::dict::encode_to_vec;
    use slideconductr_protocol::{FieldType, Tuple};

    fn text(key: SyncKey, value: &str) -> Tuple<'_> {
        Tuple::text(key.to_u32(), value)
    }

    fn int(key: SyncKey, value: i32) -> Tuple<'static> {
        Tuple::int(key.to_u32(), value)
    }

    fn encode(tuples: &[Tuple<'_>]) -> Vec<u8, 4096> {
        encode_to_vec(tuples).unwrap()
    }

    fn ready_channel() -> SyncChannel {
        let mut channel = SyncChannel::default();
        channel.set_connected(true);
        channel
            .apply_batch(&encode(&[
                text(SyncKey::IsConfigured, "1"),
                text(SyncKey::PresentationTitle, "Deck"),
                text(SyncKey::SlideId, "1"),
                text(SyncKey::SlideCount, "12"),
                int(SyncKey::SlideStart, 1_700_000_050),
            ]))
            .unwrap();
        channel
    }

    #[test]
    fn test_batch_applies_fields_and_progress() {
        let mut channel = SyncChannel::default();
        let report = channel
            .apply_batch(&encode(&[
                text(SyncKey::SlideId, "2"),
                text(SyncKey::SlideCount, "10"),
            ]))
            .unwrap();

        assert_eq!(report.applied, 2);
        assert!(report.progress_changed);
        assert_eq!(channel.progress_text(), "Slide 2 / 10");
        assert_eq!(channel.progress_revision(), 1);
    }

    #[test]
    fn test_separate_updates_yield_final_progress() {
        let mut channel = SyncChannel::default();
        channel
            .apply_batch(&encode(&[text(SyncKey::SlideId, "2")]))
            .unwrap();
        channel
            .apply_batch(&encode(&[text(SyncKey::SlideCount, "10")]))
            .unwrap();

        assert_eq!(channel.progress_text(), "Slide 2 / 10");
        assert_eq!(channel.progress_revision(), 2);
    }

    #[test]
    fn test_progress_untouched_by_other_fields() {
        let mut channel = ready_channel();
        let revision = channel.progress_revision();

        let report = channel
            .apply_batch(&encode(&[
                int(SyncKey::SlideStart, 1_700_000_100),
                text(SyncKey::SlideNotes, "Say hello"),
            ]))
            .unwrap();

        assert!(!report.progress_changed);
        assert_eq!(channel.progress_revision(), revision);
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let mut channel = SyncChannel::default();
        let report = channel
            .apply_batch(&encode(&[
                Tuple::text(42, "mystery"),
                text(SyncKey::SlideId, "5"),
            ]))
            .unwrap();

        assert_eq!(report.ignored, 1);
        assert_eq!(report.applied, 1);
        assert_eq!(channel.state().slide_id(), "5");
    }

    #[test]
    fn test_mistyped_field_rejected_neighbours_applied() {
        let mut channel = SyncChannel::default();
        let report = channel
            .apply_batch(&encode(&[
                text(SyncKey::SlideStart, "not a number"),
                text(SyncKey::SlideId, "7"),
            ]))
            .unwrap();

        assert_eq!(report.rejected, 1);
        assert_eq!(report.applied, 1);
        assert_eq!(
            report.first_rejection,
            Some(ApplyError::TypeMismatch {
                key: SyncKey::SlideStart,
                expected: FieldType::Integer,
            })
        );
        assert_eq!(channel.state().slide_start(), 0);
        assert_eq!(channel.state().slide_id(), "7");
    }

    #[test]
    fn test_oversized_batch_rejected_in_full() {
        let mut channel = ready_channel();
        let notes = [b'a'; INBOUND_CAPACITY];
        let notes = core::str::from_utf8(&notes).unwrap();

        let bytes = encode(&[text(SyncKey::SlideId, "9"), text(SyncKey::SlideNotes, notes)]);
        assert!(bytes.len() > INBOUND_CAPACITY);

        let result = channel.apply_batch(&bytes);
        assert_eq!(
            result,
            Err(SyncError::Overflow {
                len: bytes.len(),
                capacity: INBOUND_CAPACITY,
            })
        );

        assert_eq!(channel.state().slide_id(), "1");
        assert_eq!(channel.state().notes(), "");
        assert_eq!(channel.progress_text(), "Slide 1 / 12");
        assert_eq!(channel.status(), DisplayStatus::Ready);
    }

    #[test]
    fn test_smaller_inbound_capacity() {
        let mut channel = SyncChannel::new(16, LatchPolicy::Sticky);
        let bytes = encode(&[text(SyncKey::PresentationTitle, "A long title")]);
        assert!(matches!(
            channel.apply_batch(&bytes),
            Err(SyncError::Overflow { capacity: 16, .. })
        ));
        assert!(!channel.state().is_loaded());
    }

    #[test]
    fn test_inbound_capacity_capped_at_buffer() {
        let mut channel = SyncChannel::new(60_000, LatchPolicy::Sticky);
        assert_eq!(channel.inbound_capacity(), INBOUND_CAPACITY);

        let notes = [b'a'; INBOUND_CAPACITY];
        let notes = core::str::from_utf8(&notes).unwrap();
        let bytes = encode(&[text(SyncKey::SlideNotes, notes)]);
        assert!(matches!(
            channel.apply_batch(&bytes),
            Err(SyncError::Overflow { .. })
        ));
        assert_eq!(channel.state().notes(), "");
    }

    #[test]
    fn test_malformed_batch_rejected_in_full() {
        let mut channel = SyncChannel::default();
        let mut bytes = encode(&[text(SyncKey::SlideId, "3"), text(SyncKey::SlideCount, "4")]);
        // Drop the last byte so the second tuple is truncated
        bytes.pop();

        assert_eq!(
            channel.apply_batch(&bytes),
            Err(SyncError::Malformed(DictError::Truncated))
        );
        assert_eq!(channel.state().slide_id(), "");
        assert_eq!(channel.progress_revision(), 0);
    }

    #[test]
    fn test_status_follows_latches_and_link() {
        let mut channel = SyncChannel::default();
        assert_eq!(channel.status(), DisplayStatus::Disconnected);

        assert!(channel.set_connected(true));
        assert_eq!(channel.status(), DisplayStatus::Unconfigured);

        let report = channel
            .apply_batch(&encode(&[text(SyncKey::IsConfigured, "yes")]))
            .unwrap();
        assert!(report.status_changed);
        assert_eq!(channel.status(), DisplayStatus::Connecting);

        let report = channel
            .apply_batch(&encode(&[text(SyncKey::PresentationTitle, "Deck")]))
            .unwrap();
        assert!(report.status_changed);
        assert_eq!(channel.status(), DisplayStatus::Ready);

        assert!(channel.set_connected(false));
        assert_eq!(channel.status(), DisplayStatus::Disconnected);
        assert!(!channel.set_connected(false));
    }

    #[test]
    fn test_empty_title_keeps_ready() {
        let mut channel = ready_channel();
        let report = channel
            .apply_batch(&encode(&[text(SyncKey::PresentationTitle, "")]))
            .unwrap();

        assert!(!report.status_changed);
        assert!(channel.state().is_loaded());
        assert_eq!(channel.status(), DisplayStatus::Ready);
    }

    #[test]
    fn test_apply_single_field() {
        let mut channel = SyncChannel::default();
        let change = channel
            .apply_field(SyncKey::SlideCount, TupleValue::Text("30"))
            .unwrap();
        assert!(change.progress_dirty);
        assert_eq!(channel.progress_text(), "Slide  / 30");

        assert!(matches!(
            channel.apply_field(SyncKey::SlideCount, TupleValue::Int(31)),
            Err(SyncError::Rejected(_))
        ));
        assert_eq!(channel.state().slide_count(), "30");
    }

    #[test]
    fn test_empty_batch() {
        let mut channel = SyncChannel::default();
        let report = channel.apply_batch(&[0]).unwrap();
        assert_eq!(report, BatchReport::default());
    }
}

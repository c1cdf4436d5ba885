//! Sync keys shared by the watch and the phone controller

/// Identifiers of the synchronized presentation fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SyncKey {
    /// Current slide number (display only)
    SlideId,
    /// Advance intent (outbound; mirrored inbound but unused)
    NextIntent,
    /// Retreat intent (outbound; mirrored inbound but unused)
    PrevIntent,
    /// Presentation title, non-empty once a deck is open
    PresentationTitle,
    /// Total number of slides (display only)
    SlideCount,
    /// Speaker notes for the current slide (reserved)
    SlideNotes,
    /// Epoch seconds when the presentation began
    PresentationStart,
    /// Epoch seconds when the current slide began
    SlideStart,
    /// Non-empty once the controller has been configured
    IsConfigured,
}

/// Value type a key is expected to carry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FieldType {
    /// Short NUL-terminated text
    Text,
    /// 32-bit integer
    Integer,
}

// Wire format values
const KEY_SLIDE_ID: u32 = 0x0;
const KEY_NEXT_INTENT: u32 = 0x1;
const KEY_PREV_INTENT: u32 = 0x2;
const KEY_PRESENTATION_TITLE: u32 = 0x3;
const KEY_SLIDE_COUNT: u32 = 0x4;
const KEY_SLIDE_NOTES: u32 = 0x5;
const KEY_PRESENTATION_START: u32 = 0x6;
const KEY_SLIDE_START: u32 = 0x7;
const KEY_IS_CONFIGURED: u32 = 0x8;

impl SyncKey {
    /// Every key, in wire order
    pub const ALL: [SyncKey; 9] = [
        SyncKey::SlideId,
        SyncKey::NextIntent,
        SyncKey::PrevIntent,
        SyncKey::PresentationTitle,
        SyncKey::SlideCount,
        SyncKey::SlideNotes,
        SyncKey::PresentationStart,
        SyncKey::SlideStart,
        SyncKey::IsConfigured,
    ];

    /// Parse a key from its wire number
    pub fn from_u32(raw: u32) -> Option<Self> {
        match raw {
            KEY_SLIDE_ID => Some(SyncKey::SlideId),
            KEY_NEXT_INTENT => Some(SyncKey::NextIntent),
            KEY_PREV_INTENT => Some(SyncKey::PrevIntent),
            KEY_PRESENTATION_TITLE => Some(SyncKey::PresentationTitle),
            KEY_SLIDE_COUNT => Some(SyncKey::SlideCount),
            KEY_SLIDE_NOTES => Some(SyncKey::SlideNotes),
            KEY_PRESENTATION_START => Some(SyncKey::PresentationStart),
            KEY_SLIDE_START => Some(SyncKey::SlideStart),
            KEY_IS_CONFIGURED => Some(SyncKey::IsConfigured),
            _ => None,
        }
    }

    /// Convert to wire number
    pub fn to_u32(self) -> u32 {
        match self {
            SyncKey::SlideId => KEY_SLIDE_ID,
            SyncKey::NextIntent => KEY_NEXT_INTENT,
            SyncKey::PrevIntent => KEY_PREV_INTENT,
            SyncKey::PresentationTitle => KEY_PRESENTATION_TITLE,
            SyncKey::SlideCount => KEY_SLIDE_COUNT,
            SyncKey::SlideNotes => KEY_SLIDE_NOTES,
            SyncKey::PresentationStart => KEY_PRESENTATION_START,
            SyncKey::SlideStart => KEY_SLIDE_START,
            SyncKey::IsConfigured => KEY_IS_CONFIGURED,
        }
    }

    /// Type the controller sends for this key
    pub fn field_type(self) -> FieldType {
        match self {
            SyncKey::PresentationStart | SyncKey::SlideStart => FieldType::Integer,
            _ => FieldType::Text,
        }
    }

    /// Returns true if a change to this key invalidates the progress text
    pub fn affects_progress(self) -> bool {
        matches!(self, SyncKey::SlideId | SyncKey::SlideCount)
    }
}

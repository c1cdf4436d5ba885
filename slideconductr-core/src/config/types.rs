//! Configuration type definitions
//!
//! Defaults reproduce the watch app's fixed constants. With the `serde`
//! feature the whole configuration can be persisted as postcard bytes.

use heapless::String;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use slideconductr_protocol::dict::{DICT_HEADER_SIZE, TUPLE_HEADER_SIZE};
use slideconductr_protocol::{INBOUND_CAPACITY, INTENT_MARKER, OUTBOUND_CAPACITY};

use crate::state::DisplayStatus;
use crate::text::truncated;

/// Maximum intent marker length
pub const MAX_MARKER_LEN: usize = 8;

/// Maximum status message length
pub const MAX_STATUS_MESSAGE_LEN: usize = 64;

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Inbound capacity cannot hold even an empty dictionary
    InboundCapacityTooSmall,
    /// Inbound capacity exceeds the fixed inbound buffer
    InboundCapacityTooLarge,
    /// Outbound capacity exceeds the fixed outbound buffer
    OutboundCapacityTooLarge,
    /// Outbound capacity cannot hold a single intent
    OutboundCapacityTooSmall,
    /// Stored bytes are not a valid configuration
    Deserialize,
    /// Output buffer too small for the serialized configuration
    Serialize,
}

/// What happens to the loaded/configured latches when their field is
/// later synced as empty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LatchPolicy {
    /// Once set, a latch stays set for the life of the engine
    #[default]
    Sticky,
    /// An empty value clears the latch again
    FollowValue,
}

impl LatchPolicy {
    /// Next latch value after observing a field that is `non_empty`
    pub fn next(self, latched: bool, non_empty: bool) -> bool {
        match self {
            LatchPolicy::Sticky => latched || non_empty,
            LatchPolicy::FollowValue => non_empty,
        }
    }
}

/// Human-readable message per display status
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StatusMessages {
    pub disconnected: String<MAX_STATUS_MESSAGE_LEN>,
    pub unconfigured: String<MAX_STATUS_MESSAGE_LEN>,
    pub connecting: String<MAX_STATUS_MESSAGE_LEN>,
    pub ready: String<MAX_STATUS_MESSAGE_LEN>,
}

impl Default for StatusMessages {
    fn default() -> Self {
        Self {
            disconnected: truncated("Bluetooth Connection Required"),
            unconfigured: truncated("Configure SlideConductr from the app on your phone"),
            connecting: truncated("Connecting..."),
            ready: truncated("Ready"),
        }
    }
}

impl StatusMessages {
    /// Message shown for `status`
    pub fn for_status(&self, status: DisplayStatus) -> &str {
        match status {
            DisplayStatus::Disconnected => &self.disconnected,
            DisplayStatus::Unconfigured => &self.unconfigured,
            DisplayStatus::Connecting => &self.connecting,
            DisplayStatus::Ready => &self.ready,
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EngineConfig {
    /// Largest inbound batch accepted, in bytes (at most [`INBOUND_CAPACITY`])
    pub inbound_capacity: u16,
    /// Largest outbound message, in bytes (at most [`OUTBOUND_CAPACITY`])
    pub outbound_capacity: u16,
    /// Text carried by NEXT/PREV intents
    pub intent_marker: String<MAX_MARKER_LEN>,
    /// Loaded/configured latch behavior
    pub latch_policy: LatchPolicy,
    /// Status messages
    pub status_messages: StatusMessages,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            inbound_capacity: INBOUND_CAPACITY as u16,
            outbound_capacity: OUTBOUND_CAPACITY as u16,
            intent_marker: truncated(INTENT_MARKER),
            latch_policy: LatchPolicy::Sticky,
            status_messages: StatusMessages::default(),
        }
    }
}

impl EngineConfig {
    /// Encoded size of one intent with this configuration's marker
    pub fn intent_len(&self) -> usize {
        DICT_HEADER_SIZE + TUPLE_HEADER_SIZE + self.intent_marker.len() + 1
    }

    /// Check that the capacities are usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if (self.inbound_capacity as usize) < DICT_HEADER_SIZE {
            return Err(ConfigError::InboundCapacityTooSmall);
        }

        if self.inbound_capacity as usize > INBOUND_CAPACITY {
            return Err(ConfigError::InboundCapacityTooLarge);
        }

        if self.outbound_capacity as usize > OUTBOUND_CAPACITY {
            return Err(ConfigError::OutboundCapacityTooLarge);
        }

        if self.intent_len() > self.outbound_capacity as usize {
            return Err(ConfigError::OutboundCapacityTooSmall);
        }

        Ok(())
    }
}

#[cfg(feature = "serde")]
impl EngineConfig {
    /// Load a configuration from postcard bytes and validate it
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        let config: Self = postcard::from_bytes(bytes).map_err(|_| ConfigError::Deserialize)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize this configuration into `buffer`
    ///
    /// Returns the used prefix of the buffer
    pub fn to_slice<'b>(&self, buffer: &'b mut [u8]) -> Result<&'b mut [u8], ConfigError> {
        postcard::to_slice(self, buffer).map_err(|_| ConfigError::Serialize)
    }
}


// Tests require the serde feature
#[cfg(all(test, feature = "serde"))]
mod persistence_tests {
    use super::*;

    #[test]
    fn test_postcard_roundtrip() {
        let config = EngineConfig {
            inbound_capacity: 640,
            latch_policy: LatchPolicy::FollowValue,
            ..EngineConfig::default()
        };

        let mut buffer = [0u8; 512];
        let len = config.to_slice(&mut buffer).unwrap().len();
        let loaded = EngineConfig::from_bytes(&buffer[..len]).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_garbage_rejected() {
        assert_eq!(
            EngineConfig::from_bytes(&[0xFF, 0xFF, 0xFF]),
            Err(ConfigError::Deserialize)
        );
    }

    #[test]
    fn test_invalid_config_rejected_on_load() {
        let config = EngineConfig {
            outbound_capacity: 4,
            ..EngineConfig::default()
        };
        let mut buffer = [0u8; 512];
        let len = config.to_slice(&mut buffer).unwrap().len();
        assert_eq!(
            EngineConfig::from_bytes(&buffer[..len]),
            Err(ConfigError::OutboundCapacityTooSmall)
        );
    }

    #[test]
    fn test_serialize_buffer_too_small() {
        let mut buffer = [0u8; 4];
        assert_eq!(
            EngineConfig::default().to_slice(&mut buffer).map(|s| s.len()),
            Err(ConfigError::Serialize)
        );
    }
}

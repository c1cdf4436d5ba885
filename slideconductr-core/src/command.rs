//! Command dispatcher
//!
//! Turns button actions into NEXT/PREV intents for the controller. Nothing
//! is sent until a presentation is loaded. Each call produces at most one
//! intent: no retry, no queue, no coalescing.

use heapless::String;

use slideconductr_protocol::{DictError, Intent, OUTBOUND_CAPACITY};

use crate::config::{EngineConfig, MAX_MARKER_LEN};
use crate::state::PresentationState;
use crate::text::truncated;
use crate::traits::{Outbox, OutboxError};

/// Errors sending an intent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    /// Intent does not fit the outbound capacity
    Encode(DictError),
    /// Transport did not take the message; the intent is dropped
    Outbox(OutboxError),
}

impl From<DictError> for CommandError {
    fn from(e: DictError) -> Self {
        CommandError::Encode(e)
    }
}

impl From<OutboxError> for CommandError {
    fn from(e: OutboxError) -> Self {
        CommandError::Outbox(e)
    }
}

/// What a dispatch attempt did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Dispatch {
    /// Intent handed to the transport
    Sent(Intent),
    /// No presentation loaded yet; nothing sent
    NotLoaded,
}

/// Encodes and sends intents
#[derive(Debug, Clone)]
pub struct CommandDispatcher {
    marker: String<MAX_MARKER_LEN>,
    outbound_capacity: usize,
}

impl Default for CommandDispatcher {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl CommandDispatcher {
    /// Create a dispatcher
    ///
    /// `outbound_capacity` is capped at [`OUTBOUND_CAPACITY`].
    pub fn new(marker: &str, outbound_capacity: usize) -> Self {
        Self {
            marker: truncated(marker),
            outbound_capacity: outbound_capacity.min(OUTBOUND_CAPACITY),
        }
    }

    /// Create a dispatcher from engine configuration
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(&config.intent_marker, config.outbound_capacity as usize)
    }

    /// Ask the controller for the next slide
    pub fn advance<O: Outbox>(
        &self,
        state: &PresentationState,
        outbox: &mut O,
    ) -> Result<Dispatch, CommandError> {
        self.dispatch(Intent::Next, state, outbox)
    }

    /// Ask the controller for the previous slide
    pub fn retreat<O: Outbox>(
        &self,
        state: &PresentationState,
        outbox: &mut O,
    ) -> Result<Dispatch, CommandError> {
        self.dispatch(Intent::Prev, state, outbox)
    }

    /// Send `intent` if a presentation is loaded
    pub fn dispatch<O: Outbox>(
        &self,
        intent: Intent,
        state: &PresentationState,
        outbox: &mut O,
    ) -> Result<Dispatch, CommandError> {
        if !state.is_loaded() {
            return Ok(Dispatch::NotLoaded);
        }

        let mut buffer = [0u8; OUTBOUND_CAPACITY];
        let len = intent.encode(&self.marker, &mut buffer[..self.outbound_capacity])?;
        outbox.send(&buffer[..len])?;
        Ok(Dispatch::Sent(intent))
    }
}

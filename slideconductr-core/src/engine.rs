//! Event dispatcher coordinating sync, clock and commands
//!
//! The engine is the single owner of everything the watch shows:
//! - Applies field batches from the controller through the sync channel
//! - Tracks the phone link
//! - Refreshes both durations on every tick
//! - Turns button presses into NEXT/PREV intents
//!
//! Each event runs to completion inside [`Engine::handle`]. Errors are
//! recorded in the returned [`Refresh`] and never stop the engine.

use slideconductr_protocol::Intent;

use crate::clock::{DurationClock, FormatError};
use crate::command::{CommandDispatcher, CommandError, Dispatch};
use crate::config::{ConfigError, EngineConfig, StatusMessages};
use crate::state::{Button, DisplayStatus, Event, PresentationState};
use crate::sync::{SyncChannel, SyncError};
use crate::traits::{ConnectionSource, Outbox};

/// Error raised while handling a single event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EngineError {
    /// Inbound batch rejected, or a field within it
    Sync(SyncError),
    /// Duration text could not be rendered
    Clock(FormatError),
    /// Intent could not be sent
    Command(CommandError),
}

impl From<SyncError> for EngineError {
    fn from(e: SyncError) -> Self {
        EngineError::Sync(e)
    }
}

impl From<FormatError> for EngineError {
    fn from(e: FormatError) -> Self {
        EngineError::Clock(e)
    }
}

impl From<CommandError> for EngineError {
    fn from(e: CommandError) -> Self {
        EngineError::Command(e)
    }
}

/// Display regions touched by one event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Refresh {
    /// Progress text changed
    pub progress: bool,
    /// Slide or presentation duration text changed
    pub durations: bool,
    /// Display status changed
    pub status: bool,
    /// Intent handed to the outbox
    pub sent: Option<Intent>,
    /// Error raised while handling the event
    pub error: Option<EngineError>,
}

impl Refresh {
    /// Check if any display region needs redrawing
    pub fn needs_redraw(&self) -> bool {
        self.progress || self.durations || self.status
    }

    /// Check if the event was handled without error
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Snapshot of everything the display shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct View<'a> {
    /// `Slide {id} / {count}`
    pub progress: &'a str,
    /// Time on the current slide, `MM:SS`
    pub slide_duration: &'a str,
    /// Time since the presentation started, `MM:SS`
    pub presentation_duration: &'a str,
    /// Presentation title
    pub title: &'a str,
    /// Notes for the current slide
    pub notes: &'a str,
    /// Current display status
    pub status: DisplayStatus,
    /// Message for the current status
    pub status_message: &'a str,
    /// Status message covers the presentation view
    pub overlay: bool,
}

/// Single-threaded event dispatcher
#[derive(Debug, Clone)]
pub struct Engine {
    /// Synchronized state, progress and link
    sync: SyncChannel,
    /// Slide and presentation durations
    clock: DurationClock,
    /// Outbound intents
    commands: CommandDispatcher,
    /// Message per display status
    status_messages: StatusMessages,
    /// Wall-clock time of the last tick (epoch seconds)
    last_tick: Option<i64>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::from_valid_config(EngineConfig::default())
    }
}

impl Engine {
    /// Create an engine from a validated configuration
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: EngineConfig) -> Self {
        Self {
            sync: SyncChannel::from_config(&config),
            clock: DurationClock::new(),
            commands: CommandDispatcher::from_config(&config),
            status_messages: config.status_messages,
            last_tick: None,
        }
    }

    /// Seed the link state from the host at startup
    pub fn sync_connection<C: ConnectionSource>(&mut self, source: &C) -> Refresh {
        let refresh = self.on_connection_changed(source.is_connected());

        #[cfg(feature = "defmt")]
        if refresh.status {
            defmt::debug!("Status now {}", self.status());
        }

        refresh
    }

    /// Handle one event to completion
    pub fn handle<O: Outbox>(&mut self, event: Event<'_>, outbox: &mut O) -> Refresh {
        let refresh = match event {
            Event::Tick { now } => self.on_tick(now),
            Event::FieldUpdate(bytes) => self.on_field_update(bytes),
            Event::ConnectionChanged(connected) => self.on_connection_changed(connected),
            Event::ButtonPressed(button) => self.on_button(button, outbox),
        };

        #[cfg(feature = "defmt")]
        {
            if let Some(error) = refresh.error {
                defmt::warn!("Event {} failed: {}", event, error);
            }
            if refresh.status {
                defmt::debug!("Status now {}", self.status());
            }
        }

        refresh
    }

    /// Refresh both durations against the synced start timestamps
    fn on_tick(&mut self, now: i64) -> Refresh {
        self.last_tick = Some(now);
        let state = self.sync.state();

        match self
            .clock
            .tick(now, state.slide_start(), state.presentation_start())
        {
            Ok(durations) => Refresh {
                durations,
                ..Refresh::default()
            },
            Err(e) => Refresh {
                error: Some(e.into()),
                ..Refresh::default()
            },
        }
    }

    /// Apply a batch of field updates
    ///
    /// Durations are left for the next tick.
    fn on_field_update(&mut self, bytes: &[u8]) -> Refresh {
        match self.sync.apply_batch(bytes) {
            Ok(report) => {
                #[cfg(feature = "defmt")]
                if report.ignored > 0 {
                    defmt::debug!("Ignored {} unknown fields", report.ignored);
                }

                Refresh {
                    progress: report.progress_changed,
                    status: report.status_changed,
                    error: report
                        .first_rejection
                        .map(|e| EngineError::Sync(SyncError::Rejected(e))),
                    ..Refresh::default()
                }
            }
            Err(e) => Refresh {
                error: Some(e.into()),
                ..Refresh::default()
            },
        }
    }

    fn on_connection_changed(&mut self, connected: bool) -> Refresh {
        Refresh {
            status: self.sync.set_connected(connected),
            ..Refresh::default()
        }
    }

    /// Send the button's intent; nothing is sent before a presentation loads
    fn on_button<O: Outbox>(&mut self, button: Button, outbox: &mut O) -> Refresh {
        match self
            .commands
            .dispatch(button.intent(), self.sync.state(), outbox)
        {
            Ok(Dispatch::Sent(intent)) => Refresh {
                sent: Some(intent),
                ..Refresh::default()
            },
            Ok(Dispatch::NotLoaded) => Refresh::default(),
            Err(e) => Refresh {
                error: Some(e.into()),
                ..Refresh::default()
            },
        }
    }

    /// Current display snapshot
    pub fn view(&self) -> View<'_> {
        let status = self.status();
        let state = self.sync.state();
        View {
            progress: self.sync.progress_text(),
            slide_duration: self.clock.slide_text(),
            presentation_duration: self.clock.presentation_text(),
            title: state.title(),
            notes: state.notes(),
            status,
            status_message: self.status_messages.for_status(status),
            overlay: status.shows_overlay(),
        }
    }

    /// Current display status
    pub fn status(&self) -> DisplayStatus {
        self.sync.status()
    }

    /// Read-only view of the synchronized fields
    pub fn state(&self) -> &PresentationState {
        self.sync.state()
    }

    /// Duration clock
    pub fn clock(&self) -> &DurationClock {
        &self.clock
    }

    /// Sync channel
    pub fn sync(&self) -> &SyncChannel {
        &self.sync
    }

    /// Wall-clock time of the last tick, if any
    pub fn last_tick(&self) -> Option<i64> {
        self.last_tick
    }
}

//! Outbound message channel to the controller

/// Errors that can occur handing a message to the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutboxError {
    /// Channel busy or not open; nothing was sent
    Unavailable,
    /// Transport refused the message (e.g. too large)
    Rejected,
}

/// Trait for the outbound side of the phone link
///
/// Sends are fire-and-forget: `Ok` means the transport accepted the bytes,
/// not that the controller received them. Implementations must not block.
pub trait Outbox {
    /// Hand one encoded dictionary to the transport
    fn send(&mut self, message: &[u8]) -> Result<(), OutboxError>;
}

impl<T: Outbox + ?Sized> Outbox for &mut T {
    fn send(&mut self, message: &[u8]) -> Result<(), OutboxError> {
        (**self).send(message)
    }
}

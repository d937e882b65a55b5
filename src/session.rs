//! Connection abstraction
//!
//! The engine never talks to sockets directly. Every connected screen, host
//! console or read-only board display, is reached through a [`Tunnel`]
//! supplied by the embedding application.

use super::{SyncMessage, UpdateMessage};

/// A channel to one connected screen
pub trait Tunnel {
    /// Sends an incremental update
    ///
    /// # Arguments
    ///
    /// * `message` - The update message to send
    fn send_message(&self, message: &UpdateMessage);

    /// Sends the full board state, used when a screen connects or reconnects
    ///
    /// # Arguments
    ///
    /// * `state` - The synchronization message to send
    fn send_state(&self, state: &SyncMessage);

    /// Closes the channel
    fn close(self);
}

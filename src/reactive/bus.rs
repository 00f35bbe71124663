//! NotificationBus — one [`EventEmitter`] per declared [`Channel`].
//!
//! Listeners subscribe to the channels they care about and never see the
//! store's field names. `on_any` exists for diagnostics and tests that need
//! to observe every emission in order.

use super::event_emitter::{EventEmitter, ListenerId};
use super::notification::{Channel, Notification, CHANNEL_COUNT};

pub struct NotificationBus {
    /// Indexed by `Channel as usize`; `Channel::ALL` is in discriminant order.
    channels: [EventEmitter<Notification>; CHANNEL_COUNT],
    any: EventEmitter<Notification>,
}

impl NotificationBus {
    pub fn new() -> Self {
        Self {
            channels: std::array::from_fn(|_| EventEmitter::new()),
            any: EventEmitter::new(),
        }
    }

    /// Listen on a single channel.
    pub fn on(
        &self,
        channel: Channel,
        callback: impl Fn(&Notification) + Send + Sync + 'static,
    ) -> ListenerId {
        self.emitter(channel).on(callback)
    }

    pub fn off(&self, channel: Channel, id: ListenerId) -> bool {
        self.emitter(channel).off(id)
    }

    /// Listen on every channel. Called after the channel's own listeners.
    pub fn on_any(&self, callback: impl Fn(&Notification) + Send + Sync + 'static) -> ListenerId {
        self.any.on(callback)
    }

    pub fn off_any(&self, id: ListenerId) -> bool {
        self.any.off(id)
    }

    /// Broadcast `notification` on its channel.
    ///
    /// Listener panics are contained and logged; they never reach the caller.
    pub fn emit(&self, notification: Notification) {
        let channel = notification.channel();
        let panicked = self.emitter(channel).emit(&notification) + self.any.emit(&notification);
        if panicked > 0 {
            tracing::warn!(%channel, panicked, "notification listener panicked");
        }
    }

    /// Number of listeners on `channel` (excluding `on_any` listeners).
    pub fn listener_count(&self, channel: Channel) -> usize {
        self.emitter(channel).size()
    }

    fn emitter(&self, channel: Channel) -> &EventEmitter<Notification> {
        &self.channels[channel as usize]
    }
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::new()
    }
}

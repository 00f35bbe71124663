//! ChangeRouter — turns a store changed-set into typed channel emissions.
//!
//! The field → channel mapping is the [`ROUTES`] table. Adding a routed field
//! means adding one row; fields without a row are ignored.

use std::sync::{Arc, Weak};

use crate::error::{json_type_name, RouteError};
use crate::patch::Changeset;
use crate::store::KeyedStore;
use crate::types::{field, SubscriptionId};

use super::bus::NotificationBus;
use super::notification::{Channel, Notification};

/// Field name → channel. Emission order within one changed-set follows this table.
pub const ROUTES: &[(&str, Channel)] = &[
    (field::FONT_SIZE, Channel::FontSize),
    (field::WRITE_MODE, Channel::WriteMode),
    (field::SOURCE_DIR, Channel::SourceDir),
    (field::OUTPUT_DIR, Channel::OutputDir),
    (field::OUTPUT_EXT, Channel::OutputExt),
    (field::FILE_LIST, Channel::FileList),
    (field::FILE_METADATA_CACHE, Channel::FileMetadataCache),
    (field::IMAGE_EXTS, Channel::ImageExts),
    (field::ALLOW_FILES, Channel::AllowFiles),
    (field::SELECTED_LANG, Channel::Lang),
];

pub struct ChangeRouter {
    store: Arc<KeyedStore>,
    bus: Arc<NotificationBus>,
}

impl ChangeRouter {
    pub fn new(store: Arc<KeyedStore>, bus: Arc<NotificationBus>) -> Self {
        Self { store, bus }
    }

    /// The routing table.
    pub fn routes() -> &'static [(&'static str, Channel)] {
        ROUTES
    }

    /// The channel a field is routed to, if any.
    pub fn channel_for(field_name: &str) -> Option<Channel> {
        ROUTES
            .iter()
            .find(|(name, _)| *name == field_name)
            .map(|(_, channel)| *channel)
    }

    /// Register this router as a store subscriber.
    ///
    /// The subscription holds a weak reference, so dropping the last `Arc`
    /// to the router silences it without unsubscribing.
    pub fn attach(self: &Arc<Self>) -> SubscriptionId {
        let weak: Weak<Self> = Arc::downgrade(self);
        self.store.subscribe(move |changes| match weak.upgrade() {
            Some(router) => router.route(changes).map(|_| ()).map_err(Into::into),
            None => Ok(()),
        })
    }

    /// Emit one notification per routed field in `changes`, each carrying the
    /// field's current value read fresh from the store.
    ///
    /// Returns how many notifications were emitted. A field whose value does
    /// not fit its channel is skipped; the other fields are still emitted and
    /// the first mismatch is returned afterwards.
    pub fn route(&self, changes: &Changeset) -> Result<usize, RouteError> {
        let mut emitted = 0;
        let mut first_error = None;

        for (field_name, channel) in ROUTES {
            if !changes.contains(*field_name) {
                continue;
            }
            // Fields are never removed, so a changed field is always readable.
            let Ok(value) = self.store.get(field_name) else {
                continue;
            };
            let received = json_type_name(&value);
            match Notification::from_value(*channel, value) {
                Some(notification) => {
                    tracing::trace!(field = %field_name, %channel, "routing field change");
                    self.bus.emit(notification);
                    emitted += 1;
                }
                None => {
                    first_error.get_or_insert_with(|| RouteError {
                        field: field_name.to_string(),
                        channel: channel.name().to_string(),
                        expected: channel.payload_kind().expected().to_string(),
                        received: received.to_string(),
                    });
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(emitted),
        }
    }

    /// React to the file-read subsystem finishing a scan: reset the
    /// selection-status hint to `0`.
    pub fn file_read_ready(&self) {
        self.bus.emit(Notification::SelectionStatusChanged(0));
    }
}

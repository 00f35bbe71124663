//! Reactive layer — typed notifications driven by store changes.
//!
//! # Overview
//!
//! [`ChangeRouter`] subscribes to the [`KeyedStore`](crate::store::KeyedStore)
//! and re-broadcasts each changed field on its [`Channel`] through the
//! [`NotificationBus`]. Listeners only ever see typed [`Notification`]s.
//!
//! # Modules
//!
//! - [`event_emitter`] — Generic typed pub/sub ([`EventEmitter<T>`]).
//! - [`notification`] — [`Channel`] and [`Notification`].
//! - [`bus`] — [`NotificationBus`].
//! - [`router`] — [`ChangeRouter`] and its [`ROUTES`] table.

pub mod bus;
pub mod event_emitter;
pub mod notification;
pub mod router;

pub use bus::NotificationBus;
pub use event_emitter::{EventEmitter, ListenerId};
pub use notification::{Channel, Notification, PayloadKind};
pub use router::{ChangeRouter, ROUTES};

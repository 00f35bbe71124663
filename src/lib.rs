pub mod error;
pub mod types;

pub mod app;
pub mod config;
pub mod ordering;
pub mod patch;
pub mod reactive;
pub mod store;

pub use app::AppCore;
pub use config::{AppConfig, LanguageCatalog, TranslationSource};
pub use error::{Result, ShelfError};
pub use ordering::{OrderingDispatcher, SortMode, UnknownSortMode};
pub use reactive::{Channel, ChangeRouter, Notification, NotificationBus};
pub use store::KeyedStore;

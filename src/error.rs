use std::fmt;
use thiserror::Error;

use crate::types::SubscriptionId;

// ---------------------------------------------------------------------------
// SubscriberError / SubscriberErrors
// ---------------------------------------------------------------------------

/// A single subscriber failure collected during an update fan-out.
#[derive(Debug, Clone)]
pub struct SubscriberError {
    pub subscription: SubscriptionId,
    pub message: String,
}

impl SubscriberError {
    pub fn new(subscription: SubscriptionId, message: impl Into<String>) -> Self {
        Self {
            subscription,
            message: message.into(),
        }
    }
}

impl fmt::Display for SubscriberError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Subscriber #{} failed: {}", self.subscription, self.message)
    }
}

impl std::error::Error for SubscriberError {}

/// Every subscriber failure from one update, in registration order.
#[derive(Debug, Clone)]
pub struct SubscriberErrors(pub Vec<SubscriberError>);

impl SubscriberErrors {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SubscriberError> {
        self.0.iter()
    }
}

impl fmt::Display for SubscriberErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} subscriber(s) failed:", self.0.len())?;
        for e in &self.0 {
            write!(f, "\n  - #{}: {}", e.subscription, e.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for SubscriberErrors {}

// ---------------------------------------------------------------------------
// StoreError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Unknown key: \"{0}\" was never set")]
    UnknownKey(String),

    #[error("Store already initialized. initialize() may only be called once.")]
    AlreadyInitialized,

    #[error("Reentrant update: a subscriber called update() during its own notification")]
    ReentrantUpdate,

    /// The update was applied, but one or more subscribers failed afterwards.
    #[error(transparent)]
    Subscribers(#[from] SubscriberErrors),

    #[error("Field \"{field}\" has the wrong type: expected {expected}, received {received}")]
    FieldType {
        field: String,
        expected: String,
        received: String,
    },
}

// ---------------------------------------------------------------------------
// RouteError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
#[error("Cannot emit \"{channel}\" for field \"{field}\": expected {expected}, received {received}")]
pub struct RouteError {
    pub field: String,
    pub channel: String,
    pub expected: String,
    pub received: String,
}

// ---------------------------------------------------------------------------
// OrderingError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum OrderingError {
    #[error("Unsupported sort mode: {0}")]
    UnsupportedMode(i64),

    #[error(transparent)]
    Store(#[from] StoreError),
}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Unknown language \"{0}\": not present in the language catalog")]
    UnknownLanguage(String),
}

// ---------------------------------------------------------------------------
// ShelfError — top-level rollup
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ShelfError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Route(#[from] RouteError),

    #[error(transparent)]
    Ordering(#[from] OrderingError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Convenience alias — the default error type is `ShelfError`.
pub type Result<T, E = ShelfError> = std::result::Result<T, E>;

/// Human-readable JSON type name, used in type-mismatch messages.
pub(crate) fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

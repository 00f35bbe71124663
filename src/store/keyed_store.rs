//! KeyedStore — the flat field mapping with batched updates and change fan-out.
//!
//! # Threading model
//!
//! `KeyedStore` is `Send + Sync`. Four pieces of state are guarded separately:
//!   - `fields` — the value mapping (`parking_lot::RwLock`). Held only while a
//!     patch is applied or a value is read; never across a callback.
//!   - `subscribers` — the registration list (`parking_lot::Mutex`). Snapshotted
//!     before a fan-out, so callbacks may subscribe/unsubscribe.
//!   - `update_lock` — serializes `initialize`/`update`/`update_with` end to
//!     end, including the fan-out. Two updates never interleave and every
//!     changed-set is computed against a fully applied state.
//!   - `notifying` — the thread currently running subscribers. An `update`
//!     from that thread is rejected with [`StoreError::ReentrantUpdate`]
//!     instead of deadlocking on `update_lock`.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, ThreadId};

use parking_lot::{Mutex, RwLock};
use serde_json::Value;

use crate::error::{json_type_name, StoreError, SubscriberError, SubscriberErrors};
use crate::patch::{apply_patch, Changeset};
use crate::types::{Fields, SubscriptionId};

/// Boxed error a subscriber may return.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// What a subscriber returns for one notification.
pub type SubscriberResult = std::result::Result<(), BoxError>;

/// Closure type for store subscribers.
pub type SubscriberFn = dyn Fn(&Changeset) -> SubscriberResult + Send + Sync;

/// The application's field store.
pub struct KeyedStore {
    fields: RwLock<Fields>,
    subscribers: Mutex<Vec<(SubscriptionId, Arc<SubscriberFn>)>>,
    next_id: AtomicU64,
    initialized: AtomicBool,
    update_lock: Mutex<()>,
    notifying: Mutex<Option<ThreadId>>,
}

/// Clears `notifying` when the fan-out ends, however it ends.
struct NotifyingGuard<'a>(&'a Mutex<Option<ThreadId>>);

impl Drop for NotifyingGuard<'_> {
    fn drop(&mut self) {
        *self.0.lock() = None;
    }
}

impl KeyedStore {
    /// Create an empty, uninitialized store.
    pub fn new() -> Self {
        Self {
            fields: RwLock::new(Fields::new()),
            subscribers: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
            initialized: AtomicBool::new(false),
            update_lock: Mutex::new(()),
            notifying: Mutex::new(None),
        }
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Set the startup field values. May be called once per store.
    ///
    /// Subscribers registered beforehand are notified with every default key.
    pub fn initialize(&self, defaults: Fields) -> Result<Changeset, StoreError> {
        self.reject_reentrant()?;
        let _serial = self.update_lock.lock();
        if self.initialized.swap(true, Ordering::SeqCst) {
            return Err(StoreError::AlreadyInitialized);
        }
        tracing::debug!(fields = defaults.len(), "initializing store");
        self.apply_and_notify(defaults)
    }

    /// Whether [`initialize`](Self::initialize) has run.
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Return an owned copy of the value stored under `key`.
    pub fn get(&self, key: &str) -> Result<Value, StoreError> {
        self.read(key, Value::clone)
    }

    /// Run `f` against the value under `key` without copying it.
    ///
    /// The read lock is held while `f` runs; `f` must not call `update`.
    pub fn read<R>(&self, key: &str, f: impl FnOnce(&Value) -> R) -> Result<R, StoreError> {
        let fields = self.fields.read();
        fields
            .get(key)
            .map(f)
            .ok_or_else(|| StoreError::UnknownKey(key.to_string()))
    }

    /// Read `key` as a list of strings.
    pub fn get_string_list(&self, key: &str) -> Result<Vec<String>, StoreError> {
        self.read(key, |value| to_string_list(key, value))?
    }

    /// Whether `key` has ever been set.
    pub fn contains(&self, key: &str) -> bool {
        self.fields.read().contains_key(key)
    }

    /// All field names currently present.
    pub fn keys(&self) -> Vec<String> {
        self.fields.read().keys().cloned().collect()
    }

    /// An owned copy of the whole mapping.
    pub fn snapshot(&self) -> Fields {
        self.fields.read().clone()
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    /// Apply every key/value pair of `patch`, then notify subscribers once
    /// with the set of keys that actually changed.
    ///
    /// Returns the changed-set. A patch that changes nothing notifies nobody.
    /// If subscribers fail, the patch stays applied and the failures are
    /// returned together as [`StoreError::Subscribers`].
    pub fn update(&self, patch: Fields) -> Result<Changeset, StoreError> {
        self.reject_reentrant()?;
        let _serial = self.update_lock.lock();
        self.apply_and_notify(patch)
    }

    /// Compute a patch from the current fields and apply it as one update.
    ///
    /// `compute` runs under the update lock, so no other update can land
    /// between the read and the write. It sees the fields through a read
    /// lock and must not call back into the store. An error from `compute`
    /// leaves the store untouched.
    pub fn update_with(
        &self,
        compute: impl FnOnce(&Fields) -> Result<Fields, StoreError>,
    ) -> Result<Changeset, StoreError> {
        self.reject_reentrant()?;
        let _serial = self.update_lock.lock();
        let patch = {
            let fields = self.fields.read();
            compute(&fields)?
        };
        self.apply_and_notify(patch)
    }

    /// Single-field shorthand for [`update`](Self::update).
    pub fn set(&self, key: impl Into<String>, value: Value) -> Result<Changeset, StoreError> {
        let mut patch = Fields::new();
        patch.insert(key.into(), value);
        self.update(patch)
    }

    // -----------------------------------------------------------------------
    // Subscriptions
    // -----------------------------------------------------------------------

    /// Register `callback`; it runs on every update with a non-empty
    /// changed-set, after subscribers registered before it.
    pub fn subscribe(
        &self,
        callback: impl Fn(&Changeset) -> SubscriberResult + Send + Sync + 'static,
    ) -> SubscriptionId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.subscribers.lock().push((id, Arc::new(callback)));
        id
    }

    /// Remove a subscriber. Returns `false` if `id` was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subs = self.subscribers.lock();
        let before = subs.len();
        subs.retain(|(sid, _)| *sid != id);
        subs.len() != before
    }

    /// Number of registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    fn reject_reentrant(&self) -> Result<(), StoreError> {
        if *self.notifying.lock() == Some(thread::current().id()) {
            tracing::warn!("update() called from inside a store subscriber");
            return Err(StoreError::ReentrantUpdate);
        }
        Ok(())
    }

    /// Caller must hold `update_lock`.
    fn apply_and_notify(&self, patch: Fields) -> Result<Changeset, StoreError> {
        let changes = {
            let mut fields = self.fields.write();
            apply_patch(&mut fields, patch)
        };
        if changes.is_empty() {
            return Ok(changes);
        }
        tracing::debug!(changed = ?changes, "store updated");

        let errors = self.notify(&changes);
        if errors.is_empty() {
            Ok(changes)
        } else {
            Err(SubscriberErrors(errors).into())
        }
    }

    fn notify(&self, changes: &Changeset) -> Vec<SubscriberError> {
        let snapshot: Vec<(SubscriptionId, Arc<SubscriberFn>)> = {
            let subs = self.subscribers.lock();
            subs.iter().map(|(id, cb)| (*id, Arc::clone(cb))).collect()
        };

        *self.notifying.lock() = Some(thread::current().id());
        let _reset = NotifyingGuard(&self.notifying);

        let mut errors = Vec::new();
        for (id, callback) in snapshot {
            let outcome = catch_unwind(AssertUnwindSafe(|| callback(changes)));
            let failure = match outcome {
                Ok(Ok(())) => continue,
                Ok(Err(e)) => e.to_string(),
                Err(panic) => panic_message(&*panic),
            };
            tracing::warn!(subscription = id, error = %failure, "store subscriber failed");
            errors.push(SubscriberError::new(id, failure));
        }
        errors
    }
}

impl Default for KeyedStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Read `key` from `fields` as a list of strings.
pub fn string_list(fields: &Fields, key: &str) -> Result<Vec<String>, StoreError> {
    let value = fields
        .get(key)
        .ok_or_else(|| StoreError::UnknownKey(key.to_string()))?;
    to_string_list(key, value)
}

fn to_string_list(key: &str, value: &Value) -> Result<Vec<String>, StoreError> {
    let mismatch = || StoreError::FieldType {
        field: key.to_string(),
        expected: "array of strings".to_string(),
        received: json_type_name(value).to_string(),
    };
    value
        .as_array()
        .ok_or_else(mismatch)?
        .iter()
        .map(|item| item.as_str().map(str::to_string).ok_or_else(mismatch))
        .collect()
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked".to_string()
    }
}

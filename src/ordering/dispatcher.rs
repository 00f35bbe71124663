//! OrderingDispatcher — reorders the store's `file_list` by a selected strategy.
//!
//! The new order is written back through [`KeyedStore::update_with`], so
//! listeners hear about it on the normal `fileListChanged` channel. A separate
//! `SortApplied` notification tells them which strategy ran, even when the
//! order did not change.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{OrderingError, StoreError};
use crate::reactive::{Notification, NotificationBus};
use crate::store::{string_list, KeyedStore};
use crate::types::{field, Fields};

use super::natural::natural_sort;
use super::rank::resolve_rank;

/// A list-ordering strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortMode {
    /// Keep the current order.
    Identity,
    /// Natural string order.
    Natural,
    /// Ascending metadata rank; unranked items last, ties keep their order.
    MetadataRank,
}

impl SortMode {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Identity),
            1 => Some(Self::Natural),
            2 => Some(Self::MetadataRank),
            _ => None,
        }
    }

    pub fn code(self) -> i64 {
        match self {
            Self::Identity => 0,
            Self::Natural => 1,
            Self::MetadataRank => 2,
        }
    }
}

/// What [`OrderingDispatcher::sort`] does with a code that names no strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownSortMode {
    /// Do nothing and report nothing.
    #[default]
    Ignore,
    /// Fail with [`OrderingError::UnsupportedMode`].
    Reject,
}

/// Compute `items` in `mode` order without touching any store.
///
/// `cache` is the metadata cache; it is only consulted for
/// [`SortMode::MetadataRank`] and may be any JSON value.
pub fn order(mut items: Vec<String>, mode: SortMode, cache: &Value) -> Vec<String> {
    match mode {
        SortMode::Identity => {}
        SortMode::Natural => natural_sort(&mut items),
        SortMode::MetadataRank => {
            let default_rank = i64::try_from(items.len())
                .unwrap_or(i64::MAX)
                .saturating_add(1);
            // `sort_by_cached_key` is stable and resolves each rank once.
            items.sort_by_cached_key(|item| resolve_rank(cache, item, default_rank));
        }
    }
    items
}

pub struct OrderingDispatcher {
    store: Arc<KeyedStore>,
    bus: Arc<NotificationBus>,
    unknown_mode: UnknownSortMode,
}

impl OrderingDispatcher {
    pub fn new(store: Arc<KeyedStore>, bus: Arc<NotificationBus>) -> Self {
        Self {
            store,
            bus,
            unknown_mode: UnknownSortMode::default(),
        }
    }

    pub fn with_unknown_mode(mut self, policy: UnknownSortMode) -> Self {
        self.unknown_mode = policy;
        self
    }

    pub fn unknown_mode(&self) -> UnknownSortMode {
        self.unknown_mode
    }

    /// Reorder the file list by the strategy named by `code`.
    ///
    /// Returns the applied order, or `Ok(None)` when `code` names no strategy
    /// and the policy is [`UnknownSortMode::Ignore`].
    pub fn sort(&self, code: i64) -> Result<Option<Vec<String>>, OrderingError> {
        match SortMode::from_code(code) {
            Some(mode) => self.apply(mode).map(Some),
            None => match self.unknown_mode {
                UnknownSortMode::Ignore => {
                    tracing::debug!(code, "ignoring unknown sort mode");
                    Ok(None)
                }
                UnknownSortMode::Reject => Err(OrderingError::UnsupportedMode(code)),
            },
        }
    }

    /// Reorder the file list by `mode`, write it back and announce the mode.
    ///
    /// The read, the reorder and the write-back form one store update, so a
    /// concurrent `file_list` update is never overwritten by a stale order.
    /// If a store subscriber fails, the new order is still applied and
    /// announced before the failure is returned.
    pub fn apply(&self, mode: SortMode) -> Result<Vec<String>, OrderingError> {
        let mut applied = Vec::new();
        let written = self.store.update_with(|fields| {
            let items = string_list(fields, field::FILE_LIST)?;
            let ordered = match mode {
                SortMode::MetadataRank => {
                    let cache = fields.get(field::FILE_METADATA_CACHE).ok_or_else(|| {
                        StoreError::UnknownKey(field::FILE_METADATA_CACHE.to_string())
                    })?;
                    order(items, mode, cache)
                }
                _ => order(items, mode, &Value::Null),
            };
            applied.clone_from(&ordered);
            let mut patch = Fields::new();
            patch.insert(field::FILE_LIST.to_string(), Value::from(ordered));
            Ok(patch)
        });

        match written {
            Ok(_) => {
                self.bus.emit(Notification::SortApplied(mode));
                Ok(applied)
            }
            Err(StoreError::Subscribers(failures)) => {
                self.bus.emit(Notification::SortApplied(mode));
                Err(StoreError::Subscribers(failures).into())
            }
            Err(err) => Err(err.into()),
        }
    }
}

//! AppCore — the application's state context.
//!
//! Owns one [`KeyedStore`], the [`NotificationBus`] listeners attach to, the
//! [`ChangeRouter`] connecting the two, and the [`OrderingDispatcher`].
//! Construct one per running application and pass it (or its parts) to
//! whatever needs them; nothing here is global.

use std::sync::Arc;

use serde_json::Value;

use crate::config::{AppConfig, LanguageCatalog, TranslationSource};
use crate::error::{ConfigError, OrderingError, Result, StoreError};
use crate::ordering::OrderingDispatcher;
use crate::reactive::{ChangeRouter, NotificationBus};
use crate::store::KeyedStore;
use crate::types::{field, SubscriptionId};

pub struct AppCore {
    store: Arc<KeyedStore>,
    bus: Arc<NotificationBus>,
    router: Arc<ChangeRouter>,
    router_subscription: SubscriptionId,
    dispatcher: OrderingDispatcher,
}

impl AppCore {
    /// Initialize the store from `config` and the translation catalog, then
    /// start routing field changes to the bus.
    ///
    /// The startup values themselves are not broadcast.
    pub fn new(
        config: &AppConfig,
        translations: &dyn TranslationSource,
    ) -> std::result::Result<Self, StoreError> {
        let catalog = LanguageCatalog::resolve(translations, &config.preferred_lang);
        let store = Arc::new(KeyedStore::new());
        store.initialize(config.initial_fields(&catalog))?;

        let bus = Arc::new(NotificationBus::new());
        let router = Arc::new(ChangeRouter::new(Arc::clone(&store), Arc::clone(&bus)));
        let router_subscription = router.attach();
        let dispatcher = OrderingDispatcher::new(Arc::clone(&store), Arc::clone(&bus))
            .with_unknown_mode(config.unknown_sort_mode);

        tracing::debug!(lang = catalog.selected(), "application state ready");
        Ok(Self {
            store,
            bus,
            router,
            router_subscription,
            dispatcher,
        })
    }

    pub fn store(&self) -> &Arc<KeyedStore> {
        &self.store
    }

    pub fn bus(&self) -> &Arc<NotificationBus> {
        &self.bus
    }

    pub fn router(&self) -> &Arc<ChangeRouter> {
        &self.router
    }

    pub fn dispatcher(&self) -> &OrderingDispatcher {
        &self.dispatcher
    }

    /// Reorder the file list by sort-mode code. See [`OrderingDispatcher::sort`].
    pub fn sort_file_list(&self, code: i64) -> std::result::Result<Option<Vec<String>>, OrderingError> {
        self.dispatcher.sort(code)
    }

    /// The file-read subsystem finished scanning a source location.
    pub fn file_read_ready(&self) {
        self.router.file_read_ready();
    }

    /// Switch the UI language. `lang` must be a key of `langFileData`.
    pub fn select_language(&self, lang: &str) -> Result<()> {
        let known = self
            .store
            .read(field::LANG_FILE_DATA, |files| files.get(lang).is_some())?;
        if !known {
            return Err(ConfigError::UnknownLanguage(lang.to_string()).into());
        }
        self.store.set(field::SELECTED_LANG, Value::from(lang))?;
        Ok(())
    }
}

impl Drop for AppCore {
    fn drop(&mut self) {
        self.store.unsubscribe(self.router_subscription);
    }
}

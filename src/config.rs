//! Startup configuration and language-catalog resolution.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ConfigError;
use crate::ordering::UnknownSortMode;
use crate::types::{field, Fields};

/// Catalog key substituted when no translations are available, so
/// `selectedLang` always names a real `langFileData` entry.
pub const PLACEHOLDER_LANG: &str = "no-translations";

/// Startup defaults for every store field, plus dispatcher policy.
///
/// Deserializes from partial JSON; absent keys keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub source_dir: String,
    pub output_dir: String,
    pub output_ext: String,
    pub file_list: Vec<String>,
    pub file_metadata_cache: Map<String, Value>,
    pub write_mode: i64,
    pub font_size: i64,
    pub image_exts: Vec<String>,
    pub allow_files: Vec<String>,
    /// Language selected at startup when the catalog has it.
    pub preferred_lang: String,
    pub unknown_sort_mode: UnknownSortMode,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source_dir: String::new(),
            output_dir: String::new(),
            output_ext: "cbz".to_string(),
            file_list: Vec::new(),
            file_metadata_cache: Map::new(),
            write_mode: 0,
            font_size: 10,
            image_exts: [".jpg", ".jpeg", ".png", ".webp", ".bmp", ".gif"]
                .into_iter()
                .map(String::from)
                .collect(),
            allow_files: vec![".nomedia".to_string()],
            preferred_lang: "zh_TW".to_string(),
            unknown_sort_mode: UnknownSortMode::Ignore,
        }
    }
}

impl AppConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// The field mapping handed to `KeyedStore::initialize`.
    pub fn initial_fields(&self, catalog: &LanguageCatalog) -> Fields {
        let lang_files: Map<String, Value> = catalog
            .files()
            .iter()
            .map(|(lang, path)| (lang.clone(), Value::from(path.as_str())))
            .collect();

        let mut fields = Fields::new();
        fields.insert(field::SOURCE_DIR.into(), Value::from(self.source_dir.as_str()));
        fields.insert(field::OUTPUT_DIR.into(), Value::from(self.output_dir.as_str()));
        fields.insert(field::OUTPUT_EXT.into(), Value::from(self.output_ext.as_str()));
        fields.insert(field::FILE_LIST.into(), Value::from(self.file_list.clone()));
        fields.insert(
            field::FILE_METADATA_CACHE.into(),
            Value::Object(self.file_metadata_cache.clone()),
        );
        fields.insert(field::WRITE_MODE.into(), Value::from(self.write_mode));
        fields.insert(field::FONT_SIZE.into(), Value::from(self.font_size));
        fields.insert(field::IMAGE_EXTS.into(), Value::from(self.image_exts.clone()));
        fields.insert(field::ALLOW_FILES.into(), Value::from(self.allow_files.clone()));
        fields.insert(field::LANG_FILE_DATA.into(), Value::Object(lang_files));
        fields.insert(field::SELECTED_LANG.into(), Value::from(catalog.selected()));
        fields
    }
}

// ---------------------------------------------------------------------------
// Language catalog
// ---------------------------------------------------------------------------

/// Enumerates available translations as language id → resource path.
///
/// Called once at startup.
pub trait TranslationSource {
    fn enumerate(&self) -> BTreeMap<String, String>;
}

impl TranslationSource for BTreeMap<String, String> {
    fn enumerate(&self) -> BTreeMap<String, String> {
        self.clone()
    }
}

/// A non-empty set of languages with one of them selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageCatalog {
    files: BTreeMap<String, String>,
    selected: String,
}

impl LanguageCatalog {
    /// Enumerate `source` and select `preferred` if present, otherwise the
    /// first language in sorted order. An empty enumeration becomes a single
    /// [`PLACEHOLDER_LANG`] entry with an empty path.
    pub fn resolve(source: &dyn TranslationSource, preferred: &str) -> Self {
        let mut files = source.enumerate();
        if files.is_empty() {
            tracing::debug!("no translations found, using placeholder language");
            files.insert(PLACEHOLDER_LANG.to_string(), String::new());
        }
        let selected = if files.contains_key(preferred) {
            preferred.to_string()
        } else {
            files.keys().next().cloned().unwrap_or_default()
        };
        Self { files, selected }
    }

    pub fn files(&self) -> &BTreeMap<String, String> {
        &self.files
    }

    pub fn selected(&self) -> &str {
        &self.selected
    }

    pub fn contains(&self, lang: &str) -> bool {
        self.files.contains_key(lang)
    }
}

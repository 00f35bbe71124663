use serde_json::{Map, Value};

/// The store's flat state: field name → JSON value.
pub type Fields = Map<String, Value>;

/// Identifies a registered store subscriber. Pass to `KeyedStore::unsubscribe`.
pub type SubscriptionId = u64;

/// Well-known field names used by the application schema.
///
/// The store itself treats field names as opaque strings; these constants exist
/// so the router table, the dispatcher and the startup defaults agree.
pub mod field {
    pub const SOURCE_DIR: &str = "source_dir";
    pub const OUTPUT_DIR: &str = "output_dir";
    pub const OUTPUT_EXT: &str = "output_ext";
    pub const FILE_LIST: &str = "file_list";
    pub const FILE_METADATA_CACHE: &str = "file_metadata_cache";
    pub const WRITE_MODE: &str = "write_mode";
    pub const FONT_SIZE: &str = "font_size";
    pub const IMAGE_EXTS: &str = "image_exts";
    pub const ALLOW_FILES: &str = "allow_files";
    pub const LANG_FILE_DATA: &str = "langFileData";
    pub const SELECTED_LANG: &str = "selectedLang";
}

//! Channel / Notification — the typed broadcast vocabulary.
//!
//! Every notification belongs to exactly one [`Channel`]. Payload types are
//! fixed per channel, so a listener on `FileList` always receives a
//! `Vec<String>` and never has to inspect a JSON value.

use serde_json::{Map, Value};

use crate::ordering::SortMode;

/// Number of declared channels.
pub const CHANNEL_COUNT: usize = 12;

/// A named broadcast target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Channel {
    FontSize,
    WriteMode,
    SourceDir,
    OutputDir,
    OutputExt,
    FileList,
    FileMetadataCache,
    ImageExts,
    AllowFiles,
    Lang,
    /// Selection-status hint; reset to `0` when a file read completes.
    SelectionStatus,
    /// A sort strategy was applied to the file list.
    SortApplied,
}

/// The shape of a channel's payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    Text,
    Integer,
    TextList,
    Mapping,
    SortMode,
}

impl PayloadKind {
    /// Description used in type-mismatch errors.
    pub fn expected(self) -> &'static str {
        match self {
            Self::Text => "string",
            Self::Integer => "integer",
            Self::TextList => "array of strings",
            Self::Mapping => "object",
            Self::SortMode => "sort mode code (0, 1 or 2)",
        }
    }
}

impl Channel {
    /// Every declared channel, in declaration order.
    pub const ALL: [Channel; CHANNEL_COUNT] = [
        Channel::FontSize,
        Channel::WriteMode,
        Channel::SourceDir,
        Channel::OutputDir,
        Channel::OutputExt,
        Channel::FileList,
        Channel::FileMetadataCache,
        Channel::ImageExts,
        Channel::AllowFiles,
        Channel::Lang,
        Channel::SelectionStatus,
        Channel::SortApplied,
    ];

    /// Listener-facing channel name.
    pub fn name(self) -> &'static str {
        match self {
            Self::FontSize => "fontSizeChanged",
            Self::WriteMode => "writeModeChanged",
            Self::SourceDir => "sourceDirChanged",
            Self::OutputDir => "outputDirChanged",
            Self::OutputExt => "outputExtChanged",
            Self::FileList => "fileListChanged",
            Self::FileMetadataCache => "fileMetadataCacheChanged",
            Self::ImageExts => "imageExtChanged",
            Self::AllowFiles => "allowFilesChanged",
            Self::Lang => "langChanged",
            Self::SelectionStatus => "selectionStatusChange",
            Self::SortApplied => "comicListSortDisplayChange",
        }
    }

    pub fn payload_kind(self) -> PayloadKind {
        match self {
            Self::SourceDir | Self::OutputDir | Self::OutputExt | Self::Lang => PayloadKind::Text,
            Self::FontSize | Self::WriteMode | Self::SelectionStatus => PayloadKind::Integer,
            Self::FileList | Self::ImageExts | Self::AllowFiles => PayloadKind::TextList,
            Self::FileMetadataCache => PayloadKind::Mapping,
            Self::SortApplied => PayloadKind::SortMode,
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A typed notification payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    FontSizeChanged(i64),
    WriteModeChanged(i64),
    SourceDirChanged(String),
    OutputDirChanged(String),
    OutputExtChanged(String),
    FileListChanged(Vec<String>),
    FileMetadataCacheChanged(Map<String, Value>),
    ImageExtChanged(Vec<String>),
    AllowFilesChanged(Vec<String>),
    LangChanged(String),
    SelectionStatusChanged(i64),
    SortApplied(SortMode),
}

impl Notification {
    /// The channel this payload is broadcast on.
    pub fn channel(&self) -> Channel {
        match self {
            Self::FontSizeChanged(_) => Channel::FontSize,
            Self::WriteModeChanged(_) => Channel::WriteMode,
            Self::SourceDirChanged(_) => Channel::SourceDir,
            Self::OutputDirChanged(_) => Channel::OutputDir,
            Self::OutputExtChanged(_) => Channel::OutputExt,
            Self::FileListChanged(_) => Channel::FileList,
            Self::FileMetadataCacheChanged(_) => Channel::FileMetadataCache,
            Self::ImageExtChanged(_) => Channel::ImageExts,
            Self::AllowFilesChanged(_) => Channel::AllowFiles,
            Self::LangChanged(_) => Channel::Lang,
            Self::SelectionStatusChanged(_) => Channel::SelectionStatus,
            Self::SortApplied(_) => Channel::SortApplied,
        }
    }

    /// Build the payload for `channel` from an owned field value.
    ///
    /// Returns `None` when `value` does not have the channel's payload shape.
    pub fn from_value(channel: Channel, value: Value) -> Option<Self> {
        let notification = match channel {
            Channel::FontSize => Self::FontSizeChanged(as_integer(&value)?),
            Channel::WriteMode => Self::WriteModeChanged(as_integer(&value)?),
            Channel::SelectionStatus => Self::SelectionStatusChanged(as_integer(&value)?),
            Channel::SourceDir => Self::SourceDirChanged(into_string(value)?),
            Channel::OutputDir => Self::OutputDirChanged(into_string(value)?),
            Channel::OutputExt => Self::OutputExtChanged(into_string(value)?),
            Channel::Lang => Self::LangChanged(into_string(value)?),
            Channel::FileList => Self::FileListChanged(into_string_list(value)?),
            Channel::ImageExts => Self::ImageExtChanged(into_string_list(value)?),
            Channel::AllowFiles => Self::AllowFilesChanged(into_string_list(value)?),
            Channel::FileMetadataCache => match value {
                Value::Object(map) => Self::FileMetadataCacheChanged(map),
                _ => return None,
            },
            Channel::SortApplied => Self::SortApplied(SortMode::from_code(as_integer(&value)?)?),
        };
        Some(notification)
    }
}

/// Integers as-is; floats only when integral, so `10.0` reads as `10`.
fn as_integer(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
            .map(|f| f as i64)
    })
}

fn into_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        _ => None,
    }
}

fn into_string_list(value: Value) -> Option<Vec<String>> {
    match value {
        Value::Array(items) => items.into_iter().map(into_string).collect(),
        _ => None,
    }
}

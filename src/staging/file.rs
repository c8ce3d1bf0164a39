use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};

/// Caption token used when the file name has no leading numeric sender id.
pub const UNKNOWN_PREFIX: &str = "Unknown";

static PREFIX_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(-?\d+)_").expect("valid regex"));

/// A media file sitting in the staging directory, waiting to be relayed.
///
/// The filesystem entry is the only record of it; this struct is derived from
/// the path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    pub path: PathBuf,
    pub prefix: String,
    /// Without the leading dot; empty when the name has none.
    pub extension: String,
}

impl StagedFile {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = file_name(&path);
        let prefix = extract_prefix(&name);
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_string();
        Self {
            path,
            prefix,
            extension,
        }
    }

    pub fn file_name(&self) -> String {
        file_name(&self.path)
    }

    /// Dotfiles are never relayed (temporary writes, editor droppings).
    pub fn is_hidden(&self) -> bool {
        is_hidden(&self.path)
    }
}

/// `{sender_id}_media_{message_id}{extension}`; `extension` includes the dot.
pub fn staged_file_name(sender_id: &str, message_id: i64, extension: &str) -> String {
    let sender: String = sender_id
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();
    format!("{}_media_{}{}", sender, message_id, extension)
}

/// Leading signed integer followed by `_`, or [`UNKNOWN_PREFIX`].
pub fn extract_prefix(file_name: &str) -> String {
    PREFIX_RE
        .captures(file_name)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| UNKNOWN_PREFIX.to_string())
}

pub(crate) fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with('.'))
        .unwrap_or(false)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

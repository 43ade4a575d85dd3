//! Skip rules and log-location matching for directory entries.

use std::fs::Metadata;
use std::path::Path;

/// Name prefixes of directories that are never descended into or deleted.
/// Covers dot-directories (`.git`, `.vs`, ...) and build output (`obj`, `obj-debug`, ...).
pub const SKIPPED_PREFIXES: &[&str] = &[".", "obj"];

/// Extensions (without the dot) of files cleaned inside log paths
pub const CLEANABLE_EXTENSIONS: &[&str] = &["txt", "log"];

/// Marker searched for, case-insensitively, anywhere in a path
const LOG_MARKER: &str = "log";

/// Check if a directory name matches one of the skipped prefixes
pub fn is_skipped_dir_name(name: &str) -> bool {
    SKIPPED_PREFIXES.iter().any(|prefix| name.starts_with(prefix))
}

/// Check whether the entry carries attributes that protect it from traversal.
///
/// Read-only entries are protected everywhere. On Windows the hidden and
/// system attributes count as well; elsewhere "hidden" means dot-prefixed,
/// which [`is_skipped_dir_name`] already covers.
pub fn is_protected(metadata: &Metadata) -> bool {
    metadata.permissions().readonly() || has_hidden_or_system_attribute(metadata)
}

#[cfg(windows)]
fn has_hidden_or_system_attribute(metadata: &Metadata) -> bool {
    use std::os::windows::fs::MetadataExt;

    const FILE_ATTRIBUTE_HIDDEN: u32 = 0x2;
    const FILE_ATTRIBUTE_SYSTEM: u32 = 0x4;

    metadata.file_attributes() & (FILE_ATTRIBUTE_HIDDEN | FILE_ATTRIBUTE_SYSTEM) != 0
}

#[cfg(not(windows))]
fn has_hidden_or_system_attribute(_metadata: &Metadata) -> bool {
    false
}

/// A directory is skipped when its name or its attributes say so
pub fn is_skipped_dir(name: &str, metadata: &Metadata) -> bool {
    is_skipped_dir_name(name) || is_protected(metadata)
}

/// Check if "LOG" appears anywhere in the full path, ignoring case.
/// Unlike name matching this also accepts `/var/backlog/x` or `/srv/LOGS/app`.
pub fn is_log_path(path: &Path) -> bool {
    path.to_string_lossy()
        .to_lowercase()
        .contains(LOG_MARKER)
}

/// Check if a directory name starts with "log", ignoring case
pub fn is_log_dir_name(name: &str) -> bool {
    name.get(..LOG_MARKER.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(LOG_MARKER))
}

/// Check if a file has one of the cleanable extensions, ignoring case
pub fn has_cleanable_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            CLEANABLE_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
}

//! Path-addressable virtual filesystem.
//!
//! An in-memory mapping from absolute path to content, seeded once at
//! startup from a JSON blob and immutable afterwards. Nothing here ever
//! touches the real filesystem — every "file" a server hands out lives
//! in this map.
//!
//! Directory markers are keys ending in `/` with `null` content; a key
//! without a trailing `/` is a file. Listing results are returned in
//! lexicographic order, which callers rely on when diffing output
//! across drift states.

pub mod classify;

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::debug;

/// Fixed home directory a leading `~` expands to.
pub const HOME_DIR: &str = "/home/user";

/// Result of an exact-path lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadResult {
    /// The path names a file; carries its literal content.
    File(String),
    /// The path names a directory marker.
    Directory,
    /// The path is not present at all.
    Missing,
}

/// Immutable in-memory filesystem.
#[derive(Debug, Clone)]
pub struct VirtualFs {
    entries: BTreeMap<String, Option<String>>,
}

impl VirtualFs {
    /// Builds a filesystem from a JSON object mapping paths to content
    /// strings (files) or `null` (directory markers).
    ///
    /// Returns `None` if the value is not an object or any non-null
    /// entry is not a string; the caller falls back to
    /// [`VirtualFs::default_fs`] in that case.
    #[must_use]
    pub fn from_seed(seed: &Value) -> Option<Self> {
        let object = seed.as_object()?;
        let mut entries = BTreeMap::new();
        for (path, content) in object {
            let content = match content {
                Value::Null => None,
                Value::String(s) => Some(s.clone()),
                _ => return None,
            };
            entries.insert(normalize_key(path, content.is_none()), content);
        }
        debug!(entries = entries.len(), "virtual filesystem seeded");
        Some(Self { entries })
    }

    /// Builds the minimal default filesystem used when no seed is
    /// supplied or the seed JSON is malformed.
    #[must_use]
    pub fn default_fs() -> Self {
        let mut entries = BTreeMap::new();
        let dirs = ["/docs/", "/home/user/", "/safe/"];
        for dir in dirs {
            entries.insert(dir.to_string(), None);
        }
        entries.insert(
            "/docs/readme.md".to_string(),
            Some("# Snare test corpus\n\nNothing here is real.\n".to_string()),
        );
        entries.insert(
            "/home/user/notes.txt".to_string(),
            Some("groceries: rust, tokio, serde\n".to_string()),
        );
        entries.insert(
            "/safe/data.txt".to_string(),
            Some("benign payload 001\n".to_string()),
        );
        Self { entries }
    }

    /// Looks up a path after normalization.
    ///
    /// Both directory markers and absent paths are "not readable";
    /// callers that need to tell them apart match on the variant.
    #[must_use]
    pub fn read(&self, path: &str) -> ReadResult {
        let normalized = normalize(path);
        match self.entries.get(&normalized) {
            Some(Some(content)) => ReadResult::File(content.clone()),
            Some(None) => ReadResult::Directory,
            None => {
                let as_dir = format!("{}/", normalized.trim_end_matches('/'));
                if self.entries.contains_key(&as_dir) {
                    ReadResult::Directory
                } else {
                    ReadResult::Missing
                }
            }
        }
    }

    /// Returns whether the normalized path exists as a directory marker.
    #[must_use]
    pub fn is_dir(&self, path: &str) -> bool {
        matches!(self.read(path), ReadResult::Directory)
    }

    /// Lists entries under a directory, sorted lexicographically.
    ///
    /// Non-recursive listings truncate each suffix at its first
    /// separator and deduplicate, keeping a trailing `/` on directory
    /// entries. Recursive listings return each full suffix with any
    /// trailing separator stripped.
    ///
    /// Returns `None` if the path is not a known directory.
    #[must_use]
    pub fn list(&self, path: &str, recursive: bool) -> Option<Vec<String>> {
        let prefix = format!("{}/", normalize(path).trim_end_matches('/'));
        if !self.entries.contains_key(&prefix) && prefix != "/" {
            return None;
        }

        let mut names: Vec<String> = Vec::new();
        for key in self.entries.keys() {
            let Some(suffix) = key.strip_prefix(&prefix) else {
                continue;
            };
            if suffix.is_empty() {
                continue;
            }
            if recursive {
                names.push(suffix.trim_end_matches('/').to_string());
            } else {
                let entry = match suffix.find('/') {
                    Some(pos) => &suffix[..=pos],
                    None => suffix,
                };
                names.push(entry.to_string());
            }
        }
        names.dedup();
        // BTreeMap iteration is already sorted; dedup on the sorted
        // stream is enough to drop repeated first-level entries.
        Some(names)
    }

    /// Number of entries, directory markers included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the filesystem holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Normalizes a requested path.
///
/// Trims surrounding whitespace, expands a leading `~` to [`HOME_DIR`],
/// collapses repeated separators, and forces a leading `/`. Trailing
/// separators are preserved (they distinguish directory markers).
#[must_use]
pub fn normalize(path: &str) -> String {
    let trimmed = path.trim();
    let expanded = if trimmed == "~" {
        HOME_DIR.to_string()
    } else if let Some(rest) = trimmed.strip_prefix("~/") {
        format!("{HOME_DIR}/{rest}")
    } else {
        trimmed.to_string()
    };

    let mut out = String::with_capacity(expanded.len() + 1);
    if !expanded.starts_with('/') {
        out.push('/');
    }
    let mut last_was_sep = out.ends_with('/');
    for ch in expanded.chars() {
        if ch == '/' {
            if !last_was_sep {
                out.push('/');
            }
            last_was_sep = true;
        } else {
            out.push(ch);
            last_was_sep = false;
        }
    }
    out
}

/// Normalizes a seed key, enforcing the trailing slash on directories.
fn normalize_key(path: &str, is_dir: bool) -> String {
    let normalized = normalize(path);
    if is_dir && !normalized.ends_with('/') {
        format!("{normalized}/")
    } else {
        normalized
    }
}

/// Flags any path containing a literal `..` segment.
///
/// The check is purely lexical and deliberately fail-closed: a `..`
/// that would resolve back inside bounds is still flagged.
#[must_use]
pub fn has_traversal(path: &str) -> bool {
    normalize(path).split('/').any(|segment| segment == "..")
}

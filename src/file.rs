use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

/// Extensions collected when no explicit file list is given.
static TEXT_EXTENSIONS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| ["txt", "py", "md", "csv"].into_iter().collect());

/// A file discovered by the scanner, before its content is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    /// Absolute (or root-joined) path to the file
    pub absolute_path: PathBuf,

    /// Path relative to the scan root, `/`-separated
    pub relative_path: String,
}

/// A discovered file together with its decoded text.
#[derive(Debug, Clone)]
pub struct FileEntry {
    /// Absolute (or root-joined) path to the file
    pub absolute_path: PathBuf,

    /// Path relative to the scan root, `/`-separated
    pub relative_path: String,

    /// Text content; invalid UTF-8 sequences are replaced
    pub content: String,
}

impl FileEntry {
    /// Creates a new file entry.
    #[must_use]
    pub fn new(absolute_path: PathBuf, relative_path: String, content: String) -> Self {
        Self {
            absolute_path,
            relative_path,
            content,
        }
    }
}

/// Reads a discovered file, decoding it as UTF-8 on a best-effort basis.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or read.
pub fn read_entry(file: &DiscoveredFile) -> Result<FileEntry> {
    let bytes =
        std::fs::read(&file.absolute_path).map_err(|e| Error::io(&file.absolute_path, e))?;
    let content = String::from_utf8_lossy(&bytes).into_owned();

    Ok(FileEntry::new(
        file.absolute_path.clone(),
        file.relative_path.clone(),
        content,
    ))
}

/// One optimized record: `[relative/path] flattened content`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line(String);

impl Line {
    /// Builds the path-tagged record for a flattened file.
    #[must_use]
    pub fn new(relative_path: &str, flattened: &str) -> Self {
        Self(format!("[{relative_path}] {flattened}"))
    }

    /// Returns the record text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the record length in characters.
    #[must_use]
    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }

    /// Returns the number of whitespace-separated words in the record.
    #[must_use]
    pub fn word_count(&self) -> usize {
        self.0.split_whitespace().count()
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Line {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Checks if an entry name marks it as hidden (`.git`) or dunder (`__pycache__`).
#[must_use]
pub fn is_hidden_name(name: &str) -> bool {
    name.starts_with('.') || name.starts_with("__")
}

/// Checks if a file extension is one of the collected text types.
#[must_use]
pub fn has_text_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| TEXT_EXTENSIONS.contains(ext))
}

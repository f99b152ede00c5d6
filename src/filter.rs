use std::path::Path;

/// Extension whose files get comment-only lines removed.
const COMMENT_STRIPPED_EXTENSION: &str = "py";

/// Line comment marker for [`COMMENT_STRIPPED_EXTENSION`] files.
const COMMENT_MARKER: char = '#';

/// Configuration for content optimization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterConfig {
    /// Drop comment-only lines in Python files
    pub remove_comments: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            remove_comments: true,
        }
    }
}

/// Flattens file content into a single space-joined line.
///
/// Comment removal is line-based: a trimmed line starting with `#` is dropped.
/// String literals and triple-quoted blocks are not parsed, so a docstring line
/// beginning with `#` is dropped too, while `x = "#"` survives.
#[derive(Debug, Clone, Default)]
pub struct CodeFilter {
    config: FilterConfig,
}

impl CodeFilter {
    /// Creates a new code filter with the given configuration.
    #[must_use]
    pub const fn new(config: FilterConfig) -> Self {
        Self { config }
    }

    /// Optimizes `content` read from `path` into one flattened line.
    #[must_use]
    pub fn filter(&self, content: &str, path: &Path) -> String {
        let strip_comments = self.config.remove_comments && is_comment_stripped(path);

        content
            .split(is_line_break)
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .filter(|line| !(strip_comments && line.starts_with(COMMENT_MARKER)))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

// LF, CR, VT, FF, FS, GS, RS, NEL, LS and PS all end a line. The empty piece
// between a CR LF pair is dropped with the other blank lines.
const fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n'
            | '\r'
            | '\x0b'
            | '\x0c'
            | '\x1c'
            | '\x1d'
            | '\x1e'
            | '\u{85}'
            | '\u{2028}'
            | '\u{2029}'
    )
}

fn is_comment_stripped(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| ext == COMMENT_STRIPPED_EXTENSION)
}

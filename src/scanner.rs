use crate::{
    config::Config,
    file::{has_text_extension, is_hidden_name, DiscoveredFile},
};
use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, trace, warn};
use walkdir::WalkDir;

/// Why an entry was left out of the scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Listing or stat failed (missing directory, permission denied, link loop)
    Walk(String),
    /// The path could not be expressed relative to the scan root
    RelativePath,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Walk(message) => write!(f, "walk error: {message}"),
            Self::RelativePath => f.write_str("path is not under the scan root"),
        }
    }
}

/// An entry that was skipped, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    /// Path of the skipped entry, or the scan root when unknown
    pub path: PathBuf,
    /// Reason for skipping
    pub reason: SkipReason,
}

/// Result of a scan: matched files in emission order plus skipped entries.
#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    /// Files to process, depth-first, parent before children
    pub entries: Vec<DiscoveredFile>,
    /// Entries skipped because of traversal failures
    pub skipped: Vec<Skipped>,
}

/// Recognizes the files this run writes, so a rerun never reads its own output.
#[derive(Debug, Clone)]
struct OutputMatcher {
    dir: Option<PathBuf>,
    stem: String,
}

impl OutputMatcher {
    fn new(output_base: &Path) -> Self {
        let parent = match output_base.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };

        Self {
            dir: parent.canonicalize().ok(),
            stem: output_base
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        }
    }

    fn matches(&self, path: &Path) -> bool {
        let Some(dir) = &self.dir else {
            return false;
        };

        let name_matches = path
            .file_name()
            .and_then(OsStr::to_str)
            .is_some_and(|n| self.matches_name(n));
        if !name_matches {
            return false;
        }

        path.parent()
            .and_then(|p| p.canonicalize().ok())
            .is_some_and(|p| &p == dir)
    }

    /// `<stem>.txt` or `<stem>_part<N>.txt`.
    fn matches_name(&self, name: &str) -> bool {
        let Some(rest) = name
            .strip_prefix(self.stem.as_str())
            .and_then(|r| r.strip_suffix(".txt"))
        else {
            return false;
        };

        rest.is_empty()
            || rest
                .strip_prefix("_part")
                .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
    }
}

/// Walks the root directory and selects the files to combine.
#[derive(Debug, Clone)]
pub struct Scanner {
    root_dir: PathBuf,
    target_files: Option<BTreeSet<String>>,
    output: OutputMatcher,
}

impl Scanner {
    /// Creates a new scanner from configuration.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            root_dir: config.root_dir.clone(),
            target_files: config.target_files.clone(),
            output: OutputMatcher::new(&config.output_base),
        }
    }

    /// Scans the root directory.
    ///
    /// Never fails as a whole: unreadable subtrees and odd paths are reported
    /// in [`ScanOutcome::skipped`] and the walk continues past them. Entries of
    /// each directory are visited in file-name order.
    #[must_use]
    pub fn scan(&self) -> ScanOutcome {
        let mut outcome = ScanOutcome::default();

        debug!("Starting scan of {}", self.root_dir.display());

        let mut walker = WalkDir::new(&self.root_dir)
            .min_depth(1)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter();

        while let Some(result) = walker.next() {
            let entry = match result {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e
                        .path()
                        .map_or_else(|| self.root_dir.clone(), Path::to_path_buf);
                    warn!("Skipping {}: {}", path.display(), e);
                    outcome.skipped.push(Skipped {
                        path,
                        reason: SkipReason::Walk(e.to_string()),
                    });
                    continue;
                }
            };

            let is_dir = entry.file_type().is_dir();

            if is_hidden_name(&entry.file_name().to_string_lossy()) {
                trace!("Ignoring hidden entry: {}", entry.path().display());
                if is_dir {
                    walker.skip_current_dir();
                }
                continue;
            }

            let Some(relative_path) = relative_path(&self.root_dir, entry.path()) else {
                warn!(
                    "Skipping {}: cannot compute path relative to {}",
                    entry.path().display(),
                    self.root_dir.display()
                );
                outcome.skipped.push(Skipped {
                    path: entry.path().to_path_buf(),
                    reason: SkipReason::RelativePath,
                });
                if is_dir {
                    walker.skip_current_dir();
                }
                continue;
            };

            if is_dir {
                if !self.should_descend(&relative_path) {
                    trace!("Pruning directory: {}", relative_path);
                    walker.skip_current_dir();
                }
                continue;
            }

            if !entry.file_type().is_file()
                || !self.should_include(&relative_path, entry.path())
            {
                continue;
            }

            // An explicitly listed file is always taken, even if named like our output.
            if self.target_files.is_none() && self.output.matches(entry.path()) {
                debug!("Skipping previous output file: {}", relative_path);
                continue;
            }

            trace!("Selected file: {}", relative_path);
            outcome.entries.push(DiscoveredFile {
                absolute_path: entry.into_path(),
                relative_path,
            });
        }

        debug!(
            "Scan complete: {} files selected, {} entries skipped",
            outcome.entries.len(),
            outcome.skipped.len()
        );

        outcome
    }

    /// A directory is entered only if some target lives beneath it.
    fn should_descend(&self, relative_dir: &str) -> bool {
        self.target_files.as_ref().is_none_or(|targets| {
            let prefix = format!("{relative_dir}/");
            targets.iter().any(|t| t.starts_with(&prefix))
        })
    }

    fn should_include(&self, relative_path: &str, path: &Path) -> bool {
        match &self.target_files {
            Some(targets) => targets.contains(relative_path),
            None => has_text_extension(path),
        }
    }
}

/// Returns `path` relative to `root`, joined with `/`.
fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;

    let parts = relative
        .components()
        .map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Option<Vec<_>>>()?;

    if parts.is_empty() {
        return None;
    }

    Some(parts.join("/"))
}

/// Normalizes a user-supplied target path for matching against relative paths.
///
/// Backslashes become `/`, leading `./` and trailing `/` are removed.
/// Returns `None` for paths that are empty after normalization.
#[must_use]
pub fn normalize_target(target: &str) -> Option<String> {
    let unified = target.trim().replace('\\', "/");

    let mut rest = unified.as_str();
    while let Some(stripped) = rest.strip_prefix("./") {
        rest = stripped.trim_start_matches('/');
    }
    let rest = rest.trim_end_matches('/');

    (!rest.is_empty() && rest != ".").then(|| rest.to_string())
}

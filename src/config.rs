use crate::error::{Error, Result};
use crate::filter::FilterConfig;
use crate::scanner::normalize_target;
use chrono::NaiveDateTime;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Default token ceiling per output chunk.
pub const DEFAULT_MAX_TOKENS: usize = 10_000;

/// Directory used for synthesized output paths: `<temp>/combine-files`,
/// outside any tree being scanned.
#[must_use]
pub fn default_output_dir() -> PathBuf {
    std::env::temp_dir().join("combine-files")
}

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Configuration for the combine-files pipeline.
///
/// Use [`Config::builder()`] to construct a new configuration.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct Config {
    /// Root directory to scan for files
    pub root_dir: PathBuf,

    /// Output path without extension; chunks become `<base>.txt` or `<base>_partN.txt`
    pub output_base: PathBuf,

    /// Relative paths to restrict processing to, if any
    pub target_files: Option<BTreeSet<String>>,

    /// Maximum tokens per chunk
    pub max_tokens: usize,

    /// Content optimization configuration
    pub filter_config: FilterConfig,

    /// Dry run mode (no file writes)
    pub dry_run: bool,
}

impl Config {
    /// Creates a new configuration builder.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use combine_files::Config;
    ///
    /// let config = Config::builder()
    ///     .root_dir("./docs")
    ///     .output_base("./out/docs")
    ///     .max_tokens(8_000)
    ///     .build()
    ///     .expect("valid configuration");
    /// ```
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Root directory doesn't exist or isn't a directory
    /// - The token ceiling is zero
    /// - The output base has no file name
    pub fn validate(&self) -> Result<()> {
        if !self.root_dir.is_dir() {
            return Err(Error::root_not_found(&self.root_dir));
        }

        if self.max_tokens == 0 {
            return Err(Error::config("max_tokens must be greater than 0"));
        }

        if self.output_base.file_name().is_none() {
            return Err(Error::config(format!(
                "Output path has no file name: {}",
                self.output_base.display()
            )));
        }

        Ok(())
    }
}

/// Builds `<output_dir>/combined_<root-folder-name>_<timestamp>`.
#[must_use]
pub fn default_output_base(root: &Path, output_dir: &Path, now: NaiveDateTime) -> PathBuf {
    let folder_name = root
        .canonicalize()
        .ok()
        .as_deref()
        .and_then(Path::file_name)
        .or_else(|| root.file_name())
        .map_or_else(|| "root".to_string(), |n| n.to_string_lossy().into_owned());

    output_dir.join(format!(
        "combined_{folder_name}_{}",
        now.format(TIMESTAMP_FORMAT)
    ))
}

/// Builder for creating a [`Config`].
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    root_dir: Option<PathBuf>,
    output_base: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    target_files: Option<Vec<String>>,
    max_tokens: Option<usize>,
    filter_config: Option<FilterConfig>,
    dry_run: bool,
}

impl ConfigBuilder {
    /// Sets the root directory to scan.
    #[must_use]
    pub fn root_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.root_dir = Some(path.into());
        self
    }

    /// Sets the output path. Any extension is stripped.
    #[must_use]
    pub fn output_base(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_base = Some(path.into());
        self
    }

    /// Sets the directory used when no output path is given.
    #[must_use]
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(path.into());
        self
    }

    /// Restricts processing to the given relative paths.
    ///
    /// An empty list means no restriction.
    #[must_use]
    pub fn target_files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.target_files = Some(files.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the maximum tokens per chunk.
    #[must_use]
    pub fn max_tokens(mut self, tokens: usize) -> Self {
        self.max_tokens = Some(tokens);
        self
    }

    /// Sets the content optimization configuration.
    #[must_use]
    pub fn filter_config(mut self, config: FilterConfig) -> Self {
        self.filter_config = Some(config);
        self
    }

    /// Enables dry run mode (no file writes).
    #[must_use]
    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails.
    pub fn build(self) -> Result<Config> {
        let root_dir = self.root_dir.unwrap_or_else(|| PathBuf::from("."));

        let output_base = match self.output_base {
            Some(path) => path.with_extension(""),
            None => default_output_base(
                &root_dir,
                &self.output_dir.unwrap_or_else(default_output_dir),
                chrono::Local::now().naive_local(),
            ),
        };

        let target_files = self
            .target_files
            .map(|files| {
                files
                    .iter()
                    .filter_map(|f| normalize_target(f))
                    .collect::<BTreeSet<_>>()
            })
            .filter(|set| !set.is_empty());

        let config = Config {
            root_dir,
            output_base,
            target_files,
            max_tokens: self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            filter_config: self.filter_config.unwrap_or_default(),
            dry_run: self.dry_run,
        };

        config.validate()?;
        Ok(config)
    }
}

//! # combine-files
//!
//! Combines the text files of a directory tree into path-tagged, token-bounded
//! chunks ready to be pasted into an LLM context window.
//!
//! ## Quick Start
//!
//! ```no_run
//! use combine_files::{Config, Pipeline};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = Config::builder()
//!     .root_dir("./docs")
//!     .output_base("./out/docs")
//!     .max_tokens(10_000)
//!     .build()?;
//!
//! Pipeline::new(config)?.run()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! The library follows a pipeline architecture:
//! 1. **Scanner**: Walks the tree, skipping hidden and dunder entries
//! 2. **Filter**: Flattens each file into one `[path] content` line
//! 3. **Tokenizer**: Counts `cl100k_base` tokens
//! 4. **Splitter**: Greedily packs lines into chunks under the ceiling
//! 5. **Writer**: Persists chunks as `<base>.txt` or `<base>_partN.txt`

#![warn(
    missing_docs,
    rust_2018_idioms,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery
)]
#![allow(clippy::module_name_repetitions)]

mod config;
mod error;
mod file;
mod filter;
mod pipeline;
mod scanner;
mod splitter;
mod token;
mod writer;

pub use config::{
    default_output_base, default_output_dir, Config, ConfigBuilder, DEFAULT_MAX_TOKENS,
};
pub use error::{exit_codes, Error, Result};
pub use file::{
    has_text_extension, is_hidden_name, read_entry, DiscoveredFile, FileEntry, Line,
};
pub use filter::{CodeFilter, FilterConfig};
pub use pipeline::{Pipeline, PipelineStats};
pub use scanner::{normalize_target, ScanOutcome, Scanner, SkipReason, Skipped};
pub use splitter::{Chunk, Splitter};
pub use token::{Cl100kTokenizer, TokenEstimator, ENCODING_NAME};
pub use writer::Writer;

/// Runs the complete pipeline with the given configuration.
///
/// # Errors
///
/// Returns an error if:
/// - Configuration is invalid or the root directory is missing
/// - The tokenizer cannot be initialized
/// - An output file cannot be written
///
/// # Examples
///
/// ```no_run
/// use combine_files::{Config, run};
///
/// # fn main() -> anyhow::Result<()> {
/// let config = Config::builder()
///     .root_dir(".")
///     .build()?;
///
/// run(config)?;
/// # Ok(())
/// # }
/// ```
pub fn run(config: Config) -> Result<PipelineStats> {
    Pipeline::new(config)?.run()
}

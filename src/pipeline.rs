use crate::{
    config::Config,
    error::Result,
    file::{read_entry, Line},
    filter::CodeFilter,
    scanner::{ScanOutcome, Scanner},
    splitter::{Chunk, Splitter},
    token::{Cl100kTokenizer, TokenEstimator},
    writer::Writer,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, instrument, warn};

/// Statistics collected during pipeline execution.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PipelineStats {
    /// Files selected by the scanner
    pub files_found: usize,

    /// Files that could not be read
    pub files_failed: usize,

    /// Entries skipped during traversal
    pub entries_skipped: usize,

    /// Lines produced (one per successfully read file)
    pub lines: usize,

    /// Token count of the whole Line stream joined by newlines
    pub total_tokens: usize,

    /// Characters across all Lines
    pub total_chars: usize,

    /// Whitespace-separated words across all Lines
    pub total_words: usize,

    /// Total number of chunks created
    pub total_chunks: usize,

    /// Largest chunk size in tokens
    pub max_chunk_tokens: usize,

    /// Paths of the files written
    pub files_written: Vec<PathBuf>,

    /// Total execution time
    pub duration: Duration,

    /// Time spent scanning and reading
    pub scan_duration: Duration,

    /// Time spent counting and splitting
    pub split_duration: Duration,

    /// Time spent writing
    pub write_duration: Duration,
}

impl PipelineStats {
    /// Prints a human-readable summary to stdout.
    pub fn print_summary(&self) {
        println!("\n╔═══════════════════════════════════════════════════════╗");
        println!("║              Combine Files Summary                    ║");
        println!("╠═══════════════════════════════════════════════════════╣");
        println!(
            "║ Files Found:          {:>8}                        ║",
            self.files_found
        );
        println!(
            "║   - Unreadable:       {:>8}                        ║",
            self.files_failed
        );
        println!(
            "║ Entries Skipped:      {:>8}                        ║",
            self.entries_skipped
        );
        println!("║                                                       ║");
        println!(
            "║ Total Tokens:         {:>8}                        ║",
            self.total_tokens
        );
        println!(
            "║ Total Characters:     {:>8}                        ║",
            self.total_chars
        );
        println!(
            "║ Total Words:          {:>8}                        ║",
            self.total_words
        );
        println!(
            "║ Chunks Created:       {:>8}                        ║",
            self.total_chunks
        );
        println!(
            "║ Max Chunk Size:       {:>8} tokens                 ║",
            self.max_chunk_tokens
        );
        println!("║                                                       ║");
        println!(
            "║ Files Written:        {:>8}                        ║",
            self.files_written.len()
        );
        for path in &self.files_written {
            println!("║   {}", path.display());
        }
        println!("║                                                       ║");
        println!(
            "║ Total Time:           {:>8.2}s                     ║",
            self.duration.as_secs_f64()
        );
        println!("╚═══════════════════════════════════════════════════════╝\n");
    }
}

/// Main pipeline orchestrator: scan, optimize, split, write.
pub struct Pipeline {
    config: Config,
    scanner: Scanner,
    filter: CodeFilter,
    tokenizer: Arc<dyn TokenEstimator>,
    splitter: Splitter,
    writer: Writer,
}

impl Pipeline {
    /// Creates a new pipeline counting tokens with `cl100k_base`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration validation fails
    /// - The tokenizer cannot be initialized
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let tokenizer: Arc<dyn TokenEstimator> = Arc::new(Cl100kTokenizer::new()?);
        Self::with_tokenizer(config, tokenizer)
    }

    /// Creates a new pipeline with a caller-supplied token counter.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration validation fails.
    pub fn with_tokenizer(config: Config, tokenizer: Arc<dyn TokenEstimator>) -> Result<Self> {
        config.validate()?;

        let scanner = Scanner::new(&config);
        let filter = CodeFilter::new(config.filter_config);
        let splitter = Splitter::new(&config, Arc::clone(&tokenizer));
        let writer = Writer::new(&config);

        Ok(Self {
            config,
            scanner,
            filter,
            tokenizer,
            splitter,
            writer,
        })
    }

    /// Executes the complete pipeline and returns statistics.
    ///
    /// Unreadable files and directories are logged and skipped; only a write
    /// failure aborts the run.
    ///
    /// # Errors
    ///
    /// Returns an error if an output file cannot be written.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use combine_files::{Config, Pipeline};
    ///
    /// # fn main() -> anyhow::Result<()> {
    /// let config = Config::builder()
    ///     .root_dir("./notes")
    ///     .output_base("./out/notes")
    ///     .build()?;
    ///
    /// let stats = Pipeline::new(config)?.run()?;
    /// stats.print_summary();
    /// # Ok(())
    /// # }
    /// ```
    #[instrument(skip(self), fields(root_dir = %self.config.root_dir.display()))]
    pub fn run(self) -> Result<PipelineStats> {
        let start_time = Instant::now();
        let mut stats = PipelineStats::default();

        info!("Stage 1/3: Scanning and optimizing files...");
        let scan_start = Instant::now();
        let outcome = self.scanner.scan();
        stats.files_found = outcome.entries.len();
        stats.entries_skipped = outcome.skipped.len();
        let (lines, failed) = self.optimize(outcome);
        stats.files_failed = failed;
        stats.scan_duration = scan_start.elapsed();

        info!(
            "✓ Processed {} files ({} unreadable, {} entries skipped) in {:.2}s",
            stats.files_found,
            stats.files_failed,
            stats.entries_skipped,
            stats.scan_duration.as_secs_f64()
        );

        info!("Stage 2/3: Counting tokens and splitting...");
        let split_start = Instant::now();
        stats.lines = lines.len();
        stats.total_tokens = self.stream_tokens(&lines);
        stats.total_chars = lines.iter().map(Line::char_count).sum();
        stats.total_words = lines.iter().map(Line::word_count).sum();
        info!("Total tokens: {}", stats.total_tokens);

        let chunks = self.splitter.split(lines);
        stats.total_chunks = chunks.len();
        stats.max_chunk_tokens = chunks.iter().map(|c| c.total_tokens).max().unwrap_or(0);
        stats.split_duration = split_start.elapsed();

        self.log_chunk_distribution(&chunks);

        let write_start = Instant::now();
        if chunks.is_empty() {
            warn!(
                "No matching files under {}; nothing to write",
                self.config.root_dir.display()
            );
        } else if self.config.dry_run {
            warn!("Dry run mode enabled - skipping file writes");
            for chunk in &chunks {
                info!(
                    "Would write {} ({} tokens)",
                    self.writer
                        .output_path(chunk.index, chunks.len())
                        .display(),
                    chunk.total_tokens
                );
            }
        } else {
            info!("Stage 3/3: Writing output files...");
            stats.files_written = self.writer.write_chunks(&chunks)?;
        }
        stats.write_duration = write_start.elapsed();

        stats.duration = start_time.elapsed();

        info!(
            "✓ Combined {} files into {} chunk(s) ({} characters, {} words) in {:.2}s",
            stats.lines,
            stats.total_chunks,
            stats.total_chars,
            stats.total_words,
            stats.duration.as_secs_f64()
        );

        Ok(stats)
    }

    /// Reads and flattens each discovered file. Returns the Lines and the
    /// number of files that could not be read.
    fn optimize(&self, outcome: ScanOutcome) -> (Vec<Line>, usize) {
        let mut lines = Vec::with_capacity(outcome.entries.len());
        let mut failed = 0;

        for file in &outcome.entries {
            match read_entry(file) {
                Ok(entry) => {
                    let flattened = self.filter.filter(&entry.content, &entry.absolute_path);
                    lines.push(Line::new(&entry.relative_path, &flattened));
                    debug!("Processed file: {}", entry.relative_path);
                }
                Err(e) => {
                    error!("Failed to process {}: {}", file.relative_path, e);
                    failed += 1;
                }
            }
        }

        (lines, failed)
    }

    /// Token count of all Lines joined by newlines, as they appear on disk.
    fn stream_tokens(&self, lines: &[Line]) -> usize {
        let joined = lines
            .iter()
            .map(Line::as_str)
            .collect::<Vec<_>>()
            .join("\n");
        self.tokenizer.estimate(&joined)
    }

    /// Logs information about chunk distribution.
    fn log_chunk_distribution(&self, chunks: &[Chunk]) {
        if chunks.is_empty() {
            return;
        }

        let total_tokens: usize = chunks.iter().map(|c| c.total_tokens).sum();
        let avg_tokens = total_tokens / chunks.len();
        let max_tokens = chunks.iter().map(|c| c.total_tokens).max().unwrap_or(0);
        let min_tokens = chunks.iter().map(|c| c.total_tokens).min().unwrap_or(0);

        info!(
            "  Chunk stats: avg={}, min={}, max={} tokens",
            avg_tokens, min_tokens, max_tokens
        );

        let oversized = chunks
            .iter()
            .filter(|c| c.total_tokens > self.config.max_tokens)
            .count();

        if oversized > 0 {
            warn!(
                "  {} chunk(s) hold a single file larger than the {} token limit",
                oversized, self.config.max_tokens
            );
        }
    }
}

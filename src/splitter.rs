use crate::{config::Config, file::Line, token::TokenEstimator};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// An ordered run of Lines destined for one output file.
#[derive(Debug, Clone)]
pub struct Chunk {
    /// Sequential chunk index (0-based)
    pub index: usize,

    /// Lines included in this chunk
    pub lines: Vec<Line>,

    /// Sum of the per-Line token counts
    pub total_tokens: usize,
}

impl Chunk {
    /// Creates a new chunk.
    #[must_use]
    pub fn new(index: usize, lines: Vec<Line>, total_tokens: usize) -> Self {
        Self {
            index,
            lines,
            total_tokens,
        }
    }

    /// Returns the number of Lines in this chunk.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Renders the chunk as file content: one Line per row, trailing newline.
    #[must_use]
    pub fn render(&self) -> String {
        let capacity = self.lines.iter().map(|l| l.as_str().len() + 1).sum();
        let mut out = String::with_capacity(capacity);
        for line in &self.lines {
            out.push_str(line.as_str());
            out.push('\n');
        }
        out
    }

    /// Returns the utilization percentage (0.0 to 1.0).
    #[must_use]
    pub fn utilization(&self, max_tokens: usize) -> f64 {
        if max_tokens == 0 {
            return 0.0;
        }
        self.total_tokens as f64 / max_tokens as f64
    }
}

/// Greedily packs Lines into chunks bounded by a token ceiling.
pub struct Splitter {
    max_chunk_tokens: usize,
    tokenizer: Arc<dyn TokenEstimator>,
}

impl Splitter {
    /// Creates a new splitter from configuration.
    pub fn new(config: &Config, tokenizer: Arc<dyn TokenEstimator>) -> Self {
        Self {
            max_chunk_tokens: config.max_tokens,
            tokenizer,
        }
    }

    /// Splits Lines into chunks in a single pass.
    ///
    /// # Algorithm
    ///
    /// 1. A Line that would push a non-empty chunk past the ceiling seals it first
    /// 2. The Line is then always added, even if it alone exceeds the ceiling
    /// 3. Lines are never split or reordered
    #[must_use]
    pub fn split(&self, lines: Vec<Line>) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        let mut current = ChunkBuilder::new(0, self.max_chunk_tokens);

        for line in lines {
            let tokens = self.tokenizer.estimate(line.as_str());

            if !current.is_empty() && !current.can_fit(tokens) {
                let sealed = std::mem::replace(
                    &mut current,
                    ChunkBuilder::new(chunks.len() + 1, self.max_chunk_tokens),
                );
                if let Some(chunk) = sealed.build() {
                    trace!(
                        "Sealed chunk {} ({} lines, {} tokens)",
                        chunk.index,
                        chunk.line_count(),
                        chunk.total_tokens
                    );
                    chunks.push(chunk);
                }
            }

            if tokens > self.max_chunk_tokens {
                warn!(
                    "Line has {} tokens (exceeds limit of {}); it gets a chunk of its own",
                    tokens, self.max_chunk_tokens
                );
            }

            current.add_line(line, tokens);
        }

        if let Some(chunk) = current.build() {
            chunks.push(chunk);
        }

        self.log_split_results(&chunks);

        chunks
    }

    /// Logs results of the splitting operation.
    fn log_split_results(&self, chunks: &[Chunk]) {
        if chunks.is_empty() {
            return;
        }

        let total_lines: usize = chunks.iter().map(Chunk::line_count).sum();
        let avg_utilization = chunks
            .iter()
            .map(|c| c.utilization(self.max_chunk_tokens))
            .sum::<f64>()
            / chunks.len() as f64;

        debug!(
            "Created {} chunks from {} lines (avg utilization: {:.1}%)",
            chunks.len(),
            total_lines,
            avg_utilization * 100.0
        );
    }
}

/// Builder for constructing chunks incrementally.
struct ChunkBuilder {
    index: usize,
    lines: Vec<Line>,
    current_tokens: usize,
    max_tokens: usize,
}

impl ChunkBuilder {
    const fn new(index: usize, max_tokens: usize) -> Self {
        Self {
            index,
            lines: Vec::new(),
            current_tokens: 0,
            max_tokens,
        }
    }

    fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    const fn can_fit(&self, tokens: usize) -> bool {
        self.current_tokens.saturating_add(tokens) <= self.max_tokens
    }

    fn add_line(&mut self, line: Line, tokens: usize) {
        self.current_tokens += tokens;
        self.lines.push(line);
    }

    /// Builds the final chunk if not empty.
    fn build(self) -> Option<Chunk> {
        if self.lines.is_empty() {
            None
        } else {
            Some(Chunk::new(self.index, self.lines, self.current_tokens))
        }
    }
}

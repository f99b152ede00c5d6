use crate::error::{Error, Result};
use tiktoken_rs::CoreBPE;

/// Name of the fixed BPE encoding used to budget chunks.
pub const ENCODING_NAME: &str = "cl100k_base";

/// Trait for counting tokens in text.
///
/// The pipeline only ever uses [`Cl100kTokenizer`]; the trait exists so the
/// chunker can be driven by other counters.
pub trait TokenEstimator: Send + Sync {
    /// Returns the number of tokens in the given text.
    fn estimate(&self, text: &str) -> usize;
}

/// Exact token counter for the `cl100k_base` encoding.
pub struct Cl100kTokenizer {
    bpe: CoreBPE,
}

impl Cl100kTokenizer {
    /// Loads the `cl100k_base` ranks.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Tokenizer`] if the encoder cannot be built. Callers are
    /// expected to treat this as fatal before any file is read.
    pub fn new() -> Result<Self> {
        let bpe = tiktoken_rs::cl100k_base().map_err(|e| Error::tokenizer(ENCODING_NAME, e))?;
        Ok(Self { bpe })
    }
}

impl std::fmt::Debug for Cl100kTokenizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cl100kTokenizer")
            .field("encoding", &ENCODING_NAME)
            .finish()
    }
}

impl TokenEstimator for Cl100kTokenizer {
    fn estimate(&self, text: &str) -> usize {
        if text.is_empty() {
            return 0;
        }

        // Special-token text in file content is counted, not rejected.
        self.bpe.encode_with_special_tokens(text).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenizer() -> Cl100kTokenizer {
        Cl100kTokenizer::new().unwrap()
    }

    #[test]
    fn test_cl100k_empty() {
        assert_eq!(tokenizer().estimate(""), 0);
    }

    #[test]
    fn test_cl100k_basic() {
        let tokenizer = tokenizer();
        assert_eq!(tokenizer.estimate("hello"), 1);
        assert_eq!(tokenizer.estimate("hello world"), 2);
    }

    #[test]
    fn test_cl100k_special_token_text() {
        let tokenizer = tokenizer();
        assert_eq!(tokenizer.estimate("<|endoftext|>"), 1);
    }

    #[test]
    fn test_cl100k_is_additive_enough_for_budgeting() {
        let tokenizer = tokenizer();
        let line = "[src/app.py] def main(): print('hi')";
        let single = tokenizer.estimate(line);
        assert!(single > 0);

        let doubled = format!("{line}\n{line}");
        let count = tokenizer.estimate(&doubled);
        assert!(count >= single * 2);
        assert!(count <= single * 2 + 2);
    }

    #[test]
    fn test_debug_names_encoding() {
        let debug = format!("{:?}", tokenizer());
        assert!(debug.contains(ENCODING_NAME));
    }
}

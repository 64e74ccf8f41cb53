//! Token-window chunking for the pretraining corpus.
//!
//! The corpus is encoded once, then emitted as overlapping fixed-size
//! token windows decoded back to text. The window start advances by
//! `chunk_size - overlap` each step; once the next start lands within
//! `overlap` tokens of the end, the loop terminates rather than emit a
//! near-duplicate tiny trailing chunk. A small amount of trailing text is
//! traded away to avoid degenerate chunks.
//!
//! Tokenization is an opaque external capability behind the [`Tokenizer`]
//! trait; the chunker assumes encode/decode are deterministic and
//! side-effect free.

use anyhow::{bail, Result};

/// Text-to-token-ids capability supplied by the training collaborator.
pub trait Tokenizer {
    fn encode(&self, text: &str) -> Vec<u32>;
    fn decode(&self, ids: &[u32]) -> String;
}

/// Built-in byte-level tokenizer: one token per byte.
///
/// Serves as the default capability for the CLI; a model tokenizer plugs
/// in through the same trait. Decoding is lossy when a window boundary
/// splits a multi-byte codepoint.
#[derive(Debug, Default)]
pub struct ByteTokenizer;

impl Tokenizer for ByteTokenizer {
    fn encode(&self, text: &str) -> Vec<u32> {
        text.bytes().map(u32::from).collect()
    }

    fn decode(&self, ids: &[u32]) -> String {
        let bytes: Vec<u8> = ids.iter().map(|&id| id as u8).collect();
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

/// Split `text` into overlapping windows of up to `chunk_size` tokens,
/// decoded back to text. Empty input produces no chunks.
///
/// Re-invoking with identical inputs yields identical output; the returned
/// iterator is single-pass, restart by calling again.
///
/// Fails if `chunk_size` is zero or `overlap >= chunk_size` (such a
/// configuration would stall the window advance).
pub fn chunk_text<'a>(
    tokenizer: &'a dyn Tokenizer,
    text: &str,
    chunk_size: usize,
    overlap: usize,
) -> Result<impl Iterator<Item = String> + 'a> {
    if chunk_size == 0 {
        bail!("chunk_size must be > 0");
    }
    if overlap >= chunk_size {
        bail!(
            "chunk_overlap ({}) must be smaller than chunk_size ({})",
            overlap,
            chunk_size
        );
    }

    let tokens = tokenizer.encode(text);
    let total = tokens.len();
    let mut start: usize = 0;
    let mut done = total == 0;

    Ok(std::iter::from_fn(move || {
        if done {
            return None;
        }
        let end = (start + chunk_size).min(total);
        let piece = tokenizer.decode(&tokens[start..end]);

        // Signed arithmetic: near the tail `end - overlap` may go negative.
        let next = end as i64 - overlap as i64;
        if next >= total as i64 - overlap as i64 {
            done = true;
        } else {
            start = next as usize;
        }
        Some(piece)
    }))
}

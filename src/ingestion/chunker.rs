//! Sliding-window text chunking
//!
//! Splits document text into fixed-size overlapping windows, the atomic
//! retrievable unit of the whole pipeline. Boundaries are measured in
//! characters so multi-byte text never splits inside a code point.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{AppError, Result};

/// Configuration for text chunking
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Window size in characters
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Overlap between consecutive windows in characters
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
}

fn default_chunk_size() -> usize {
    500
}
fn default_chunk_overlap() -> usize {
    50
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
        }
    }
}

impl ChunkingConfig {
    /// Reject configurations whose window would never advance.
    ///
    /// With `chunk_overlap >= chunk_size` the start offset stays put and
    /// chunking would loop forever, so this is checked before any chunking
    /// work starts (and once at boot).
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 || self.chunk_overlap >= self.chunk_size {
            return Err(AppError::ChunkingConfig {
                size: self.chunk_size,
                overlap: self.chunk_overlap,
            });
        }
        Ok(())
    }
}

/// Split text into overlapping windows of `chunk_size` characters.
///
/// Each window starts `chunk_size - chunk_overlap` characters after the
/// previous one; the final window may be shorter than `chunk_size`. Empty
/// input produces no chunks. Identical input always produces the identical
/// sequence.
pub fn chunk_text(text: &str, config: &ChunkingConfig) -> Result<Vec<String>> {
    config.validate()?;

    let chars: Vec<char> = text.chars().collect();
    let step = config.chunk_size - config.chunk_overlap;

    let mut chunks = Vec::with_capacity(chars.len() / step + 1);
    let mut start = 0;
    while start < chars.len() {
        let end = (start + config.chunk_size).min(chars.len());
        chunks.push(chars[start..end].iter().collect());
        start += step;
    }

    debug!(
        input_chars = chars.len(),
        chunk_count = chunks.len(),
        chunk_size = config.chunk_size,
        "Text chunked"
    );

    Ok(chunks)
}

/// Stable identifier for a chunk within the vector store.
///
/// Re-uploading a file with the same name reproduces the same ids, so the
/// store overwrites matching records instead of accumulating duplicates.
pub fn chunk_id(filename: &str, index: usize) -> String {
    format!("{filename}_{index}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_produces_no_chunks() {
        let chunks = chunk_text("", &ChunkingConfig::default()).unwrap();
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_window_boundaries() {
        // 1200 chars at (500, 50) -> [0..500), [450..950), [900..1200)
        let text = "a".repeat(450) + &"b".repeat(450) + &"c".repeat(300);
        let chunks = chunk_text(&text, &ChunkingConfig::default()).unwrap();

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 500);
        assert_eq!(chunks[1].len(), 500);
        assert_eq!(chunks[2].len(), 300);
        // Overlap: the first 50 chars of chunk 1 equal the last 50 of chunk 0
        assert_eq!(chunks[0][450..], chunks[1][..50]);
        assert_eq!(chunks[1][450..], chunks[2][..50]);
    }

    #[test]
    fn test_prefixes_reconstruct_input() {
        // Concatenating each chunk's first (size - overlap) chars, plus the
        // final chunk in full, must reproduce the input with no gaps.
        let text: String = ('a'..='z').cycle().take(1337).collect();
        let config = ChunkingConfig {
            chunk_size: 100,
            chunk_overlap: 25,
        };
        let chunks = chunk_text(&text, &config).unwrap();

        let step = config.chunk_size - config.chunk_overlap;
        let mut rebuilt = String::new();
        for (i, chunk) in chunks.iter().enumerate() {
            if i + 1 == chunks.len() {
                rebuilt.push_str(chunk);
            } else {
                rebuilt.push_str(&chunk.chars().take(step).collect::<String>());
            }
        }
        assert!(text.starts_with(&rebuilt));
        assert!(rebuilt.len() >= text.len() - config.chunk_overlap);
    }

    #[test]
    fn test_short_text_is_a_single_chunk() {
        let chunks = chunk_text("hello", &ChunkingConfig::default()).unwrap();
        assert_eq!(chunks, vec!["hello".to_string()]);
    }

    #[test]
    fn test_overlap_not_smaller_than_size_is_rejected() {
        let config = ChunkingConfig {
            chunk_size: 50,
            chunk_overlap: 50,
        };
        let err = chunk_text("some text", &config).unwrap_err();
        assert!(matches!(
            err,
            AppError::ChunkingConfig {
                size: 50,
                overlap: 50
            }
        ));

        let config = ChunkingConfig {
            chunk_size: 0,
            chunk_overlap: 0,
        };
        assert!(chunk_text("some text", &config).is_err());
    }

    #[test]
    fn test_multibyte_text_splits_on_characters() {
        let text = "é".repeat(120);
        let config = ChunkingConfig {
            chunk_size: 100,
            chunk_overlap: 10,
        };
        let chunks = chunk_text(&text, &config).unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].chars().count(), 100);
        assert_eq!(chunks[1].chars().count(), 30);
    }

    #[test]
    fn test_chunk_id_format() {
        assert_eq!(chunk_id("notes.txt", 3), "notes.txt_3");
        assert_eq!(chunk_id("notes.txt", 0), "notes.txt_0");
    }

    #[test]
    fn test_rechunking_is_deterministic() {
        let text = "determinism ".repeat(200);
        let config = ChunkingConfig::default();
        assert_eq!(
            chunk_text(&text, &config).unwrap(),
            chunk_text(&text, &config).unwrap()
        );
    }
}

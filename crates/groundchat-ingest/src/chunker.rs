//! Token-budget text splitting.
//!
//! Token counts are estimated at four characters per token, which tracks
//! closely enough for English prose without pulling in a tokenizer.

/// Estimated characters per token.
pub const CHARS_PER_TOKEN: usize = 4;

/// Splitting parameters. `chunk_size` and `chunk_overlap` are in tokens;
/// `min_chunk_size_chars` is in characters.
#[derive(Debug, Clone)]
pub struct ChunkPolicy {
    /// Target chunk size in tokens.
    pub chunk_size: usize,
    /// Overlap between consecutive chunks in tokens. Zero disables overlap.
    pub chunk_overlap: usize,
    /// A sentence boundary is only honored at or past this many characters
    /// into the current window.
    pub min_chunk_size_chars: usize,
    /// Fragments shorter than this many tokens are dropped entirely.
    pub min_chunk_length_to_embed: usize,
    /// Hard cap on chunks produced from a single document.
    pub max_num_chunks: usize,
    /// Keep newlines inside chunks instead of flattening them to spaces.
    pub keep_separator: bool,
}

impl Default for ChunkPolicy {
    fn default() -> Self {
        Self {
            chunk_size: 800,
            chunk_overlap: 0,
            min_chunk_size_chars: 350,
            min_chunk_length_to_embed: 5,
            max_num_chunks: 10_000,
            keep_separator: true,
        }
    }
}

impl ChunkPolicy {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            chunk_overlap,
            ..Self::default()
        }
    }

    /// Splits `text` into chunks of roughly `chunk_size` tokens, cutting at
    /// the last sentence boundary inside the window where one exists. A
    /// trailing fragment shorter than `min_chunk_size_chars` is merged into
    /// the previous chunk rather than emitted on its own.
    pub fn split(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        if chars.is_empty() {
            return Vec::new();
        }

        let budget = (self.chunk_size * CHARS_PER_TOKEN).max(1);
        let floor = self.min_chunk_length_to_embed * CHARS_PER_TOKEN;
        let overlap = self.chunk_overlap * CHARS_PER_TOKEN;

        let mut chunks: Vec<String> = Vec::new();
        let mut start = 0;
        while start < chars.len() && chunks.len() < self.max_num_chunks {
            let window_end = (start + budget).min(chars.len());
            let mut cut = window_end;
            if window_end < chars.len() {
                let boundary_floor = (start + self.min_chunk_size_chars).min(window_end);
                if let Some(pos) = (boundary_floor..window_end)
                    .rev()
                    .find(|&i| is_sentence_boundary(chars[i]))
                {
                    cut = pos + 1;
                }
            }

            let raw: String = chars[start..cut].iter().collect();
            let piece = if self.keep_separator {
                raw.trim().to_string()
            } else {
                raw.replace('\n', " ").trim().to_string()
            };

            let at_end = cut >= chars.len();
            if piece.chars().count() >= floor.max(1) {
                if at_end && piece.chars().count() < self.min_chunk_size_chars {
                    match chunks.last_mut() {
                        Some(last) => {
                            last.push(' ');
                            last.push_str(&piece);
                        }
                        None => chunks.push(piece),
                    }
                } else {
                    chunks.push(piece);
                }
            }

            if at_end {
                break;
            }
            let mut next = cut.saturating_sub(overlap);
            if next <= start {
                next = cut;
            }
            start = next;
        }

        chunks
    }
}

fn is_sentence_boundary(c: char) -> bool {
    matches!(c, '.' | '!' | '?' | '\n')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sentence(n: usize) -> String {
        // 35 chars, short enough that every boundary-search window between
        // min_chunk_size_chars and the budget contains a period.
        format!("Sentence number {n:04} sized to fit. ")
    }

    #[test]
    fn short_text_is_a_single_chunk() {
        let policy = ChunkPolicy::default();
        let chunks = policy.split("A short paragraph that fits in one chunk.");
        assert_eq!(chunks.len(), 1);
    }

    #[test]
    fn empty_text_yields_no_chunks() {
        assert!(ChunkPolicy::default().split("").is_empty());
    }

    #[test]
    fn long_text_cuts_at_sentence_boundaries() {
        let text: String = (0..200).map(sentence).collect();
        let policy = ChunkPolicy::new(100, 0); // ~400 char budget
        let chunks = policy.split(&text);
        assert!(chunks.len() > 1);
        for chunk in &chunks[..chunks.len() - 1] {
            assert!(
                chunk.ends_with('.'),
                "expected a sentence-boundary cut, got: ...{:?}",
                &chunk[chunk.len().saturating_sub(20)..]
            );
        }
    }

    #[test]
    fn boundary_is_ignored_before_min_chunk_size() {
        // A period at position ~10 must not produce a tiny chunk.
        let text = format!("Short one. {}", "x".repeat(2000));
        let policy = ChunkPolicy::new(100, 0);
        let chunks = policy.split(&text);
        assert!(chunks[0].chars().count() >= 350);
    }

    #[test]
    fn tiny_fragments_are_dropped() {
        let policy = ChunkPolicy::default();
        assert!(policy.split("ok.").is_empty());
    }

    #[test]
    fn trailing_fragment_merges_into_previous_chunk() {
        let body: String = (0..46).map(sentence).collect();
        let text = format!("{body}Tail piece well above the embed floor here.");
        let policy = ChunkPolicy::new(200, 0); // ~800 char budget
        let chunks = policy.split(&text);
        assert!(chunks.len() > 1);
        let last = chunks.last().unwrap();
        assert!(
            last.chars().count() >= 350,
            "trailing fragment was emitted standalone: {} chars",
            last.chars().count()
        );
        assert!(last.ends_with("embed floor here."));
    }

    #[test]
    fn respects_max_num_chunks() {
        let text: String = (0..500).map(sentence).collect();
        let policy = ChunkPolicy {
            max_num_chunks: 3,
            ..ChunkPolicy::new(25, 0)
        };
        assert_eq!(policy.split(&text).len(), 3);
    }

    #[test]
    fn overlap_repeats_window_tails() {
        let text: String = (0..100).map(sentence).collect();
        let with = ChunkPolicy::new(100, 25).split(&text);
        let without = ChunkPolicy::new(100, 0).split(&text);
        assert!(with.len() > without.len());
    }

    #[test]
    fn multibyte_text_splits_without_panicking() {
        let text = "日本語のテキスト。".repeat(500);
        let chunks = ChunkPolicy::new(100, 0).split(&text);
        assert!(!chunks.is_empty());
    }
}

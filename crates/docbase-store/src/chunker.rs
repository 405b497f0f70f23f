//! Text chunking for vector storage

use docbase_core::{Error, Result};

/// How far back from a proposed window end to look for a sentence boundary.
const SENTENCE_LOOKBACK: usize = 100;

/// Split `text` into overlapping chunks of at most `chunk_size` characters,
/// preferring to cut just after a sentence-ending period.
///
/// Text no longer than `chunk_size` comes back as a single chunk, unchanged.
/// Longer text is windowed from the front; each window end is pulled back to
/// the last period found within [`SENTENCE_LOOKBACK`] characters (when that
/// period lies beyond the window start), the slice is whitespace-trimmed and
/// emitted if non-empty, and the cursor advances to `end - overlap`. A
/// sentence cut that lands inside the overlap would stall the cursor; the
/// cursor jumps to the window end instead.
///
/// Identical input always produces identical chunks.
pub fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> Result<Vec<String>> {
    if chunk_size == 0 {
        return Err(Error::Configuration("chunk size must be positive".to_string()));
    }
    if overlap >= chunk_size {
        return Err(Error::Configuration(format!(
            "chunk overlap ({overlap}) must be smaller than chunk size ({chunk_size})"
        )));
    }

    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= chunk_size {
        return Ok(vec![text.to_string()]);
    }

    let mut chunks = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let mut end = start + chunk_size;

        if end < chars.len() {
            let search_start = end.saturating_sub(SENTENCE_LOOKBACK).max(start);
            if let Some(stop) = (search_start..end).rev().find(|&i| chars[i] == '.') {
                if stop > start {
                    end = stop + 1;
                }
            }
        } else {
            end = chars.len();
        }

        let chunk: String = chars[start..end].iter().collect();
        let trimmed = chunk.trim();
        if !trimmed.is_empty() {
            chunks.push(trimmed.to_string());
        }

        start = if end < chars.len() {
            let next = end.saturating_sub(overlap);
            if next > start { next } else { end }
        } else {
            end
        };
    }

    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_a_single_chunk() {
        let chunks = chunk_text("short text", 100, 20).unwrap();
        assert_eq!(chunks, vec!["short text".to_string()]);
    }

    #[test]
    fn test_empty_text_passes_through() {
        let chunks = chunk_text("", 100, 20).unwrap();
        assert_eq!(chunks, vec![String::new()]);
    }

    #[test]
    fn test_prefers_sentence_boundaries() {
        let chunks = chunk_text("One. Two. Three. Four.", 10, 3).unwrap();
        assert_eq!(
            chunks,
            vec![
                "One. Two.".to_string(),
                "wo. Three.".to_string(),
                "ee. Four.".to_string(),
            ]
        );
    }

    #[test]
    fn test_windows_without_periods() {
        let chunks = chunk_text("abcdefghij klmnopqrst uvwxyz", 10, 2).unwrap();
        assert_eq!(
            chunks,
            vec![
                "abcdefghij".to_string(),
                "ij klmnopq".to_string(),
                "pqrst uvwx".to_string(),
                "wxyz".to_string(),
            ]
        );
    }

    #[test]
    fn test_sentence_cut_inside_overlap_still_advances() {
        // With overlap 9, the cut after "Two." would send the cursor
        // backwards; the guard jumps to the window end instead.
        let chunks = chunk_text("One. Two. Three.", 10, 9).unwrap();
        assert_eq!(chunks, vec!["One. Two.".to_string(), "Three.".to_string()]);
    }

    #[test]
    fn test_chunks_overlap_without_gaps() {
        let text = "The quick brown fox jumps over the lazy dog and keeps on running through the quiet field until dusk settles over everything";
        let chunk_size = 40;
        let overlap = 10;
        let chunks = chunk_text(text, chunk_size, overlap).unwrap();
        assert!(chunks.len() > 1);

        // Each chunk is a trimmed slice of the original, and each next chunk
        // starts before the previous one ends.
        let mut search_from = 0;
        let mut previous_end = 0;
        for (i, chunk) in chunks.iter().enumerate() {
            let at = text[search_from..]
                .find(chunk.as_str())
                .map(|p| p + search_from)
                .expect("chunk must be a slice of the input");
            if i > 0 {
                assert!(at <= previous_end, "gap before chunk {i}");
            }
            previous_end = at + chunk.len();
            search_from = at + 1;
        }
        assert!(previous_end >= text.trim_end().len());
    }

    #[test]
    fn test_deterministic() {
        let text = "Sentence one is here. Sentence two follows it. Sentence three closes.";
        let first = chunk_text(text, 30, 8).unwrap();
        let second = chunk_text(text, 30, 8).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_rejects_stalling_parameters() {
        assert!(matches!(
            chunk_text("some text", 10, 10),
            Err(Error::Configuration(_))
        ));
        assert!(matches!(
            chunk_text("some text", 0, 0),
            Err(Error::Configuration(_))
        ));
    }
}

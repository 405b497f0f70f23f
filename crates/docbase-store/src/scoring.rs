//! Lexical relevance scoring for the fallback backend

/// Score `text` against `query` by token overlap.
///
/// The query is lowercased and split on whitespace into `n` words; every word
/// that occurs as a substring of the lowercased candidate adds `1/n`, and the
/// full query occurring verbatim adds a flat `0.5` on top. The sum is not
/// clamped, so an exact phrase match on every word scores `1.5`. An empty
/// query scores `0.0` against everything.
pub fn lexical_score(query: &str, text: &str) -> f32 {
    let query_lower = query.to_lowercase();
    let text_lower = text.to_lowercase();

    let words: Vec<&str> = query_lower.split_whitespace().collect();
    if words.is_empty() {
        return 0.0;
    }

    let mut matches = 0;
    for word in &words {
        if text_lower.contains(word) {
            matches += 1;
        }
    }

    let mut score = matches as f32 / words.len() as f32;

    if text_lower.contains(&query_lower) {
        score += 0.5;
    }

    score
}

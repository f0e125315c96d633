/// Fallback result count used when the raw top_k field is unusable.
pub const DEFAULT_TOP_K: i64 = 7;

/// Resolves the raw top_k field the way the search form treated it: a value
/// that fails to parse, or parses to zero, falls back to the default. Any
/// other parsed value passes through untouched, sign included.
pub fn resolve_top_k(raw: &str) -> i64 {
    match raw.trim().parse::<i64>() {
        Ok(0) | Err(_) => DEFAULT_TOP_K,
        Ok(n) => n,
    }
}

/// Relevance scores are always displayed with exactly 3 decimal digits.
pub fn format_score(score: f64) -> String {
    format!("{:.3}", score)
}

pub fn truncate_cell(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    let kept: String = value.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{kept}...")
}

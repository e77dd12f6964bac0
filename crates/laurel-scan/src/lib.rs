//! laurel-scan
//!
//! Token Scanner: decides whether a comment body contains an award token
//! outside quoted/code regions. Tokens placed only inside quotations (the
//! common abuse pattern: quoting somebody else's award) must not count.
//!
//! Deterministic, pure logic. No IO.

/// True if the line opens a skippable region: indented as a code block or
/// beginning with a blockquote marker. The platform delivers quoted bodies
/// with the marker HTML-escaped, so both `>` and `&gt;` are recognized.
pub fn line_is_skippable(line: &str) -> bool {
    if line.starts_with("    ") {
        return true;
    }
    let stripped = line.trim_start_matches(' ');
    stripped.starts_with("&gt;") || stripped.starts_with('>')
}

/// Scan `body` for any exact substring match against any token, excluding
/// quoted/code regions.
///
/// A skippable line opens a block that swallows every following line —
/// markdown continues a quote across unmarked lines — until a blank line
/// closes it. First match short-circuits.
pub fn contains_token(body: &str, tokens: &[String]) -> bool {
    let mut in_block = false;
    for line in body.split('\n') {
        if line.is_empty() {
            in_block = false;
        }
        if in_block {
            continue;
        }
        if line_is_skippable(line) {
            in_block = true;
            continue;
        }
        if tokens.iter().any(|token| line.contains(token.as_str())) {
            return true;
        }
    }
    false
}

/// Length in chars of the longest token; 0 for an empty set.
pub fn longest_token_len(tokens: &[String]) -> usize {
    tokens
        .iter()
        .map(|t| t.chars().count())
        .max()
        .unwrap_or(0)
}

/// Minimum acceptable body length: the longest token plus a configured base
/// minimum. Precomputed once by the classifier.
pub fn minimum_body_length(tokens: &[String], base_minimum: usize) -> usize {
    longest_token_len(tokens) + base_minimum
}

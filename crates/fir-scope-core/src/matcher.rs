// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

//! Wildcard prefix matching of ICAO identifiers against FIR patterns.
//!
//! A pattern such as `EG*` means "any code starting with EG". Matching is
//! anchored at the first character: `EG*` matches `EGLL` but never `BEGL`.

/// Marker accepted at the end of a pattern.
pub const WILDCARD: char = '*';

/// Removes every trailing wildcard marker and surrounding whitespace.
/// `"EG**"` becomes `"EG"`, `"*"` becomes `""`.
pub fn strip_wildcards(pattern: &str) -> &str {
    pattern.trim().trim_end_matches(WILDCARD).trim_end()
}

/// True when the pattern stands for the whole world (empty once stripped).
pub fn is_global(pattern: &str) -> bool {
    strip_wildcards(pattern).is_empty()
}

/// Decides whether `code` falls inside `patterns`.
///
/// An empty pattern list permits everything: callers rely on that to mean
/// "no filter configured". A global pattern anywhere in the list also permits
/// everything. Otherwise the upper-cased code must start with at least one
/// stripped, upper-cased pattern. A missing or blank code matches nothing.
pub fn matches<S: AsRef<str>>(code: Option<&str>, patterns: &[S]) -> bool {
    if patterns.is_empty() {
        return true;
    }

    let code = code.map(|c| c.trim().to_uppercase()).unwrap_or_default();

    for pattern in patterns {
        let stripped = strip_wildcards(pattern.as_ref());
        if stripped.is_empty() {
            return true;
        }
        if !code.is_empty() && code.starts_with(&stripped.to_uppercase()) {
            return true;
        }
    }

    false
}

/// Convenience for callers that always hold a code.
pub fn matches_code<S: AsRef<str>>(code: &str, patterns: &[S]) -> bool {
    matches(Some(code), patterns)
}

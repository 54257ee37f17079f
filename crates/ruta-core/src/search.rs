//! # Stock Search Matching
//!
//! Pure matching helpers behind the seller's stock search box. The database
//! layer narrows candidates with substring queries; this module decides which
//! candidate, if any, is an *exact* match worth auto-selecting, and whether
//! the raw input looks like a barcode scan.

use crate::types::StockCandidate;

/// Minimum length for an input to plausibly be a scanned barcode.
const MIN_SCAN_LENGTH: usize = 6;

/// Finds the earliest candidate whose code, name, or brand equals the filter
/// (case-insensitive), returning its index.
///
/// Candidates are scanned in list order and the first one matching on *any*
/// field wins; code, name, and brand are checked in that order within each
/// candidate. An earlier candidate matching by name beats a later candidate
/// matching by code.
pub fn find_exact_match(filter: &str, candidates: &[StockCandidate]) -> Option<usize> {
    let needle = filter.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }

    let eq = |v: &str| v.to_lowercase() == needle;
    candidates
        .iter()
        .position(|c| eq(&c.code) || eq(&c.name) || c.brand.as_deref().is_some_and(|b| eq(b)))
}

/// Heuristic for "this input came from a barcode scanner": long enough and
/// containing no whitespace. Used to auto-add the exact match to the sale
/// instead of just highlighting it.
pub fn is_likely_scan(input: &str) -> bool {
    let trimmed = input.trim();
    trimmed.len() >= MIN_SCAN_LENGTH && !trimmed.contains(char::is_whitespace)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(code: &str, name: &str, brand: Option<&str>) -> StockCandidate {
        StockCandidate {
            product_id: format!("p-{code}"),
            code: code.to_string(),
            name: name.to_string(),
            brand: brand.map(str::to_string),
            in_inventory: true,
            quantity: 10,
        }
    }

    #[test]
    fn test_code_match_on_first_candidate() {
        // Both candidates match the filter (first by code, second by name);
        // the earlier one wins.
        let candidates = vec![
            candidate("A1", "Widget", None),
            candidate("B2", "A1", None),
        ];
        assert_eq!(find_exact_match("A1", &candidates), Some(0));
    }

    #[test]
    fn test_earlier_name_match_beats_later_code_match() {
        // List order decides, not which field matched: the first candidate
        // matches by name, the second by code, and the first wins.
        let candidates = vec![
            candidate("B2", "A1", None),
            candidate("A1", "Zest", None),
        ];
        assert_eq!(find_exact_match("A1", &candidates), Some(0));
    }

    #[test]
    fn test_earlier_brand_match_beats_later_name_match() {
        let candidates = vec![
            candidate("X1", "Cola", Some("Acme")),
            candidate("X2", "Acme", None),
        ];
        assert_eq!(find_exact_match("acme", &candidates), Some(0));
    }

    #[test]
    fn test_case_insensitive() {
        let candidates = vec![candidate("ABC123", "Soap", Some("CleanCo"))];
        assert_eq!(find_exact_match("abc123", &candidates), Some(0));
        assert_eq!(find_exact_match("SOAP", &candidates), Some(0));
        assert_eq!(find_exact_match("cleanco", &candidates), Some(0));
    }

    #[test]
    fn test_no_match() {
        let candidates = vec![candidate("A1", "Widget", None)];
        assert_eq!(find_exact_match("A", &candidates), None);
        assert_eq!(find_exact_match("", &candidates), None);
        assert_eq!(find_exact_match("   ", &candidates), None);
    }

    #[test]
    fn test_first_wins_within_field() {
        let candidates = vec![
            candidate("DUP", "First", None),
            candidate("DUP", "Second", None),
        ];
        assert_eq!(find_exact_match("dup", &candidates), Some(0));
    }

    #[test]
    fn test_is_likely_scan() {
        assert!(is_likely_scan("7501001234567"));
        assert!(is_likely_scan("ABC123"));
        assert!(is_likely_scan("  ABC123  ")); // surrounding whitespace is trimmed
        assert!(!is_likely_scan("AB12")); // too short
        assert!(!is_likely_scan("blue soap")); // inner whitespace
    }
}

//! Sequential evidence codes (`EV-001`, `EV-002`, ...) scoped to one interview.

use std::sync::LazyLock;

use regex::Regex;

pub const CODE_PREFIX: &str = "EV-";

/// Minimum number of digits; longer sequences simply grow past it.
const CODE_WIDTH: usize = 3;

static CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^EV-(\d+)$").expect("valid evidence code regex"));

/// Sequence number encoded in a code, if it follows the `EV-<digits>` shape.
pub fn parse_sequence(code: &str) -> Option<u64> {
    CODE_RE
        .captures(code.trim())
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

pub fn format_code(sequence: u64) -> String {
    format!("{CODE_PREFIX}{sequence:0width$}", width = CODE_WIDTH)
}

/// The code following the highest existing sequence. Codes that do not match
/// the pattern are ignored, and gaps left by deletions are never refilled.
pub fn next_code<'a>(existing: impl IntoIterator<Item = &'a str>) -> String {
    let highest = existing
        .into_iter()
        .filter_map(parse_sequence)
        .max()
        .unwrap_or(0);
    format_code(highest.saturating_add(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_code_for_empty_interview() {
        assert_eq!(next_code(std::iter::empty()), "EV-001");
    }

    #[test]
    fn follows_highest_sequence_not_count() {
        let codes = ["EV-001", "EV-007", "EV-003"];
        assert_eq!(next_code(codes.iter().copied()), "EV-008");
    }

    #[test]
    fn ignores_foreign_codes() {
        let codes = ["LEGACY-99", "EV-002", "ev-050", "EV-abc"];
        assert_eq!(next_code(codes.iter().copied()), "EV-003");
    }

    #[test]
    fn grows_past_padding_width() {
        assert_eq!(format_code(999), "EV-999");
        assert_eq!(next_code(["EV-999"].iter().copied()), "EV-1000");
        assert_eq!(parse_sequence("EV-1000"), Some(1000));
    }

    #[test]
    fn parse_accepts_unpadded_codes() {
        assert_eq!(parse_sequence("EV-7"), Some(7));
        assert_eq!(parse_sequence("EV-"), None);
        assert_eq!(parse_sequence("XEV-001"), None);
    }
}

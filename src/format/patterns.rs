//! Per-country VAT number shapes.
//!
//! See <https://en.wikipedia.org/wiki/VAT_identification_number>. Each prefix
//! maps to one or more alternative shapes for the local part, tried in order.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

pub(crate) const PATTERNS: &[(&str, &[&str])] = &[
    ("AT", &["U[A-Z0-9]{8}"]),
    ("BE", &["0[0-9]{9}", "[0-9]{10}"]),
    ("BG", &["[0-9]{9,10}"]),
    (
        "CH",
        &[
            r"E(?:-| )[0-9]{3}(?:\.| )[0-9]{3}(?:\.| )[0-9]{3}(?: MWST)?",
            "E[0-9]{9}(?:MWST)?",
        ],
    ),
    ("CY", &["[0-9]{8}[A-Z]"]),
    ("CZ", &["[0-9]{8,10}"]),
    ("DE", &["[0-9]{9}"]),
    ("DK", &["[0-9]{8}"]),
    ("EE", &["[0-9]{9}"]),
    ("EL", &["[0-9]{9}"]),
    ("ES", &["[A-Z][0-9]{7}[A-Z]", "[0-9]{8}[A-Z]", "[A-Z][0-9]{8}"]),
    ("FI", &["[0-9]{8}"]),
    ("FR", &["(?:[A-Z]{2}|[0-9]{2})[0-9]{9}"]),
    // HMRC only accepts 9 or 12 digits; GD/HA government numbers are not looked up
    ("GB", &["[0-9]{9}", "[0-9]{12}"]),
    ("HR", &["[0-9]{11}"]),
    ("HU", &["[0-9]{8}"]),
    ("IE", &["[A-Z0-9]{7}[A-Z]", "[A-Z0-9]{7}[A-W][A-I]"]),
    ("IT", &["[0-9]{11}"]),
    ("LT", &["[0-9]{9}", "[0-9]{12}"]),
    ("LU", &["[0-9]{8}"]),
    ("LV", &["[0-9]{11}"]),
    ("MT", &["[0-9]{8}"]),
    ("NL", &["[0-9]{9}B[0-9]{2}"]),
    ("PL", &["[0-9]{10}"]),
    ("PT", &["[0-9]{9}"]),
    ("RO", &["[0-9]{2,10}"]),
    ("SE", &["[0-9]{12}"]),
    ("SI", &["[0-9]{8}"]),
    ("SK", &["[0-9]{10}"]),
    // Northern Ireland, same shape as GB
    ("XI", &["[0-9]{9}", "[0-9]{12}"]),
];

static TABLE: LazyLock<HashMap<&'static str, Vec<Regex>>> = LazyLock::new(|| {
    PATTERNS
        .iter()
        .map(|&(prefix, shapes)| {
            let compiled = shapes
                .iter()
                .map(|shape| {
                    Regex::new(&format!("^(?:{shape})$"))
                        .unwrap_or_else(|e| panic!("invalid VAT pattern for {prefix}: {e}"))
                })
                .collect();
            (prefix, compiled)
        })
        .collect()
});

/// Compiled shapes for an upper-cased prefix.
pub(crate) fn shapes_for(prefix: &str) -> Option<&'static [Regex]> {
    TABLE.get(prefix).map(Vec::as_slice)
}

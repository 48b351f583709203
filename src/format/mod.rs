//! Offline VAT number format validation.
//!
//! Pure functions over a static pattern table; nothing here touches the
//! network or any shared mutable state.

mod patterns;

use std::sync::LazyLock;

use regex::Regex;

use crate::core::{VatError, VatNumber};

/// Validate a VAT number by its shape alone (no network call).
///
/// The input must include the two-letter country prefix (e.g.
/// `"NL123456789B01"`). The prefix is case-insensitive; whitespace anywhere,
/// including a trailing newline, makes the number invalid. Use [`sanitize`]
/// for untidy input. Returns the normalised number on success.
///
/// # Errors
///
/// - [`VatError::Country`] if the input is shorter than three characters or
///   its prefix is not in the pattern table.
/// - [`VatError::Format`] if the local part matches none of the shapes for
///   that prefix.
pub fn validate_format(vat_number: &str) -> Result<VatNumber, VatError> {
    let number = VatNumber::parse(vat_number).map_err(|_| {
        let prefix: String = vat_number.chars().take(2).collect();
        VatError::country(prefix.to_uppercase())
    })?;

    let shapes = patterns::shapes_for(number.prefix())
        .ok_or_else(|| VatError::country(number.prefix()))?;

    if shapes.iter().any(|re| re.is_match(number.local_part())) {
        Ok(number)
    } else {
        Err(VatError::format(number.as_str()))
    }
}

/// All country prefixes with a known format.
pub fn supported_prefixes() -> impl Iterator<Item = &'static str> {
    patterns::PATTERNS.iter().map(|&(prefix, _)| prefix)
}

/// Whether `prefix` (case-insensitive) has a known format.
pub fn is_supported_prefix(prefix: &str) -> bool {
    patterns::shapes_for(&prefix.to_uppercase()).is_some()
}

static SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-_ ]").unwrap_or_else(|e| panic!("invalid separator pattern: {e}")));

/// Strip readability separators from user input, then check the format.
///
/// Outer whitespace is trimmed, then all spaces, dashes and underscores are
/// removed. Returns the cleaned number on success.
///
/// # Errors
///
/// Returns the [`validate_format`] error for the cleaned value, so the error
/// carries what was actually checked.
pub fn sanitize(vat_number: &str) -> Result<String, VatError> {
    let cleaned = SEPARATORS.replace_all(vat_number.trim(), "");
    validate_format(&cleaned)?;
    Ok(cleaned.into_owned())
}

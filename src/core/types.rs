use std::fmt;

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use super::VatError;

/// A VAT identification number split into its country prefix and local part.
///
/// The number is upper-cased on construction; whitespace is kept as given.
/// It always holds at least three characters: a two-character prefix and a
/// non-empty remainder.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VatNumber {
    normalized: String,
    split: usize,
}

impl VatNumber {
    /// Normalise raw user input.
    ///
    /// # Errors
    ///
    /// Returns [`VatError::Format`] if the input is shorter than three
    /// characters.
    pub fn parse(raw: &str) -> Result<Self, VatError> {
        let normalized = raw.to_uppercase();
        if normalized.chars().count() < 3 {
            return Err(VatError::format(normalized));
        }
        // at least three chars, so the third one exists
        let split = normalized
            .char_indices()
            .nth(2)
            .map(|(i, _)| i)
            .unwrap_or(normalized.len());
        Ok(Self { normalized, split })
    }

    /// The upper-cased two-letter country prefix (e.g. `"NL"`).
    pub fn prefix(&self) -> &str {
        &self.normalized[..self.split]
    }

    /// Everything after the prefix.
    pub fn local_part(&self) -> &str {
        &self.normalized[self.split..]
    }

    /// The full normalised number.
    pub fn as_str(&self) -> &str {
        &self.normalized
    }
}

impl fmt::Display for VatNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.normalized)
    }
}

/// Details returned by the VIES service for a registered number.
///
/// The UK backend confirms existence without returning any of these fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupResult {
    /// Whether the number is currently valid.
    pub valid: bool,
    /// Country code echoed by the service.
    pub country_code: String,
    /// Local part echoed by the service.
    pub number: String,
    /// Request date as sent by VIES, e.g. `2015-03-06+01:00`.
    pub request_date: String,
    /// Registered trader name, if disclosed.
    pub name: Option<String>,
    /// Registered trader address, if disclosed.
    pub address: Option<String>,
}

impl LookupResult {
    /// The calendar day of the request, ignoring the zone suffix.
    pub fn request_day(&self) -> Option<NaiveDate> {
        let day = self.request_date.get(..10)?;
        NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
    }
}

/// Seconds subtracted from the provider-declared lifetime of a token.
pub const TOKEN_EXPIRY_MARGIN_SECS: i64 = 60;

/// OAuth bearer token for the HMRC VAT API.
///
/// Never use a token once `now >= expires_at`. Tokens produced by
/// [`HmrcBackend::generate_access_token`](crate::hmrc::HmrcBackend::generate_access_token)
/// already expire [`TOKEN_EXPIRY_MARGIN_SECS`] before the provider's deadline.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    /// Bearer value.
    pub token: String,
    /// Instant after which the token must not be sent.
    pub expires_at: DateTime<Utc>,
    /// Whether the token was issued by the HMRC test environment.
    #[serde(default)]
    pub issued_for_test: bool,
}

impl AccessToken {
    /// Build a token from a provider-declared lifetime in seconds, applying
    /// the expiry margin.
    pub fn from_lifetime(
        token: impl Into<String>,
        expires_in_secs: i64,
        issued_for_test: bool,
        now: DateTime<Utc>,
    ) -> Self {
        let effective = expires_in_secs.saturating_sub(TOKEN_EXPIRY_MARGIN_SECS);
        let expires_at = TimeDelta::try_seconds(effective)
            .and_then(|d| now.checked_add_signed(d))
            .unwrap_or(now);
        Self {
            token: token.into(),
            expires_at,
            issued_for_test,
        }
    }

    /// Whether the token must no longer be used at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Whether the token must no longer be used.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .field("issued_for_test", &self.issued_for_test)
            .finish()
    }
}

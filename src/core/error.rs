use thiserror::Error;

use crate::transport::TransportError;

/// Errors that can occur while validating a VAT number.
///
/// Every remote-call failure ends up as exactly one of these variants.
/// Only [`VatError::ServiceUnavailable`] and most [`VatError::TokenGeneration`]
/// failures are worth retrying; see [`VatError::is_retryable`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum VatError {
    /// The number does not have a legal shape, detected locally or by the
    /// remote service.
    #[error("VAT number format is invalid: {value}")]
    Format {
        /// The offending input (normalised where possible).
        value: String,
    },

    /// The country prefix is unknown, or not served by the selected backend.
    #[error("unknown country code: {prefix}")]
    Country {
        /// The offending prefix, upper-cased.
        prefix: String,
    },

    /// The number is well formed but not registered as an active VAT number.
    #[error("number not found as an existing active VAT number")]
    NotFound,

    /// The lookup service could not be reached or answered in a bad state.
    #[error("service is unavailable: {0}")]
    ServiceUnavailable(#[source] UnavailableCause),

    /// Exchanging client credentials for an access token failed.
    #[error("unable to generate UK access token: {0}")]
    TokenGeneration(#[source] TokenError),

    /// No usable access token was supplied and no credentials are configured
    /// to obtain one.
    #[error("missing UK access token and no client credentials configured")]
    MissingToken,
}

impl VatError {
    pub(crate) fn format(value: impl Into<String>) -> Self {
        Self::Format {
            value: value.into(),
        }
    }

    pub(crate) fn country(prefix: impl Into<String>) -> Self {
        Self::Country {
            prefix: prefix.into(),
        }
    }

    /// Whether a caller may reasonably retry the same call later.
    ///
    /// Format, country and not-found results are deterministic and never
    /// change on retry. Neither does a token exchange attempted without
    /// client credentials.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ServiceUnavailable(_) => true,
            Self::TokenGeneration(e) => !matches!(e, TokenError::MissingCredentials),
            _ => false,
        }
    }
}

/// Why a lookup service was considered unavailable.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum UnavailableCause {
    /// Connection error, timeout or other transport failure.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The upstream reported a member-state outage or throttling marker
    /// (e.g. `MS_UNAVAILABLE`).
    #[error("member state service unavailable ({0})")]
    MemberStateUnavailable(String),

    /// The upstream answered with a SOAP fault not otherwise recognised.
    #[error("SOAP fault: {0}")]
    Fault(String),

    /// The response body could not be interpreted.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The upstream answered with an HTTP status outside its contract.
    #[error("unexpected HTTP status {0}")]
    UnexpectedStatus(u16),
}

/// Why a client-credentials token exchange failed.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TokenError {
    /// The token endpoint could not be reached.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The token endpoint answered with a non-200 status.
    #[error("unexpected status code: {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, as returned.
        body: String,
    },

    /// The token response body was not the expected JSON.
    #[error("invalid token response: {0}")]
    Decode(String),

    /// Client id or secret is not configured.
    #[error("missing client ID or secret")]
    MissingCredentials,

    /// The declared lifetime does not outlast the expiry margin, so the
    /// token is already expired when received.
    #[error("token expired on issue (expires_in {expires_in}s)")]
    ExpiredOnIssue {
        /// Lifetime declared by the provider, in seconds.
        expires_in: i64,
    },
}

impl From<UnavailableCause> for VatError {
    fn from(cause: UnavailableCause) -> Self {
        Self::ServiceUnavailable(cause)
    }
}

impl From<TokenError> for VatError {
    fn from(err: TokenError) -> Self {
        Self::TokenGeneration(err)
    }
}

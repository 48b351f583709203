//! HMRC "check a UK VAT number" client.
//!
//! Only `GB` numbers are served here. Lookups need an OAuth bearer token; a
//! supplied token is reused while it is valid, otherwise one is obtained with
//! the configured client credentials and handed back to the caller.
//!
//! API documentation:
//! <https://developer.service.hmrc.gov.uk/api-documentation/docs/api/service/vat-registered-companies-api/2.0>

mod token;

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};

use crate::core::{AccessToken, TokenError, UnavailableCause, ValidatorOptions, VatError, VatNumber};
use crate::dispatch::{ExistenceCheck, LookupBackend};
use crate::transport::{HttpRequest, HttpTransport};

use token::Credentials;

/// The only prefix this backend serves.
pub const UK_PREFIX: &str = "GB";

/// Default timeout for token exchanges and lookups.
pub const DEFAULT_HMRC_TIMEOUT: Duration = Duration::from_secs(10);

const ACCEPT: &str = "application/vnd.hmrc.2.0+json";

/// Timeout and optional base URL override of the HMRC backend.
///
/// Without an override the base URL follows
/// [`ValidatorOptions::environment`](crate::ValidatorOptions::environment).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HmrcConfig {
    pub timeout: Duration,
    pub base_url: Option<String>,
}

impl Default for HmrcConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_HMRC_TIMEOUT,
            base_url: None,
        }
    }
}

/// Lookup backend for the HMRC VAT API.
#[derive(Clone)]
pub struct HmrcBackend {
    transport: Arc<dyn HttpTransport>,
    config: HmrcConfig,
    clock: fn() -> DateTime<Utc>,
}

impl HmrcBackend {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self::with_config(transport, HmrcConfig::default())
    }

    pub fn with_config(transport: Arc<dyn HttpTransport>, config: HmrcConfig) -> Self {
        Self {
            transport,
            config,
            clock: Utc::now,
        }
    }

    /// Replace the wall clock used for token expiry decisions.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &HmrcConfig {
        &self.config
    }

    fn base_url(&self, opts: &ValidatorOptions) -> String {
        match &self.config.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => opts.environment.hmrc_base_url(),
        }
    }

    /// Exchange the configured client credentials for a fresh token.
    ///
    /// The token expires 60 seconds before the provider-declared lifetime.
    ///
    /// # Errors
    ///
    /// Returns [`VatError::TokenGeneration`] if credentials are missing, the
    /// endpoint is unreachable or answers with a non-200 status, or the body
    /// is unexpected or declares a lifetime no longer than the margin.
    #[instrument(skip_all, fields(environment = ?opts.environment))]
    pub fn generate_access_token(&self, opts: &ValidatorOptions) -> Result<AccessToken, VatError> {
        let (client_id, client_secret) = opts
            .uk_credentials()
            .ok_or(TokenError::MissingCredentials)?;
        let creds = Credentials {
            client_id,
            client_secret,
        };
        let request = token::token_request(&self.base_url(opts), &creds, self.config.timeout);
        let issued_for_test = opts.environment.is_test();

        let token = token::exchange(self.transport.as_ref(), request, issued_for_test, (self.clock)())
            .inspect_err(|e| warn!(error = %e, "token exchange failed"))?;
        info!(expires_at = %token.expires_at, "obtained HMRC access token");
        Ok(token)
    }

    /// The local part as a single URL path segment.
    ///
    /// HMRC numbers are ASCII alphanumeric; anything else could step out of
    /// the lookup path, so it is rejected before a request is made.
    fn path_segment(number: &VatNumber) -> Result<&str, VatError> {
        let local = number.local_part();
        if local.is_empty() || !local.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(VatError::format(number.as_str()));
        }
        Ok(local)
    }

    /// A token that may be sent right now, and whether it was freshly issued.
    fn usable_token(&self, opts: &ValidatorOptions) -> Result<(AccessToken, bool), VatError> {
        let now = (self.clock)();
        if let Some(token) = &opts.uk_access_token {
            if !token.is_expired_at(now) && token.issued_for_test == opts.environment.is_test() {
                return Ok((token.clone(), false));
            }
            debug!("supplied token expired or issued for another environment");
        }
        if opts.uk_credentials().is_none() {
            return Err(VatError::MissingToken);
        }
        Ok((self.generate_access_token(opts)?, true))
    }

    /// Confirm that a `GB` number is registered, using the given token.
    ///
    /// # Errors
    ///
    /// - [`VatError::Country`] for any prefix other than `GB`.
    /// - [`VatError::Format`] if the local part is not ASCII alphanumeric, or
    ///   on HTTP 400; [`VatError::NotFound`] on 404.
    /// - [`VatError::ServiceUnavailable`] on transport failure or any other
    ///   non-200 status.
    #[instrument(skip_all, fields(number = %number))]
    pub fn lookup(
        &self,
        number: &VatNumber,
        token: &AccessToken,
        opts: &ValidatorOptions,
    ) -> Result<(), VatError> {
        if number.prefix() != UK_PREFIX {
            return Err(VatError::country(number.prefix()));
        }
        let segment = Self::path_segment(number)?;

        let url = format!(
            "{}/organisations/vat/check-vat-number/lookup/{segment}",
            self.base_url(opts)
        );
        let request = HttpRequest::get(url)
            .header("Accept", ACCEPT)
            .header("Authorization", format!("Bearer {}", token.token))
            .timeout(self.config.timeout);

        let resp = self
            .transport
            .send(request)
            .map_err(|e| VatError::from(UnavailableCause::Transport(e)))?;
        debug!(status = resp.status, "HMRC responded");

        match resp.status {
            200 => Ok(()),
            400 => Err(VatError::format(number.as_str())),
            404 => Err(VatError::NotFound),
            other => {
                warn!(status = other, "unexpected status from HMRC");
                Err(UnavailableCause::UnexpectedStatus(other).into())
            }
        }
    }
}

impl LookupBackend for HmrcBackend {
    fn check(&self, number: &VatNumber, opts: &ValidatorOptions) -> ExistenceCheck {
        if let Err(e) = Self::path_segment(number) {
            return ExistenceCheck::from(Err(e));
        }
        let (token, fresh) = match self.usable_token(opts) {
            Ok(t) => t,
            Err(e) => return ExistenceCheck::from(Err(e)),
        };
        let outcome = self.lookup(number, &token, opts).map(|()| None);
        ExistenceCheck {
            outcome,
            refreshed_token: fresh.then_some(token),
        }
    }
}

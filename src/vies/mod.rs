//! EU VIES `checkVat` SOAP client.
//!
//! Serves every prefix except `GB`, including `XI` (Northern Ireland).

mod envelope;
mod response;

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, instrument, warn};

use crate::core::{LookupResult, UnavailableCause, ValidatorOptions, VatError, VatNumber};
use crate::dispatch::{ExistenceCheck, LookupBackend};
use crate::transport::{HttpRequest, HttpTransport};

/// Production `checkVat` endpoint.
pub const VIES_URL: &str = "https://ec.europa.eu/taxation_customs/vies/services/checkVatService";

/// Default timeout for a `checkVat` call.
pub const DEFAULT_VIES_TIMEOUT: Duration = Duration::from_secs(10);

const CONTENT_TYPE: &str = "text/xml;charset=UTF-8";

/// Endpoint and timeout of the VIES backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViesConfig {
    pub endpoint: String,
    pub timeout: Duration,
}

impl Default for ViesConfig {
    fn default() -> Self {
        Self {
            endpoint: VIES_URL.to_string(),
            timeout: DEFAULT_VIES_TIMEOUT,
        }
    }
}

/// Lookup backend for the EU VIES service.
#[derive(Clone)]
pub struct ViesBackend {
    transport: Arc<dyn HttpTransport>,
    config: ViesConfig,
}

impl ViesBackend {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self::with_config(transport, ViesConfig::default())
    }

    pub fn with_config(transport: Arc<dyn HttpTransport>, config: ViesConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &ViesConfig {
        &self.config
    }

    /// Look up a number and return the registered details.
    ///
    /// # Errors
    ///
    /// - [`VatError::ServiceUnavailable`] on transport failure, an outage
    ///   marker, a SOAP fault or an unparseable body.
    /// - [`VatError::Format`] if VIES rejects the input.
    /// - [`VatError::NotFound`] if VIES reports the number as not valid.
    #[instrument(skip_all, fields(number = %number))]
    pub fn lookup(&self, number: &VatNumber) -> Result<LookupResult, VatError> {
        let request = HttpRequest::post(&self.config.endpoint, envelope::check_vat_envelope(number))
            .header("Content-Type", CONTENT_TYPE)
            .timeout(self.config.timeout);

        let resp = self
            .transport
            .send(request)
            .map_err(|e| VatError::from(UnavailableCause::Transport(e)))?;
        debug!(status = resp.status, bytes = resp.body.len(), "VIES responded");

        let result = response::interpret(&resp.body).inspect_err(|e| {
            if e.is_retryable() {
                warn!(error = %e, "VIES unavailable");
            }
        })?;

        if !result.valid {
            return Err(VatError::NotFound);
        }
        Ok(result)
    }
}

impl LookupBackend for ViesBackend {
    fn check(&self, number: &VatNumber, _opts: &ValidatorOptions) -> ExistenceCheck {
        ExistenceCheck::from(self.lookup(number).map(Some))
    }
}

//! Existence dispatch: routes a number to the backend serving its country.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::core::{AccessToken, LookupResult, ValidatorOptions, VatError, VatNumber};
use crate::format::validate_format;
use crate::hmrc::{HmrcBackend, UK_PREFIX};
use crate::transport::HttpTransport;
use crate::vies::ViesBackend;

/// Which remote service answers for a prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// EU VIES, for every prefix except `GB` (including `XI`).
    Vies,
    /// HMRC, for `GB` only.
    Hmrc,
}

impl Route {
    /// Route for a (case-insensitive) country prefix.
    pub fn for_prefix(prefix: &str) -> Self {
        if prefix.eq_ignore_ascii_case(UK_PREFIX) {
            Self::Hmrc
        } else {
            Self::Vies
        }
    }
}

/// Outcome of an existence check.
///
/// `outcome` is `Ok(Some(_))` when the backend returned trader details, and
/// `Ok(None)` when it only confirmed the number exists. A token obtained
/// during the call is returned in `refreshed_token` even if the lookup
/// itself failed; storing it is up to the caller.
#[derive(Debug)]
#[must_use]
pub struct ExistenceCheck {
    pub outcome: Result<Option<LookupResult>, VatError>,
    pub refreshed_token: Option<AccessToken>,
}

impl ExistenceCheck {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }

    /// Drop the refreshed token and keep the plain result.
    pub fn into_result(self) -> Result<Option<LookupResult>, VatError> {
        self.outcome
    }
}

impl From<Result<Option<LookupResult>, VatError>> for ExistenceCheck {
    fn from(outcome: Result<Option<LookupResult>, VatError>) -> Self {
        Self {
            outcome,
            refreshed_token: None,
        }
    }
}

/// A remote service able to confirm that a VAT number exists.
///
/// Implementations must not mutate `opts`; anything they want the caller to
/// keep goes into the returned [`ExistenceCheck`].
pub trait LookupBackend: Send + Sync {
    fn check(&self, number: &VatNumber, opts: &ValidatorOptions) -> ExistenceCheck;
}

impl<B: LookupBackend + ?Sized> LookupBackend for &B {
    fn check(&self, number: &VatNumber, opts: &ValidatorOptions) -> ExistenceCheck {
        (**self).check(number, opts)
    }
}

impl<B: LookupBackend + ?Sized> LookupBackend for Box<B> {
    fn check(&self, number: &VatNumber, opts: &ValidatorOptions) -> ExistenceCheck {
        (**self).check(number, opts)
    }
}

/// Format check plus existence dispatch over two injected backends.
///
/// Holds no mutable state, so one validator can serve concurrent callers.
#[derive(Clone)]
pub struct Validator<E = ViesBackend, U = HmrcBackend> {
    eu: E,
    uk: U,
}

impl Validator {
    /// Validator using the default VIES and HMRC backends over `transport`.
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            eu: ViesBackend::new(transport.clone()),
            uk: HmrcBackend::new(transport),
        }
    }

    /// Exchange client credentials for a token with the HMRC backend.
    ///
    /// # Errors
    ///
    /// See [`HmrcBackend::generate_access_token`].
    pub fn generate_access_token(&self, opts: &ValidatorOptions) -> Result<AccessToken, VatError> {
        self.uk.generate_access_token(opts)
    }
}

impl<E: LookupBackend, U: LookupBackend> Validator<E, U> {
    /// Validator over explicit backends (`eu` for VIES, `uk` for `GB`).
    pub fn with_backends(eu: E, uk: U) -> Self {
        Self { eu, uk }
    }

    /// Confirm with the remote service that `vat_number` exists.
    ///
    /// No format check beyond the minimum length is made, and no retry is
    /// attempted.
    #[instrument(skip_all, fields(number = %vat_number))]
    pub fn validate_exists(&self, vat_number: &str, opts: &ValidatorOptions) -> ExistenceCheck {
        let number = match VatNumber::parse(vat_number) {
            Ok(n) => n,
            Err(e) => return ExistenceCheck::from(Err(e)),
        };
        let route = Route::for_prefix(number.prefix());
        debug!(?route, prefix = number.prefix(), "dispatching existence check");
        match route {
            Route::Hmrc => self.uk.check(&number, opts),
            Route::Vies => self.eu.check(&number, opts),
        }
    }

    /// Format check, then existence check if the format is valid.
    pub fn validate(&self, vat_number: &str, opts: &ValidatorOptions) -> ExistenceCheck {
        match validate_format(vat_number) {
            Ok(number) => self.validate_exists(number.as_str(), opts),
            Err(e) => ExistenceCheck::from(Err(e)),
        }
    }
}

#[cfg(feature = "http")]
fn default_validator() -> Result<Validator, VatError> {
    let transport = crate::transport::ReqwestTransport::new()
        .map_err(|e| VatError::from(crate::core::UnavailableCause::Transport(e)))?;
    Ok(Validator::new(Arc::new(transport)))
}

/// [`Validator::validate_exists`] over the default `reqwest` transport.
#[cfg(feature = "http")]
pub fn validate_exists(vat_number: &str, opts: &ValidatorOptions) -> ExistenceCheck {
    match default_validator() {
        Ok(v) => v.validate_exists(vat_number, opts),
        Err(e) => ExistenceCheck::from(Err(e)),
    }
}

/// [`Validator::validate`] over the default `reqwest` transport.
#[cfg(feature = "http")]
pub fn validate(vat_number: &str, opts: &ValidatorOptions) -> ExistenceCheck {
    match default_validator() {
        Ok(v) => v.validate(vat_number, opts),
        Err(e) => ExistenceCheck::from(Err(e)),
    }
}

/// [`HmrcBackend::generate_access_token`] over the default `reqwest` transport.
///
/// # Errors
///
/// Returns [`VatError::TokenGeneration`] on any exchange failure.
#[cfg(feature = "http")]
pub fn generate_access_token(opts: &ValidatorOptions) -> Result<AccessToken, VatError> {
    let transport = crate::transport::ReqwestTransport::new()
        .map_err(|e| VatError::from(crate::core::TokenError::Transport(e)))?;
    HmrcBackend::new(Arc::new(transport)).generate_access_token(opts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<String>>,
    }

    impl LookupBackend for Recorder {
        fn check(&self, number: &VatNumber, _opts: &ValidatorOptions) -> ExistenceCheck {
            self.calls.lock().unwrap().push(number.to_string());
            ExistenceCheck::from(Ok(None))
        }
    }

    fn recorders() -> (Recorder, Recorder) {
        (Recorder::default(), Recorder::default())
    }

    #[test]
    fn route_by_prefix() {
        assert_eq!(Route::for_prefix("GB"), Route::Hmrc);
        assert_eq!(Route::for_prefix("gb"), Route::Hmrc);
        assert_eq!(Route::for_prefix("XI"), Route::Vies);
        assert_eq!(Route::for_prefix("DE"), Route::Vies);
    }

    #[test]
    fn gb_goes_to_uk_backend() {
        let (eu, uk) = recorders();
        let v = Validator::with_backends(&eu, &uk);
        assert!(v.validate_exists("gb123456789", &ValidatorOptions::new()).is_ok());
        assert_eq!(*uk.calls.lock().unwrap(), vec!["GB123456789"]);
        assert!(eu.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn xi_goes_to_eu_backend() {
        let (eu, uk) = recorders();
        let v = Validator::with_backends(&eu, &uk);
        assert!(v.validate_exists("XI123456789", &ValidatorOptions::new()).is_ok());
        assert_eq!(*eu.calls.lock().unwrap(), vec!["XI123456789"]);
        assert!(uk.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn short_input_never_reaches_a_backend() {
        let (eu, uk) = recorders();
        let v = Validator::with_backends(&eu, &uk);
        let check = v.validate_exists("GB", &ValidatorOptions::new());
        assert!(matches!(check.outcome, Err(VatError::Format { .. })));
        assert!(eu.calls.lock().unwrap().is_empty());
        assert!(uk.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn validate_stops_on_bad_format() {
        let (eu, uk) = recorders();
        let v = Validator::with_backends(&eu, &uk);
        let check = v.validate("ATU1234567", &ValidatorOptions::new());
        assert!(matches!(check.outcome, Err(VatError::Format { .. })));
        let check = v.validate("KT123456789", &ValidatorOptions::new());
        assert!(matches!(check.outcome, Err(VatError::Country { .. })));
        assert!(eu.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn validate_passes_normalised_number() {
        let (eu, uk) = recorders();
        let v = Validator::with_backends(&eu, &uk);
        assert!(v.validate("atu12345678", &ValidatorOptions::new()).is_ok());
        assert_eq!(*eu.calls.lock().unwrap(), vec!["ATU12345678"]);
    }
}

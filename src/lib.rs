//! # vatcheck
//!
//! EU and UK VAT identification number validation in two stages:
//! an offline format check against per-country rules, and a remote
//! existence check against VIES (EU, including `XI`) or HMRC (`GB`).
//!
//! ## Quick Start
//!
//! ```rust
//! use vatcheck::*;
//!
//! // Format-only validation (no network)
//! let number = validate_format("nl123456789b01").unwrap();
//! assert_eq!(number.prefix(), "NL");
//! assert!(matches!(validate_format("KT123456789"), Err(VatError::Country { .. })));
//!
//! assert_eq!(sanitize("NL 1234-5678_9B01").unwrap(), "NL123456789B01");
//! ```
//!
//! Existence checks go through a [`Validator`], which never mutates the
//! [`ValidatorOptions`] it is given. A token obtained from HMRC during a call
//! is handed back for the caller to cache:
//!
//! ```rust,no_run
//! # #[cfg(feature = "http")]
//! # fn demo() -> Result<(), vatcheck::VatError> {
//! use vatcheck::*;
//!
//! let mut opts = ValidatorOptions::from_env();
//! let check = validate("GB123456789", &opts);
//! if let Some(token) = check.refreshed_token {
//!     opts.uk_access_token = Some(token);
//! }
//! check.outcome?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `http` (default) | Blocking `reqwest` transport and the free-function API |

pub mod core;
pub mod dispatch;
pub mod format;
pub mod hmrc;
pub mod transport;
pub mod vies;

pub use crate::core::*;
pub use crate::dispatch::{ExistenceCheck, LookupBackend, Route, Validator};
#[cfg(feature = "http")]
pub use crate::dispatch::{generate_access_token, validate, validate_exists};
pub use crate::format::{is_supported_prefix, sanitize, supported_prefixes, validate_format};
pub use crate::hmrc::{HmrcBackend, HmrcConfig};
pub use crate::transport::{HttpRequest, HttpResponse, HttpTransport, TransportError};
pub use crate::vies::{ViesBackend, ViesConfig};

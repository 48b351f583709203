//! Core types shared by the format check, both lookup backends and the
//! dispatcher: the normalised VAT number, lookup results, access tokens,
//! per-call options and the error taxonomy.

mod error;
mod options;
mod types;

pub use error::*;
pub use options::*;
pub use types::*;

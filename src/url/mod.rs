//! URL handling module for Tidepool
//!
//! This module provides URL canonicalization, stable key derivation, and
//! domain extraction. The canonical form is the crate-wide identity for a
//! URL: every deduplication decision goes through [`canonicalize`].

mod domain;
mod key;
mod normalize;

// Re-export main functions
pub use domain::extract_domain;
pub use key::UrlKey;
pub use normalize::{canonicalize, normalize_url};

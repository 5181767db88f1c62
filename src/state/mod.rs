//! State module for per-domain politeness tracking
//!
//! Workers share a map of [`DomainState`] keyed by domain; it enforces
//! the minimum delay between requests to the same host.

mod domain_state;

pub use domain_state::DomainState;

//! API integrations: request construction, execution and payload unwrapping
//! for the Census, BLS and BEA endpoints.

pub mod bea;
pub mod bls;
pub mod census;
pub mod request;

#[cfg(test)]
pub(crate) mod testing;

pub use request::{FetchError, FetchOutcome, HttpTransport, RequestSpec, Requester, Transport};

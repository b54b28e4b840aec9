//! # davsync HTTP transport
//!
//! A `WebDavTransport` backed by `reqwest`.
//!
//! Failures are normalized at this boundary: a non-success response keeps
//! its status, a client error keeps whatever status it carries, and nothing
//! above this crate has to know which of the two happened.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod transport;

pub use error::{HttpError, HttpResult};
pub use transport::{metadata_from_headers, HttpOptions, HttpTransport, OC_ETAG};

//! Transport layer for talking to an SLSC chassis
//!
//! - `http` - one blocking HTTP POST per call to the chassis web service
//! - `mock` - scripted replies and captured requests for tests

pub mod http;
pub mod mock;

use serde_json::Value;

use crate::errors::ClientError;
use crate::rpc::request::RequestEnvelope;

pub use http::HttpTransport;
pub use mock::MockTransport;

/// Sends one envelope and returns the raw JSON-RPC response mapping.
///
/// Failures to reach the chassis or to read its reply are `Err`; an `error` object inside
/// the reply is not, and is left for the response parser.
pub trait Transport: Send {
    fn call(&mut self, envelope: &RequestEnvelope) -> Result<Value, ClientError>;

    /// Transport name for logging
    fn transport_type(&self) -> &'static str;
}

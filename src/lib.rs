//! Client for the JSON-RPC web service of SLSC (switch, load and signal conditioning) chassis
//!
//! ```no_run
//! use slsc_web::{ClientConfig, ResourceKind, Session};
//!
//! # fn main() -> Result<(), slsc_web::ClientError> {
//! let config = ClientConfig::new("SLSC-12001-TSE");
//! let mut session = Session::connect_http(&config, ResourceKind::Devices, "SLSC-12001-TSE")?;
//!
//! let properties = session.get_property_list(None)?;
//! println!("{:?}", properties.result.dynamic_properties);
//!
//! session.close()?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod domain;
pub mod errors;
pub mod logging;
pub mod rpc;
pub mod session;
pub mod transport;

#[cfg(test)]
mod test_support;

pub use config::ClientConfig;
pub use domain::property::{AccessType, PropertyDataType, PropertyValue};
pub use domain::resources::{ResourceKind, Resources};
pub use errors::ClientError;
pub use rpc::request::{Request, RequestEnvelope, ReserveOptions};
pub use rpc::response::{Response, RpcError};
pub use session::{close_session_by_id, Session, SessionState};
pub use transport::{HttpTransport, MockTransport, Transport};

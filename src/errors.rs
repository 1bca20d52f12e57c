use thiserror::Error;

use crate::config::ConfigError;
use crate::rpc::response::RpcError;
use crate::session::SessionState;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("chassis answered with status {status}: {body}")]
    HttpStatus { status: u16, body: String },
    #[error("chassis reply is not JSON: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("unexpected JSON shape: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("one of devices, physical_channels or nvmem_areas is required")]
    MissingResources,
    #[error("unknown method: {0}")]
    UnknownMethod(String),
    #[error("invalid request id: {0}")]
    InvalidRequestId(String),
    #[error("unknown property data type: {0}")]
    UnknownDataType(String),
    #[error("property value does not match data type {data_type}: {value}")]
    ValueMismatch {
        data_type: &'static str,
        value: String,
    },
    #[error("cannot {operation} while session is {state}")]
    InvalidState {
        operation: &'static str,
        state: SessionState,
    },
    #[error("chassis rejected {method}: {error}")]
    Rpc {
        method: &'static str,
        error: RpcError,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ClientError {
    pub fn invalid_state(operation: &'static str, state: SessionState) -> Self {
        Self::InvalidState { operation, state }
    }

    pub fn value_mismatch(data_type: &'static str, value: &serde_json::Value) -> Self {
        Self::ValueMismatch {
            data_type,
            value: value.to_string(),
        }
    }

    pub fn rpc(method: &'static str, error: RpcError) -> Self {
        Self::Rpc { method, error }
    }

    /// True when no JSON reply came back from the chassis. A reply that is JSON but has
    /// the wrong shape is a `Decode` error and does not count.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::HttpStatus { .. } | Self::Parse(_)
        )
    }
}

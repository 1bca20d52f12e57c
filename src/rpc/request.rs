//! Request builders for the SLSC web service
//!
//! Every method of the service is one [`Request`] variant carrying its own parameter record.
//! [`RequestEnvelope`] adds the call id and produces the canonical wire form
//! `{"id": "<n>", "jsonrpc": "2.0", "method": ..., "params": {...}}`.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::domain::property::{AccessType, PropertyValue};
use crate::domain::resources::{split_list, Resources};
use crate::errors::ClientError;

pub const JSONRPC_VERSION: &str = "2.0";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitializeParams {
    #[serde(flatten)]
    pub resources: Resources,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionParams {
    pub session_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DevicePropertyListParams {
    pub session_id: String,
    pub device: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyParams {
    #[serde(flatten)]
    pub resources: Resources,
    pub session_id: String,
    pub property: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetPropertyParams {
    #[serde(flatten)]
    pub resources: Resources,
    pub session_id: String,
    pub property: String,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DevicesParams {
    pub session_id: String,
    pub devices: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameDeviceParams {
    pub session_id: String,
    pub device: String,
    pub new_device_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReserveDevicesParams {
    pub session_id: String,
    pub devices: Vec<String>,
    pub access: AccessType,
    pub reservation_group: String,
    pub reservation_timeout: f64,
}

/// Optional knobs of `reserveDevices`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReserveOptions {
    pub access: AccessType,
    pub reservation_group: String,
    /// Seconds to wait for a conflicting reservation to clear.
    pub reservation_timeout: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Initialize(InitializeParams),
    Close(SessionParams),
    /// Cancels a call blocking network communication. The session handle stays valid but
    /// network calls fail until it is closed and a new one is initialized.
    Abort(SessionParams),
    GetSessionPropertyList(SessionParams),
    /// Property names of a single device, channel or nvmem area.
    GetDevicePropertyList(DevicePropertyListParams),
    GetProperty(PropertyParams),
    GetPropertyInformation(PropertyParams),
    SetProperty(SetPropertyParams),
    ConnectToDevices(DevicesParams),
    DisconnectFromDevices(DevicesParams),
    /// Software reset: module registers return to their initial values and nvmem is reread.
    ResetDevices(DevicesParams),
    RenameDevice(RenameDeviceParams),
    ReserveDevices(ReserveDevicesParams),
    UnreserveDevices(DevicesParams),
    /// Applies pending dynamic property changes. Static properties apply when set.
    CommitProperties(DevicesParams),
}

impl Request {
    pub fn initialize(resources: Resources) -> Self {
        Self::Initialize(InitializeParams { resources })
    }

    pub fn close(session_id: impl Into<String>) -> Self {
        Self::Close(session(session_id))
    }

    pub fn abort(session_id: impl Into<String>) -> Self {
        Self::Abort(session(session_id))
    }

    pub fn get_session_property_list(session_id: impl Into<String>) -> Self {
        Self::GetSessionPropertyList(session(session_id))
    }

    pub fn get_device_property_list(
        session_id: impl Into<String>,
        device: impl Into<String>,
    ) -> Self {
        Self::GetDevicePropertyList(DevicePropertyListParams {
            session_id: session_id.into(),
            device: device.into(),
        })
    }

    pub fn get_property(
        session_id: impl Into<String>,
        property: impl Into<String>,
        resources: Resources,
    ) -> Self {
        Self::GetProperty(property_params(session_id, property, resources))
    }

    pub fn get_property_information(
        session_id: impl Into<String>,
        property: impl Into<String>,
        resources: Resources,
    ) -> Self {
        Self::GetPropertyInformation(property_params(session_id, property, resources))
    }

    pub fn set_property(
        session_id: impl Into<String>,
        property: impl Into<String>,
        resources: Resources,
        value: &PropertyValue,
    ) -> Self {
        Self::SetProperty(SetPropertyParams {
            resources,
            session_id: session_id.into(),
            property: property.into(),
            value: value.to_json(),
        })
    }

    pub fn connect_to_devices(session_id: impl Into<String>, devices: &str) -> Self {
        Self::ConnectToDevices(devices_params(session_id, devices))
    }

    pub fn disconnect_from_devices(session_id: impl Into<String>, devices: &str) -> Self {
        Self::DisconnectFromDevices(devices_params(session_id, devices))
    }

    pub fn reset_devices(session_id: impl Into<String>, devices: &str) -> Self {
        Self::ResetDevices(devices_params(session_id, devices))
    }

    pub fn rename_device(
        session_id: impl Into<String>,
        device: impl Into<String>,
        new_device_name: impl Into<String>,
    ) -> Self {
        Self::RenameDevice(RenameDeviceParams {
            session_id: session_id.into(),
            device: device.into(),
            new_device_name: new_device_name.into(),
        })
    }

    pub fn reserve_devices(
        session_id: impl Into<String>,
        devices: &str,
        options: &ReserveOptions,
    ) -> Self {
        Self::ReserveDevices(ReserveDevicesParams {
            session_id: session_id.into(),
            devices: split_list(devices),
            access: options.access,
            reservation_group: options.reservation_group.clone(),
            reservation_timeout: options.reservation_timeout,
        })
    }

    pub fn unreserve_devices(session_id: impl Into<String>, devices: &str) -> Self {
        Self::UnreserveDevices(devices_params(session_id, devices))
    }

    pub fn commit_properties(session_id: impl Into<String>, devices: &str) -> Self {
        Self::CommitProperties(devices_params(session_id, devices))
    }

    pub fn method(&self) -> &'static str {
        match self {
            Self::Initialize(_) => "initializeSession",
            Self::Close(_) => "closeSession",
            Self::Abort(_) => "abortSession",
            Self::GetSessionPropertyList(_) => "getSessionPropertyList",
            Self::GetDevicePropertyList(_) => "getDevicePropertyList",
            Self::GetProperty(_) => "getProperty",
            Self::GetPropertyInformation(_) => "getPropertyInformation",
            Self::SetProperty(_) => "setProperty",
            Self::ConnectToDevices(_) => "connectToDevices",
            Self::DisconnectFromDevices(_) => "disconnectFromDevices",
            Self::ResetDevices(_) => "resetDevices",
            Self::RenameDevice(_) => "renameDevice",
            Self::ReserveDevices(_) => "reserveDevices",
            Self::UnreserveDevices(_) => "unreserveDevices",
            Self::CommitProperties(_) => "commitProperties",
        }
    }

    /// Rebuilds a request from its wire method name and `params` object.
    pub fn from_parts(method: &str, params: Value) -> Result<Self, ClientError> {
        let request = match method {
            "initializeSession" => Self::Initialize(serde_json::from_value(params)?),
            "closeSession" => Self::Close(serde_json::from_value(params)?),
            "abortSession" => Self::Abort(serde_json::from_value(params)?),
            "getSessionPropertyList" => {
                Self::GetSessionPropertyList(serde_json::from_value(params)?)
            }
            "getDevicePropertyList" => Self::GetDevicePropertyList(serde_json::from_value(params)?),
            "getProperty" => Self::GetProperty(serde_json::from_value(params)?),
            "getPropertyInformation" => {
                Self::GetPropertyInformation(serde_json::from_value(params)?)
            }
            "setProperty" => Self::SetProperty(serde_json::from_value(params)?),
            "connectToDevices" => Self::ConnectToDevices(serde_json::from_value(params)?),
            "disconnectFromDevices" => Self::DisconnectFromDevices(serde_json::from_value(params)?),
            "resetDevices" => Self::ResetDevices(serde_json::from_value(params)?),
            "renameDevice" => Self::RenameDevice(serde_json::from_value(params)?),
            "reserveDevices" => Self::ReserveDevices(serde_json::from_value(params)?),
            "unreserveDevices" => Self::UnreserveDevices(serde_json::from_value(params)?),
            "commitProperties" => Self::CommitProperties(serde_json::from_value(params)?),
            other => return Err(ClientError::UnknownMethod(other.to_string())),
        };

        Ok(request)
    }

    /// The session this call targets, if it carries one.
    pub fn session_id(&self) -> Option<&str> {
        match self {
            Self::Initialize(_) => None,
            Self::Close(params) | Self::Abort(params) | Self::GetSessionPropertyList(params) => {
                Some(params.session_id.as_str())
            }
            Self::GetDevicePropertyList(params) => Some(params.session_id.as_str()),
            Self::GetProperty(params) | Self::GetPropertyInformation(params) => {
                Some(params.session_id.as_str())
            }
            Self::SetProperty(params) => Some(params.session_id.as_str()),
            Self::ConnectToDevices(params)
            | Self::DisconnectFromDevices(params)
            | Self::ResetDevices(params)
            | Self::UnreserveDevices(params)
            | Self::CommitProperties(params) => Some(params.session_id.as_str()),
            Self::RenameDevice(params) => Some(params.session_id.as_str()),
            Self::ReserveDevices(params) => Some(params.session_id.as_str()),
        }
    }
}

fn session(session_id: impl Into<String>) -> SessionParams {
    SessionParams {
        session_id: session_id.into(),
    }
}

fn property_params(
    session_id: impl Into<String>,
    property: impl Into<String>,
    resources: Resources,
) -> PropertyParams {
    PropertyParams {
        resources,
        session_id: session_id.into(),
        property: property.into(),
    }
}

fn devices_params(session_id: impl Into<String>, devices: &str) -> DevicesParams {
    DevicesParams {
        session_id: session_id.into(),
        devices: split_list(devices),
    }
}

/// Serializes only the parameter record of a request, keeping its field order.
struct Params<'a>(&'a Request);

impl Serialize for Params<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            Request::Initialize(params) => params.serialize(serializer),
            Request::Close(params)
            | Request::Abort(params)
            | Request::GetSessionPropertyList(params) => params.serialize(serializer),
            Request::GetDevicePropertyList(params) => params.serialize(serializer),
            Request::GetProperty(params) | Request::GetPropertyInformation(params) => {
                params.serialize(serializer)
            }
            Request::SetProperty(params) => params.serialize(serializer),
            Request::ConnectToDevices(params)
            | Request::DisconnectFromDevices(params)
            | Request::ResetDevices(params)
            | Request::UnreserveDevices(params)
            | Request::CommitProperties(params) => params.serialize(serializer),
            Request::RenameDevice(params) => params.serialize(serializer),
            Request::ReserveDevices(params) => params.serialize(serializer),
        }
    }
}

/// A request paired with its call id.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestEnvelope {
    pub id: u64,
    pub request: Request,
}

#[derive(Deserialize)]
struct RawEnvelope {
    id: Value,
    method: String,
    #[serde(default)]
    params: Value,
}

impl RequestEnvelope {
    pub fn new(id: u64, request: Request) -> Self {
        Self { id, request }
    }

    pub fn method(&self) -> &'static str {
        self.request.method()
    }

    /// Compact wire form sent as the HTTP body.
    pub fn to_wire(&self) -> Result<String, ClientError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn params_value(&self) -> Result<Value, ClientError> {
        Ok(serde_json::to_value(Params(&self.request))?)
    }

    /// Parses a wire envelope back into a typed request.
    pub fn parse(body: &[u8]) -> Result<Self, ClientError> {
        let raw: RawEnvelope = serde_json::from_slice(body)?;

        let id = match &raw.id {
            Value::String(text) => text.parse::<u64>().ok(),
            Value::Number(number) => number.as_u64(),
            _ => None,
        }
        .ok_or_else(|| ClientError::InvalidRequestId(raw.id.to_string()))?;

        let request = Request::from_parts(&raw.method, raw.params)?;
        Ok(Self { id, request })
    }
}

impl Serialize for RequestEnvelope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut envelope = serializer.serialize_struct("RequestEnvelope", 4)?;
        envelope.serialize_field("id", &self.id.to_string())?;
        envelope.serialize_field("jsonrpc", JSONRPC_VERSION)?;
        envelope.serialize_field("method", self.request.method())?;
        envelope.serialize_field("params", &Params(&self.request))?;
        envelope.end()
    }
}

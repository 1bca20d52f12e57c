//! Response parsers for the SLSC web service
//!
//! A response either carries an `error` object, in which case the result record is left at
//! its default, or a method-specific `result` object decoded once into an immutable record.

use std::fmt;

use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::domain::property::{PropertyDataType, PropertyValue};
use crate::errors::ClientError;

/// Error object of a failed JSON-RPC call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RpcError {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl RpcError {
    /// Accepts the standard object form; anything else is kept verbatim as the message.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Object(_) => serde_json::from_value(value.clone()).unwrap_or_else(|_| Self {
                message: value.to_string(),
                ..Self::default()
            }),
            Value::String(message) => Self {
                message: message.clone(),
                ..Self::default()
            },
            other => Self {
                message: other.to_string(),
                ..Self::default()
            },
        }
    }
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code {})", self.message, self.code)
    }
}

pub fn is_json_rpc_error(value: &Value) -> bool {
    value.get("error").is_some_and(|error| !error.is_null())
}

/// The chassis echoes the request id as a string; numeric ids are accepted too.
pub fn value_to_request_id(value: &Value) -> Option<String> {
    if let Some(string_id) = value.as_str() {
        return Some(string_id.to_string());
    }

    value.as_u64().map(|id| id.to_string())
}

#[derive(Debug, Clone, PartialEq)]
pub struct Response<T> {
    /// Same as the request id; absent when the server could not read the request.
    pub id: Option<String>,
    pub rpc_version: Option<String>,
    pub error: Option<RpcError>,
    pub result: T,
}

impl<T: DeserializeOwned + Default> Response<T> {
    pub fn from_value(data: &Value) -> Result<Self, ClientError> {
        let id = data.get("id").and_then(value_to_request_id);
        let rpc_version = data
            .get("jsonrpc")
            .and_then(Value::as_str)
            .map(str::to_string);

        if is_json_rpc_error(data) {
            return Ok(Self {
                id,
                rpc_version,
                error: data.get("error").map(RpcError::from_value),
                result: T::default(),
            });
        }

        let result = match data.get("result") {
            None | Some(Value::Null) => T::default(),
            Some(result) => T::deserialize(result)?,
        };

        Ok(Self {
            id,
            rpc_version,
            error: None,
            result,
        })
    }
}

impl<T> Response<T> {
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn into_result(self) -> Result<T, RpcError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.result),
        }
    }
}

/// Result of calls that return no data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenericResult;

impl<'de> Deserialize<'de> for GenericResult {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        IgnoredAny::deserialize(deserializer)?;
        Ok(Self)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct InitializeResult {
    pub session_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PropertyListResult {
    pub static_properties: Vec<String>,
    pub dynamic_properties: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SessionPropertyListResult {
    pub properties: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PropertyResult {
    /// Tag as sent, a name or a numeric code. Read it with [`PropertyResult::data_type`].
    #[serde(rename = "data_type")]
    pub raw_data_type: Option<Value>,
    pub value: Option<Value>,
}

impl PropertyResult {
    pub fn data_type(&self) -> Result<Option<PropertyDataType>, ClientError> {
        parse_tag(self.raw_data_type.as_ref())
    }

    /// `None` when the response carried no tag or no value.
    pub fn typed_value(&self) -> Result<Option<PropertyValue>, ClientError> {
        let Some(value) = self.value.as_ref() else {
            return Ok(None);
        };

        match self.data_type()? {
            Some(data_type) => data_type.decode(value).map(Some),
            None => Ok(None),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PropertyInformationResult {
    #[serde(rename = "data_type")]
    pub raw_data_type: Option<Value>,
    /// Remaining descriptive fields, kept as the chassis sent them.
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl PropertyInformationResult {
    pub fn data_type(&self) -> Result<Option<PropertyDataType>, ClientError> {
        parse_tag(self.raw_data_type.as_ref())
    }
}

// Tags are kept raw so a type this client does not know leaves the rest of the
// response readable.
fn parse_tag(tag: Option<&Value>) -> Result<Option<PropertyDataType>, ClientError> {
    match tag {
        None | Some(Value::Null) => Ok(None),
        Some(tag) => PropertyDataType::from_tag(tag).map(Some),
    }
}

pub type GenericResponse = Response<GenericResult>;
pub type InitializeResponse = Response<InitializeResult>;
pub type PropertyListResponse = Response<PropertyListResult>;
pub type SessionPropertyListResponse = Response<SessionPropertyListResult>;
pub type PropertyResponse = Response<PropertyResult>;
pub type PropertyInformationResponse = Response<PropertyInformationResult>;

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn initialize_reads_session_id() {
        let response = InitializeResponse::from_value(&json!({
            "id": "1",
            "jsonrpc": "2.0",
            "result": {"session_id": "_session3"}
        }))
        .expect("parse");

        assert!(!response.has_error());
        assert_eq!(response.id.as_deref(), Some("1"));
        assert_eq!(response.rpc_version.as_deref(), Some("2.0"));
        assert_eq!(response.result.session_id, "_session3");
    }

    #[test]
    fn error_leaves_results_at_defaults() {
        let response = PropertyListResponse::from_value(&json!({
            "id": "4",
            "jsonrpc": "2.0",
            "error": {"code": -32000, "message": "invalid session"},
            "result": {"static_properties": ["ignored"]}
        }))
        .expect("parse");

        assert!(response.has_error());
        assert_eq!(response.result, PropertyListResult::default());
        let error = response.into_result().expect_err("error response");
        assert_eq!(error.code, -32000);
        assert_eq!(error.message, "invalid session");
    }

    #[test]
    fn malformed_error_object_is_still_an_error() {
        let response = InitializeResponse::from_value(&json!({
            "id": "2",
            "error": "chassis busy",
            "result": {"session_id": 17}
        }))
        .expect("parse");

        assert!(response.has_error());
        assert_eq!(response.result.session_id, "");
        assert_eq!(
            response.error.as_ref().map(|error| error.message.as_str()),
            Some("chassis busy")
        );
    }

    #[test]
    fn null_error_is_success() {
        let response = SessionPropertyListResponse::from_value(&json!({
            "id": 7,
            "jsonrpc": "2.0",
            "error": null,
            "result": {"properties": ["Session.Timeout"]}
        }))
        .expect("parse");

        assert!(!response.has_error());
        assert_eq!(response.id.as_deref(), Some("7"));
        assert_eq!(response.result.properties, vec!["Session.Timeout"]);
    }

    #[test]
    fn missing_result_defaults() {
        let response = GenericResponse::from_value(&json!({"id": "3", "jsonrpc": "2.0"}))
            .expect("parse");
        assert!(!response.has_error());
        assert_eq!(response.result, GenericResult);

        let response = PropertyListResponse::from_value(&json!({
            "id": "3",
            "result": {"dynamic_properties": ["Relay.State"]}
        }))
        .expect("parse");
        assert!(response.result.static_properties.is_empty());
        assert_eq!(response.result.dynamic_properties, vec!["Relay.State"]);
    }

    #[test]
    fn wrong_result_shape_is_a_decode_error() {
        let err = SessionPropertyListResponse::from_value(&json!({
            "id": "3",
            "result": {"properties": "Session.Timeout"}
        }))
        .expect_err("expected decode error");
        assert!(matches!(err, ClientError::Decode(_)));
        assert!(!err.is_transport());
    }

    #[test]
    fn property_value_is_typed_by_tag() {
        let response = PropertyResponse::from_value(&json!({
            "id": "5",
            "jsonrpc": "2.0",
            "result": {"data_type": "StringArray", "value": ["Mod1", "Mod2"]}
        }))
        .expect("parse");

        assert_eq!(
            response.result.data_type().expect("tag"),
            Some(PropertyDataType::StringArray)
        );
        assert_eq!(
            response.result.typed_value().expect("decode"),
            Some(PropertyValue::StringArray(vec![
                "Mod1".to_string(),
                "Mod2".to_string()
            ]))
        );
    }

    #[test]
    fn property_error_has_no_value() {
        let response = PropertyResponse::from_value(&json!({
            "id": "5",
            "error": {"code": 1, "message": "unknown property"}
        }))
        .expect("parse");

        assert_eq!(response.result.raw_data_type, None);
        assert_eq!(response.result.data_type().expect("no tag"), None);
        assert_eq!(response.result.value, None);
        assert_eq!(response.result.typed_value().expect("no value"), None);
    }

    #[test]
    fn property_information_keeps_details() {
        let response = PropertyInformationResponse::from_value(&json!({
            "id": "6",
            "result": {"data_type": 2, "dynamic": true, "units": "V"}
        }))
        .expect("parse");

        assert_eq!(
            response.result.data_type().expect("tag"),
            Some(PropertyDataType::Double)
        );
        assert_eq!(response.result.details.get("dynamic"), Some(&json!(true)));
        assert_eq!(response.result.details.get("units"), Some(&json!("V")));
        assert!(!response.result.details.contains_key("data_type"));
    }

    #[test]
    fn unknown_data_type_keeps_the_response() {
        let response = PropertyResponse::from_value(&json!({
            "id": "7",
            "jsonrpc": "2.0",
            "result": {"data_type": "I32", "value": 5}
        }))
        .expect("parse");

        assert_eq!(response.id.as_deref(), Some("7"));
        assert!(!response.has_error());
        assert_eq!(response.result.raw_data_type, Some(json!("I32")));
        assert_eq!(response.result.value, Some(json!(5)));

        let err = response.result.typed_value().expect_err("unknown tag");
        assert!(matches!(err, ClientError::UnknownDataType(tag) if tag == "I32"));
    }

    #[test]
    fn unknown_information_tag_keeps_details() {
        let response = PropertyInformationResponse::from_value(&json!({
            "id": "8",
            "result": {"data_type": 99, "units": "A"}
        }))
        .expect("parse");

        assert_eq!(response.result.raw_data_type, Some(json!(99)));
        assert_eq!(response.result.details.get("units"), Some(&json!("A")));
        assert!(response.result.data_type().is_err());
    }
}

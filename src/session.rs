//! Session lifecycle against an SLSC chassis
//!
//! A [`Session`] owns the server-assigned session id, a call-id counter starting at 1, and
//! the resource list it was opened with, which is the default target of later calls.
//!
//! ```text
//! Uninitialized --initialize--> Initialized --close--> Closed --initialize--> Initialized
//!                                    |                   ^
//!                                    +--abort--> Aborted-+ (close)
//! ```
//!
//! A session is not synchronized; callers sharing one across threads must serialize access.

use std::fmt;

use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::config::ClientConfig;
use crate::domain::property::PropertyValue;
use crate::domain::resources::{ResourceKind, Resources};
use crate::errors::ClientError;
use crate::rpc::request::{Request, RequestEnvelope, ReserveOptions};
use crate::rpc::response::{
    GenericResponse, InitializeResponse, PropertyInformationResponse, PropertyListResponse,
    PropertyResponse, Response, SessionPropertyListResponse,
};
use crate::transport::{HttpTransport, Transport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Initialized,
    Aborted,
    Closed,
}

impl SessionState {
    /// Whether the server still holds a handle for this session.
    pub fn is_open(self) -> bool {
        matches!(self, Self::Initialized | Self::Aborted)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uninitialized => "uninitialized",
            Self::Initialized => "initialized",
            Self::Aborted => "aborted",
            Self::Closed => "closed",
        };
        f.write_str(name)
    }
}

pub struct Session {
    transport: Box<dyn Transport>,
    kind: ResourceKind,
    resources: String,
    session_id: String,
    last_id: u64,
    state: SessionState,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("transport", &self.transport.transport_type())
            .field("kind", &self.kind)
            .field("resources", &self.resources)
            .field("session_id", &self.session_id)
            .field("last_id", &self.last_id)
            .field("state", &self.state)
            .finish()
    }
}

impl Session {
    /// A session that has not talked to the chassis yet.
    pub fn new(
        transport: Box<dyn Transport>,
        kind: ResourceKind,
        resources: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            kind,
            resources: resources.into(),
            session_id: String::new(),
            last_id: 0,
            state: SessionState::Uninitialized,
        }
    }

    /// Creates and initializes a session; a rejected initialize becomes `ClientError::Rpc`.
    pub fn open(
        transport: Box<dyn Transport>,
        kind: ResourceKind,
        resources: impl Into<String>,
    ) -> Result<Self, ClientError> {
        let mut session = Self::new(transport, kind, resources);
        let response = session.initialize()?;

        match response.error {
            Some(error) => Err(ClientError::rpc("initializeSession", error)),
            None => Ok(session),
        }
    }

    /// Opens a session over HTTP to the chassis named in `config`.
    pub fn connect_http(
        config: &ClientConfig,
        kind: ResourceKind,
        resources: impl Into<String>,
    ) -> Result<Self, ClientError> {
        let transport = HttpTransport::new(config)?;
        Self::open(Box::new(transport), kind, resources)
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn resources(&self) -> &str {
        &self.resources
    }

    /// Id of the most recent call, 0 before the first one.
    pub fn last_call_id(&self) -> u64 {
        self.last_id
    }

    /// Starts a server-side session for the resources this session was created with.
    /// Allowed before the first initialize and after a close.
    pub fn initialize(&mut self) -> Result<InitializeResponse, ClientError> {
        if !matches!(
            self.state,
            SessionState::Uninitialized | SessionState::Closed
        ) {
            return Err(ClientError::invalid_state("initialize", self.state));
        }

        let request = Request::initialize(Resources::new(self.kind, &self.resources));
        let response: InitializeResponse = self.query(request)?;

        if !response.has_error() {
            self.session_id = response.result.session_id.clone();
            self.state = SessionState::Initialized;
            info!(
                session_id = %self.session_id,
                resources = %self.resources,
                kind = %self.kind,
                "session initialized"
            );
        }

        Ok(response)
    }

    /// Releases the server-side session. Also the only way out of `Aborted`.
    pub fn close(&mut self) -> Result<GenericResponse, ClientError> {
        self.ensure_open("close")?;

        let response: GenericResponse = self.query(Request::close(self.session_id.clone()))?;

        if !response.has_error() {
            info!(session_id = %self.session_id, "session closed");
            self.state = SessionState::Closed;
        }

        Ok(response)
    }

    /// Cancels a call that blocks network communication.
    ///
    /// The handle stays valid, but calls that use the network fail until the session is
    /// closed and initialized again.
    pub fn abort(&mut self) -> Result<GenericResponse, ClientError> {
        if self.state != SessionState::Initialized {
            return Err(ClientError::invalid_state("abort", self.state));
        }

        let response: GenericResponse = self.query(Request::abort(self.session_id.clone()))?;

        if !response.has_error() {
            warn!(session_id = %self.session_id, "session aborted");
            self.state = SessionState::Aborted;
        }

        Ok(response)
    }

    /// Connects to devices; defaults to the session resources.
    pub fn connect(&mut self, devices: Option<&str>) -> Result<GenericResponse, ClientError> {
        self.ensure_open("connect")?;
        let request = Request::connect_to_devices(self.session_id.clone(), self.or_session(devices));
        self.query(request)
    }

    /// Disconnects from devices; defaults to the session resources.
    pub fn disconnect(&mut self, devices: Option<&str>) -> Result<GenericResponse, ClientError> {
        self.ensure_open("disconnect")?;
        let request =
            Request::disconnect_from_devices(self.session_id.clone(), self.or_session(devices));
        self.query(request)
    }

    pub fn get_session_properties(&mut self) -> Result<SessionPropertyListResponse, ClientError> {
        self.ensure_open("get session properties")?;
        self.query(Request::get_session_property_list(self.session_id.clone()))
    }

    /// Lists the static and dynamic properties of one resource, by default the first
    /// resource of the session.
    pub fn get_property_list(
        &mut self,
        resource: Option<&str>,
    ) -> Result<PropertyListResponse, ClientError> {
        self.ensure_open("get property list")?;

        let resource = match resource {
            Some(resource) => resource.to_string(),
            None => first_resource(&self.resources).to_string(),
        };

        self.query(Request::get_device_property_list(
            self.session_id.clone(),
            resource,
        ))
    }

    pub fn get_property(
        &mut self,
        property: &str,
        resources: Option<&str>,
    ) -> Result<PropertyResponse, ClientError> {
        self.ensure_open("get property")?;
        let resources = self.resource_selector(resources);
        self.query(Request::get_property(
            self.session_id.clone(),
            property,
            resources,
        ))
    }

    pub fn get_property_information(
        &mut self,
        property: &str,
        resources: Option<&str>,
    ) -> Result<PropertyInformationResponse, ClientError> {
        self.ensure_open("get property information")?;
        let resources = self.resource_selector(resources);
        self.query(Request::get_property_information(
            self.session_id.clone(),
            property,
            resources,
        ))
    }

    /// Static properties take effect at once; dynamic ones need [`Session::commit_properties`].
    pub fn set_property(
        &mut self,
        property: &str,
        value: impl Into<PropertyValue>,
        resources: Option<&str>,
    ) -> Result<GenericResponse, ClientError> {
        self.ensure_open("set property")?;
        let resources = self.resource_selector(resources);
        let value = value.into();
        self.query(Request::set_property(
            self.session_id.clone(),
            property,
            resources,
            &value,
        ))
    }

    pub fn rename_device(
        &mut self,
        device: &str,
        new_name: &str,
    ) -> Result<GenericResponse, ClientError> {
        self.ensure_open("rename device")?;
        self.query(Request::rename_device(
            self.session_id.clone(),
            device,
            new_name,
        ))
    }

    /// Reserves devices so other sessions cannot use them. A device must be reserved
    /// before it is used.
    pub fn reserve_devices(
        &mut self,
        devices: Option<&str>,
        options: &ReserveOptions,
    ) -> Result<GenericResponse, ClientError> {
        self.ensure_open("reserve devices")?;
        let request =
            Request::reserve_devices(self.session_id.clone(), self.or_session(devices), options);
        self.query(request)
    }

    /// Resets devices to their default state. Naming a chassis resets all of its modules.
    pub fn reset_devices(&mut self, devices: Option<&str>) -> Result<GenericResponse, ClientError> {
        self.ensure_open("reset devices")?;
        let request = Request::reset_devices(self.session_id.clone(), self.or_session(devices));
        self.query(request)
    }

    pub fn unreserve_devices(
        &mut self,
        devices: Option<&str>,
    ) -> Result<GenericResponse, ClientError> {
        self.ensure_open("unreserve devices")?;
        let request = Request::unreserve_devices(self.session_id.clone(), self.or_session(devices));
        self.query(request)
    }

    /// Pushes pending property changes to the hardware. Only the last value set for a
    /// property is committed.
    pub fn commit_properties(
        &mut self,
        devices: Option<&str>,
    ) -> Result<GenericResponse, ClientError> {
        self.ensure_open("commit properties")?;
        let request = Request::commit_properties(self.session_id.clone(), self.or_session(devices));
        self.query(request)
    }

    fn next_id(&mut self) -> u64 {
        self.last_id += 1;
        self.last_id
    }

    fn query<T>(&mut self, request: Request) -> Result<Response<T>, ClientError>
    where
        T: DeserializeOwned + Default,
    {
        let envelope = RequestEnvelope::new(self.next_id(), request);
        let reply = self.transport.call(&envelope)?;
        Response::from_value(&reply)
    }

    fn ensure_open(&self, operation: &'static str) -> Result<(), ClientError> {
        if self.state.is_open() {
            Ok(())
        } else {
            Err(ClientError::invalid_state(operation, self.state))
        }
    }

    fn or_session<'a>(&'a self, devices: Option<&'a str>) -> &'a str {
        devices.unwrap_or(&self.resources)
    }

    fn resource_selector(&self, resources: Option<&str>) -> Resources {
        Resources::new(self.kind, self.or_session(resources))
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if !self.state.is_open() {
            return;
        }

        match self.close() {
            Ok(response) if response.has_error() => warn!(
                session_id = %self.session_id,
                error = ?response.error,
                "chassis refused to close session on drop"
            ),
            Ok(_) => {}
            Err(err) => warn!(
                session_id = %self.session_id,
                error = %err,
                "failed to close session on drop"
            ),
        }
    }
}

fn first_resource(resources: &str) -> &str {
    resources.split(',').next().unwrap_or(resources)
}

/// Closes a session by id, e.g. one leaked by another client. Uses call id 1.
pub fn close_session_by_id(
    transport: &mut dyn Transport,
    session_id: &str,
) -> Result<GenericResponse, ClientError> {
    let envelope = RequestEnvelope::new(1, Request::close(session_id));
    let reply = transport.call(&envelope)?;
    Response::from_value(&reply)
}

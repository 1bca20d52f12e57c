//! Resource selectors shared by requests and sessions

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::ClientError;

/// Which family of resources a session or call addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Devices,
    PhysicalChannels,
    NvmemAreas,
}

impl ResourceKind {
    pub fn param_name(self) -> &'static str {
        match self {
            Self::Devices => "devices",
            Self::PhysicalChannels => "physical_channels",
            Self::NvmemAreas => "nvmem_areas",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.param_name())
    }
}

/// Exactly one resource list, serialized as a single `<kind>: [..]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resources {
    Devices(Vec<String>),
    PhysicalChannels(Vec<String>),
    NvmemAreas(Vec<String>),
}

impl Resources {
    pub fn new(kind: ResourceKind, list: &str) -> Self {
        let names = split_list(list);
        match kind {
            ResourceKind::Devices => Self::Devices(names),
            ResourceKind::PhysicalChannels => Self::PhysicalChannels(names),
            ResourceKind::NvmemAreas => Self::NvmemAreas(names),
        }
    }

    /// Picks the first list present, in the order devices, physical channels,
    /// nvmem areas.
    pub fn from_optional(
        devices: Option<&str>,
        physical_channels: Option<&str>,
        nvmem_areas: Option<&str>,
    ) -> Result<Self, ClientError> {
        if let Some(list) = devices {
            return Ok(Self::new(ResourceKind::Devices, list));
        }
        if let Some(list) = physical_channels {
            return Ok(Self::new(ResourceKind::PhysicalChannels, list));
        }
        if let Some(list) = nvmem_areas {
            return Ok(Self::new(ResourceKind::NvmemAreas, list));
        }

        Err(ClientError::MissingResources)
    }

    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::Devices(_) => ResourceKind::Devices,
            Self::PhysicalChannels(_) => ResourceKind::PhysicalChannels,
            Self::NvmemAreas(_) => ResourceKind::NvmemAreas,
        }
    }
}

/// Splits on commas only. Surrounding whitespace is part of the name, so
/// `"a, b"` yields `["a", " b"]`.
pub fn split_list(list: &str) -> Vec<String> {
    list.split(',').map(str::to_string).collect()
}

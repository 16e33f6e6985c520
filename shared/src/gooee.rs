//! Gooee cloud API client.
//!
//! [`VendorApi`] is the capability surface the handlers program against;
//! [`GooeeClient`] is the real HTTP implementation. The client classifies
//! failures but never retries; retry policy belongs to the handlers.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::Config;
use crate::error::VendorError;

/// One device as returned by the Gooee device listing.
#[derive(Debug, Clone, Deserialize)]
pub struct VendorDevice {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub meta: Vec<MetaEntry>,
}

/// A Gooee meta name/value pair.
#[derive(Debug, Clone, Deserialize)]
pub struct MetaEntry {
    pub name: String,
    #[serde(default)]
    pub value: Value,
}

impl VendorDevice {
    /// A device is dimmable when it reports a `dim` meta entry.
    pub fn is_dimmable(&self) -> bool {
        self.meta.iter().any(|m| m.name == "dim")
    }
}

/// Point-in-time state of one device, decoded from Gooee meta values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorState {
    pub onoff: bool,
    /// Present only for dimmable devices.
    pub dim: Option<u8>,
    pub is_online: bool,
}

impl VendorState {
    fn from_meta(meta: &[MetaEntry]) -> Result<Self, VendorError> {
        let find = |name: &str| meta.iter().find(|m| m.name == name).map(|m| &m.value);

        let onoff = find("onoff")
            .and_then(Value::as_bool)
            .ok_or_else(|| VendorError::MalformedResponse("missing onoff meta".to_string()))?;
        let dim = find("dim")
            .and_then(Value::as_u64)
            .map(|v| v.min(100) as u8);
        let is_online = find("is_online").and_then(Value::as_bool).unwrap_or(true);

        Ok(Self {
            onoff,
            dim,
            is_online,
        })
    }
}

/// One property write against a device, expressed as a Gooee action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VendorCommand {
    OnOff(bool),
    /// Absolute dim level, 0-100.
    Dim(u8),
    /// Relative dim adjustment, -100..=100.
    DimAdjust(i16),
}

impl VendorCommand {
    fn action_body(&self, device_id: &str) -> Value {
        match self {
            VendorCommand::OnOff(on) => {
                let value = if *on { "ON" } else { "OFF" };
                json!({
                    "name": format!("Alexa {} request", value),
                    "type": value.to_lowercase(),
                    "value": {"transition_time": 2},
                    "device": device_id,
                })
            }
            VendorCommand::Dim(level) => json!({
                "name": "Alexa brightness request",
                "type": "dim",
                "value": {"level": level, "transition_time": 1},
                "device": device_id,
            }),
            VendorCommand::DimAdjust(delta) => json!({
                "name": "Alexa brightnessDelta request",
                "type": "adjust",
                "value": {"delta": delta, "transition_time": 1},
                "device": device_id,
            }),
        }
    }
}

/// Capability surface of the lighting vendor. No internal retries.
#[async_trait]
pub trait VendorApi: Send + Sync {
    async fn list_devices(&self, token: &str) -> Result<Vec<VendorDevice>, VendorError>;

    async fn device_state(&self, token: &str, device_id: &str)
        -> Result<VendorState, VendorError>;

    async fn set_device_property(
        &self,
        token: &str,
        device_id: &str,
        command: VendorCommand,
    ) -> Result<VendorState, VendorError>;
}

/// Device document shape shared by state reads and action responses.
#[derive(Debug, Deserialize)]
struct DeviceDocument {
    #[serde(default)]
    meta: Vec<MetaEntry>,
}

pub struct GooeeClient {
    http: reqwest::Client,
    api_url: String,
}

impl GooeeClient {
    pub fn new(config: &Config, http: reqwest::Client) -> Self {
        Self {
            http,
            api_url: config.api_url.clone(),
        }
    }

    /// Gooee answers 400 on the actions path both for unknown devices
    /// ("Device or Space not found") and for rejected values; the detail
    /// text is the only way to tell them apart, and unknown-device is the
    /// common case.
    fn classify_action_rejection(device_id: &str, detail: &str) -> VendorError {
        let lowered = detail.to_lowercase();
        if ["level", "value", "delta", "range"]
            .iter()
            .any(|k| lowered.contains(k))
        {
            VendorError::ValueRejected(detail.to_string())
        } else {
            VendorError::DeviceNotFound(device_id.to_string())
        }
    }

    fn classify_status(status: StatusCode, device_id: Option<&str>) -> Option<VendorError> {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Some(VendorError::AuthRejected),
            StatusCode::NOT_FOUND => Some(VendorError::DeviceNotFound(
                device_id.unwrap_or("unknown").to_string(),
            )),
            s if s.is_success() => None,
            s => Some(VendorError::Unreachable(format!("vendor returned {}", s))),
        }
    }

    async fn get(&self, path: &str, token: &str) -> Result<reqwest::Response, VendorError> {
        debug!(path, "GET vendor request");
        self.http
            .get(format!("{}{}", self.api_url, path))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| VendorError::Unreachable(e.to_string()))
    }
}

#[async_trait]
impl VendorApi for GooeeClient {
    async fn list_devices(&self, token: &str) -> Result<Vec<VendorDevice>, VendorError> {
        let response = self
            .get(
                "/devices/?_include=id,name,description,meta&type__in=wim,bulb",
                token,
            )
            .await?;

        if let Some(err) = Self::classify_status(response.status(), None) {
            return Err(err);
        }
        response
            .json()
            .await
            .map_err(|e| VendorError::MalformedResponse(e.to_string()))
    }

    async fn device_state(
        &self,
        token: &str,
        device_id: &str,
    ) -> Result<VendorState, VendorError> {
        let response = self.get(&format!("/devices/{}", device_id), token).await?;

        let status = response.status();
        // Gooee answers a bad device id on this path with 400 as well as 404.
        if status == StatusCode::BAD_REQUEST {
            return Err(VendorError::DeviceNotFound(device_id.to_string()));
        }
        if let Some(err) = Self::classify_status(status, Some(device_id)) {
            return Err(err);
        }

        let document: DeviceDocument = response
            .json()
            .await
            .map_err(|e| VendorError::MalformedResponse(e.to_string()))?;
        VendorState::from_meta(&document.meta)
    }

    async fn set_device_property(
        &self,
        token: &str,
        device_id: &str,
        command: VendorCommand,
    ) -> Result<VendorState, VendorError> {
        let body = command.action_body(device_id);
        debug!(device_id, ?command, "POST vendor action");

        let response = self
            .http
            .post(format!("{}/actions", self.api_url))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|e| VendorError::Unreachable(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::BAD_REQUEST {
            let detail = response.text().await.unwrap_or_default();
            return Err(Self::classify_action_rejection(device_id, &detail));
        }
        if let Some(err) = Self::classify_status(status, Some(device_id)) {
            return Err(err);
        }

        // The action response echoes the device document with its updated
        // meta values.
        let document: DeviceDocument = response
            .json()
            .await
            .map_err(|e| VendorError::MalformedResponse(e.to_string()))?;
        VendorState::from_meta(&document.meta)
    }
}

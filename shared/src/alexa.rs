//! Alexa Smart Home v3 envelope types.
//!
//! Inbound directives are deserialized from the raw Lambda event; outbound
//! envelopes are built through [`crate::respond`] and serialized back.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The only payload version this skill speaks.
pub const PAYLOAD_VERSION: &str = "3";

/// Inbound event wrapper: `{"directive": {...}}`.
#[derive(Debug, Deserialize)]
pub struct DirectiveEnvelope {
    pub directive: Directive,
}

/// One user intent; immutable unit of work for one invocation.
#[derive(Debug, Deserialize)]
pub struct Directive {
    pub header: Header,
    #[serde(default)]
    pub endpoint: Option<Endpoint>,
    #[serde(default)]
    pub payload: Value,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Header {
    pub namespace: String,
    pub name: String,
    pub message_id: String,
    #[serde(default)]
    pub correlation_token: Option<String>,
    pub payload_version: String,
}

/// The device a directive targets.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    pub endpoint_id: String,
    #[serde(default)]
    pub scope: Option<Scope>,
}

#[derive(Debug, Deserialize)]
pub struct Scope {
    #[serde(rename = "type", default)]
    pub scope_type: Option<String>,
    pub token: String,
}

/// Outbound envelope: `{"context": {...}, "event": {...}}`.
#[derive(Debug, Serialize)]
pub struct ResponseEnvelope {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Context>,
    pub event: Event,
}

#[derive(Debug, Serialize)]
pub struct Context {
    pub properties: Vec<Property>,
}

/// One reported property in the response context.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub namespace: String,
    pub name: String,
    pub value: Value,
    pub time_of_sample: String,
    pub uncertainty_in_milliseconds: u32,
}

#[derive(Debug, Serialize)]
pub struct Event {
    pub header: ResponseHeader,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<ResponseEndpoint>,
    pub payload: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseHeader {
    pub namespace: String,
    pub name: String,
    pub message_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_token: Option<String>,
    pub payload_version: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEndpoint {
    pub endpoint_id: String,
}

/// One controllable light as advertised in `Discover.Response`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveredEndpoint {
    pub endpoint_id: String,
    pub manufacturer_name: String,
    pub friendly_name: String,
    pub description: String,
    pub display_categories: Vec<String>,
    pub capabilities: Vec<CapabilityDecl>,
}

/// A declared Alexa interface on a discovered endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityDecl {
    #[serde(rename = "type")]
    pub capability_type: String,
    pub interface: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<CapabilityProperties>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityProperties {
    pub supported: Vec<SupportedProperty>,
    pub proactively_reported: bool,
    pub retrievable: bool,
}

#[derive(Debug, Serialize)]
pub struct SupportedProperty {
    pub name: String,
}

impl CapabilityDecl {
    /// The bare `Alexa` interface every endpoint declares.
    pub fn base() -> Self {
        Self {
            capability_type: "AlexaInterface".to_string(),
            interface: "Alexa".to_string(),
            version: PAYLOAD_VERSION.to_string(),
            properties: None,
        }
    }

    /// An interface with one retrievable, non-proactive property.
    pub fn retrievable(interface: &str, property: &str) -> Self {
        Self {
            capability_type: "AlexaInterface".to_string(),
            interface: interface.to_string(),
            version: PAYLOAD_VERSION.to_string(),
            properties: Some(CapabilityProperties {
                supported: vec![SupportedProperty {
                    name: property.to_string(),
                }],
                proactively_reported: false,
                retrievable: true,
            }),
        }
    }
}

//! Constructs Alexa response and error envelopes.
//!
//! Every envelope leaving the skill is built here, which keeps the shape in
//! one place: fresh messageId per response, correlationToken echoed verbatim
//! when present, endpointId echoed when the directive carried one.

use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::alexa::{
    Context, Directive, DiscoveredEndpoint, Event, Property, ResponseEndpoint, ResponseEnvelope,
    ResponseHeader, PAYLOAD_VERSION,
};
use crate::error::ErrorType;

/// The Gooee API offers no sub-second freshness guarantee, so every reported
/// property carries this fixed uncertainty.
pub const UNCERTAINTY_MS: u32 = 500;

fn fresh_message_id() -> String {
    Uuid::new_v4().to_string()
}

fn time_of_sample() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S.00Z").to_string()
}

fn header(namespace: &str, name: &str, correlation_token: Option<String>) -> ResponseHeader {
    ResponseHeader {
        namespace: namespace.to_string(),
        name: name.to_string(),
        message_id: fresh_message_id(),
        correlation_token,
        payload_version: PAYLOAD_VERSION.to_string(),
    }
}

fn echo_endpoint(directive: &Directive) -> Option<ResponseEndpoint> {
    directive.endpoint.as_ref().map(|endpoint| ResponseEndpoint {
        endpoint_id: endpoint.endpoint_id.clone(),
    })
}

/// A context property sampled now.
pub fn property(namespace: &str, name: &str, value: Value) -> Property {
    Property {
        namespace: namespace.to_string(),
        name: name.to_string(),
        value,
        time_of_sample: time_of_sample(),
        uncertainty_in_milliseconds: UNCERTAINTY_MS,
    }
}

fn with_context(directive: &Directive, name: &str, properties: Vec<Property>) -> ResponseEnvelope {
    ResponseEnvelope {
        context: Some(Context { properties }),
        event: Event {
            header: header("Alexa", name, directive.header.correlation_token.clone()),
            endpoint: echo_endpoint(directive),
            payload: json!({}),
        },
    }
}

/// Standard `Alexa`/`Response` for a completed control directive.
pub fn success(directive: &Directive, properties: Vec<Property>) -> ResponseEnvelope {
    with_context(directive, "Response", properties)
}

/// `Alexa`/`StateReport` answering a `ReportState` directive.
pub fn state_report(directive: &Directive, properties: Vec<Property>) -> ResponseEnvelope {
    with_context(directive, "StateReport", properties)
}

/// `Alexa.Discovery`/`Discover.Response` carrying the endpoint list
/// (an empty list is a valid response, not an error).
pub fn discover_response(
    directive: &Directive,
    endpoints: Vec<DiscoveredEndpoint>,
) -> ResponseEnvelope {
    ResponseEnvelope {
        context: None,
        event: Event {
            header: header(
                "Alexa.Discovery",
                "Discover.Response",
                directive.header.correlation_token.clone(),
            ),
            endpoint: None,
            payload: json!({ "endpoints": endpoints }),
        },
    }
}

/// `Alexa.Authorization`/`AcceptGrant.Response` acknowledging a grant.
pub fn accept_grant_response(directive: &Directive) -> ResponseEnvelope {
    ResponseEnvelope {
        context: None,
        event: Event {
            header: header(
                "Alexa.Authorization",
                "AcceptGrant.Response",
                directive.header.correlation_token.clone(),
            ),
            endpoint: None,
            payload: json!({}),
        },
    }
}

/// `Alexa`/`ErrorResponse`. `directive` is `None` only when the inbound
/// envelope could not be parsed at all.
pub fn error(
    directive: Option<&Directive>,
    error_type: ErrorType,
    message: impl Into<String>,
) -> ResponseEnvelope {
    ResponseEnvelope {
        context: None,
        event: Event {
            header: header(
                "Alexa",
                "ErrorResponse",
                directive.and_then(|d| d.header.correlation_token.clone()),
            ),
            endpoint: directive.and_then(echo_endpoint),
            payload: json!({
                "type": error_type.as_str(),
                "message": message.into(),
            }),
        },
    }
}

//! Directive routing: one inbound envelope in, exactly one outbound
//! envelope out, no matter what fails along the way.

use std::sync::Arc;

use serde_json::Value;
use tracing::{error, info, warn};

use crate::alexa::{DirectiveEnvelope, Header, ResponseEnvelope, PAYLOAD_VERSION};
use crate::error::{ErrorType, HandlerError, VendorError};
use crate::gooee::{VendorApi, VendorCommand, VendorState};
use crate::token::TokenProvider;
use crate::{brightness, discovery, power, respond, state_report};

/// Supported (namespace, name) pairs, statically enumerated so dispatch is
/// exhaustive and unknown directives fall into one well-defined arm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectiveKind {
    Discover,
    AcceptGrant,
    ReportState,
    TurnOn,
    TurnOff,
    SetBrightness,
    AdjustBrightness,
    Unsupported { namespace: String, name: String },
}

impl DirectiveKind {
    pub fn from_header(header: &Header) -> Self {
        match (header.namespace.as_str(), header.name.as_str()) {
            ("Alexa.Discovery", "Discover") => Self::Discover,
            ("Alexa.Authorization", "AcceptGrant") => Self::AcceptGrant,
            ("Alexa", "ReportState") => Self::ReportState,
            ("Alexa.PowerController", "TurnOn") => Self::TurnOn,
            ("Alexa.PowerController", "TurnOff") => Self::TurnOff,
            ("Alexa.BrightnessController", "SetBrightness") => Self::SetBrightness,
            ("Alexa.BrightnessController", "AdjustBrightness") => Self::AdjustBrightness,
            (namespace, name) => Self::Unsupported {
                namespace: namespace.to_string(),
                name: name.to_string(),
            },
        }
    }
}

/// The directive engine. Owns the vendor client and token provider; both are
/// injected so tests can substitute deterministic fakes.
pub struct Skill {
    pub(crate) vendor: Arc<dyn VendorApi>,
    pub(crate) tokens: Arc<dyn TokenProvider>,
}

impl Skill {
    pub fn new(vendor: Arc<dyn VendorApi>, tokens: Arc<dyn TokenProvider>) -> Self {
        Self { vendor, tokens }
    }

    /// Entry point: parse, validate, dispatch. Every failure becomes an
    /// `ErrorResponse` envelope; nothing propagates past this boundary.
    pub async fn handle(&self, raw: Value) -> ResponseEnvelope {
        let envelope: DirectiveEnvelope = match serde_json::from_value(raw) {
            Ok(envelope) => envelope,
            Err(err) => {
                error!(error = %err, "failed to parse directive envelope");
                return respond::error(
                    None,
                    ErrorType::InternalError,
                    "malformed directive envelope",
                );
            }
        };
        let directive = envelope.directive;
        info!(
            namespace = %directive.header.namespace,
            name = %directive.header.name,
            message_id = %directive.header.message_id,
            "handling directive"
        );

        if directive.header.payload_version != PAYLOAD_VERSION {
            return respond::error(
                Some(&directive),
                ErrorType::InternalError,
                format!(
                    "unsupported payloadVersion {}",
                    directive.header.payload_version
                ),
            );
        }

        let result = match DirectiveKind::from_header(&directive.header) {
            DirectiveKind::Discover => discovery::handle(self, &directive).await,
            DirectiveKind::AcceptGrant => Ok(respond::accept_grant_response(&directive)),
            DirectiveKind::ReportState => state_report::handle(self, &directive).await,
            DirectiveKind::TurnOn => power::handle(self, &directive, true).await,
            DirectiveKind::TurnOff => power::handle(self, &directive, false).await,
            DirectiveKind::SetBrightness => brightness::set(self, &directive).await,
            DirectiveKind::AdjustBrightness => brightness::adjust(self, &directive).await,
            DirectiveKind::Unsupported { namespace, name } => Err(HandlerError::new(
                ErrorType::InvalidDirective,
                format!("no handler for {}::{}", namespace, name),
            )),
        };

        match result {
            Ok(response) => response,
            Err(err) => {
                warn!(
                    error_type = err.error_type.as_str(),
                    message = %err.message,
                    "directive failed"
                );
                respond::error(Some(&directive), err.error_type, err.message)
            }
        }
    }

    /// Vendor write with the one-shot auth recovery: if the vendor rejects
    /// the credentials, refresh the token once and retry once.
    pub(crate) async fn set_property(
        &self,
        device_id: &str,
        command: VendorCommand,
    ) -> Result<VendorState, HandlerError> {
        let token = self.tokens.access_token().await?;
        match self
            .vendor
            .set_device_property(&token, device_id, command.clone())
            .await
        {
            Err(VendorError::AuthRejected) => {
                info!("vendor rejected access token, refreshing and retrying once");
                let token = self.tokens.refresh().await?;
                Ok(self
                    .vendor
                    .set_device_property(&token, device_id, command)
                    .await?)
            }
            other => Ok(other?),
        }
    }

    /// Vendor read with the same one-shot auth recovery.
    pub(crate) async fn state_of(&self, device_id: &str) -> Result<VendorState, HandlerError> {
        let token = self.tokens.access_token().await?;
        match self.vendor.device_state(&token, device_id).await {
            Err(VendorError::AuthRejected) => {
                info!("vendor rejected access token, refreshing and retrying once");
                let token = self.tokens.refresh().await?;
                Ok(self.vendor.device_state(&token, device_id).await?)
            }
            other => Ok(other?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{skill_with, FakeTokens, FakeVendor};
    use serde_json::json;

    fn header(namespace: &str, name: &str) -> Header {
        Header {
            namespace: namespace.to_string(),
            name: name.to_string(),
            message_id: "msg-1".to_string(),
            correlation_token: None,
            payload_version: "3".to_string(),
        }
    }

    #[test]
    fn every_supported_pair_routes_to_one_kind() {
        let cases = [
            ("Alexa.Discovery", "Discover", DirectiveKind::Discover),
            ("Alexa.Authorization", "AcceptGrant", DirectiveKind::AcceptGrant),
            ("Alexa", "ReportState", DirectiveKind::ReportState),
            ("Alexa.PowerController", "TurnOn", DirectiveKind::TurnOn),
            ("Alexa.PowerController", "TurnOff", DirectiveKind::TurnOff),
            (
                "Alexa.BrightnessController",
                "SetBrightness",
                DirectiveKind::SetBrightness,
            ),
            (
                "Alexa.BrightnessController",
                "AdjustBrightness",
                DirectiveKind::AdjustBrightness,
            ),
        ];
        for (namespace, name, expected) in cases {
            assert_eq!(DirectiveKind::from_header(&header(namespace, name)), expected);
        }
    }

    #[test]
    fn unknown_pairs_fall_into_unsupported() {
        let kind = DirectiveKind::from_header(&header("Alexa.SceneController", "Activate"));
        assert_eq!(
            kind,
            DirectiveKind::Unsupported {
                namespace: "Alexa.SceneController".to_string(),
                name: "Activate".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn unsupported_directive_yields_invalid_directive() {
        let (skill, vendor, _) = skill_with(FakeVendor::default(), FakeTokens::default());
        let response = skill
            .handle(json!({
                "directive": {
                    "header": {
                        "namespace": "Alexa.SceneController",
                        "name": "Activate",
                        "messageId": "msg-1",
                        "correlationToken": "corr-9",
                        "payloadVersion": "3"
                    },
                    "endpoint": {"endpointId": "appliance-001"},
                    "payload": {}
                }
            }))
            .await;

        let wire = serde_json::to_value(&response).unwrap();
        assert_eq!(wire["event"]["header"]["name"], "ErrorResponse");
        assert_eq!(wire["event"]["payload"]["type"], "INVALID_DIRECTIVE");
        assert_eq!(wire["event"]["header"]["correlationToken"], "corr-9");
        assert!(vendor.set_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unsupported_payload_version_is_rejected() {
        let (skill, _, _) = skill_with(FakeVendor::default(), FakeTokens::default());
        let response = skill
            .handle(json!({
                "directive": {
                    "header": {
                        "namespace": "Alexa.PowerController",
                        "name": "TurnOn",
                        "messageId": "msg-1",
                        "payloadVersion": "2"
                    },
                    "endpoint": {"endpointId": "appliance-001"},
                    "payload": {}
                }
            }))
            .await;

        let wire = serde_json::to_value(&response).unwrap();
        assert_eq!(wire["event"]["payload"]["type"], "INTERNAL_ERROR");
    }

    #[tokio::test]
    async fn unparseable_envelope_still_yields_one_error_envelope() {
        let (skill, _, _) = skill_with(FakeVendor::default(), FakeTokens::default());
        let response = skill.handle(json!({"not": "a directive"})).await;

        let wire = serde_json::to_value(&response).unwrap();
        assert_eq!(wire["event"]["header"]["namespace"], "Alexa");
        assert_eq!(wire["event"]["header"]["name"], "ErrorResponse");
        assert_eq!(wire["event"]["payload"]["type"], "INTERNAL_ERROR");
    }

    #[tokio::test]
    async fn accept_grant_is_acknowledged() {
        let (skill, _, _) = skill_with(FakeVendor::default(), FakeTokens::default());
        let response = skill
            .handle(json!({
                "directive": {
                    "header": {
                        "namespace": "Alexa.Authorization",
                        "name": "AcceptGrant",
                        "messageId": "msg-1",
                        "payloadVersion": "3"
                    },
                    "payload": {"grant": {"code": "auth-code"}, "grantee": {"token": "abc"}}
                }
            }))
            .await;

        assert_eq!(response.event.header.namespace, "Alexa.Authorization");
        assert_eq!(response.event.header.name, "AcceptGrant.Response");
    }
}

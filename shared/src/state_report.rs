//! StateReport: answers `Alexa` `ReportState` with the device's current
//! properties.

use serde_json::json;

use crate::alexa::{Directive, ResponseEnvelope};
use crate::error::{ErrorType, HandlerError};
use crate::respond;
use crate::router::Skill;

pub(crate) async fn handle(
    skill: &Skill,
    directive: &Directive,
) -> Result<ResponseEnvelope, HandlerError> {
    let endpoint = directive.endpoint.as_ref().ok_or_else(|| {
        HandlerError::new(ErrorType::InvalidDirective, "ReportState missing endpoint")
    })?;

    let state = skill.state_of(&endpoint.endpoint_id).await?;

    let mut properties = vec![respond::property(
        "Alexa.PowerController",
        "powerState",
        json!(if state.onoff { "ON" } else { "OFF" }),
    )];
    if let Some(dim) = state.dim {
        properties.push(respond::property(
            "Alexa.BrightnessController",
            "brightness",
            json!(dim),
        ));
    }
    properties.push(respond::property(
        "Alexa.EndpointHealth",
        "connectivity",
        json!({"value": if state.is_online { "OK" } else { "UNREACHABLE" }}),
    ));

    Ok(respond::state_report(directive, properties))
}

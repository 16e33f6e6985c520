//! BrightnessController: `SetBrightness` / `AdjustBrightness`.
//!
//! Range validation happens here, before any vendor call; out-of-range
//! values never leave the skill.

use serde_json::{json, Value};

use crate::alexa::{Directive, Endpoint, ResponseEnvelope};
use crate::error::{ErrorType, HandlerError};
use crate::gooee::VendorCommand;
use crate::respond;
use crate::router::Skill;

fn required_endpoint(directive: &Directive) -> Result<&Endpoint, HandlerError> {
    directive.endpoint.as_ref().ok_or_else(|| {
        HandlerError::new(
            ErrorType::InvalidDirective,
            "brightness directive missing endpoint",
        )
    })
}

fn payload_value(directive: &Directive, field: &str) -> Result<i64, HandlerError> {
    directive
        .payload
        .get(field)
        .and_then(Value::as_i64)
        .ok_or_else(|| {
            HandlerError::new(
                ErrorType::InvalidValue,
                format!("missing or non-numeric {}", field),
            )
        })
}

pub(crate) async fn set(
    skill: &Skill,
    directive: &Directive,
) -> Result<ResponseEnvelope, HandlerError> {
    let endpoint = required_endpoint(directive)?;
    let level = payload_value(directive, "brightness")?;
    if !(0..=100).contains(&level) {
        return Err(HandlerError::new(
            ErrorType::InvalidValue,
            format!("brightness {} out of range 0-100", level),
        ));
    }

    let state = skill
        .set_property(&endpoint.endpoint_id, VendorCommand::Dim(level as u8))
        .await?;

    // Vendors without a dim readback get the requested level echoed.
    let reported = state.dim.map(i64::from).unwrap_or(level);
    Ok(respond::success(
        directive,
        vec![respond::property(
            "Alexa.BrightnessController",
            "brightness",
            json!(reported),
        )],
    ))
}

pub(crate) async fn adjust(
    skill: &Skill,
    directive: &Directive,
) -> Result<ResponseEnvelope, HandlerError> {
    let endpoint = required_endpoint(directive)?;
    let delta = payload_value(directive, "brightnessDelta")?;
    if !(-100..=100).contains(&delta) {
        return Err(HandlerError::new(
            ErrorType::InvalidValue,
            format!("brightnessDelta {} out of range -100-100", delta),
        ));
    }

    let state = skill
        .set_property(&endpoint.endpoint_id, VendorCommand::DimAdjust(delta as i16))
        .await?;

    let reported = state.dim.map(i64::from).unwrap_or_else(|| delta.abs());
    Ok(respond::success(
        directive,
        vec![respond::property(
            "Alexa.BrightnessController",
            "brightness",
            json!(reported),
        )],
    ))
}

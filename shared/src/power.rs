//! PowerController: `TurnOn` / `TurnOff`.

use serde_json::json;

use crate::alexa::{Directive, ResponseEnvelope};
use crate::error::{ErrorType, HandlerError};
use crate::gooee::VendorCommand;
use crate::respond;
use crate::router::Skill;

pub(crate) async fn handle(
    skill: &Skill,
    directive: &Directive,
    on: bool,
) -> Result<ResponseEnvelope, HandlerError> {
    let endpoint = directive.endpoint.as_ref().ok_or_else(|| {
        HandlerError::new(ErrorType::InvalidDirective, "power directive missing endpoint")
    })?;

    let state = skill
        .set_property(&endpoint.endpoint_id, VendorCommand::OnOff(on))
        .await?;

    let power_state = if state.onoff { "ON" } else { "OFF" };
    Ok(respond::success(
        directive,
        vec![respond::property(
            "Alexa.PowerController",
            "powerState",
            json!(power_state),
        )],
    ))
}

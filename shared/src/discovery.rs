//! Device discovery: maps Gooee device listings to Alexa endpoints.

use tracing::{info, warn};
use uuid::Uuid;

use crate::alexa::{CapabilityDecl, Directive, DiscoveredEndpoint, ResponseEnvelope};
use crate::error::{HandlerError, VendorError};
use crate::gooee::VendorDevice;
use crate::respond;
use crate::router::Skill;

pub(crate) async fn handle(
    skill: &Skill,
    directive: &Directive,
) -> Result<ResponseEnvelope, HandlerError> {
    let devices = match list_devices(skill).await {
        Ok(devices) => devices,
        Err(err) => {
            // Alexa expects an empty endpoint list, not an error, when
            // discovery cannot reach the customer's account.
            warn!(error = %err, "discovery failed, returning empty endpoint list");
            Vec::new()
        }
    };

    let mut endpoints = Vec::with_capacity(devices.len());
    for device in &devices {
        if Uuid::parse_str(&device.id).is_err() {
            warn!(device_id = %device.id, "skipping device with unparseable id");
            continue;
        }
        endpoints.push(endpoint_for(device));
    }

    info!(count = endpoints.len(), "discovered endpoints");
    Ok(respond::discover_response(directive, endpoints))
}

async fn list_devices(skill: &Skill) -> Result<Vec<VendorDevice>, HandlerError> {
    let token = skill.tokens.access_token().await?;
    match skill.vendor.list_devices(&token).await {
        Err(VendorError::AuthRejected) => {
            let token = skill.tokens.refresh().await?;
            Ok(skill.vendor.list_devices(&token).await?)
        }
        other => Ok(other?),
    }
}

fn endpoint_for(device: &VendorDevice) -> DiscoveredEndpoint {
    let mut capabilities = vec![
        CapabilityDecl::base(),
        CapabilityDecl::retrievable("Alexa.PowerController", "powerState"),
    ];
    if device.is_dimmable() {
        capabilities.push(CapabilityDecl::retrievable(
            "Alexa.BrightnessController",
            "brightness",
        ));
    }
    capabilities.push(CapabilityDecl::retrievable(
        "Alexa.EndpointHealth",
        "connectivity",
    ));

    DiscoveredEndpoint {
        endpoint_id: device.id.clone(),
        manufacturer_name: "Gooee".to_string(),
        friendly_name: device.name.clone(),
        description: device
            .description
            .clone()
            .unwrap_or_else(|| "Gooee connected light".to_string()),
        display_categories: vec!["LIGHT".to_string()],
        capabilities,
    }
}

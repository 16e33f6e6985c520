//! Smart Home Skill Lambda - bridges Alexa Smart Home directives to the
//! Gooee cloud API.
//!
//! This binary is intentionally thin: deserialize the inbound envelope,
//! hand it to the directive engine, serialize the outbound envelope.

use std::sync::Arc;

use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde_json::Value;
use shared::{Config, GooeeClient, OauthTokenProvider, Skill};
use tracing::info;
use tracing_subscriber::EnvFilter;

async fn handler(skill: Arc<Skill>, event: LambdaEvent<Value>) -> Result<Value, Error> {
    let response = skill.handle(event.payload).await;
    Ok(serde_json::to_value(&response)?)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let config = Config::from_env()?;
    info!(api_url = %config.api_url, "starting smart home skill");

    let http = reqwest::Client::builder()
        .timeout(config.vendor_timeout)
        .build()?;
    let vendor = GooeeClient::new(&config, http.clone());
    let tokens = OauthTokenProvider::new(&config, http);
    let skill = Arc::new(Skill::new(Arc::new(vendor), Arc::new(tokens)));

    run(service_fn(move |event| {
        let skill = Arc::clone(&skill);
        async move { handler(skill, event).await }
    }))
    .await
}

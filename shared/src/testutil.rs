//! Deterministic fakes for handler tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::alexa::Directive;
use crate::error::{AuthError, VendorError};
use crate::gooee::{VendorApi, VendorCommand, VendorDevice, VendorState};
use crate::router::Skill;
use crate::token::TokenProvider;

/// Scriptable vendor double: results are popped per call, calls are recorded.
#[derive(Default)]
pub(crate) struct FakeVendor {
    pub list_results: Mutex<VecDeque<Result<Vec<VendorDevice>, VendorError>>>,
    pub state_results: Mutex<VecDeque<Result<VendorState, VendorError>>>,
    pub set_results: Mutex<VecDeque<Result<VendorState, VendorError>>>,
    pub list_calls: Mutex<Vec<String>>,
    pub state_calls: Mutex<Vec<(String, String)>>,
    pub set_calls: Mutex<Vec<(String, String, VendorCommand)>>,
}

impl FakeVendor {
    pub fn device(id: &str, name: &str, dimmable: bool) -> VendorDevice {
        let mut meta = vec![json!({"name": "onoff", "value": true})];
        if dimmable {
            meta.push(json!({"name": "dim", "value": 50}));
        }
        serde_json::from_value(json!({"id": id, "name": name, "meta": meta})).unwrap()
    }

    pub fn state(onoff: bool, dim: Option<u8>) -> VendorState {
        VendorState {
            onoff,
            dim,
            is_online: true,
        }
    }
}

#[async_trait]
impl VendorApi for FakeVendor {
    async fn list_devices(&self, token: &str) -> Result<Vec<VendorDevice>, VendorError> {
        self.list_calls.lock().unwrap().push(token.to_string());
        self.list_results
            .lock()
            .unwrap()
            .pop_front()
            .expect("no scripted list_devices result")
    }

    async fn device_state(
        &self,
        token: &str,
        device_id: &str,
    ) -> Result<VendorState, VendorError> {
        self.state_calls
            .lock()
            .unwrap()
            .push((token.to_string(), device_id.to_string()));
        self.state_results
            .lock()
            .unwrap()
            .pop_front()
            .expect("no scripted device_state result")
    }

    async fn set_device_property(
        &self,
        token: &str,
        device_id: &str,
        command: VendorCommand,
    ) -> Result<VendorState, VendorError> {
        self.set_calls
            .lock()
            .unwrap()
            .push((token.to_string(), device_id.to_string(), command));
        self.set_results
            .lock()
            .unwrap()
            .pop_front()
            .expect("no scripted set_device_property result")
    }
}

/// Token provider double counting refreshes.
#[derive(Default)]
pub(crate) struct FakeTokens {
    pub access_calls: AtomicUsize,
    pub refresh_calls: AtomicUsize,
    pub access_fails: bool,
    pub refresh_fails: bool,
}

#[async_trait]
impl TokenProvider for FakeTokens {
    async fn access_token(&self) -> Result<String, AuthError> {
        self.access_calls.fetch_add(1, Ordering::SeqCst);
        if self.access_fails {
            return Err(AuthError::MissingRefreshToken);
        }
        Ok("access-0".to_string())
    }

    async fn refresh(&self) -> Result<String, AuthError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        if self.refresh_fails {
            return Err(AuthError::RefreshRejected("invalid_grant".to_string()));
        }
        Ok("access-1".to_string())
    }
}

pub(crate) fn skill_with(
    vendor: FakeVendor,
    tokens: FakeTokens,
) -> (Skill, Arc<FakeVendor>, Arc<FakeTokens>) {
    let vendor = Arc::new(vendor);
    let tokens = Arc::new(tokens);
    let skill = Skill::new(vendor.clone(), tokens.clone());
    (skill, vendor, tokens)
}

/// Builds a directive the way Alexa sends it, exercising deserialization.
pub(crate) fn directive(
    namespace: &str,
    name: &str,
    endpoint_id: Option<&str>,
    payload: Value,
) -> Directive {
    let mut value = json!({
        "header": {
            "namespace": namespace,
            "name": name,
            "messageId": "msg-1",
            "correlationToken": "corr-1",
            "payloadVersion": "3"
        },
        "payload": payload
    });
    if let Some(id) = endpoint_id {
        value["endpoint"] = json!({
            "scope": {"type": "BearerToken", "token": "linked"},
            "endpointId": id
        });
    }
    serde_json::from_value(value).unwrap()
}

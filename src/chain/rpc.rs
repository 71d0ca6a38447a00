use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::abi::{self, Selector};
use super::{MembershipError, MembershipPredicate};
use crate::config::AppConfig;
use crate::identity::Address;

#[derive(Debug, Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
pub struct RpcErrorObject {
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

/// JSON-RPC 2.0 body for `eth_call` at the latest block.
pub fn eth_call_request(id: u64, to: &Address, data: &str) -> serde_json::Value {
    serde_json::json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "eth_call",
        "params": [{ "to": to.to_string(), "data": data }, "latest"],
    })
}

pub fn into_result(response: RpcResponse) -> Result<String, MembershipError> {
    if let Some(err) = response.error {
        return Err(MembershipError::Rpc {
            code: err.code,
            message: err.message,
        });
    }
    response
        .result
        .ok_or_else(|| MembershipError::Decode("response has neither result nor error".to_string()))
}

/// Reads `isRepresentative(address)` from the registry contract over JSON-RPC.
pub struct ContractMembership {
    client: reqwest::Client,
    rpc_url: String,
    contract: Option<Address>,
    selector: Selector,
    next_id: AtomicU64,
}

impl ContractMembership {
    pub fn new(
        rpc_url: impl Into<String>,
        contract: Option<Address>,
        selector: Selector,
        timeout: Duration,
    ) -> Result<Self, MembershipError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MembershipError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            rpc_url: rpc_url.into(),
            contract,
            selector,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, MembershipError> {
        Self::new(
            config.rpc_url.clone(),
            config.contract_address,
            config.membership_selector,
            config.rpc_timeout,
        )
    }

    async fn eth_call(&self, to: &Address, data: &str) -> Result<String, MembershipError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = eth_call_request(id, to, data);

        let response = self
            .client
            .post(&self.rpc_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| MembershipError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MembershipError::Transport(format!("HTTP {status}")));
        }

        let parsed: RpcResponse = response
            .json()
            .await
            .map_err(|e| MembershipError::Decode(e.to_string()))?;
        into_result(parsed)
    }
}

#[async_trait]
impl MembershipPredicate for ContractMembership {
    fn contract(&self) -> Option<Address> {
        self.contract
    }

    async fn is_representative(&self, account: &Address) -> Result<bool, MembershipError> {
        let contract = self.contract.ok_or(MembershipError::NotConfigured)?;
        let data = abi::encode_address_call(self.selector, account);
        let result = self.eth_call(&contract, &data).await?;
        Ok(abi::decode_bool(&result)?)
    }
}

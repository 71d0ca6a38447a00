//! Reports posted by `static/js/wallet.js`.
//!
//! The bridge script performs the wallet calls in the browser and posts what
//! happened. A report stands in for the wallet for the duration of one request.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{AccountSource, Signature, WalletError};
use crate::identity::Address;

/// EIP-1193 "User Rejected Request".
const USER_REJECTED: i64 = 4001;
/// EIP-1193 "Unauthorized".
const UNAUTHORIZED: i64 = 4100;

fn present() -> bool {
    true
}

/// Error object as thrown by `window.ethereum.request`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderError {
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

impl ProviderError {
    pub fn classify(&self) -> WalletError {
        match self.code {
            USER_REJECTED | UNAUTHORIZED => WalletError::Rejected(self.message.clone()),
            code => WalletError::Provider {
                code,
                message: self.message.clone(),
            },
        }
    }
}

/// Outcome of an account request in the browser.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BrowserReport {
    #[serde(default = "present")]
    pub provider_present: bool,
    #[serde(default)]
    pub accounts: Vec<String>,
    #[serde(default)]
    pub error: Option<ProviderError>,
}

impl BrowserReport {
    pub fn accounts(accounts: &[&str]) -> Self {
        Self {
            provider_present: true,
            accounts: accounts.iter().map(|a| a.to_string()).collect(),
            error: None,
        }
    }

    pub fn failed(code: i64, message: &str) -> Self {
        Self {
            provider_present: true,
            accounts: Vec::new(),
            error: Some(ProviderError {
                code,
                message: message.to_string(),
            }),
        }
    }

    pub fn no_provider() -> Self {
        Self {
            provider_present: false,
            accounts: Vec::new(),
            error: None,
        }
    }

    fn outcome(&self) -> Result<Vec<Address>, WalletError> {
        if !self.provider_present {
            return Err(WalletError::Unavailable);
        }
        if let Some(err) = &self.error {
            return Err(err.classify());
        }
        self.accounts
            .iter()
            .map(|raw| Address::parse(raw).map_err(|e| WalletError::Malformed(e.to_string())))
            .collect()
    }
}

#[async_trait]
impl AccountSource for BrowserReport {
    // The bridge already showed the picker; a refused permission prompt is
    // not reported separately.
    async fn request_permissions(&self) -> Result<(), WalletError> {
        if self.provider_present {
            Ok(())
        } else {
            Err(WalletError::Unavailable)
        }
    }

    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError> {
        self.outcome()
    }

    async fn list_accounts(&self) -> Result<Vec<Address>, WalletError> {
        self.outcome()
    }
}

/// Outcome of a `personal_sign` call, tagged with the digest of the payload
/// the browser was asked to sign.
#[derive(Debug, Clone, Deserialize)]
pub struct SignatureReport {
    pub digest: String,
    #[serde(default = "present")]
    pub provider_present: bool,
    #[serde(default)]
    pub signature: Option<String>,
    #[serde(default)]
    pub error: Option<ProviderError>,
}

impl SignatureReport {
    pub fn outcome(&self) -> Result<Signature, WalletError> {
        if !self.provider_present {
            return Err(WalletError::Unavailable);
        }
        if let Some(err) = &self.error {
            return Err(err.classify());
        }
        match &self.signature {
            Some(raw) => Signature::parse(raw),
            None => Err(WalletError::Malformed("missing signature".to_string())),
        }
    }
}

//! Wallet seams.
//!
//! The application never holds keys. Account selection and message signing
//! are delegated to the user's wallet, which in the deployed app is the
//! EIP-1193 provider injected into the browser. The bridge script reports
//! the wallet's answers back to the server (see [`browser`]).

pub mod browser;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::identity::Address;

pub use browser::{BrowserReport, ProviderError, SignatureReport};

/// Something that can reveal the user's accounts.
#[async_trait]
pub trait AccountSource: Send + Sync {
    /// Forces the wallet's account picker, so the user can switch accounts.
    async fn request_permissions(&self) -> Result<(), WalletError>;

    /// Prompting account request (`eth_requestAccounts`).
    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError>;

    /// Accounts already exposed to the site, without prompting (`eth_accounts`).
    async fn list_accounts(&self) -> Result<Vec<Address>, WalletError>;
}

/// Something that can sign a text message on behalf of the connected account.
#[async_trait]
pub trait MessageSigner: Send + Sync {
    async fn sign_message(&self, message: &str) -> Result<Signature, WalletError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    /// No wallet extension in the browser.
    Unavailable,
    /// The user dismissed the prompt.
    Rejected(String),
    NoAccounts,
    Malformed(String),
    Provider { code: i64, message: String },
}

impl WalletError {
    /// Short message shown to the user.
    pub fn notice(&self) -> &'static str {
        match self {
            WalletError::Unavailable => "MetaMask non installato",
            WalletError::Rejected(_) => "Richiesta annullata dall'utente",
            WalletError::NoAccounts => "Nessun account disponibile nel wallet",
            WalletError::Malformed(_) | WalletError::Provider { .. } => {
                "Errore di comunicazione con il wallet"
            }
        }
    }
}

impl fmt::Display for WalletError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WalletError::Unavailable => write!(f, "wallet provider not available"),
            WalletError::Rejected(msg) => write!(f, "request rejected by user: {msg}"),
            WalletError::NoAccounts => write!(f, "wallet returned no accounts"),
            WalletError::Malformed(msg) => write!(f, "malformed wallet response: {msg}"),
            WalletError::Provider { code, message } => {
                write!(f, "wallet provider error {code}: {message}")
            }
        }
    }
}

impl std::error::Error for WalletError {}

/// A 65-byte `personal_sign` signature, `0x`-prefixed hex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Signature(String);

const SIGNATURE_LEN: usize = 65;

impl Signature {
    pub fn parse(raw: &str) -> Result<Self, WalletError> {
        let trimmed = raw.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .ok_or_else(|| WalletError::Malformed("signature must start with 0x".to_string()))?;
        let bytes = hex::decode(digits)
            .map_err(|_| WalletError::Malformed("signature is not hex".to_string()))?;
        if bytes.len() != SIGNATURE_LEN {
            return Err(WalletError::Malformed(format!(
                "signature must be {SIGNATURE_LEN} bytes, got {}",
                bytes.len()
            )));
        }
        Ok(Signature(format!("0x{}", hex::encode(bytes))))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Signature {
    type Error = WalletError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Signature::parse(&value)
    }
}

impl From<Signature> for String {
    fn from(value: Signature) -> Self {
        value.0
    }
}

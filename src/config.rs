use std::fmt;
use std::time::Duration;

use crate::chain::abi::{self, Selector};
use crate::identity::Address;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";
pub const DEFAULT_SCHOOL_NAME: &str = "Istituto";

/// Runtime settings, read from the environment (and `.env`) at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: String,
    pub session_key: Option<String>,
    pub rpc_url: String,
    /// Representative registry. Unset means every membership check fails closed.
    pub contract_address: Option<Address>,
    pub membership_selector: Selector,
    pub rpc_timeout: Duration,
    pub draft_ttl: Duration,
    pub school_name: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            session_key: None,
            rpc_url: DEFAULT_RPC_URL.to_string(),
            contract_address: None,
            membership_selector: abi::IS_REPRESENTATIVE,
            rpc_timeout: Duration::from_secs(10),
            draft_ttl: Duration::from_secs(3600),
            school_name: DEFAULT_SCHOOL_NAME.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Invalid { key: &'static str, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Invalid { key, reason } => write!(f, "invalid {key}: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from `lookup`. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let contract_address = get("CONTRACT_ADDRESS")
            .map(|raw| {
                Address::parse(&raw).map_err(|e| ConfigError::Invalid {
                    key: "CONTRACT_ADDRESS",
                    reason: e.to_string(),
                })
            })
            .transpose()?;

        let membership_selector = match get("MEMBERSHIP_SELECTOR") {
            Some(raw) => abi::parse_selector(&raw).map_err(|e| ConfigError::Invalid {
                key: "MEMBERSHIP_SELECTOR",
                reason: e.to_string(),
            })?,
            None => defaults.membership_selector,
        };

        Ok(Self {
            bind_addr: get("BIND_ADDR").unwrap_or(defaults.bind_addr),
            session_key: get("SESSION_KEY"),
            rpc_url: get("RPC_URL").unwrap_or(defaults.rpc_url),
            contract_address,
            membership_selector,
            rpc_timeout: secs(get("RPC_TIMEOUT_SECS"), "RPC_TIMEOUT_SECS", defaults.rpc_timeout)?,
            draft_ttl: secs(get("DRAFT_TTL_SECS"), "DRAFT_TTL_SECS", defaults.draft_ttl)?,
            school_name: get("SCHOOL_NAME").unwrap_or(defaults.school_name),
        })
    }
}

fn secs(raw: Option<String>, key: &'static str, default: Duration) -> Result<Duration, ConfigError> {
    match raw {
        None => Ok(default),
        Some(v) => match v.parse::<u64>() {
            Ok(n) if n > 0 => Ok(Duration::from_secs(n)),
            _ => Err(ConfigError::Invalid {
                key,
                reason: format!("expected a positive number of seconds, got '{v}'"),
            }),
        },
    }
}

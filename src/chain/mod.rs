//! Representative membership, read from the registry contract.

pub mod abi;
pub mod rpc;

use std::fmt;

use async_trait::async_trait;

use crate::identity::Address;

pub use rpc::ContractMembership;

/// The external "is this address a representative?" predicate.
#[async_trait]
pub trait MembershipPredicate: Send + Sync {
    /// The contract the predicate reads from, if one is configured.
    fn contract(&self) -> Option<Address>;

    async fn is_representative(&self, account: &Address) -> Result<bool, MembershipError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MembershipError {
    NotConfigured,
    Transport(String),
    Rpc { code: i64, message: String },
    Decode(String),
}

impl fmt::Display for MembershipError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MembershipError::NotConfigured => write!(f, "contract address not set"),
            MembershipError::Transport(e) => write!(f, "RPC transport error: {e}"),
            MembershipError::Rpc { code, message } => write!(f, "RPC error {code}: {message}"),
            MembershipError::Decode(e) => write!(f, "cannot decode contract result: {e}"),
        }
    }
}

impl std::error::Error for MembershipError {}

impl From<abi::AbiError> for MembershipError {
    fn from(e: abi::AbiError) -> Self {
        MembershipError::Decode(e.to_string())
    }
}

/// Result of one membership check. `Unknown` means the check itself failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipCheck {
    Unknown,
    Member,
    NotMember,
}

impl MembershipCheck {
    /// Collapses to a yes/no answer; an unknown answer is a no.
    pub fn is_member(self) -> bool {
        matches!(self, MembershipCheck::Member)
    }
}

/// Runs the predicate and never fails: errors are logged and reported as
/// [`MembershipCheck::Unknown`].
pub async fn check_membership<P>(registry: &P, account: &Address) -> MembershipCheck
where
    P: MembershipPredicate + ?Sized,
{
    match registry.is_representative(account).await {
        Ok(true) => {
            log::info!("Address {account} is representative: true");
            MembershipCheck::Member
        }
        Ok(false) => {
            log::info!("Address {account} is representative: false");
            MembershipCheck::NotMember
        }
        Err(MembershipError::NotConfigured) => {
            log::warn!("Contract address not set; {account} treated as not a representative");
            MembershipCheck::Unknown
        }
        Err(e) => {
            log::error!("Error checking representative status for {account}: {e}");
            MembershipCheck::Unknown
        }
    }
}

//! Access gate: who is connected, and may they use the request form.
//!
//! The gate lives in the browser session. Every transition runs to completion
//! inside one request, so the stored value is always settled; `loading` is
//! only true on a fresh session that has not yet been resynced with the
//! wallet, and while a connect is in flight.

use serde::{Deserialize, Serialize};

use super::Address;
use crate::chain::{self, MembershipPredicate};
use crate::wallet::{AccountSource, WalletError};

/// The contract binding used for the last membership check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipHandle {
    pub contract: Address,
    pub account: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessGate {
    address: Option<Address>,
    is_representative: bool,
    membership: Option<MembershipHandle>,
    loading: bool,
}

/// What the dashboard may show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Loading,
    Disconnected,
    Restricted { address: Address },
    Granted { address: Address },
}

impl Access {
    pub fn is_granted(&self) -> bool {
        matches!(self, Access::Granted { .. })
    }

    /// True when both sides grant access to the same address.
    pub fn same_holder(&self, other: &Access) -> bool {
        match (self, other) {
            (Access::Granted { address: a }, Access::Granted { address: b }) => a == b,
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Access::Loading => "loading",
            Access::Disconnected => "disconnected",
            Access::Restricted { .. } => "restricted",
            Access::Granted { .. } => "granted",
        }
    }
}

impl Default for AccessGate {
    fn default() -> Self {
        Self {
            address: None,
            is_representative: false,
            membership: None,
            loading: true,
        }
    }
}

impl AccessGate {
    pub fn address(&self) -> Option<&Address> {
        self.address.as_ref()
    }

    pub fn is_representative(&self) -> bool {
        self.address.is_some() && self.is_representative
    }

    pub fn membership(&self) -> Option<&MembershipHandle> {
        self.membership.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn access(&self) -> Access {
        if self.loading {
            return Access::Loading;
        }
        match self.address {
            None => Access::Disconnected,
            Some(address) if self.is_representative => Access::Granted { address },
            Some(address) => Access::Restricted { address },
        }
    }

    /// Interactive connect: shows the account picker, takes the first
    /// account and checks its membership.
    ///
    /// If the wallet refuses, the gate keeps its previous identity and the
    /// error is returned for the caller to show.
    pub async fn connect<A, P>(&mut self, wallet: &A, registry: &P) -> Result<(), WalletError>
    where
        A: AccountSource + ?Sized,
        P: MembershipPredicate + ?Sized,
    {
        self.loading = true;

        match wallet.request_permissions().await {
            Ok(()) => {}
            Err(WalletError::Unavailable) => {
                self.loading = false;
                return Err(WalletError::Unavailable);
            }
            // The user may still be connected already; carry on.
            Err(e) => log::warn!("Permissions request failed: {e}"),
        }

        let first = match wallet.request_accounts().await {
            Ok(accounts) => accounts.into_iter().next().ok_or(WalletError::NoAccounts),
            Err(e) => Err(e),
        };

        match first {
            Ok(account) => {
                self.adopt(account, registry).await;
                log::info!("Wallet connected: {account}");
                Ok(())
            }
            Err(e) => {
                self.loading = false;
                log::warn!("Error connecting wallet: {e}");
                Err(e)
            }
        }
    }

    /// Silent resync on page load, using accounts the wallet already exposes.
    /// No wallet or no exposed account means disconnected.
    pub async fn resync<A, P>(&mut self, wallet: &A, registry: &P) -> Result<(), WalletError>
    where
        A: AccountSource + ?Sized,
        P: MembershipPredicate + ?Sized,
    {
        match wallet.list_accounts().await {
            Ok(accounts) => match accounts.into_iter().next() {
                Some(account) => {
                    self.adopt(account, registry).await;
                    Ok(())
                }
                None => {
                    self.disconnect();
                    Ok(())
                }
            },
            Err(WalletError::Unavailable) => {
                self.disconnect();
                Ok(())
            }
            Err(e) => {
                self.loading = false;
                Err(e)
            }
        }
    }

    /// The wallet switched accounts. An empty list is a disconnect.
    pub async fn accounts_changed<P>(&mut self, accounts: Vec<Address>, registry: &P)
    where
        P: MembershipPredicate + ?Sized,
    {
        match accounts.into_iter().next() {
            Some(account) => {
                log::info!("Wallet account changed to {account}");
                self.adopt(account, registry).await;
            }
            None => self.disconnect(),
        }
    }

    /// Forgets the local identity. The wallet itself stays connected to the
    /// site; only this session's view of it is cleared.
    pub fn disconnect(&mut self) {
        if let Some(address) = self.address {
            log::info!("Wallet disconnected: {address}");
        }
        self.address = None;
        self.is_representative = false;
        self.membership = None;
        self.loading = false;
    }

    async fn adopt<P>(&mut self, account: Address, registry: &P)
    where
        P: MembershipPredicate + ?Sized,
    {
        self.loading = true;
        self.address = Some(account);
        self.is_representative = false;
        self.membership = registry.contract().map(|contract| MembershipHandle {
            contract,
            account,
        });

        let check = chain::check_membership(registry, &account).await;
        self.is_representative = check.is_member();
        self.loading = false;
    }
}

//! Access gate tests: connect, resync, account switches and disconnect,
//! against scripted wallets and registries.

mod common;

use assemblea::identity::{Access, AccessGate};
use assemblea::wallet::WalletError;
use common::*;

async fn connected(account: &str, registry: &FakeRegistry) -> AccessGate {
    let mut gate = AccessGate::default();
    gate.connect(&FakeWallet::with_accounts(&[account]), registry)
        .await
        .expect("connect succeeds");
    gate
}

#[tokio::test]
async fn test_connect_grants_a_representative() {
    let registry = FakeRegistry::with_members(&[ALICE]);
    let gate = connected(ALICE, &registry).await;

    assert_eq!(gate.access(), Access::Granted { address: addr(ALICE) });
    assert!(gate.is_representative());
    assert!(!gate.is_loading());
    let handle = gate.membership().expect("membership handle cached");
    assert_eq!(handle.contract, addr(REGISTRY));
    assert_eq!(handle.account, addr(ALICE));
}

#[tokio::test]
async fn test_connect_takes_the_first_account() {
    let registry = FakeRegistry::with_members(&[BOB]);
    let mut gate = AccessGate::default();
    gate.connect(&FakeWallet::with_accounts(&[ALICE, BOB]), &registry)
        .await
        .unwrap();

    assert_eq!(gate.access(), Access::Restricted { address: addr(ALICE) });
}

#[tokio::test]
async fn test_membership_failure_fails_closed() {
    let registry = FakeRegistry::failing();
    let gate = connected(ALICE, &registry).await;

    assert_eq!(gate.address(), Some(&addr(ALICE)));
    assert!(!gate.is_representative());
    assert_eq!(gate.access(), Access::Restricted { address: addr(ALICE) });
}

#[tokio::test]
async fn test_missing_contract_fails_closed() {
    let registry = FakeRegistry::unconfigured();
    let gate = connected(ALICE, &registry).await;

    assert!(!gate.is_representative());
    assert!(gate.membership().is_none());
}

#[tokio::test]
async fn test_rejected_connect_stays_disconnected() {
    let registry = FakeRegistry::with_members(&[ALICE]);
    let mut gate = AccessGate::default();
    gate.disconnect();

    let result = gate.connect(&FakeWallet::rejecting(), &registry).await;

    assert!(matches!(result, Err(WalletError::Rejected(_))));
    assert_eq!(gate.access(), Access::Disconnected);
    assert_eq!(registry.calls(), 0);
}

#[tokio::test]
async fn test_rejected_connect_keeps_previous_identity() {
    let registry = FakeRegistry::with_members(&[ALICE]);
    let mut gate = connected(ALICE, &registry).await;

    let result = gate.connect(&FakeWallet::rejecting(), &registry).await;

    assert!(result.is_err());
    assert_eq!(gate.access(), Access::Granted { address: addr(ALICE) });
}

#[tokio::test]
async fn test_connect_without_wallet_is_unavailable() {
    let registry = FakeRegistry::with_members(&[ALICE]);
    let mut gate = AccessGate::default();

    let result = gate.connect(&FakeWallet::missing(), &registry).await;

    assert_eq!(result, Err(WalletError::Unavailable));
    assert_eq!(result.unwrap_err().notice(), "MetaMask non installato");
    assert!(!gate.is_loading());
    assert!(gate.address().is_none());
}

#[tokio::test]
async fn test_connect_with_empty_account_list() {
    let registry = FakeRegistry::with_members(&[ALICE]);
    let mut gate = AccessGate::default();

    let result = gate.connect(&FakeWallet::with_accounts(&[]), &registry).await;

    assert_eq!(result, Err(WalletError::NoAccounts));
    assert!(gate.address().is_none());
}

#[tokio::test]
async fn test_resync_adopts_exposed_account() {
    let registry = FakeRegistry::with_members(&[ALICE]);
    let mut gate = AccessGate::default();

    gate.resync(&FakeWallet::with_accounts(&[ALICE]), &registry)
        .await
        .unwrap();

    assert!(gate.access().is_granted());
}

#[tokio::test]
async fn test_resync_rechecks_membership_every_time() {
    let registry = FakeRegistry::with_members(&[ALICE]);
    let mut gate = AccessGate::default();
    let wallet = FakeWallet::with_accounts(&[ALICE]);

    gate.resync(&wallet, &registry).await.unwrap();
    gate.resync(&wallet, &registry).await.unwrap();

    assert_eq!(registry.calls(), 2);
}

#[tokio::test]
async fn test_resync_without_accounts_disconnects() {
    let registry = FakeRegistry::with_members(&[ALICE]);
    let mut gate = connected(ALICE, &registry).await;

    gate.resync(&FakeWallet::with_accounts(&[]), &registry)
        .await
        .unwrap();

    assert_eq!(gate.access(), Access::Disconnected);
}

#[tokio::test]
async fn test_resync_without_wallet_settles_disconnected() {
    let registry = FakeRegistry::with_members(&[ALICE]);
    let mut gate = AccessGate::default();

    gate.resync(&FakeWallet::missing(), &registry).await.unwrap();

    assert_eq!(gate.access(), Access::Disconnected);
    assert!(!gate.is_loading());
}

#[tokio::test]
async fn test_account_switch_reruns_membership_check() {
    let registry = FakeRegistry::with_members(&[ALICE]);
    let mut gate = connected(ALICE, &registry).await;

    gate.accounts_changed(vec![addr(BOB)], &registry).await;

    assert_eq!(gate.access(), Access::Restricted { address: addr(BOB) });
    assert_eq!(gate.membership().map(|h| h.account), Some(addr(BOB)));
    assert_eq!(registry.calls(), 2);
}

#[tokio::test]
async fn test_empty_account_list_is_a_disconnect() {
    let registry = FakeRegistry::with_members(&[ALICE]);
    let mut gate = connected(ALICE, &registry).await;

    gate.accounts_changed(Vec::new(), &registry).await;

    assert_eq!(gate.access(), Access::Disconnected);
    assert!(!gate.is_representative());
    assert!(gate.membership().is_none());
}

#[tokio::test]
async fn test_disconnect_always_resets_everything() {
    let registry = FakeRegistry::with_members(&[ALICE]);
    let states = vec![
        AccessGate::default(),
        connected(ALICE, &registry).await,
        connected(BOB, &registry).await,
    ];

    for mut gate in states {
        gate.disconnect();
        assert!(gate.address().is_none());
        assert!(!gate.is_representative());
        assert!(gate.membership().is_none());
        assert!(!gate.is_loading());
    }
}

#[tokio::test]
async fn test_gate_survives_session_serialization() {
    let registry = FakeRegistry::with_members(&[ALICE]);
    let gate = connected(ALICE, &registry).await;

    let json = serde_json::to_string(&gate).unwrap();
    let restored: AccessGate = serde_json::from_str(&json).unwrap();

    assert_eq!(restored, gate);
}

//! Reducer property tests
//!
//! Random action sequences must never produce a state that breaks the
//! connection invariants.

use bounty_session::{reduce, WalletAccount, WalletAction, WalletState};
use proptest::prelude::*;

/// Arbitrary non-empty address
fn arbitrary_account() -> impl Strategy<Value = WalletAccount> {
    "[A-Z2-7]{1,58}".prop_map(|address| {
        WalletAccount::from_address(address).expect("generated address is non-empty")
    })
}

fn arbitrary_action() -> impl Strategy<Value = WalletAction> {
    prop_oneof![
        Just(WalletAction::ConnectRequest),
        arbitrary_account().prop_map(WalletAction::ConnectSuccess),
        "[a-zA-Z ]{0,24}".prop_map(WalletAction::ConnectFailure),
        Just(WalletAction::Disconnect),
    ]
}

fn run(actions: &[WalletAction]) -> WalletState {
    actions
        .iter()
        .cloned()
        .fold(WalletState::default(), |state, action| reduce(&state, action))
}

proptest! {
    /// Property: every reachable state satisfies the invariants
    #[test]
    fn prop_invariants_hold(actions in prop::collection::vec(arbitrary_action(), 0..64)) {
        let mut state = WalletState::default();
        for action in actions {
            state = reduce(&state, action);
            prop_assert!(state.is_consistent(), "inconsistent state: {:?}", state);
        }
    }

    /// Property: a success is immediately visible as a connected session
    #[test]
    fn prop_success_connects(
        prefix in prop::collection::vec(arbitrary_action(), 0..16),
        account in arbitrary_account(),
    ) {
        let state = reduce(&run(&prefix), WalletAction::ConnectSuccess(account.clone()));
        prop_assert!(state.is_connected());
        prop_assert!(!state.is_connecting());
        prop_assert_eq!(state.account(), Some(&account));
        prop_assert_eq!(state.error(), None);
    }

    /// Property: disconnect resets to the initial state, and twice equals once
    #[test]
    fn prop_disconnect_resets(prefix in prop::collection::vec(arbitrary_action(), 0..16)) {
        let once = reduce(&run(&prefix), WalletAction::Disconnect);
        let twice = reduce(&once, WalletAction::Disconnect);
        prop_assert_eq!(&once, &WalletState::default());
        prop_assert_eq!(once, twice);
    }

    /// Property: the reducer is deterministic
    #[test]
    fn prop_reduce_is_pure(
        prefix in prop::collection::vec(arbitrary_action(), 0..16),
        action in arbitrary_action(),
    ) {
        let state = run(&prefix);
        prop_assert_eq!(reduce(&state, action.clone()), reduce(&state, action));
    }

    /// Property: the persisted form of an account reads back field-for-field
    #[test]
    fn prop_account_record_round_trip(account in arbitrary_account()) {
        let json = serde_json::to_string(&account).unwrap();
        let restored: WalletAccount = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(restored.address(), account.address());
        prop_assert_eq!(restored.name(), account.name());
    }
}

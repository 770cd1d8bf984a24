//! # Test Harness
//!
//! Builds the fully wired in-memory app with a company and an employee
//! account registered, and provides wait helpers over the readiness
//! signal. Individual tests drive the rig through its public surface
//! only: the gateway, the executor, and the mock adapter knobs.

use cp_02_identity_session::{NewAccount, Role};
use cp_04_readiness_coordinator::ReadinessState;
use payroll_runtime::{AppConfig, InMemoryApp};
use shared_types::Address;
use std::time::Duration;
use tokio::time::{sleep, timeout};

/// The company wallet every rig knows about.
pub fn company() -> Address {
    Address::parse("0x00000000000000000000000000000000000000c1").expect("static address")
}

/// The employee wallet every rig knows about.
pub fn employee() -> Address {
    Address::parse("0x00000000000000000000000000000000000000e1").expect("static address")
}

/// The payroll contract the channel is scoped to.
pub fn contract_address() -> Address {
    Address::parse("0x0000000000000000000000000000000000000ccc").expect("static address")
}

/// Build a started rig: company wallet in the mock provider, company and
/// employee accounts registered, coordinator loop running. Not connected.
pub fn build_app() -> InMemoryApp {
    let config = AppConfig::for_testing(contract_address());
    let rig = InMemoryApp::new(&config);

    rig.provider.set_accounts(vec![company()]);
    rig.backend.insert_account(NewAccount {
        full_name: "Acme Payroll".to_string(),
        role: Role::Company,
        wallet_address: company(),
    });
    rig.backend.insert_account(NewAccount {
        full_name: "Ada Lovelace".to_string(),
        role: Role::Employee,
        wallet_address: employee(),
    });
    let _loop = rig.app.start();
    rig
}

/// Build a rig, connect the company wallet, and wait until `Ready`.
pub async fn ready_app() -> InMemoryApp {
    let rig = build_app();
    rig.app.gateway.connect().await.expect("connect");
    wait_for_state(&rig, ReadinessState::Ready).await;
    rig
}

/// Block until the coordinator reports the given state.
///
/// Panics after two seconds; every transition in the in-memory stack
/// settles well within that.
pub async fn wait_for_state(rig: &InMemoryApp, state: ReadinessState) {
    let mut signal = rig.app.readiness();
    timeout(Duration::from_secs(2), async {
        loop {
            if signal.borrow().state == state {
                return;
            }
            signal.changed().await.expect("coordinator stopped");
        }
    })
    .await
    .unwrap_or_else(|_| panic!("coordinator never reached {state}"));
}

/// Poll a predicate until it holds or two seconds elapse.
///
/// For conditions the readiness signal alone cannot express, such as
/// which wallet the session is keyed by.
pub async fn wait_until(mut predicate: impl FnMut() -> bool) {
    timeout(Duration::from_secs(2), async {
        while !predicate() {
            sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("condition never held");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ready_app_is_ready() {
        let rig = ready_app().await;
        assert!(rig.app.coordinator.is_ready());
        assert!(rig.app.session.is_authenticated_for(&company()));
        assert!(rig.app.channel.is_initialized_for(&contract_address()));
    }

    #[tokio::test]
    async fn test_build_app_starts_idle() {
        let rig = build_app();
        assert_eq!(rig.app.coordinator.state(), ReadinessState::Idle);
        assert!(!rig.app.coordinator.is_ready());
    }
}

//! # Readiness Flows
//!
//! Drives the wired app through wallet lifecycle events and checks that
//! the coordinator's ladder, the session, and the channel stay
//! consistent: one prompt per climb, full teardown on disconnect, stale
//! completions discarded, and explicit retries only.

#[cfg(test)]
mod tests {
    use crate::harness::{
        build_app, company, contract_address, employee, ready_app, wait_for_state, wait_until,
    };
    use cp_04_readiness_coordinator::domain::invariants::{
        invariant_ready_is_consistent, invariant_teardown_complete,
    };
    use cp_04_readiness_coordinator::ReadinessState;
    use shared_bus::{EventFilter, EventPublisher, EventTopic, PayrollEvent};
    use std::time::Duration;
    use tokio::time::{sleep, timeout};

    #[tokio::test]
    async fn test_cold_start_climbs_to_ready() {
        let rig = ready_app().await;

        assert!(invariant_ready_is_consistent(
            rig.app.coordinator.state(),
            rig.app.session.current().is_some(),
            rig.app.channel.is_initialized_for(&contract_address()),
        ));
        // One login challenge; channel init needs no signature
        assert_eq!(rig.provider.signature_requests(), 1);
    }

    #[tokio::test]
    async fn test_readiness_changes_reach_the_bus() {
        let rig = build_app();
        let mut sub = rig
            .app
            .bus
            .subscribe(EventFilter::topics(vec![EventTopic::Readiness]));

        rig.app.gateway.connect().await.unwrap();
        let event = timeout(Duration::from_secs(2), sub.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(event, PayrollEvent::ReadinessChanged { ready: true }));

        rig.app.gateway.disconnect().await;
        let event = timeout(Duration::from_secs(2), sub.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(event, PayrollEvent::ReadinessChanged { ready: false }));
    }

    #[tokio::test]
    async fn test_disconnect_tears_everything_down() {
        let rig = ready_app().await;

        rig.app.gateway.disconnect().await;
        wait_for_state(&rig, ReadinessState::Idle).await;

        assert!(invariant_teardown_complete(
            rig.app.coordinator.state(),
            rig.app.session.current().is_some(),
            rig.app.channel.is_initialized_for(&contract_address()),
        ));
    }

    #[tokio::test]
    async fn test_duplicate_wallet_events_prompt_once() {
        let rig = build_app();
        rig.app.gateway.connect().await.unwrap();

        // A storm of duplicate connection events for the same wallet
        for _ in 0..5 {
            rig.app
                .bus
                .publish(PayrollEvent::WalletConnected { address: company() })
                .await;
        }
        wait_for_state(&rig, ReadinessState::Ready).await;
        sleep(Duration::from_millis(100)).await;

        assert_eq!(rig.provider.signature_requests(), 1);
        assert!(rig.app.coordinator.is_ready());
    }

    #[tokio::test]
    async fn test_disconnect_mid_init_discards_late_completion() {
        let rig = build_app();
        rig.fhe.set_init_delay(Some(Duration::from_millis(300)));

        rig.app.gateway.connect().await.unwrap();
        wait_for_state(&rig, ReadinessState::Initializing).await;

        rig.app.gateway.disconnect().await;
        wait_for_state(&rig, ReadinessState::Idle).await;

        // The delayed init resolves after teardown and must change nothing
        sleep(Duration::from_millis(500)).await;
        assert_eq!(rig.app.coordinator.state(), ReadinessState::Idle);
        assert!(!rig.app.channel.is_initialized_for(&contract_address()));
        assert!(rig.app.session.current().is_none());
    }

    #[tokio::test]
    async fn test_rejected_sign_in_waits_for_explicit_retry() {
        let rig = build_app();
        rig.provider.set_reject_signatures(true);

        rig.app.gateway.connect().await.unwrap();
        wait_for_state(&rig, ReadinessState::Faulted).await;
        assert_eq!(rig.provider.signature_requests(), 1);

        // No automatic re-prompt while faulted
        sleep(Duration::from_millis(200)).await;
        assert_eq!(rig.app.coordinator.state(), ReadinessState::Faulted);
        assert_eq!(rig.provider.signature_requests(), 1);

        rig.provider.set_reject_signatures(false);
        rig.app.coordinator.retry_sign_in().unwrap();
        wait_for_state(&rig, ReadinessState::Ready).await;
        assert_eq!(rig.provider.signature_requests(), 2);
    }

    #[tokio::test]
    async fn test_account_switch_rebuilds_for_new_wallet() {
        let rig = ready_app().await;
        assert!(rig.app.session.is_authenticated_for(&company()));

        rig.provider.set_accounts(vec![employee()]);
        rig.app
            .gateway
            .handle_accounts_changed(vec![employee()])
            .await;

        wait_until(|| {
            rig.app.session.is_authenticated_for(&employee()) && rig.app.coordinator.is_ready()
        })
        .await;
        assert!(!rig.app.session.is_authenticated_for(&company()));
    }

    #[tokio::test]
    async fn test_slow_init_raises_and_clears_warning() {
        let rig = build_app();
        rig.fhe.set_init_delay(Some(Duration::from_millis(300)));

        rig.app.gateway.connect().await.unwrap();

        let mut signal = rig.app.readiness();
        let mut saw_slow = false;
        timeout(Duration::from_secs(2), async {
            loop {
                {
                    let current = signal.borrow();
                    saw_slow |= current.slow;
                    if current.state == ReadinessState::Ready {
                        return;
                    }
                }
                signal.changed().await.expect("coordinator stopped");
            }
        })
        .await
        .expect("never became ready");

        assert!(saw_slow);
        assert!(!rig.app.readiness().borrow().slow);
    }
}

//! # Operation Flows
//!
//! Runs money-moving operations through the fully wired app: the
//! readiness gate, the encrypt-submit-confirm pipeline, decrypt
//! authorization prompts, and failure handling end to end.

#[cfg(test)]
mod tests {
    use crate::harness::{build_app, company, employee, ready_app, wait_for_state};
    use cp_04_readiness_coordinator::ReadinessState;
    use cp_05_operation_executor::{ContractError, ExecutorError, OperationStatus};
    use shared_bus::{EventFilter, EventTopic, PayrollEvent};
    use std::time::Duration;
    use tokio::time::{sleep, timeout};

    #[tokio::test]
    async fn test_full_payroll_cycle() {
        let rig = ready_app().await;
        let exec = &rig.app.executor;

        exec.deposit(&company(), 10_000).await.unwrap();
        exec.create_stream(&company(), &employee(), 2_500)
            .await
            .unwrap();
        rig.contract.accrue(&company(), &employee()).unwrap();

        assert_eq!(exec.balance(&employee()).await.unwrap(), 2_500);
        assert_eq!(exec.company_funds(&company()).await.unwrap(), 7_500);

        exec.withdraw(&employee()).await.unwrap();
        assert_eq!(exec.balance(&employee()).await.unwrap(), 0);
        // Deposit and stream creation each carried exactly one ciphertext
        assert_eq!(rig.contract.submissions(), 2);
    }

    #[tokio::test]
    async fn test_operations_blocked_before_ready() {
        let rig = build_app();

        let result = rig.app.executor.deposit(&company(), 100).await;
        assert!(matches!(result, Err(ExecutorError::ChannelNotReady)));
        assert_eq!(rig.contract.submissions(), 0);
    }

    #[tokio::test]
    async fn test_operations_blocked_after_disconnect() {
        let rig = ready_app().await;
        rig.app.executor.deposit(&company(), 100).await.unwrap();

        rig.app.gateway.disconnect().await;
        wait_for_state(&rig, ReadinessState::Idle).await;

        let result = rig.app.executor.deposit(&company(), 100).await;
        assert!(matches!(result, Err(ExecutorError::ChannelNotReady)));
        assert_eq!(rig.contract.submissions(), 1);
    }

    #[tokio::test]
    async fn test_failed_submission_retries_with_fresh_ciphertext() {
        let rig = ready_app().await;
        rig.contract
            .set_fail_next(ContractError::Failed("reverted".to_string()));

        let result = rig.app.executor.deposit(&company(), 500).await;
        assert!(matches!(result, Err(ExecutorError::TransactionFailed(_))));

        // The caller retries; a new value is encrypted for the new attempt
        rig.app.executor.deposit(&company(), 500).await.unwrap();
        assert_eq!(rig.app.executor.company_funds(&company()).await.unwrap(), 500);

        let ops = rig.app.executor.operations();
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[0].status, OperationStatus::Failed);
        assert_eq!(ops[1].status, OperationStatus::Confirmed);
    }

    #[tokio::test]
    async fn test_denied_read_authorization_prompts_exactly_once() {
        let rig = ready_app().await;
        rig.app.executor.deposit(&company(), 100).await.unwrap();
        let base = rig.provider.signature_requests();

        rig.provider.set_reject_signatures(true);
        let result = rig.app.executor.company_funds(&company()).await;
        assert!(matches!(result, Err(ExecutorError::AuthorizationDenied)));
        assert_eq!(rig.provider.signature_requests(), base + 1);

        // No automatic re-prompt after a denial
        sleep(Duration::from_millis(100)).await;
        assert_eq!(rig.provider.signature_requests(), base + 1);

        rig.provider.set_reject_signatures(false);
        assert_eq!(rig.app.executor.company_funds(&company()).await.unwrap(), 100);
    }

    #[tokio::test]
    async fn test_each_read_is_one_authorization() {
        let rig = ready_app().await;
        rig.app.executor.deposit(&company(), 100).await.unwrap();
        let base = rig.provider.signature_requests();

        rig.app.executor.company_funds(&company()).await.unwrap();
        rig.app.executor.company_funds(&company()).await.unwrap();

        assert_eq!(rig.provider.signature_requests(), base + 2);
        assert_eq!(rig.fhe.decrypt_calls(), 2);
    }

    #[tokio::test]
    async fn test_pause_and_resume_stream() {
        let rig = ready_app().await;
        rig.app
            .executor
            .create_stream(&company(), &employee(), 300)
            .await
            .unwrap();

        rig.app
            .executor
            .set_stream_active(&company(), &employee(), false)
            .await
            .unwrap();
        assert!(!rig
            .app
            .executor
            .is_stream_active(&company(), &employee())
            .await
            .unwrap());

        rig.app
            .executor
            .set_stream_active(&company(), &employee(), true)
            .await
            .unwrap();
        assert!(rig
            .app
            .executor
            .is_stream_active(&company(), &employee())
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_operation_outcomes_reach_the_bus() {
        let rig = ready_app().await;
        let mut sub = rig
            .app
            .bus
            .subscribe(EventFilter::topics(vec![EventTopic::Operation]));

        let tx = rig.app.executor.deposit(&company(), 100).await.unwrap();
        let event = timeout(Duration::from_secs(2), sub.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(
            event,
            PayrollEvent::OperationConfirmed { tx_hash } if tx_hash == tx
        ));

        rig.contract.set_fail_next(ContractError::Rejected);
        let result = rig.app.executor.deposit(&company(), 100).await;
        assert!(matches!(result, Err(ExecutorError::TransactionRejected)));
        let event = timeout(Duration::from_secs(2), sub.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(event, PayrollEvent::OperationFailed { .. }));
    }

    #[tokio::test]
    async fn test_update_stream_takes_effect() {
        let rig = ready_app().await;
        rig.app
            .executor
            .create_stream(&company(), &employee(), 200)
            .await
            .unwrap();
        rig.app
            .executor
            .update_stream(&company(), &employee(), 350)
            .await
            .unwrap();

        assert_eq!(
            rig.app
                .executor
                .salary(&company(), &employee())
                .await
                .unwrap(),
            350
        );
    }
}

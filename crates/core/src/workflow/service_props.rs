//! Property-based tests for the expense state machine.

use proptest::prelude::*;
use uuid::Uuid;

use crate::workflow::error::WorkflowError;
use crate::workflow::service::WorkflowService;
use crate::workflow::types::ExpenseStatus;

/// Strategy for generating any expense status.
fn arb_status() -> impl Strategy<Value = ExpenseStatus> {
    prop_oneof![
        Just(ExpenseStatus::Draft),
        Just(ExpenseStatus::Pending),
        Just(ExpenseStatus::Approved),
        Just(ExpenseStatus::Rejected),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Approval succeeds exactly from Pending.
    #[test]
    fn prop_approve_only_from_pending(status in arb_status()) {
        let result = WorkflowService::approve(status, Uuid::new_v4());
        if status == ExpenseStatus::Pending {
            prop_assert!(result.is_ok());
            prop_assert_eq!(result.unwrap().new_status(), ExpenseStatus::Approved);
        } else {
            prop_assert!(
                matches!(result, Err(WorkflowError::InvalidTransition { .. })),
                "expected InvalidTransition error"
            );
        }
    }

    /// Rejection with a real reason succeeds exactly from Pending.
    #[test]
    fn prop_reject_only_from_pending(status in arb_status(), reason in "[a-z]{1,40}") {
        let result = WorkflowService::reject(status, Uuid::new_v4(), reason);
        if status == ExpenseStatus::Pending {
            prop_assert!(result.is_ok());
            prop_assert_eq!(result.unwrap().new_status(), ExpenseStatus::Rejected);
        } else {
            prop_assert!(
                matches!(result, Err(WorkflowError::InvalidTransition { .. })),
                "expected InvalidTransition error"
            );
        }
    }

    /// A blank reason is rejected before the transition is even considered.
    #[test]
    fn prop_blank_reason_always_fails(status in arb_status(), spaces in " {0,10}") {
        let result = WorkflowService::reject(status, Uuid::new_v4(), spaces);
        prop_assert!(matches!(result, Err(WorkflowError::RejectionReasonRequired)));
    }

    /// The transition table admits exactly Pending→Approved and Pending→Rejected.
    #[test]
    fn prop_transition_table_is_exact(from in arb_status(), to in arb_status()) {
        let expected = from == ExpenseStatus::Pending
            && matches!(to, ExpenseStatus::Approved | ExpenseStatus::Rejected);
        prop_assert_eq!(WorkflowService::is_valid_transition(from, to), expected);
    }
}

//! Workflow service for expense state transitions.
//!
//! This module implements the core state machine logic for
//! transitioning expenses through the approval workflow.

use chrono::Utc;
use uuid::Uuid;

use crate::workflow::error::WorkflowError;
use crate::workflow::types::{ExpenseStatus, WorkflowAction};

/// Stateless service for managing expense workflow transitions.
///
/// All methods are associated functions that validate and execute
/// state transitions, returning the appropriate `WorkflowAction`
/// with audit trail information.
pub struct WorkflowService;

impl WorkflowService {
    /// Approves a pending expense.
    ///
    /// # Arguments
    /// * `current_status` - The current status of the expense
    /// * `approved_by` - The user approving the expense
    ///
    /// # Returns
    /// * `Ok(WorkflowAction::Approve)` if the transition is valid
    /// * `Err(WorkflowError::InvalidTransition)` if not in Pending status
    pub fn approve(
        current_status: ExpenseStatus,
        approved_by: Uuid,
    ) -> Result<WorkflowAction, WorkflowError> {
        match current_status {
            ExpenseStatus::Pending => Ok(WorkflowAction::Approve {
                new_status: ExpenseStatus::Approved,
                approved_by,
                approved_at: Utc::now(),
            }),
            _ => Err(WorkflowError::InvalidTransition {
                from: current_status,
                to: ExpenseStatus::Approved,
            }),
        }
    }

    /// Rejects a pending expense.
    ///
    /// # Arguments
    /// * `current_status` - The current status of the expense
    /// * `rejected_by` - The user rejecting the expense
    /// * `rejection_reason` - The reason for rejection (required)
    ///
    /// # Returns
    /// * `Ok(WorkflowAction::Reject)` if the transition is valid
    /// * `Err(WorkflowError::InvalidTransition)` if not in Pending status
    /// * `Err(WorkflowError::RejectionReasonRequired)` if reason is empty
    pub fn reject(
        current_status: ExpenseStatus,
        rejected_by: Uuid,
        rejection_reason: String,
    ) -> Result<WorkflowAction, WorkflowError> {
        if rejection_reason.trim().is_empty() {
            return Err(WorkflowError::RejectionReasonRequired);
        }

        match current_status {
            ExpenseStatus::Pending => Ok(WorkflowAction::Reject {
                new_status: ExpenseStatus::Rejected,
                rejected_by,
                rejected_at: Utc::now(),
                rejection_reason,
            }),
            _ => Err(WorkflowError::InvalidTransition {
                from: current_status,
                to: ExpenseStatus::Rejected,
            }),
        }
    }

    /// Checks if a status transition is valid.
    ///
    /// Valid transitions:
    /// - Pending → Approved (approve)
    /// - Pending → Rejected (reject)
    ///
    /// `Draft` is a reserved dead-end: nothing transitions into or out of it.
    ///
    /// # Arguments
    /// * `from` - The current status
    /// * `to` - The target status
    ///
    /// # Returns
    /// `true` if the transition is valid, `false` otherwise
    #[must_use]
    pub fn is_valid_transition(from: ExpenseStatus, to: ExpenseStatus) -> bool {
        matches!(
            (from, to),
            (
                ExpenseStatus::Pending,
                ExpenseStatus::Approved | ExpenseStatus::Rejected
            )
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approve_from_pending() {
        let user_id = Uuid::new_v4();
        let result = WorkflowService::approve(ExpenseStatus::Pending, user_id);
        assert!(result.is_ok());
        let action = result.unwrap();
        assert_eq!(action.new_status(), ExpenseStatus::Approved);
    }

    #[test]
    fn test_approve_from_approved_fails() {
        let user_id = Uuid::new_v4();
        let result = WorkflowService::approve(ExpenseStatus::Approved, user_id);
        assert!(matches!(
            result,
            Err(WorkflowError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_approve_from_rejected_fails() {
        let user_id = Uuid::new_v4();
        let result = WorkflowService::approve(ExpenseStatus::Rejected, user_id);
        assert!(matches!(
            result,
            Err(WorkflowError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_approve_from_draft_fails() {
        let user_id = Uuid::new_v4();
        let result = WorkflowService::approve(ExpenseStatus::Draft, user_id);
        assert!(matches!(
            result,
            Err(WorkflowError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_reject_from_pending() {
        let user_id = Uuid::new_v4();
        let result = WorkflowService::reject(
            ExpenseStatus::Pending,
            user_id,
            "Missing receipt".to_string(),
        );
        assert!(result.is_ok());
        let action = result.unwrap();
        assert_eq!(action.new_status(), ExpenseStatus::Rejected);
        match action {
            WorkflowAction::Reject {
                rejected_by,
                rejection_reason,
                ..
            } => {
                assert_eq!(rejected_by, user_id);
                assert_eq!(rejection_reason, "Missing receipt");
            }
            WorkflowAction::Approve { .. } => panic!("expected Reject action"),
        }
    }

    #[test]
    fn test_reject_empty_reason_fails() {
        let result =
            WorkflowService::reject(ExpenseStatus::Pending, Uuid::new_v4(), String::new());
        assert!(matches!(
            result,
            Err(WorkflowError::RejectionReasonRequired)
        ));
    }

    #[test]
    fn test_reject_whitespace_reason_fails() {
        let result =
            WorkflowService::reject(ExpenseStatus::Pending, Uuid::new_v4(), "   ".to_string());
        assert!(matches!(
            result,
            Err(WorkflowError::RejectionReasonRequired)
        ));
    }

    #[test]
    fn test_reject_from_resolved_fails() {
        let result = WorkflowService::reject(
            ExpenseStatus::Approved,
            Uuid::new_v4(),
            "Too late".to_string(),
        );
        assert!(matches!(
            result,
            Err(WorkflowError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_is_valid_transition() {
        // Valid transitions
        assert!(WorkflowService::is_valid_transition(
            ExpenseStatus::Pending,
            ExpenseStatus::Approved
        ));
        assert!(WorkflowService::is_valid_transition(
            ExpenseStatus::Pending,
            ExpenseStatus::Rejected
        ));

        // Invalid transitions
        assert!(!WorkflowService::is_valid_transition(
            ExpenseStatus::Approved,
            ExpenseStatus::Pending
        ));
        assert!(!WorkflowService::is_valid_transition(
            ExpenseStatus::Rejected,
            ExpenseStatus::Approved
        ));
        assert!(!WorkflowService::is_valid_transition(
            ExpenseStatus::Draft,
            ExpenseStatus::Pending
        ));
        assert!(!WorkflowService::is_valid_transition(
            ExpenseStatus::Pending,
            ExpenseStatus::Draft
        ));
    }
}

//! Workflow error types for expense lifecycle management.
//!
//! This module defines all error types that can occur during
//! workflow operations such as status transitions and approvals.

use thiserror::Error;
use uuid::Uuid;

use crate::workflow::types::ExpenseStatus;

/// Errors that can occur during workflow operations.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Attempted an invalid status transition.
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition {
        /// The current status.
        from: ExpenseStatus,
        /// The attempted target status.
        to: ExpenseStatus,
    },

    /// Caller's role does not meet the required approver role.
    #[error("Role {actor_role} does not meet required approver role {required_role}")]
    InsufficientRole {
        /// The caller's role.
        actor_role: String,
        /// The role required to approve this expense.
        required_role: String,
    },

    /// Rejection reason is required but not provided.
    #[error("Rejection reason is required")]
    RejectionReasonRequired,

    /// Expense not found.
    #[error("Expense {0} not found")]
    ExpenseNotFound(Uuid),

    /// Lost an optimistic update race against a concurrent resolution.
    #[error("Expense {0} was resolved by a concurrent request")]
    Conflict(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl WorkflowError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidTransition { .. } | Self::RejectionReasonRequired => 400,
            Self::InsufficientRole { .. } => 403,
            Self::ExpenseNotFound(_) => 404,
            Self::Conflict(_) => 409,
            Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::InsufficientRole { .. } => "INSUFFICIENT_ROLE",
            Self::RejectionReasonRequired => "REJECTION_REASON_REQUIRED",
            Self::ExpenseNotFound(_) => "EXPENSE_NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_transition_error() {
        let err = WorkflowError::InvalidTransition {
            from: ExpenseStatus::Approved,
            to: ExpenseStatus::Pending,
        };
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.error_code(), "INVALID_TRANSITION");
        assert!(err.to_string().contains("approved"));
        assert!(err.to_string().contains("pending"));
    }

    #[test]
    fn test_insufficient_role_error() {
        let err = WorkflowError::InsufficientRole {
            actor_role: "manager".to_string(),
            required_role: "admin".to_string(),
        };
        assert_eq!(err.status_code(), 403);
        assert_eq!(err.error_code(), "INSUFFICIENT_ROLE");
    }

    #[test]
    fn test_rejection_reason_required_error() {
        let err = WorkflowError::RejectionReasonRequired;
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.error_code(), "REJECTION_REASON_REQUIRED");
    }

    #[test]
    fn test_expense_not_found_error() {
        let err = WorkflowError::ExpenseNotFound(Uuid::nil());
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.error_code(), "EXPENSE_NOT_FOUND");
    }

    #[test]
    fn test_conflict_error() {
        let err = WorkflowError::Conflict(Uuid::nil());
        assert_eq!(err.status_code(), 409);
        assert_eq!(err.error_code(), "CONFLICT");
        assert!(err.to_string().contains("concurrent"));
    }

    #[test]
    fn test_database_error() {
        let err = WorkflowError::Database("connection refused".to_string());
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.error_code(), "DATABASE_ERROR");
    }
}

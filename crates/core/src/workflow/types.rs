//! Workflow domain types for expense lifecycle management.
//!
//! This module defines the core types used for managing expense
//! status transitions and workflow actions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Expense status in the approval workflow.
///
/// Expenses progress through these states from submission to resolution.
/// The valid transitions are:
/// - Pending → Approved (approve)
/// - Pending → Rejected (reject)
///
/// `Draft` is reserved for future draft-save behavior: the submission flow
/// always creates expenses as `Pending`, and no transition into or out of
/// `Draft` is defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseStatus {
    /// Reserved dead-end state, unreachable through the submission flow.
    Draft,
    /// Expense has been submitted and awaits approval.
    Pending,
    /// Expense has been approved (immutable).
    Approved,
    /// Expense has been rejected (immutable).
    Rejected,
}

impl ExpenseStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Returns true if the expense has been resolved (approved or rejected).
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }
}

impl fmt::Display for ExpenseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Expense category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseCategory {
    /// Travel expenses (flights, hotels, taxis).
    Travel,
    /// Meals and entertainment.
    Meals,
    /// Office supplies.
    Office,
    /// Equipment purchases.
    Equipment,
    /// Anything else.
    Other,
}

impl ExpenseCategory {
    /// Returns the string representation of the category.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Travel => "travel",
            Self::Meals => "meals",
            Self::Office => "office",
            Self::Equipment => "equipment",
            Self::Other => "other",
        }
    }

    /// Parses a category from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "travel" => Some(Self::Travel),
            "meals" => Some(Self::Meals),
            "office" => Some(Self::Office),
            "equipment" => Some(Self::Equipment),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Workflow action representing a state transition with audit data.
///
/// Each variant captures the action performed, the resulting status,
/// and the audit trail information (who, when, why).
#[derive(Debug, Clone)]
pub enum WorkflowAction {
    /// Approve a pending expense.
    Approve {
        /// The new status after approval.
        new_status: ExpenseStatus,
        /// The user who approved the expense.
        approved_by: Uuid,
        /// When the expense was approved.
        approved_at: DateTime<Utc>,
    },
    /// Reject a pending expense.
    Reject {
        /// The new status after rejection.
        new_status: ExpenseStatus,
        /// The user who rejected the expense.
        rejected_by: Uuid,
        /// When the expense was rejected.
        rejected_at: DateTime<Utc>,
        /// The reason for rejection.
        rejection_reason: String,
    },
}

impl WorkflowAction {
    /// Returns the new status resulting from this action.
    #[must_use]
    pub fn new_status(&self) -> ExpenseStatus {
        match self {
            Self::Approve { new_status, .. } | Self::Reject { new_status, .. } => *new_status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_as_str() {
        assert_eq!(ExpenseStatus::Draft.as_str(), "draft");
        assert_eq!(ExpenseStatus::Pending.as_str(), "pending");
        assert_eq!(ExpenseStatus::Approved.as_str(), "approved");
        assert_eq!(ExpenseStatus::Rejected.as_str(), "rejected");
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!(ExpenseStatus::parse("draft"), Some(ExpenseStatus::Draft));
        assert_eq!(ExpenseStatus::parse("PENDING"), Some(ExpenseStatus::Pending));
        assert_eq!(
            ExpenseStatus::parse("Approved"),
            Some(ExpenseStatus::Approved)
        );
        assert_eq!(
            ExpenseStatus::parse("rejected"),
            Some(ExpenseStatus::Rejected)
        );
        assert_eq!(ExpenseStatus::parse("invalid"), None);
    }

    #[test]
    fn test_status_display() {
        assert_eq!(format!("{}", ExpenseStatus::Pending), "pending");
        assert_eq!(format!("{}", ExpenseStatus::Rejected), "rejected");
    }

    #[test]
    fn test_status_resolved() {
        assert!(!ExpenseStatus::Draft.is_resolved());
        assert!(!ExpenseStatus::Pending.is_resolved());
        assert!(ExpenseStatus::Approved.is_resolved());
        assert!(ExpenseStatus::Rejected.is_resolved());
    }

    #[test]
    fn test_category_roundtrip() {
        for cat in [
            ExpenseCategory::Travel,
            ExpenseCategory::Meals,
            ExpenseCategory::Office,
            ExpenseCategory::Equipment,
            ExpenseCategory::Other,
        ] {
            assert_eq!(ExpenseCategory::parse(cat.as_str()), Some(cat));
        }
        assert_eq!(ExpenseCategory::parse("groceries"), None);
    }

    #[test]
    fn test_action_new_status() {
        let action = WorkflowAction::Approve {
            new_status: ExpenseStatus::Approved,
            approved_by: Uuid::new_v4(),
            approved_at: Utc::now(),
        };
        assert_eq!(action.new_status(), ExpenseStatus::Approved);
    }
}

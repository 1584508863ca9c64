//! Centralized authorization policy.
//!
//! Every mutating operation consults this single allow/deny table instead
//! of re-implementing role checks per handler. Denials carry the reason
//! shown to the caller.

use thiserror::Error;

use crate::workflow::approval::UserRole;

/// An action a caller may attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Submit a new expense claim.
    SubmitExpense,
    /// Approve or reject a pending expense.
    ResolveExpense,
    /// Delete an expense. `is_owner` is true when the caller submitted it.
    DeleteExpense {
        /// Whether the caller owns the expense.
        is_owner: bool,
    },
    /// List every expense in the company (not just one's own).
    ViewAllExpenses,
    /// View the company user roster.
    ViewRoster,
    /// Create users or change their role/manager.
    ManageUsers,
    /// Update company name, currency, or approval threshold.
    ManageCompany,
    /// Create, update, toggle, or delete approval rules.
    ManageRules,
}

/// A denied authorization decision, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct PolicyDenied {
    /// Human-readable reason for the denial.
    pub reason: &'static str,
}

const fn denied(reason: &'static str) -> Result<(), PolicyDenied> {
    Err(PolicyDenied { reason })
}

/// Decides whether `role` may perform `action`.
///
/// # Errors
///
/// Returns `PolicyDenied` with a caller-facing reason when the role is
/// insufficient.
pub fn authorize(role: UserRole, action: Action) -> Result<(), PolicyDenied> {
    match action {
        Action::SubmitExpense => Ok(()),

        Action::ResolveExpense | Action::ViewAllExpenses | Action::ViewRoster => {
            if role >= UserRole::Manager {
                Ok(())
            } else {
                denied("Manager or admin role required")
            }
        }

        Action::DeleteExpense { is_owner } => {
            if is_owner || role == UserRole::Admin {
                Ok(())
            } else {
                denied("Only the expense owner or an admin can delete an expense")
            }
        }

        Action::ManageUsers | Action::ManageCompany | Action::ManageRules => {
            if role == UserRole::Admin {
                Ok(())
            } else {
                denied("Admin role required")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(UserRole::Employee, true)]
    #[case(UserRole::Manager, true)]
    #[case(UserRole::Admin, true)]
    fn test_anyone_submits(#[case] role: UserRole, #[case] allowed: bool) {
        assert_eq!(authorize(role, Action::SubmitExpense).is_ok(), allowed);
    }

    #[rstest]
    #[case(UserRole::Employee, false)]
    #[case(UserRole::Manager, true)]
    #[case(UserRole::Admin, true)]
    fn test_resolution_needs_manager(#[case] role: UserRole, #[case] allowed: bool) {
        assert_eq!(authorize(role, Action::ResolveExpense).is_ok(), allowed);
        assert_eq!(authorize(role, Action::ViewAllExpenses).is_ok(), allowed);
        assert_eq!(authorize(role, Action::ViewRoster).is_ok(), allowed);
    }

    #[rstest]
    #[case(UserRole::Employee, false)]
    #[case(UserRole::Manager, false)]
    #[case(UserRole::Admin, true)]
    fn test_admin_only_actions(#[case] role: UserRole, #[case] allowed: bool) {
        assert_eq!(authorize(role, Action::ManageUsers).is_ok(), allowed);
        assert_eq!(authorize(role, Action::ManageCompany).is_ok(), allowed);
        assert_eq!(authorize(role, Action::ManageRules).is_ok(), allowed);
    }

    #[test]
    fn test_delete_owner_or_admin() {
        // Owner may always delete, regardless of role.
        assert!(authorize(UserRole::Employee, Action::DeleteExpense { is_owner: true }).is_ok());
        // Admin may delete anything.
        assert!(authorize(UserRole::Admin, Action::DeleteExpense { is_owner: false }).is_ok());
        // A manager cannot delete someone else's expense.
        let err =
            authorize(UserRole::Manager, Action::DeleteExpense { is_owner: false }).unwrap_err();
        assert!(err.reason.contains("owner"));
    }
}

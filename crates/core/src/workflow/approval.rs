//! Approval rules engine for expense authorization.
//!
//! This module decides whether an expense auto-approves under the company
//! threshold and, if not, which approver role the company's conditional
//! rules require. It also checks whether a given caller satisfies that
//! requirement.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::workflow::error::WorkflowError;
use crate::workflow::types::ExpenseCategory;

/// User role in the company hierarchy.
///
/// Roles are ordered from lowest to highest privilege.
/// Higher roles can perform all actions of lower roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Can submit and view their own expenses.
    Employee = 0,
    /// Can approve or reject expenses in their company.
    Manager = 1,
    /// Full access: company settings, users, rules, all approvals.
    Admin = 2,
}

impl UserRole {
    /// Parses a role from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "employee" => Some(Self::Employee),
            "manager" => Some(Self::Manager),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    /// Returns the string representation of the role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Employee => "employee",
            Self::Manager => "manager",
            Self::Admin => "admin",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The condition under which an approval rule matches an expense.
///
/// Amount rules match strictly above their threshold; category rules match
/// on category equality. The two variants replace a loosely-typed
/// number-or-string value field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleCondition {
    /// Matches expenses with `amount > threshold` (strict).
    Amount(Decimal),
    /// Matches expenses of exactly this category.
    Category(ExpenseCategory),
}

/// An approval rule that determines who must approve matching expenses.
#[derive(Debug, Clone)]
pub struct ApprovalRule {
    /// Unique identifier for the rule.
    pub id: Uuid,
    /// Human-readable name for the rule.
    pub name: String,
    /// The matching condition.
    pub condition: RuleCondition,
    /// The role required to approve matching expenses.
    pub approver_role: UserRole,
    /// Disabled rules are stored but never consulted.
    pub enabled: bool,
}

impl ApprovalRule {
    /// Returns true if this rule is enabled and matches the expense.
    #[must_use]
    pub fn matches(&self, amount: Decimal, category: ExpenseCategory) -> bool {
        if !self.enabled {
            return false;
        }
        match self.condition {
            RuleCondition::Amount(threshold) => amount > threshold,
            RuleCondition::Category(cat) => category == cat,
        }
    }
}

/// The approver requirement computed for an expense.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredApprover {
    /// Below the company threshold; no human review needed.
    AutoApproved,
    /// Requires an approver with at least this role.
    Role(UserRole),
}

/// Stateless engine for evaluating approval rules.
pub struct ApprovalEngine;

impl ApprovalEngine {
    /// Determines the required approver for an expense.
    ///
    /// Amounts strictly below the company threshold auto-approve; amounts
    /// equal to the threshold require review. Otherwise the enabled rules
    /// are matched and the highest-privilege approver role among the
    /// matches wins (admin > manager), defaulting to manager when nothing
    /// matches. The result is deterministic and independent of rule order.
    ///
    /// # Arguments
    /// * `amount` - The expense amount
    /// * `category` - The expense category
    /// * `approval_threshold` - The company's auto-approval threshold
    /// * `rules` - The company's approval rules
    #[must_use]
    pub fn evaluate(
        amount: Decimal,
        category: ExpenseCategory,
        approval_threshold: Decimal,
        rules: &[ApprovalRule],
    ) -> RequiredApprover {
        if amount < approval_threshold {
            return RequiredApprover::AutoApproved;
        }

        let required = rules
            .iter()
            .filter(|r| r.matches(amount, category))
            .map(|r| r.approver_role)
            .max()
            .unwrap_or(UserRole::Manager);

        RequiredApprover::Role(required)
    }

    /// Checks whether a caller satisfies the computed approver requirement.
    ///
    /// Employees never approve. A manager satisfies `AutoApproved` and
    /// `Role(Manager)`; only an admin satisfies `Role(Admin)`.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::InsufficientRole` if the caller's role is
    /// below the requirement.
    pub fn can_approve(
        actor_role: UserRole,
        required: RequiredApprover,
    ) -> Result<(), WorkflowError> {
        let required_role = match required {
            // Auto-approved expenses that are still pending (e.g. the
            // threshold was raised after submission) fall back to the
            // ordinary approver bar.
            RequiredApprover::AutoApproved | RequiredApprover::Role(UserRole::Employee) => {
                UserRole::Manager
            }
            RequiredApprover::Role(role) => role,
        };

        if actor_role < required_role {
            return Err(WorkflowError::InsufficientRole {
                actor_role: actor_role.as_str().to_string(),
                required_role: required_role.as_str().to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn amount_rule(threshold: Decimal, approver: UserRole) -> ApprovalRule {
        ApprovalRule {
            id: Uuid::new_v4(),
            name: format!("amount over {threshold}"),
            condition: RuleCondition::Amount(threshold),
            approver_role: approver,
            enabled: true,
        }
    }

    fn category_rule(category: ExpenseCategory, approver: UserRole) -> ApprovalRule {
        ApprovalRule {
            id: Uuid::new_v4(),
            name: format!("category {category}"),
            condition: RuleCondition::Category(category),
            approver_role: approver,
            enabled: true,
        }
    }

    #[test]
    fn test_user_role_from_str() {
        assert_eq!(UserRole::parse("employee"), Some(UserRole::Employee));
        assert_eq!(UserRole::parse("MANAGER"), Some(UserRole::Manager));
        assert_eq!(UserRole::parse("Admin"), Some(UserRole::Admin));
        assert_eq!(UserRole::parse("owner"), None);
    }

    #[test]
    fn test_user_role_ordering() {
        assert!(UserRole::Employee < UserRole::Manager);
        assert!(UserRole::Manager < UserRole::Admin);
    }

    #[test]
    fn test_below_threshold_auto_approves() {
        let rules = vec![amount_rule(dec!(500), UserRole::Manager)];
        let result =
            ApprovalEngine::evaluate(dec!(400), ExpenseCategory::Meals, dec!(1000), &rules);
        assert_eq!(result, RequiredApprover::AutoApproved);
    }

    #[test]
    fn test_equal_to_threshold_requires_review() {
        // Boundary is exclusive: amount == threshold goes to a manager.
        let result = ApprovalEngine::evaluate(dec!(1000), ExpenseCategory::Meals, dec!(1000), &[]);
        assert_eq!(result, RequiredApprover::Role(UserRole::Manager));
    }

    #[test]
    fn test_empty_rule_set_defaults_to_manager() {
        let result = ApprovalEngine::evaluate(dec!(5000), ExpenseCategory::Other, dec!(1000), &[]);
        assert_eq!(result, RequiredApprover::Role(UserRole::Manager));
    }

    #[test]
    fn test_amount_rule_boundary_is_strict() {
        let rules = vec![amount_rule(dec!(500), UserRole::Admin)];

        // amount == rule value does not match
        let result =
            ApprovalEngine::evaluate(dec!(500), ExpenseCategory::Meals, dec!(100), &rules);
        assert_eq!(result, RequiredApprover::Role(UserRole::Manager));

        // one cent above does
        let result =
            ApprovalEngine::evaluate(dec!(500.01), ExpenseCategory::Meals, dec!(100), &rules);
        assert_eq!(result, RequiredApprover::Role(UserRole::Admin));
    }

    #[test]
    fn test_category_rule_matches_only_its_category() {
        let rules = vec![category_rule(ExpenseCategory::Travel, UserRole::Admin)];

        let travel =
            ApprovalEngine::evaluate(dec!(2000), ExpenseCategory::Travel, dec!(1000), &rules);
        assert_eq!(travel, RequiredApprover::Role(UserRole::Admin));

        let meals =
            ApprovalEngine::evaluate(dec!(2000), ExpenseCategory::Meals, dec!(1000), &rules);
        assert_eq!(meals, RequiredApprover::Role(UserRole::Manager));
    }

    #[test]
    fn test_highest_privilege_wins() {
        // Company threshold 1000. Rule A: amount > 500 -> manager.
        // Rule B: category travel -> admin.
        let rules = vec![
            amount_rule(dec!(500), UserRole::Manager),
            category_rule(ExpenseCategory::Travel, UserRole::Admin),
        ];

        // $600 travel matches both; admin outranks manager.
        let result =
            ApprovalEngine::evaluate(dec!(600), ExpenseCategory::Travel, dec!(1000), &rules);
        assert_eq!(result, RequiredApprover::AutoApproved);

        // Above threshold so the rules actually decide.
        let result =
            ApprovalEngine::evaluate(dec!(1600), ExpenseCategory::Travel, dec!(1000), &rules);
        assert_eq!(result, RequiredApprover::Role(UserRole::Admin));

        // Travel rule out of the picture: only the amount rule matches.
        let result =
            ApprovalEngine::evaluate(dec!(1600), ExpenseCategory::Meals, dec!(1000), &rules);
        assert_eq!(result, RequiredApprover::Role(UserRole::Manager));
    }

    #[test]
    fn test_scenario_from_company_handbook() {
        // Threshold $1000, rules as configured by the demo tenant, with a
        // zero threshold so $600 is not auto-approved.
        let rules = vec![
            amount_rule(dec!(500), UserRole::Manager),
            category_rule(ExpenseCategory::Travel, UserRole::Admin),
        ];

        let travel = ApprovalEngine::evaluate(dec!(600), ExpenseCategory::Travel, dec!(0), &rules);
        assert_eq!(travel, RequiredApprover::Role(UserRole::Admin));

        let meals = ApprovalEngine::evaluate(dec!(600), ExpenseCategory::Meals, dec!(0), &rules);
        assert_eq!(meals, RequiredApprover::Role(UserRole::Manager));

        let small =
            ApprovalEngine::evaluate(dec!(400), ExpenseCategory::Travel, dec!(1000), &rules);
        assert_eq!(small, RequiredApprover::AutoApproved);
    }

    #[test]
    fn test_disabled_rule_is_invisible() {
        let mut rule = category_rule(ExpenseCategory::Travel, UserRole::Admin);
        let enabled_result = ApprovalEngine::evaluate(
            dec!(2000),
            ExpenseCategory::Travel,
            dec!(1000),
            std::slice::from_ref(&rule),
        );
        assert_eq!(enabled_result, RequiredApprover::Role(UserRole::Admin));

        rule.enabled = false;
        let disabled_result = ApprovalEngine::evaluate(
            dec!(2000),
            ExpenseCategory::Travel,
            dec!(1000),
            std::slice::from_ref(&rule),
        );
        assert_eq!(disabled_result, RequiredApprover::Role(UserRole::Manager));
    }

    #[test]
    fn test_can_approve_manager_requirement() {
        let required = RequiredApprover::Role(UserRole::Manager);
        assert!(ApprovalEngine::can_approve(UserRole::Manager, required).is_ok());
        assert!(ApprovalEngine::can_approve(UserRole::Admin, required).is_ok());
        assert!(matches!(
            ApprovalEngine::can_approve(UserRole::Employee, required),
            Err(WorkflowError::InsufficientRole { .. })
        ));
    }

    #[test]
    fn test_can_approve_admin_requirement() {
        let required = RequiredApprover::Role(UserRole::Admin);
        assert!(ApprovalEngine::can_approve(UserRole::Admin, required).is_ok());
        assert!(matches!(
            ApprovalEngine::can_approve(UserRole::Manager, required),
            Err(WorkflowError::InsufficientRole { .. })
        ));
    }

    #[test]
    fn test_can_approve_auto_approved_still_needs_manager() {
        let required = RequiredApprover::AutoApproved;
        assert!(ApprovalEngine::can_approve(UserRole::Manager, required).is_ok());
        assert!(matches!(
            ApprovalEngine::can_approve(UserRole::Employee, required),
            Err(WorkflowError::InsufficientRole { .. })
        ));
    }
}

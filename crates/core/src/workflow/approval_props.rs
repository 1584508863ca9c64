//! Property-based tests for the approval rules engine.
//!
//! These validate that rule evaluation is deterministic, order-independent,
//! and monotone in approver privilege.

use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::workflow::approval::{
    ApprovalEngine, ApprovalRule, RequiredApprover, RuleCondition, UserRole,
};
use crate::workflow::types::ExpenseCategory;

/// Strategy for generating random positive Decimal amounts.
fn arb_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Strategy for generating random expense categories.
fn arb_category() -> impl Strategy<Value = ExpenseCategory> {
    prop_oneof![
        Just(ExpenseCategory::Travel),
        Just(ExpenseCategory::Meals),
        Just(ExpenseCategory::Office),
        Just(ExpenseCategory::Equipment),
        Just(ExpenseCategory::Other),
    ]
}

/// Strategy for generating approver roles (rules only name manager/admin).
fn arb_approver_role() -> impl Strategy<Value = UserRole> {
    prop_oneof![Just(UserRole::Manager), Just(UserRole::Admin)]
}

/// Strategy for generating a single approval rule.
fn arb_rule() -> impl Strategy<Value = ApprovalRule> {
    (
        prop_oneof![
            arb_amount().prop_map(RuleCondition::Amount),
            arb_category().prop_map(RuleCondition::Category),
        ],
        arb_approver_role(),
        any::<bool>(),
    )
        .prop_map(|(condition, approver_role, enabled)| ApprovalRule {
            id: Uuid::new_v4(),
            name: "generated".to_string(),
            condition,
            approver_role,
            enabled,
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Amounts strictly below the threshold always auto-approve,
    /// no matter what rules exist.
    #[test]
    fn prop_below_threshold_auto_approves(
        amount in arb_amount(),
        category in arb_category(),
        rules in prop::collection::vec(arb_rule(), 0..8),
    ) {
        let threshold = amount + Decimal::new(1, 2);
        let result = ApprovalEngine::evaluate(amount, category, threshold, &rules);
        prop_assert_eq!(result, RequiredApprover::AutoApproved);
    }

    /// Amounts at or above the threshold never auto-approve.
    #[test]
    fn prop_at_or_above_threshold_requires_review(
        amount in arb_amount(),
        category in arb_category(),
        rules in prop::collection::vec(arb_rule(), 0..8),
    ) {
        let result = ApprovalEngine::evaluate(amount, category, amount, &rules);
        prop_assert!(matches!(result, RequiredApprover::Role(_)));
    }

    /// Evaluation is independent of rule ordering.
    #[test]
    fn prop_rule_order_is_irrelevant(
        amount in arb_amount(),
        category in arb_category(),
        threshold in arb_amount(),
        rules in prop::collection::vec(arb_rule(), 0..8),
    ) {
        let forward = ApprovalEngine::evaluate(amount, category, threshold, &rules);

        let mut reversed = rules.clone();
        reversed.reverse();
        prop_assert_eq!(
            forward,
            ApprovalEngine::evaluate(amount, category, threshold, &reversed)
        );

        if !rules.is_empty() {
            let mut rotated = rules;
            rotated.rotate_left(1);
            prop_assert_eq!(
                forward,
                ApprovalEngine::evaluate(amount, category, threshold, &rotated)
            );
        }
    }

    /// Disabled rules never influence the outcome.
    #[test]
    fn prop_disabled_rules_are_invisible(
        amount in arb_amount(),
        category in arb_category(),
        threshold in arb_amount(),
        rules in prop::collection::vec(arb_rule(), 0..8),
    ) {
        let enabled_only: Vec<ApprovalRule> =
            rules.iter().filter(|r| r.enabled).cloned().collect();

        prop_assert_eq!(
            ApprovalEngine::evaluate(amount, category, threshold, &rules),
            ApprovalEngine::evaluate(amount, category, threshold, &enabled_only)
        );
    }

    /// Adding an enabled, matching admin rule can only raise the bar.
    #[test]
    fn prop_matching_admin_rule_forces_admin(
        amount in arb_amount(),
        category in arb_category(),
        rules in prop::collection::vec(arb_rule(), 0..8),
    ) {
        let mut with_admin = rules;
        with_admin.push(ApprovalRule {
            id: Uuid::new_v4(),
            name: "category escalation".to_string(),
            condition: RuleCondition::Category(category),
            approver_role: UserRole::Admin,
            enabled: true,
        });

        // Threshold of zero keeps the rule set in play for any amount.
        let result = ApprovalEngine::evaluate(amount, category, Decimal::ZERO, &with_admin);
        prop_assert_eq!(result, RequiredApprover::Role(UserRole::Admin));
    }

    /// If a role satisfies a requirement, every higher role does too.
    #[test]
    fn prop_can_approve_is_monotone(
        required in prop_oneof![
            Just(RequiredApprover::AutoApproved),
            arb_approver_role().prop_map(RequiredApprover::Role),
        ],
    ) {
        let roles = [UserRole::Employee, UserRole::Manager, UserRole::Admin];
        let mut seen_ok = false;
        for role in roles {
            let ok = ApprovalEngine::can_approve(role, required).is_ok();
            // Once a role passes, all higher roles must pass.
            prop_assert!(!seen_ok || ok);
            seen_ok = seen_ok || ok;
        }
        // Admin satisfies every requirement the engine can produce.
        prop_assert!(seen_ok);
    }

    /// Employees are never able to approve anything.
    #[test]
    fn prop_employees_never_approve(
        required in prop_oneof![
            Just(RequiredApprover::AutoApproved),
            arb_approver_role().prop_map(RequiredApprover::Role),
        ],
    ) {
        prop_assert!(ApprovalEngine::can_approve(UserRole::Employee, required).is_err());
    }
}

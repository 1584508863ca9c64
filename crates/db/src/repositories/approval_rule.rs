//! Approval rule repository.
//!
//! Provides CRUD operations for approval rules and the conversion between
//! stored rows and the core engine's tagged rule representation.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use thiserror::Error;
use uuid::Uuid;

use expenza_core::workflow::{ApprovalRule, RuleCondition, UserRole};

use crate::entities::{
    approval_rules::{self, Entity as ApprovalRuleEntity, Model as ApprovalRuleModel},
    sea_orm_active_enums,
};

/// Errors that can occur during approval rule operations.
#[derive(Debug, Error)]
pub enum ApprovalRuleError {
    /// Approval rule not found.
    #[error("Approval rule {0} not found")]
    NotFound(Uuid),

    /// Rules may only require manager or admin approval.
    #[error("Invalid approver role: {0}")]
    InvalidApproverRole(String),

    /// Stored rule row has a condition/value mismatch.
    #[error("Approval rule {0} has a malformed condition value")]
    MalformedRule(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

/// Input for creating an approval rule.
#[derive(Debug, Clone)]
pub struct CreateApprovalRuleInput {
    /// Name of the approval rule.
    pub name: String,
    /// The matching condition with its value.
    pub condition: RuleCondition,
    /// Required role to approve (manager or admin).
    pub approver_role: UserRole,
}

/// Input for updating an approval rule.
#[derive(Debug, Clone, Default)]
pub struct UpdateApprovalRuleInput {
    /// New name.
    pub name: Option<String>,
    /// New condition with its value.
    pub condition: Option<RuleCondition>,
    /// New required role.
    pub approver_role: Option<UserRole>,
    /// Enabled toggle.
    pub enabled: Option<bool>,
}

/// Repository for approval rule operations.
#[derive(Debug, Clone)]
pub struct ApprovalRuleRepository {
    db: DatabaseConnection,
}

impl ApprovalRuleRepository {
    /// Creates a new `ApprovalRuleRepository`.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a new approval rule.
    ///
    /// # Errors
    ///
    /// Returns `InvalidApproverRole` if the rule names the employee role.
    pub async fn create_rule(
        &self,
        company_id: Uuid,
        input: CreateApprovalRuleInput,
    ) -> Result<ApprovalRuleModel, ApprovalRuleError> {
        if input.approver_role == UserRole::Employee {
            return Err(ApprovalRuleError::InvalidApproverRole(
                input.approver_role.as_str().to_string(),
            ));
        }

        let (condition, amount_value, category_value) = split_condition(input.condition);

        let now = chrono::Utc::now().into();
        let rule = approval_rules::ActiveModel {
            id: Set(Uuid::new_v4()),
            company_id: Set(company_id),
            name: Set(input.name),
            condition: Set(condition),
            amount_value: Set(amount_value),
            category_value: Set(category_value),
            approver_role: Set(input.approver_role.into()),
            enabled: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let created = rule.insert(&self.db).await?;
        Ok(created)
    }

    /// Lists all approval rules for a company, including disabled ones.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_rules(
        &self,
        company_id: Uuid,
    ) -> Result<Vec<ApprovalRuleModel>, ApprovalRuleError> {
        let rules = ApprovalRuleEntity::find()
            .filter(approval_rules::Column::CompanyId.eq(company_id))
            .order_by_asc(approval_rules::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(rules)
    }

    /// Loads the enabled rules of a company as core engine rules.
    ///
    /// # Errors
    ///
    /// Returns `MalformedRule` for rows whose condition/value tagging is broken.
    pub async fn list_enabled_core_rules(
        &self,
        company_id: Uuid,
    ) -> Result<Vec<ApprovalRule>, ApprovalRuleError> {
        let rows = ApprovalRuleEntity::find()
            .filter(approval_rules::Column::CompanyId.eq(company_id))
            .filter(approval_rules::Column::Enabled.eq(true))
            .all(&self.db)
            .await?;

        rows.into_iter().map(rule_to_core).collect()
    }

    /// Gets a specific approval rule by ID.
    ///
    /// # Errors
    ///
    /// Returns `ApprovalRuleError::NotFound` if the rule does not exist.
    pub async fn get_rule(
        &self,
        company_id: Uuid,
        rule_id: Uuid,
    ) -> Result<ApprovalRuleModel, ApprovalRuleError> {
        let rule = ApprovalRuleEntity::find_by_id(rule_id)
            .filter(approval_rules::Column::CompanyId.eq(company_id))
            .one(&self.db)
            .await?
            .ok_or(ApprovalRuleError::NotFound(rule_id))?;
        Ok(rule)
    }

    /// Updates an approval rule, including the enabled toggle.
    ///
    /// # Errors
    ///
    /// Returns `ApprovalRuleError::NotFound` if the rule does not exist.
    pub async fn update_rule(
        &self,
        company_id: Uuid,
        rule_id: Uuid,
        input: UpdateApprovalRuleInput,
    ) -> Result<ApprovalRuleModel, ApprovalRuleError> {
        if let Some(role) = input.approver_role
            && role == UserRole::Employee
        {
            return Err(ApprovalRuleError::InvalidApproverRole(
                role.as_str().to_string(),
            ));
        }

        let rule = self.get_rule(company_id, rule_id).await?;

        let mut active: approval_rules::ActiveModel = rule.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(condition) = input.condition {
            let (condition, amount_value, category_value) = split_condition(condition);
            active.condition = Set(condition);
            active.amount_value = Set(amount_value);
            active.category_value = Set(category_value);
        }
        if let Some(role) = input.approver_role {
            active.approver_role = Set(role.into());
        }
        if let Some(enabled) = input.enabled {
            active.enabled = Set(enabled);
        }
        active.updated_at = Set(chrono::Utc::now().into());

        let updated = active.update(&self.db).await?;
        Ok(updated)
    }

    /// Deletes an approval rule.
    ///
    /// # Errors
    ///
    /// Returns `ApprovalRuleError::NotFound` if the rule does not exist.
    pub async fn delete_rule(
        &self,
        company_id: Uuid,
        rule_id: Uuid,
    ) -> Result<(), ApprovalRuleError> {
        let rule = self.get_rule(company_id, rule_id).await?;
        ApprovalRuleEntity::delete_by_id(rule.id)
            .exec(&self.db)
            .await?;
        Ok(())
    }
}

/// Splits a core tagged condition into its storage columns.
fn split_condition(
    condition: RuleCondition,
) -> (
    sea_orm_active_enums::RuleCondition,
    Option<rust_decimal::Decimal>,
    Option<sea_orm_active_enums::ExpenseCategory>,
) {
    match condition {
        RuleCondition::Amount(threshold) => (
            sea_orm_active_enums::RuleCondition::Amount,
            Some(threshold),
            None,
        ),
        RuleCondition::Category(category) => (
            sea_orm_active_enums::RuleCondition::Category,
            None,
            Some(category.into()),
        ),
    }
}

/// Converts a stored rule row into a core engine rule.
pub(crate) fn rule_to_core(row: ApprovalRuleModel) -> Result<ApprovalRule, ApprovalRuleError> {
    let condition = match (&row.condition, row.amount_value, &row.category_value) {
        (sea_orm_active_enums::RuleCondition::Amount, Some(threshold), None) => {
            RuleCondition::Amount(threshold)
        }
        (sea_orm_active_enums::RuleCondition::Category, None, Some(category)) => {
            RuleCondition::Category(category.clone().into())
        }
        _ => return Err(ApprovalRuleError::MalformedRule(row.id)),
    };

    Ok(ApprovalRule {
        id: row.id,
        name: row.name,
        condition,
        approver_role: row.approver_role.into(),
        enabled: row.enabled,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use expenza_core::workflow::ExpenseCategory;
    use rust_decimal_macros::dec;

    fn row(
        condition: sea_orm_active_enums::RuleCondition,
        amount_value: Option<rust_decimal::Decimal>,
        category_value: Option<sea_orm_active_enums::ExpenseCategory>,
    ) -> ApprovalRuleModel {
        let now = chrono::Utc::now().into();
        ApprovalRuleModel {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            name: "rule".to_string(),
            condition,
            amount_value,
            category_value,
            approver_role: sea_orm_active_enums::UserRole::Manager,
            enabled: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_rule_to_core_amount() {
        let core = rule_to_core(row(
            sea_orm_active_enums::RuleCondition::Amount,
            Some(dec!(500)),
            None,
        ))
        .unwrap();
        assert_eq!(core.condition, RuleCondition::Amount(dec!(500)));
        assert_eq!(core.approver_role, UserRole::Manager);
    }

    #[test]
    fn test_rule_to_core_category() {
        let core = rule_to_core(row(
            sea_orm_active_enums::RuleCondition::Category,
            None,
            Some(sea_orm_active_enums::ExpenseCategory::Travel),
        ))
        .unwrap();
        assert_eq!(
            core.condition,
            RuleCondition::Category(ExpenseCategory::Travel)
        );
    }

    #[test]
    fn test_rule_to_core_rejects_mismatched_row() {
        let result = rule_to_core(row(
            sea_orm_active_enums::RuleCondition::Amount,
            None,
            Some(sea_orm_active_enums::ExpenseCategory::Meals),
        ));
        assert!(matches!(result, Err(ApprovalRuleError::MalformedRule(_))));
    }

    #[test]
    fn test_split_condition_is_tagged() {
        let (cond, amount, category) = split_condition(RuleCondition::Amount(dec!(250)));
        assert_eq!(cond, sea_orm_active_enums::RuleCondition::Amount);
        assert_eq!(amount, Some(dec!(250)));
        assert!(category.is_none());

        let (cond, amount, category) =
            split_condition(RuleCondition::Category(ExpenseCategory::Office));
        assert_eq!(cond, sea_orm_active_enums::RuleCondition::Category);
        assert!(amount.is_none());
        assert_eq!(
            category,
            Some(sea_orm_active_enums::ExpenseCategory::Office)
        );
    }
}

//! Workflow repository for expense state transitions.
//!
//! Resolutions are applied with a compare-and-set update conditioned on
//! the expense still being `pending` at write time: when two approvers
//! race, exactly one wins and the loser receives a `Conflict`.

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveEnum, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Value,
};
use uuid::Uuid;

use expenza_core::workflow::{
    ApprovalEngine, ApprovalRule, ExpenseStatus, UserRole, WorkflowAction, WorkflowError,
    WorkflowService,
};

use crate::entities::{approval_rules, companies, expenses, sea_orm_active_enums};
use crate::repositories::approval_rule::rule_to_core;

/// Workflow repository for expense state transitions.
#[derive(Debug, Clone)]
pub struct WorkflowRepository {
    db: DatabaseConnection,
}

impl WorkflowRepository {
    /// Creates a new workflow repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Approves a pending expense.
    ///
    /// The caller must satisfy the approver role computed by the rules
    /// engine for this expense; a manager-required expense may be approved
    /// by a manager or admin, an admin-required one only by an admin.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The expense is not found in the company
    /// - The expense is not in pending status
    /// - The caller's role does not satisfy the required approver role
    /// - A concurrent resolution won the race (`Conflict`)
    pub async fn approve_expense(
        &self,
        company_id: Uuid,
        expense_id: Uuid,
        approved_by: Uuid,
        actor_role: UserRole,
    ) -> Result<expenses::Model, WorkflowError> {
        let expense = self.fetch_expense(company_id, expense_id).await?;
        let current_status: ExpenseStatus = expense.status.clone().into();

        // Validate transition using WorkflowService
        let action = WorkflowService::approve(current_status, approved_by)?;

        // The actor must satisfy the rule-computed approver requirement
        let threshold = self.fetch_threshold(company_id).await?;
        let rules = self.fetch_enabled_rules(company_id).await?;
        let required = ApprovalEngine::evaluate(
            expense.amount,
            expense.category.clone().into(),
            threshold,
            &rules,
        );
        ApprovalEngine::can_approve(actor_role, required)?;

        let WorkflowAction::Approve { approved_at, .. } = action else {
            unreachable!("approve() only returns Approve actions");
        };
        let approved_at: sea_orm::prelude::DateTimeWithTimeZone = approved_at.into();

        // Compare-and-set: only flips the row if it is still pending
        let result = expenses::Entity::update_many()
            .col_expr(
                expenses::Column::Status,
                Expr::value(sea_orm_active_enums::ExpenseStatus::Approved.to_value()),
            )
            .col_expr(expenses::Column::ApprovedBy, Expr::value(approved_by))
            .col_expr(expenses::Column::ApprovedAt, Expr::value(approved_at))
            .col_expr(
                expenses::Column::RejectionReason,
                Expr::value(Value::String(None)),
            )
            .col_expr(expenses::Column::UpdatedAt, Expr::value(approved_at))
            .filter(expenses::Column::Id.eq(expense_id))
            .filter(expenses::Column::CompanyId.eq(company_id))
            .filter(
                expenses::Column::Status.eq(sea_orm_active_enums::ExpenseStatus::Pending),
            )
            .exec(&self.db)
            .await
            .map_err(|e| WorkflowError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            // Lost a race: the row was resolved (or deleted) between the
            // validation read and the conditional write.
            return match self.try_fetch_expense(company_id, expense_id).await? {
                Some(_) => Err(WorkflowError::Conflict(expense_id)),
                None => Err(WorkflowError::ExpenseNotFound(expense_id)),
            };
        }

        self.fetch_expense(company_id, expense_id).await
    }

    /// Rejects a pending expense with a reason.
    ///
    /// Rejection needs no rule satisfaction; any manager or admin may
    /// reject (the API layer enforces the not-employee policy).
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The expense is not found in the company
    /// - The expense is not in pending status
    /// - The rejection reason is empty
    /// - A concurrent resolution won the race (`Conflict`)
    pub async fn reject_expense(
        &self,
        company_id: Uuid,
        expense_id: Uuid,
        rejected_by: Uuid,
        rejection_reason: String,
    ) -> Result<expenses::Model, WorkflowError> {
        let expense = self.fetch_expense(company_id, expense_id).await?;
        let current_status: ExpenseStatus = expense.status.clone().into();

        // Validate transition and the reason using WorkflowService
        let action = WorkflowService::reject(current_status, rejected_by, rejection_reason)?;

        let WorkflowAction::Reject {
            rejected_at,
            rejection_reason,
            ..
        } = action
        else {
            unreachable!("reject() only returns Reject actions");
        };
        let rejected_at: sea_orm::prelude::DateTimeWithTimeZone = rejected_at.into();

        // Compare-and-set: only flips the row if it is still pending
        let result = expenses::Entity::update_many()
            .col_expr(
                expenses::Column::Status,
                Expr::value(sea_orm_active_enums::ExpenseStatus::Rejected.to_value()),
            )
            .col_expr(expenses::Column::ApprovedBy, Expr::value(rejected_by))
            .col_expr(expenses::Column::ApprovedAt, Expr::value(rejected_at))
            .col_expr(
                expenses::Column::RejectionReason,
                Expr::value(rejection_reason),
            )
            .col_expr(expenses::Column::UpdatedAt, Expr::value(rejected_at))
            .filter(expenses::Column::Id.eq(expense_id))
            .filter(expenses::Column::CompanyId.eq(company_id))
            .filter(
                expenses::Column::Status.eq(sea_orm_active_enums::ExpenseStatus::Pending),
            )
            .exec(&self.db)
            .await
            .map_err(|e| WorkflowError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            return match self.try_fetch_expense(company_id, expense_id).await? {
                Some(_) => Err(WorkflowError::Conflict(expense_id)),
                None => Err(WorkflowError::ExpenseNotFound(expense_id)),
            };
        }

        self.fetch_expense(company_id, expense_id).await
    }

    // ========================================================================
    // Helper methods
    // ========================================================================

    async fn fetch_expense(
        &self,
        company_id: Uuid,
        expense_id: Uuid,
    ) -> Result<expenses::Model, WorkflowError> {
        self.try_fetch_expense(company_id, expense_id)
            .await?
            .ok_or(WorkflowError::ExpenseNotFound(expense_id))
    }

    async fn try_fetch_expense(
        &self,
        company_id: Uuid,
        expense_id: Uuid,
    ) -> Result<Option<expenses::Model>, WorkflowError> {
        expenses::Entity::find_by_id(expense_id)
            .filter(expenses::Column::CompanyId.eq(company_id))
            .one(&self.db)
            .await
            .map_err(|e| WorkflowError::Database(e.to_string()))
    }

    async fn fetch_threshold(
        &self,
        company_id: Uuid,
    ) -> Result<rust_decimal::Decimal, WorkflowError> {
        let company = companies::Entity::find_by_id(company_id)
            .one(&self.db)
            .await
            .map_err(|e| WorkflowError::Database(e.to_string()))?
            .ok_or_else(|| {
                WorkflowError::Database(format!("company {company_id} not found"))
            })?;
        Ok(company.approval_threshold)
    }

    async fn fetch_enabled_rules(
        &self,
        company_id: Uuid,
    ) -> Result<Vec<ApprovalRule>, WorkflowError> {
        let rows = approval_rules::Entity::find()
            .filter(approval_rules::Column::CompanyId.eq(company_id))
            .filter(approval_rules::Column::Enabled.eq(true))
            .all(&self.db)
            .await
            .map_err(|e| WorkflowError::Database(e.to_string()))?;

        rows.into_iter()
            .map(|row| rule_to_core(row).map_err(|e| WorkflowError::Database(e.to_string())))
            .collect()
    }
}

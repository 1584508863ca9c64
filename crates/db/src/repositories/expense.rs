//! Expense repository for submission, listing, and deletion.
//!
//! Submission consults the approval engine: expenses below the company
//! threshold are created already approved (with the submitter recorded as
//! the approver), everything else starts pending.

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use thiserror::Error;
use uuid::Uuid;

use expenza_core::workflow::{
    ApprovalEngine, ExpenseCategory, ExpenseStatus, RequiredApprover,
};

use crate::entities::{companies, expenses};
use crate::repositories::approval_rule::{ApprovalRuleError, ApprovalRuleRepository};

/// Errors that can occur during expense operations.
#[derive(Debug, Error)]
pub enum ExpenseError {
    /// Expense not found.
    #[error("Expense {0} not found")]
    NotFound(Uuid),

    /// Company not found.
    #[error("Company {0} not found")]
    CompanyNotFound(Uuid),

    /// Amount must be positive.
    #[error("Expense amount must be positive")]
    InvalidAmount,

    /// Rule loading failed.
    #[error(transparent)]
    Rule(#[from] ApprovalRuleError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

/// Input for creating an expense.
#[derive(Debug, Clone)]
pub struct CreateExpenseInput {
    /// Expense amount (must be positive).
    pub amount: Decimal,
    /// Currency code; defaults to the company currency when absent.
    pub currency: Option<String>,
    /// Expense category.
    pub category: ExpenseCategory,
    /// What the expense was for.
    pub description: String,
    /// Who was paid.
    pub merchant: String,
    /// The date the expense was incurred.
    pub date: chrono::NaiveDate,
    /// Optional receipt link.
    pub receipt_url: Option<String>,
    /// Optional receipt file name.
    pub receipt_name: Option<String>,
}

/// Filters for listing expenses.
#[derive(Debug, Clone, Default)]
pub struct ExpenseFilter {
    /// Restrict to a single submitter.
    pub user_id: Option<Uuid>,
    /// Restrict to a single status.
    pub status: Option<ExpenseStatus>,
    /// Restrict to a single category.
    pub category: Option<ExpenseCategory>,
}

/// Expense repository.
#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    db: DatabaseConnection,
}

impl ExpenseRepository {
    /// Creates a new expense repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an expense, evaluating the approval engine at submission.
    ///
    /// Returns the created row and the approver requirement that was
    /// computed for it.
    ///
    /// # Errors
    ///
    /// Returns `ExpenseError::InvalidAmount` for non-positive amounts and
    /// `ExpenseError::CompanyNotFound` if the tenant is missing.
    pub async fn create_expense(
        &self,
        company_id: Uuid,
        user_id: Uuid,
        input: CreateExpenseInput,
    ) -> Result<(expenses::Model, RequiredApprover), ExpenseError> {
        if input.amount <= Decimal::ZERO {
            return Err(ExpenseError::InvalidAmount);
        }

        let company = companies::Entity::find_by_id(company_id)
            .one(&self.db)
            .await?
            .ok_or(ExpenseError::CompanyNotFound(company_id))?;

        let rules = ApprovalRuleRepository::new(self.db.clone())
            .list_enabled_core_rules(company_id)
            .await?;

        let required = ApprovalEngine::evaluate(
            input.amount,
            input.category,
            company.approval_threshold,
            &rules,
        );

        let now: sea_orm::prelude::DateTimeWithTimeZone = chrono::Utc::now().into();
        let (status, approved_by, approved_at) = match required {
            RequiredApprover::AutoApproved => {
                (ExpenseStatus::Approved, Some(user_id), Some(now))
            }
            RequiredApprover::Role(_) => (ExpenseStatus::Pending, None, None),
        };

        let expense = expenses::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            company_id: Set(company_id),
            amount: Set(input.amount),
            currency: Set(input
                .currency
                .map_or_else(|| company.currency.clone(), |c| c.to_uppercase())),
            category: Set(input.category.into()),
            description: Set(input.description),
            merchant: Set(input.merchant),
            date: Set(input.date),
            status: Set(status.into()),
            receipt_url: Set(input.receipt_url),
            receipt_name: Set(input.receipt_name),
            submitted_at: Set(now),
            approved_by: Set(approved_by),
            approved_at: Set(approved_at),
            rejection_reason: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let created = expense.insert(&self.db).await?;
        Ok((created, required))
    }

    /// Finds an expense by ID within a company.
    ///
    /// # Errors
    ///
    /// Returns `ExpenseError::NotFound` if the expense does not exist.
    pub async fn get(
        &self,
        company_id: Uuid,
        expense_id: Uuid,
    ) -> Result<expenses::Model, ExpenseError> {
        expenses::Entity::find_by_id(expense_id)
            .filter(expenses::Column::CompanyId.eq(company_id))
            .one(&self.db)
            .await?
            .ok_or(ExpenseError::NotFound(expense_id))
    }

    /// Lists expenses for a company, newest submissions first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        company_id: Uuid,
        filter: ExpenseFilter,
    ) -> Result<Vec<expenses::Model>, ExpenseError> {
        let mut query = expenses::Entity::find()
            .filter(expenses::Column::CompanyId.eq(company_id));

        if let Some(user_id) = filter.user_id {
            query = query.filter(expenses::Column::UserId.eq(user_id));
        }
        if let Some(status) = filter.status {
            let status: crate::entities::sea_orm_active_enums::ExpenseStatus = status.into();
            query = query.filter(expenses::Column::Status.eq(status));
        }
        if let Some(category) = filter.category {
            let category: crate::entities::sea_orm_active_enums::ExpenseCategory = category.into();
            query = query.filter(expenses::Column::Category.eq(category));
        }

        let expenses = query
            .order_by_desc(expenses::Column::SubmittedAt)
            .all(&self.db)
            .await?;
        Ok(expenses)
    }

    /// Deletes an expense.
    ///
    /// Authorization (owner or admin) is decided by the caller through the
    /// core policy; this only removes the row.
    ///
    /// # Errors
    ///
    /// Returns `ExpenseError::NotFound` if the expense does not exist.
    pub async fn delete(&self, company_id: Uuid, expense_id: Uuid) -> Result<(), ExpenseError> {
        let result = expenses::Entity::delete_many()
            .filter(expenses::Column::Id.eq(expense_id))
            .filter(expenses::Column::CompanyId.eq(company_id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(ExpenseError::NotFound(expense_id));
        }
        Ok(())
    }
}

//! Dashboard repository for expense metrics.

use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect,
};
use uuid::Uuid;

use crate::entities::{expenses, sea_orm_active_enums::ExpenseStatus};

/// Per-user expense summary shown on the dashboard.
#[derive(Debug, Clone)]
pub struct ExpenseSummary {
    /// Number of pending expenses.
    pub pending_count: u64,
    /// Number of approved expenses.
    pub approved_count: u64,
    /// Number of rejected expenses.
    pub rejected_count: u64,
    /// Total amount across all the user's expenses.
    pub total_amount: Decimal,
}

/// Dashboard repository for aggregate queries.
#[derive(Debug, Clone)]
pub struct DashboardRepository {
    db: DatabaseConnection,
}

impl DashboardRepository {
    /// Creates a new dashboard repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Summarizes a user's own expenses.
    ///
    /// # Errors
    ///
    /// Returns an error if a database query fails.
    pub async fn user_summary(
        &self,
        company_id: Uuid,
        user_id: Uuid,
    ) -> Result<ExpenseSummary, DbErr> {
        let pending_count = self
            .count_by_status(company_id, Some(user_id), ExpenseStatus::Pending)
            .await?;
        let approved_count = self
            .count_by_status(company_id, Some(user_id), ExpenseStatus::Approved)
            .await?;
        let rejected_count = self
            .count_by_status(company_id, Some(user_id), ExpenseStatus::Rejected)
            .await?;

        let total_amount: Option<Decimal> = expenses::Entity::find()
            .select_only()
            .column_as(expenses::Column::Amount.sum(), "total")
            .filter(expenses::Column::CompanyId.eq(company_id))
            .filter(expenses::Column::UserId.eq(user_id))
            .into_tuple()
            .one(&self.db)
            .await?
            .flatten();

        Ok(ExpenseSummary {
            pending_count,
            approved_count,
            rejected_count,
            total_amount: total_amount.unwrap_or(Decimal::ZERO),
        })
    }

    /// Counts the company-wide pending approval queue.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn company_pending_count(&self, company_id: Uuid) -> Result<u64, DbErr> {
        self.count_by_status(company_id, None, ExpenseStatus::Pending)
            .await
    }

    async fn count_by_status(
        &self,
        company_id: Uuid,
        user_id: Option<Uuid>,
        status: ExpenseStatus,
    ) -> Result<u64, DbErr> {
        let mut query = expenses::Entity::find()
            .filter(expenses::Column::CompanyId.eq(company_id))
            .filter(expenses::Column::Status.eq(status));

        if let Some(user_id) = user_id {
            query = query.filter(expenses::Column::UserId.eq(user_id));
        }

        query.count(&self.db).await
    }
}

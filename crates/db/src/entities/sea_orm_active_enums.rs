//! String-backed active enums shared by the entities.
//!
//! Values are stored as VARCHAR with CHECK constraints (see the initial
//! migration) so they bind as plain strings in conditional updates.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User role within a company.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Company administrator.
    #[sea_orm(string_value = "admin")]
    Admin,
    /// Manager who can resolve expenses.
    #[sea_orm(string_value = "manager")]
    Manager,
    /// Regular employee.
    #[sea_orm(string_value = "employee")]
    Employee,
}

/// Expense lifecycle status.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
pub enum ExpenseStatus {
    /// Reserved, unreachable through the submission flow.
    #[sea_orm(string_value = "draft")]
    Draft,
    /// Awaiting approval.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Approved.
    #[sea_orm(string_value = "approved")]
    Approved,
    /// Rejected.
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

/// Expense category.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
pub enum ExpenseCategory {
    /// Travel expenses.
    #[sea_orm(string_value = "travel")]
    Travel,
    /// Meals and entertainment.
    #[sea_orm(string_value = "meals")]
    Meals,
    /// Office supplies.
    #[sea_orm(string_value = "office")]
    Office,
    /// Equipment purchases.
    #[sea_orm(string_value = "equipment")]
    Equipment,
    /// Anything else.
    #[sea_orm(string_value = "other")]
    Other,
}

/// Approval rule condition discriminant.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
pub enum RuleCondition {
    /// Matches by amount threshold.
    #[sea_orm(string_value = "amount")]
    Amount,
    /// Matches by expense category.
    #[sea_orm(string_value = "category")]
    Category,
}

// Conversions between the storage enums and the core domain enums. The
// database CHECKs and these exhaustive matches keep the two in lockstep.

impl From<UserRole> for expenza_core::workflow::UserRole {
    fn from(role: UserRole) -> Self {
        match role {
            UserRole::Admin => Self::Admin,
            UserRole::Manager => Self::Manager,
            UserRole::Employee => Self::Employee,
        }
    }
}

impl From<expenza_core::workflow::UserRole> for UserRole {
    fn from(role: expenza_core::workflow::UserRole) -> Self {
        match role {
            expenza_core::workflow::UserRole::Admin => Self::Admin,
            expenza_core::workflow::UserRole::Manager => Self::Manager,
            expenza_core::workflow::UserRole::Employee => Self::Employee,
        }
    }
}

impl From<ExpenseStatus> for expenza_core::workflow::ExpenseStatus {
    fn from(status: ExpenseStatus) -> Self {
        match status {
            ExpenseStatus::Draft => Self::Draft,
            ExpenseStatus::Pending => Self::Pending,
            ExpenseStatus::Approved => Self::Approved,
            ExpenseStatus::Rejected => Self::Rejected,
        }
    }
}

impl From<expenza_core::workflow::ExpenseStatus> for ExpenseStatus {
    fn from(status: expenza_core::workflow::ExpenseStatus) -> Self {
        match status {
            expenza_core::workflow::ExpenseStatus::Draft => Self::Draft,
            expenza_core::workflow::ExpenseStatus::Pending => Self::Pending,
            expenza_core::workflow::ExpenseStatus::Approved => Self::Approved,
            expenza_core::workflow::ExpenseStatus::Rejected => Self::Rejected,
        }
    }
}

impl From<ExpenseCategory> for expenza_core::workflow::ExpenseCategory {
    fn from(category: ExpenseCategory) -> Self {
        match category {
            ExpenseCategory::Travel => Self::Travel,
            ExpenseCategory::Meals => Self::Meals,
            ExpenseCategory::Office => Self::Office,
            ExpenseCategory::Equipment => Self::Equipment,
            ExpenseCategory::Other => Self::Other,
        }
    }
}

impl From<expenza_core::workflow::ExpenseCategory> for ExpenseCategory {
    fn from(category: expenza_core::workflow::ExpenseCategory) -> Self {
        match category {
            expenza_core::workflow::ExpenseCategory::Travel => Self::Travel,
            expenza_core::workflow::ExpenseCategory::Meals => Self::Meals,
            expenza_core::workflow::ExpenseCategory::Office => Self::Office,
            expenza_core::workflow::ExpenseCategory::Equipment => Self::Equipment,
            expenza_core::workflow::ExpenseCategory::Other => Self::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::ActiveEnum;

    #[test]
    fn test_status_string_values() {
        assert_eq!(ExpenseStatus::Pending.to_value(), "pending");
        assert_eq!(ExpenseStatus::Approved.to_value(), "approved");
        assert_eq!(ExpenseStatus::Rejected.to_value(), "rejected");
        assert_eq!(ExpenseStatus::Draft.to_value(), "draft");
    }

    #[test]
    fn test_core_roundtrip() {
        for status in [
            ExpenseStatus::Draft,
            ExpenseStatus::Pending,
            ExpenseStatus::Approved,
            ExpenseStatus::Rejected,
        ] {
            let core: expenza_core::workflow::ExpenseStatus = status.clone().into();
            assert_eq!(ExpenseStatus::from(core), status);
        }

        for role in [UserRole::Admin, UserRole::Manager, UserRole::Employee] {
            let core: expenza_core::workflow::UserRole = role.clone().into();
            assert_eq!(UserRole::from(core), role);
        }
    }
}

//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod approval_rule;
pub mod company;
pub mod dashboard;
pub mod expense;
pub mod user;
pub mod workflow;

pub use approval_rule::{
    ApprovalRuleError, ApprovalRuleRepository, CreateApprovalRuleInput, UpdateApprovalRuleInput,
};
pub use company::{CompanyError, CompanyRepository, UpdateCompanyInput};
pub use dashboard::{DashboardRepository, ExpenseSummary};
pub use expense::{CreateExpenseInput, ExpenseError, ExpenseFilter, ExpenseRepository};
pub use user::{CreateUserInput, UpdateUserInput, UserError, UserRepository};
pub use workflow::WorkflowRepository;

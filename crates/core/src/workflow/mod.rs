//! Expense workflow management for Expenza.
//!
//! This module implements the expense lifecycle state machine and the
//! approval rules engine that decides whether an expense auto-approves
//! and, if not, which role must approve it.
//!
//! # Modules
//!
//! - `types` - Workflow domain types (ExpenseStatus, ExpenseCategory, WorkflowAction)
//! - `error` - Workflow-specific error types
//! - `service` - State transition logic
//! - `approval` - Approval rules engine

pub mod approval;
pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod approval_props;
#[cfg(test)]
mod service_props;

pub use approval::{ApprovalEngine, ApprovalRule, RequiredApprover, RuleCondition, UserRole};
pub use error::WorkflowError;
pub use service::WorkflowService;
pub use types::{ExpenseCategory, ExpenseStatus, WorkflowAction};

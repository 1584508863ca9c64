//! Expense routes: submission, listing, resolution, deletion.
//!
//! Submission consults the approval engine (below-threshold expenses come
//! back already approved). Resolution goes through the workflow repository,
//! which applies the compare-and-set transition; the loser of a concurrent
//! resolution race receives a 409.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::str::FromStr;
use tracing::{error, info};
use uuid::Uuid;

use crate::{AppState, middleware::AuthUser};
use expenza_core::auth::{Action, authorize};
use expenza_core::workflow::{ExpenseCategory, ExpenseStatus, RequiredApprover, WorkflowError};
use expenza_db::repositories::expense::{CreateExpenseInput, ExpenseError, ExpenseFilter};
use expenza_db::{ExpenseRepository, WorkflowRepository};

/// Creates the expense routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/expenses", get(list_expenses))
        .route("/expenses", post(create_expense))
        .route("/expenses/{expense_id}", get(get_expense))
        .route("/expenses/{expense_id}", delete(delete_expense))
        .route("/expenses/{expense_id}/approve", post(approve_expense))
        .route("/expenses/{expense_id}/reject", post(reject_expense))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for listing expenses.
#[derive(Debug, Deserialize)]
pub struct ListExpensesQuery {
    /// Restrict to a single submitter (managers/admins only).
    pub user_id: Option<Uuid>,
    /// Restrict to a single status.
    pub status: Option<String>,
    /// Restrict to a single category.
    pub category: Option<String>,
}

/// Request body for submitting an expense.
#[derive(Debug, Deserialize)]
pub struct CreateExpenseRequest {
    /// Amount as a decimal string.
    pub amount: String,
    /// Currency code; defaults to the company currency.
    pub currency: Option<String>,
    /// Category tag.
    pub category: String,
    /// What the expense was for.
    pub description: String,
    /// Who was paid.
    pub merchant: String,
    /// Date the expense was incurred (YYYY-MM-DD).
    pub date: chrono::NaiveDate,
    /// Optional receipt link.
    pub receipt_url: Option<String>,
    /// Optional receipt file name.
    pub receipt_name: Option<String>,
}

/// Request body for rejecting an expense.
#[derive(Debug, Deserialize)]
pub struct RejectExpenseRequest {
    /// The reason shown to the submitter. Required.
    pub reason: String,
}

/// Response for an expense.
#[derive(Debug, Serialize)]
pub struct ExpenseResponse {
    /// Expense ID.
    pub id: Uuid,
    /// Submitting user.
    pub user_id: Uuid,
    /// Amount as a decimal string.
    pub amount: String,
    /// Currency code.
    pub currency: String,
    /// Category tag.
    pub category: String,
    /// Description.
    pub description: String,
    /// Merchant.
    pub merchant: String,
    /// Date incurred.
    pub date: String,
    /// Lifecycle status.
    pub status: String,
    /// Receipt link, if any.
    pub receipt_url: Option<String>,
    /// Receipt file name, if any.
    pub receipt_name: Option<String>,
    /// Submission timestamp.
    pub submitted_at: String,
    /// Resolving user, when resolved.
    pub approved_by: Option<Uuid>,
    /// Resolution timestamp, when resolved.
    pub approved_at: Option<String>,
    /// Rejection reason, when rejected.
    pub rejection_reason: Option<String>,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET /expenses - List expenses.
///
/// Employees always see their own; managers and admins see the company's,
/// optionally filtered by submitter, status, or category.
async fn list_expenses(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListExpensesQuery>,
) -> impl IntoResponse {
    let status = match query.status.as_deref() {
        None => None,
        Some(s) => match ExpenseStatus::parse(s) {
            Some(status) => Some(status),
            None => return invalid_filter("status", s),
        },
    };

    let category = match query.category.as_deref() {
        None => None,
        Some(s) => match ExpenseCategory::parse(s) {
            Some(category) => Some(category),
            None => return invalid_filter("category", s),
        },
    };

    // Employees are pinned to their own expenses regardless of the filter.
    let user_id = if authorize(auth.role(), Action::ViewAllExpenses).is_ok() {
        query.user_id
    } else {
        Some(auth.user_id())
    };

    let repo = ExpenseRepository::new((*state.db).clone());
    let filter = ExpenseFilter {
        user_id,
        status,
        category,
    };

    match repo.list(auth.company_id(), filter).await {
        Ok(expenses) => {
            let items: Vec<ExpenseResponse> =
                expenses.into_iter().map(expense_to_response).collect();
            (StatusCode::OK, Json(json!({ "expenses": items }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list expenses");
            expense_error_response(e)
        }
    }
}

/// POST /expenses - Submit an expense claim.
async fn create_expense(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateExpenseRequest>,
) -> impl IntoResponse {
    if let Err(denied) = authorize(auth.role(), Action::SubmitExpense) {
        return forbidden(denied.reason);
    }

    if payload.description.trim().is_empty() || payload.merchant.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "missing_fields",
                "message": "Description and merchant are required"
            })),
        )
            .into_response();
    }

    let amount = match Decimal::from_str(&payload.amount) {
        Ok(a) if a > Decimal::ZERO => a,
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "invalid_amount",
                    "message": "Amount must be a positive decimal"
                })),
            )
                .into_response();
        }
    };

    let Some(category) = ExpenseCategory::parse(&payload.category) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_category",
                "message": format!("Invalid category: {}", payload.category)
            })),
        )
            .into_response();
    };

    let repo = ExpenseRepository::new((*state.db).clone());

    let input = CreateExpenseInput {
        amount,
        currency: payload.currency,
        category,
        description: payload.description,
        merchant: payload.merchant,
        date: payload.date,
        receipt_url: payload.receipt_url,
        receipt_name: payload.receipt_name,
    };

    match repo
        .create_expense(auth.company_id(), auth.user_id(), input)
        .await
    {
        Ok((expense, required)) => {
            info!(
                expense_id = %expense.id,
                user_id = %auth.user_id(),
                auto_approved = matches!(required, RequiredApprover::AutoApproved),
                "Expense submitted"
            );
            (StatusCode::CREATED, Json(expense_to_response(expense))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to create expense");
            expense_error_response(e)
        }
    }
}

/// GET /expenses/{expense_id} - Fetch a single expense.
async fn get_expense(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(expense_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = ExpenseRepository::new((*state.db).clone());

    match repo.get(auth.company_id(), expense_id).await {
        Ok(expense) => {
            // Employees may only read their own expenses.
            if expense.user_id != auth.user_id()
                && authorize(auth.role(), Action::ViewAllExpenses).is_err()
            {
                return forbidden("You can only view your own expenses");
            }
            (StatusCode::OK, Json(expense_to_response(expense))).into_response()
        }
        Err(e) => expense_error_response(e),
    }
}

/// POST /expenses/{expense_id}/approve - Approve a pending expense.
async fn approve_expense(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(expense_id): Path<Uuid>,
) -> impl IntoResponse {
    if let Err(denied) = authorize(auth.role(), Action::ResolveExpense) {
        return forbidden(denied.reason);
    }

    let repo = WorkflowRepository::new((*state.db).clone());

    match repo
        .approve_expense(auth.company_id(), expense_id, auth.user_id(), auth.role())
        .await
    {
        Ok(expense) => {
            info!(
                expense_id = %expense_id,
                approved_by = %auth.user_id(),
                "Expense approved"
            );
            (StatusCode::OK, Json(expense_to_response(expense))).into_response()
        }
        Err(e) => workflow_error_response(&e),
    }
}

/// POST /expenses/{expense_id}/reject - Reject a pending expense.
async fn reject_expense(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(expense_id): Path<Uuid>,
    Json(payload): Json<RejectExpenseRequest>,
) -> impl IntoResponse {
    if let Err(denied) = authorize(auth.role(), Action::ResolveExpense) {
        return forbidden(denied.reason);
    }

    let repo = WorkflowRepository::new((*state.db).clone());

    match repo
        .reject_expense(
            auth.company_id(),
            expense_id,
            auth.user_id(),
            payload.reason,
        )
        .await
    {
        Ok(expense) => {
            info!(
                expense_id = %expense_id,
                rejected_by = %auth.user_id(),
                "Expense rejected"
            );
            (StatusCode::OK, Json(expense_to_response(expense))).into_response()
        }
        Err(e) => workflow_error_response(&e),
    }
}

/// DELETE /expenses/{expense_id} - Delete an expense (owner or admin).
async fn delete_expense(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(expense_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = ExpenseRepository::new((*state.db).clone());

    let expense = match repo.get(auth.company_id(), expense_id).await {
        Ok(e) => e,
        Err(e) => return expense_error_response(e),
    };

    let is_owner = expense.user_id == auth.user_id();
    if let Err(denied) = authorize(auth.role(), Action::DeleteExpense { is_owner }) {
        return forbidden(denied.reason);
    }

    match repo.delete(auth.company_id(), expense_id).await {
        Ok(()) => {
            info!(
                expense_id = %expense_id,
                deleted_by = %auth.user_id(),
                "Expense deleted"
            );
            (StatusCode::NO_CONTENT, ()).into_response()
        }
        Err(e) => expense_error_response(e),
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

fn expense_to_response(expense: expenza_db::entities::expenses::Model) -> ExpenseResponse {
    let status: ExpenseStatus = expense.status.into();
    let category: ExpenseCategory = expense.category.into();

    ExpenseResponse {
        id: expense.id,
        user_id: expense.user_id,
        amount: expense.amount.to_string(),
        currency: expense.currency,
        category: category.as_str().to_string(),
        description: expense.description,
        merchant: expense.merchant,
        date: expense.date.to_string(),
        status: status.as_str().to_string(),
        receipt_url: expense.receipt_url,
        receipt_name: expense.receipt_name,
        submitted_at: expense.submitted_at.to_rfc3339(),
        approved_by: expense.approved_by,
        approved_at: expense.approved_at.map(|t| t.to_rfc3339()),
        rejection_reason: expense.rejection_reason,
    }
}

fn forbidden(reason: &str) -> axum::response::Response {
    (
        StatusCode::FORBIDDEN,
        Json(json!({
            "error": "forbidden",
            "message": reason
        })),
    )
        .into_response()
}

fn invalid_filter(field: &str, value: &str) -> axum::response::Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "error": "invalid_filter",
            "message": format!("Invalid {field} filter: {value}")
        })),
    )
        .into_response()
}

fn expense_error_response(e: ExpenseError) -> axum::response::Response {
    match e {
        ExpenseError::NotFound(_) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": "Expense not found"
            })),
        )
            .into_response(),
        ExpenseError::CompanyNotFound(_) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": "Company not found"
            })),
        )
            .into_response(),
        ExpenseError::InvalidAmount => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_amount",
                "message": "Amount must be positive"
            })),
        )
            .into_response(),
        ExpenseError::Rule(_) | ExpenseError::Database(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "internal_error",
                "message": "An error occurred"
            })),
        )
            .into_response(),
    }
}

fn workflow_error_response(e: &WorkflowError) -> axum::response::Response {
    let status =
        StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let message = match e {
        WorkflowError::Database(_) => "An error occurred".to_string(),
        other => other.to_string(),
    };

    if matches!(e, WorkflowError::Database(_)) {
        error!(error = %e, "Workflow database error");
    }

    (
        status,
        Json(json!({
            "error": e.error_code().to_lowercase(),
            "message": message
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use expenza_db::entities::sea_orm_active_enums;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn sample_expense(
        status: sea_orm_active_enums::ExpenseStatus,
        rejection_reason: Option<String>,
    ) -> expenza_db::entities::expenses::Model {
        let now: sea_orm::prelude::DateTimeWithTimeZone = chrono::Utc::now().into();
        let resolved = !matches!(
            status,
            sea_orm_active_enums::ExpenseStatus::Pending
                | sea_orm_active_enums::ExpenseStatus::Draft
        );
        expenza_db::entities::expenses::Model {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            amount: dec!(123.45),
            currency: "USD".to_string(),
            category: sea_orm_active_enums::ExpenseCategory::Meals,
            description: "Team lunch".to_string(),
            merchant: "Bistro".to_string(),
            date: chrono::NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
            status,
            receipt_url: None,
            receipt_name: None,
            submitted_at: now,
            approved_by: resolved.then(Uuid::new_v4),
            approved_at: resolved.then_some(now),
            rejection_reason,
            created_at: now,
            updated_at: now,
        }
    }

    #[rstest]
    #[case(sea_orm_active_enums::ExpenseStatus::Pending, "pending")]
    #[case(sea_orm_active_enums::ExpenseStatus::Approved, "approved")]
    fn test_expense_to_response_status(
        #[case] status: sea_orm_active_enums::ExpenseStatus,
        #[case] expected: &str,
    ) {
        let response = expense_to_response(sample_expense(status, None));
        assert_eq!(response.status, expected);
        assert_eq!(response.amount, "123.45");
        assert_eq!(response.category, "meals");
        assert_eq!(response.date, "2026-03-14");
    }

    #[test]
    fn test_expense_to_response_rejection_fields() {
        let response = expense_to_response(sample_expense(
            sea_orm_active_enums::ExpenseStatus::Rejected,
            Some("No receipt".to_string()),
        ));
        assert_eq!(response.status, "rejected");
        assert_eq!(response.rejection_reason.as_deref(), Some("No receipt"));
        assert!(response.approved_by.is_some());
        assert!(response.approved_at.is_some());
    }

    #[test]
    fn test_workflow_error_maps_to_http() {
        let conflict = workflow_error_response(&WorkflowError::Conflict(Uuid::new_v4()));
        assert_eq!(conflict.status(), StatusCode::CONFLICT);

        let forbidden = workflow_error_response(&WorkflowError::InsufficientRole {
            actor_role: "manager".to_string(),
            required_role: "admin".to_string(),
        });
        assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);

        let invalid = workflow_error_response(&WorkflowError::InvalidTransition {
            from: ExpenseStatus::Approved,
            to: ExpenseStatus::Approved,
        });
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);

        let missing = workflow_error_response(&WorkflowError::ExpenseNotFound(Uuid::new_v4()));
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }
}

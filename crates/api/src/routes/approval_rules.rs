//! Approval rule management routes.
//!
//! Rules are visible to every member of the company; mutations are
//! admin-only. The rule value arrives as a string and is parsed into the
//! tagged condition the engine uses.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, patch, post},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::str::FromStr;
use tracing::{error, info};
use uuid::Uuid;

use crate::{AppState, middleware::AuthUser};
use expenza_core::auth::{Action, authorize};
use expenza_core::workflow::{ExpenseCategory, RuleCondition, UserRole};
use expenza_db::ApprovalRuleRepository;
use expenza_db::repositories::approval_rule::{
    ApprovalRuleError, CreateApprovalRuleInput, UpdateApprovalRuleInput,
};

/// Creates the approval rules routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/approval-rules", get(list_approval_rules))
        .route("/approval-rules", post(create_approval_rule))
        .route("/approval-rules/{rule_id}", get(get_approval_rule))
        .route("/approval-rules/{rule_id}", patch(update_approval_rule))
        .route("/approval-rules/{rule_id}", delete(delete_approval_rule))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating an approval rule.
#[derive(Debug, Deserialize)]
pub struct CreateApprovalRuleRequest {
    /// Name of the approval rule.
    pub name: String,
    /// Condition type: "amount" or "category".
    pub condition: String,
    /// Amount threshold (decimal string) or category tag, per the condition.
    pub value: String,
    /// Required approver role (manager or admin).
    pub approver_role: String,
}

/// Request body for updating an approval rule.
#[derive(Debug, Deserialize)]
pub struct UpdateApprovalRuleRequest {
    /// New name.
    pub name: Option<String>,
    /// New condition type (must be paired with `value`).
    pub condition: Option<String>,
    /// New condition value.
    pub value: Option<String>,
    /// New required approver role.
    pub approver_role: Option<String>,
    /// Enabled toggle.
    pub enabled: Option<bool>,
}

/// Response for an approval rule.
#[derive(Debug, Serialize)]
pub struct ApprovalRuleResponse {
    /// Rule ID.
    pub id: Uuid,
    /// Company ID.
    pub company_id: Uuid,
    /// Name.
    pub name: String,
    /// Condition type.
    pub condition: String,
    /// Condition value (amount as decimal string, or category tag).
    pub value: String,
    /// Required approver role.
    pub approver_role: String,
    /// Enabled flag.
    pub enabled: bool,
    /// Created at timestamp.
    pub created_at: String,
    /// Updated at timestamp.
    pub updated_at: String,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET /approval-rules - List the company's rules, disabled ones included.
async fn list_approval_rules(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    let repo = ApprovalRuleRepository::new((*state.db).clone());

    match repo.list_rules(auth.company_id()).await {
        Ok(rules) => {
            let items: Vec<ApprovalRuleResponse> =
                rules.into_iter().map(rule_to_response).collect();
            (StatusCode::OK, Json(json!({ "rules": items }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list approval rules");
            approval_rule_error_response(e)
        }
    }
}

/// POST /approval-rules - Create an approval rule (admin only).
async fn create_approval_rule(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateApprovalRuleRequest>,
) -> impl IntoResponse {
    if let Err(denied) = authorize(auth.role(), Action::ManageRules) {
        return forbidden(denied.reason);
    }

    if payload.name.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "name_required",
                "message": "Name is required"
            })),
        )
            .into_response();
    }

    let condition = match parse_condition(&payload.condition, &payload.value) {
        Ok(c) => c,
        Err(response) => return response,
    };

    let Some(approver_role) = UserRole::parse(&payload.approver_role) else {
        return invalid_role(&payload.approver_role);
    };

    let repo = ApprovalRuleRepository::new((*state.db).clone());

    let input = CreateApprovalRuleInput {
        name: payload.name,
        condition,
        approver_role,
    };

    match repo.create_rule(auth.company_id(), input).await {
        Ok(rule) => {
            info!(
                company_id = %auth.company_id(),
                rule_id = %rule.id,
                "Approval rule created"
            );
            (StatusCode::CREATED, Json(rule_to_response(rule))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to create approval rule");
            approval_rule_error_response(e)
        }
    }
}

/// GET /approval-rules/{rule_id} - Get a single rule.
async fn get_approval_rule(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(rule_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = ApprovalRuleRepository::new((*state.db).clone());

    match repo.get_rule(auth.company_id(), rule_id).await {
        Ok(rule) => (StatusCode::OK, Json(rule_to_response(rule))).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to get approval rule");
            approval_rule_error_response(e)
        }
    }
}

/// PATCH /approval-rules/{rule_id} - Update a rule, including the enabled
/// toggle (admin only).
async fn update_approval_rule(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(rule_id): Path<Uuid>,
    Json(payload): Json<UpdateApprovalRuleRequest>,
) -> impl IntoResponse {
    if let Err(denied) = authorize(auth.role(), Action::ManageRules) {
        return forbidden(denied.reason);
    }

    let condition = match (payload.condition.as_deref(), payload.value.as_deref()) {
        (None, None) => None,
        (Some(condition), Some(value)) => match parse_condition(condition, value) {
            Ok(c) => Some(c),
            Err(response) => return response,
        },
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "condition_value_pair",
                    "message": "Condition and value must be updated together"
                })),
            )
                .into_response();
        }
    };

    let approver_role = match payload.approver_role.as_deref() {
        None => None,
        Some(s) => match UserRole::parse(s) {
            Some(r) => Some(r),
            None => return invalid_role(s),
        },
    };

    let repo = ApprovalRuleRepository::new((*state.db).clone());

    let input = UpdateApprovalRuleInput {
        name: payload.name,
        condition,
        approver_role,
        enabled: payload.enabled,
    };

    match repo.update_rule(auth.company_id(), rule_id, input).await {
        Ok(rule) => {
            info!(
                company_id = %auth.company_id(),
                rule_id = %rule_id,
                "Approval rule updated"
            );
            (StatusCode::OK, Json(rule_to_response(rule))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to update approval rule");
            approval_rule_error_response(e)
        }
    }
}

/// DELETE /approval-rules/{rule_id} - Delete a rule (admin only).
async fn delete_approval_rule(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(rule_id): Path<Uuid>,
) -> impl IntoResponse {
    if let Err(denied) = authorize(auth.role(), Action::ManageRules) {
        return forbidden(denied.reason);
    }

    let repo = ApprovalRuleRepository::new((*state.db).clone());

    match repo.delete_rule(auth.company_id(), rule_id).await {
        Ok(()) => {
            info!(
                company_id = %auth.company_id(),
                rule_id = %rule_id,
                "Approval rule deleted"
            );
            (StatusCode::NO_CONTENT, ()).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to delete approval rule");
            approval_rule_error_response(e)
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

#[allow(clippy::result_large_err)]
fn parse_condition(condition: &str, value: &str) -> Result<RuleCondition, axum::response::Response> {
    match condition {
        "amount" => match Decimal::from_str(value) {
            Ok(d) if d > Decimal::ZERO => Ok(RuleCondition::Amount(d)),
            _ => Err((
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "invalid_amount",
                    "message": "Amount rules need a positive decimal value"
                })),
            )
                .into_response()),
        },
        "category" => match ExpenseCategory::parse(value) {
            Some(category) => Ok(RuleCondition::Category(category)),
            None => Err((
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "invalid_category",
                    "message": format!("Invalid category: {value}")
                })),
            )
                .into_response()),
        },
        other => Err((
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_condition",
                "message": format!("Invalid condition type: {other}")
            })),
        )
            .into_response()),
    }
}

fn rule_to_response(
    rule: expenza_db::entities::approval_rules::Model,
) -> ApprovalRuleResponse {
    use expenza_db::entities::sea_orm_active_enums::RuleCondition as DbCondition;

    let (condition, value) = match rule.condition {
        DbCondition::Amount => (
            "amount".to_string(),
            rule.amount_value.map(|a| a.to_string()).unwrap_or_default(),
        ),
        DbCondition::Category => (
            "category".to_string(),
            rule.category_value
                .map(|c| {
                    let core: ExpenseCategory = c.into();
                    core.as_str().to_string()
                })
                .unwrap_or_default(),
        ),
    };

    let approver_role: UserRole = rule.approver_role.into();

    ApprovalRuleResponse {
        id: rule.id,
        company_id: rule.company_id,
        name: rule.name,
        condition,
        value,
        approver_role: approver_role.as_str().to_string(),
        enabled: rule.enabled,
        created_at: rule.created_at.to_rfc3339(),
        updated_at: rule.updated_at.to_rfc3339(),
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

fn invalid_role(role: &str) -> axum::response::Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "error": "invalid_role",
            "message": format!("Invalid approver role: {role}")
        })),
    )
        .into_response()
}

fn approval_rule_error_response(e: ApprovalRuleError) -> axum::response::Response {
    match e {
        ApprovalRuleError::NotFound(_) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": "Approval rule not found"
            })),
        )
            .into_response(),
        ApprovalRuleError::InvalidApproverRole(role) => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_role",
                "message": format!("Invalid approver role: {role}")
            })),
        )
            .into_response(),
        ApprovalRuleError::MalformedRule(_) | ApprovalRuleError::Database(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "internal_error",
                "message": "An error occurred"
            })),
        )
            .into_response(),
    }
}

//! Company settings routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::str::FromStr;
use tracing::{error, info};
use uuid::Uuid;

use crate::{AppState, middleware::AuthUser};
use expenza_core::auth::{Action, authorize};
use expenza_db::repositories::company::{CompanyError, UpdateCompanyInput};
use expenza_db::CompanyRepository;

/// Creates the company routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/company", get(get_company))
        .route("/company", put(update_company))
}

/// Request body for updating the company.
#[derive(Debug, Deserialize)]
pub struct UpdateCompanyRequest {
    /// New company name.
    pub name: Option<String>,
    /// New currency code.
    pub currency: Option<String>,
    /// New auto-approval threshold as a decimal string.
    pub approval_threshold: Option<String>,
}

/// Response for a company.
#[derive(Debug, Serialize)]
pub struct CompanyResponse {
    /// Company ID.
    pub id: Uuid,
    /// Company name.
    pub name: String,
    /// Currency code.
    pub currency: String,
    /// Auto-approval threshold.
    pub approval_threshold: String,
    /// Created at timestamp.
    pub created_at: String,
    /// Updated at timestamp.
    pub updated_at: String,
}

/// GET /company - Read the caller's tenant.
async fn get_company(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    let repo = CompanyRepository::new((*state.db).clone());

    match repo.get(auth.company_id()).await {
        Ok(company) => (StatusCode::OK, Json(company_to_response(&company))).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to load company");
            company_error_response(e)
        }
    }
}

/// PUT /company - Update company settings (admin only).
async fn update_company(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<UpdateCompanyRequest>,
) -> impl IntoResponse {
    if let Err(denied) = authorize(auth.role(), Action::ManageCompany) {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({
                "error": "forbidden",
                "message": denied.reason
            })),
        )
            .into_response();
    }

    let approval_threshold = match payload.approval_threshold.as_deref() {
        None => None,
        Some(s) => match Decimal::from_str(s) {
            Ok(d) if d >= Decimal::ZERO => Some(d),
            _ => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error": "invalid_threshold",
                        "message": "Approval threshold must be a non-negative amount"
                    })),
                )
                    .into_response();
            }
        },
    };

    let repo = CompanyRepository::new((*state.db).clone());

    let input = UpdateCompanyInput {
        name: payload.name,
        currency: payload.currency,
        approval_threshold,
    };

    match repo.update(auth.company_id(), input).await {
        Ok(company) => {
            info!(company_id = %company.id, "Company settings updated");
            (StatusCode::OK, Json(company_to_response(&company))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to update company");
            company_error_response(e)
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

fn company_to_response(company: &expenza_db::entities::companies::Model) -> CompanyResponse {
    CompanyResponse {
        id: company.id,
        name: company.name.clone(),
        currency: company.currency.clone(),
        approval_threshold: company.approval_threshold.to_string(),
        created_at: company.created_at.to_rfc3339(),
        updated_at: company.updated_at.to_rfc3339(),
    }
}

fn company_error_response(e: CompanyError) -> axum::response::Response {
    match e {
        CompanyError::NotFound(_) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": "Company not found"
            })),
        )
            .into_response(),
        CompanyError::NegativeThreshold => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_threshold",
                "message": "Approval threshold must be non-negative"
            })),
        )
            .into_response(),
        CompanyError::Database(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "internal_error",
                "message": "An error occurred"
            })),
        )
            .into_response(),
    }
}

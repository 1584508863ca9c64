//! Dashboard metrics route.

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::get};
use serde::Serialize;
use serde_json::json;
use tracing::error;

use crate::{AppState, middleware::AuthUser};
use expenza_core::auth::{Action, authorize};
use expenza_db::DashboardRepository;

/// Creates the dashboard routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/dashboard", get(get_dashboard))
}

/// Dashboard response.
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    /// Caller's pending expense count.
    pub pending_count: u64,
    /// Caller's approved expense count.
    pub approved_count: u64,
    /// Caller's rejected expense count.
    pub rejected_count: u64,
    /// Caller's total claimed amount as a decimal string.
    pub total_amount: String,
    /// Company-wide pending queue size; present for managers and admins.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_pending_count: Option<u64>,
}

/// GET /dashboard - Expense summary for the caller.
async fn get_dashboard(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    let repo = DashboardRepository::new((*state.db).clone());

    let summary = match repo.user_summary(auth.company_id(), auth.user_id()).await {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "Failed to load dashboard summary");
            return internal_error();
        }
    };

    // Approvers also see the size of the company-wide queue.
    let company_pending_count = if authorize(auth.role(), Action::ViewAllExpenses).is_ok() {
        match repo.company_pending_count(auth.company_id()).await {
            Ok(count) => Some(count),
            Err(e) => {
                error!(error = %e, "Failed to load pending queue size");
                return internal_error();
            }
        }
    } else {
        None
    };

    (
        StatusCode::OK,
        Json(DashboardResponse {
            pending_count: summary.pending_count,
            approved_count: summary.approved_count,
            rejected_count: summary.rejected_count,
            total_amount: summary.total_amount.to_string(),
            company_pending_count,
        }),
    )
        .into_response()
}

fn internal_error() -> axum::response::Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": "internal_error",
            "message": "An error occurred"
        })),
    )
        .into_response()
}

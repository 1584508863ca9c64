//! User management routes.
//!
//! Managers and admins can view the company roster; only admins can
//! provision users or change roles and manager assignments.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::routes::auth::user_to_info;
use crate::{AppState, middleware::AuthUser};
use expenza_core::auth::{Action, authorize, hash_password};
use expenza_core::workflow::UserRole;
use expenza_db::UserRepository;
use expenza_db::repositories::user::{CreateUserInput, UpdateUserInput, UserError};

/// Creates the user management routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users", post(create_user))
        .route("/users/{user_id}", patch(update_user))
}

/// Request body for provisioning a user.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    /// Email address.
    pub email: String,
    /// Initial password.
    pub password: String,
    /// Full name.
    pub name: String,
    /// Role (admin, manager, employee).
    pub role: String,
    /// Optional manager assignment.
    pub manager_id: Option<Uuid>,
}

/// Request body for updating a user (role/manager only).
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    /// New role.
    pub role: Option<String>,
    /// New manager assignment.
    pub manager_id: Option<Uuid>,
}

/// GET /users - Company roster (manager/admin).
async fn list_users(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    if let Err(denied) = authorize(auth.role(), Action::ViewRoster) {
        return forbidden(denied.reason);
    }

    let repo = UserRepository::new((*state.db).clone());

    match repo.list_by_company(auth.company_id()).await {
        Ok(users) => {
            let items: Vec<_> = users.iter().map(user_to_info).collect();
            (StatusCode::OK, Json(json!({ "users": items }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list users");
            user_error_response(e)
        }
    }
}

/// POST /users - Provision a user in the caller's company (admin only).
async fn create_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateUserRequest>,
) -> impl IntoResponse {
    if let Err(denied) = authorize(auth.role(), Action::ManageUsers) {
        return forbidden(denied.reason);
    }

    if payload.email.trim().is_empty() || payload.name.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "missing_fields",
                "message": "Email and name are required"
            })),
        )
            .into_response();
    }

    if payload.password.len() < 6 {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "weak_password",
                "message": "Password must be at least 6 characters"
            })),
        )
            .into_response();
    }

    let Some(role) = UserRole::parse(&payload.role) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_role",
                "message": format!("Invalid role: {}", payload.role)
            })),
        )
            .into_response();
    };

    let password_hash = match hash_password(&payload.password) {
        Ok(h) => h,
        Err(e) => {
            error!(error = %e, "Failed to hash password");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "internal_error",
                    "message": "An error occurred"
                })),
            )
                .into_response();
        }
    };

    let repo = UserRepository::new((*state.db).clone());

    let input = CreateUserInput {
        email: payload.email,
        password_hash,
        name: payload.name,
        role,
        company_id: auth.company_id(),
        manager_id: payload.manager_id,
    };

    match repo.create(input).await {
        Ok(user) => {
            info!(
                company_id = %auth.company_id(),
                user_id = %user.id,
                role = %role,
                "User provisioned"
            );
            (StatusCode::CREATED, Json(json!({ "user": user_to_info(&user) }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to create user");
            user_error_response(e)
        }
    }
}

/// PATCH /users/{user_id} - Change a user's role or manager (admin only).
async fn update_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> impl IntoResponse {
    if let Err(denied) = authorize(auth.role(), Action::ManageUsers) {
        return forbidden(denied.reason);
    }

    let role = match payload.role.as_deref() {
        None => None,
        Some(s) => match UserRole::parse(s) {
            Some(r) => Some(r),
            None => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error": "invalid_role",
                        "message": format!("Invalid role: {s}")
                    })),
                )
                    .into_response();
            }
        },
    };

    let repo = UserRepository::new((*state.db).clone());

    let input = UpdateUserInput {
        role,
        manager_id: payload.manager_id.map(Some),
    };

    match repo
        .update_role_and_manager(auth.company_id(), user_id, input)
        .await
    {
        Ok(user) => {
            info!(user_id = %user.id, "User updated");
            (StatusCode::OK, Json(json!({ "user": user_to_info(&user) }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to update user");
            user_error_response(e)
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

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

fn user_error_response(e: UserError) -> axum::response::Response {
    match e {
        UserError::NotFound(_) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": "User not found"
            })),
        )
            .into_response(),
        UserError::EmailTaken(_) => (
            StatusCode::CONFLICT,
            Json(json!({
                "error": "email_taken",
                "message": "A user with this email already exists"
            })),
        )
            .into_response(),
        UserError::Database(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "internal_error",
                "message": "An error occurred"
            })),
        )
            .into_response(),
    }
}

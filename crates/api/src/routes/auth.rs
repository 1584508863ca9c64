//! Authentication routes for login, registration, and caller lookup.
//!
//! Registration is the tenant-setup flow: it creates a company and its
//! admin in one step. Managers and employees are provisioned by their
//! admin through the users routes.

use axum::{
    Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::get,
    routing::post,
};
use rust_decimal::Decimal;
use serde_json::json;
use std::str::FromStr;
use tracing::{error, info};

use crate::{AppState, middleware::AuthUser};
use expenza_core::auth::{hash_password, verify_password};
use expenza_core::workflow::UserRole;
use expenza_db::repositories::user::CreateUserInput;
use expenza_db::{CompanyRepository, UserRepository};
use expenza_shared::auth::{LoginRequest, LoginResponse, RegisterRequest, UserInfo};

/// Creates the public auth router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
}

/// Creates the auth routes that require an authenticated caller.
pub fn protected_routes() -> Router<AppState> {
    Router::new().route("/auth/me", get(me))
}

/// POST /auth/login - Authenticate a user and return a token.
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> impl IntoResponse {
    let user_repo = UserRepository::new((*state.db).clone());

    // Find user by email
    let user = match user_repo.find_by_email(&payload.email).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            info!(email = %payload.email, "Login attempt for non-existent user");
            return invalid_credentials();
        }
        Err(e) => {
            error!(error = %e, "Database error during login");
            return internal_error("An error occurred during login");
        }
    };

    // Verify password
    match verify_password(&payload.password, &user.password_hash) {
        Ok(true) => {}
        Ok(false) => {
            info!(user_id = %user.id, "Failed login attempt - invalid password");
            return invalid_credentials();
        }
        Err(e) => {
            error!(error = %e, "Password verification error");
            return internal_error("An error occurred during login");
        }
    }

    let role: UserRole = user.role.clone().into();
    let token = match state
        .jwt_service
        .generate_token(user.id, user.company_id, role.as_str())
    {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "Failed to generate token");
            return internal_error("An error occurred during login");
        }
    };

    info!(user_id = %user.id, "User logged in");

    (
        StatusCode::OK,
        Json(LoginResponse {
            user: user_to_info(&user),
            token,
            expires_in: state.jwt_service.token_expires_in(),
        }),
    )
        .into_response()
}

/// POST /auth/register - Tenant setup: create a company and its admin.
async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> impl IntoResponse {
    if payload.email.trim().is_empty()
        || payload.name.trim().is_empty()
        || payload.company_name.trim().is_empty()
    {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "missing_fields",
                "message": "Email, name, and company name are required"
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

    let approval_threshold = match payload.approval_threshold.as_deref() {
        None | Some("") => Decimal::new(1000, 0),
        Some(s) => match Decimal::from_str(s) {
            Ok(d) if d >= Decimal::ZERO => d,
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

    let user_repo = UserRepository::new((*state.db).clone());

    match user_repo.email_exists(&payload.email).await {
        Ok(true) => {
            return (
                StatusCode::CONFLICT,
                Json(json!({
                    "error": "email_taken",
                    "message": "A user with this email already exists"
                })),
            )
                .into_response();
        }
        Ok(false) => {}
        Err(e) => {
            error!(error = %e, "Database error during registration");
            return internal_error("An error occurred during registration");
        }
    }

    let company_repo = CompanyRepository::new((*state.db).clone());
    let currency = payload.currency.as_deref().unwrap_or("USD");

    let company = match company_repo
        .create(&payload.company_name, currency, approval_threshold)
        .await
    {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "Failed to create company");
            return internal_error("An error occurred during registration");
        }
    };

    let password_hash = match hash_password(&payload.password) {
        Ok(h) => h,
        Err(e) => {
            error!(error = %e, "Failed to hash password");
            return internal_error("An error occurred during registration");
        }
    };

    let user = match user_repo
        .create(CreateUserInput {
            email: payload.email,
            password_hash,
            name: payload.name,
            role: UserRole::Admin,
            company_id: company.id,
            manager_id: None,
        })
        .await
    {
        Ok(u) => u,
        Err(e) => {
            error!(error = %e, "Failed to create admin user");
            return internal_error("An error occurred during registration");
        }
    };

    let token = match state
        .jwt_service
        .generate_token(user.id, company.id, UserRole::Admin.as_str())
    {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "Failed to generate token");
            return internal_error("An error occurred during registration");
        }
    };

    info!(
        company_id = %company.id,
        user_id = %user.id,
        "Company registered"
    );

    (
        StatusCode::CREATED,
        Json(LoginResponse {
            user: user_to_info(&user),
            token,
            expires_in: state.jwt_service.token_expires_in(),
        }),
    )
        .into_response()
}

/// GET /auth/me - Resolve the authenticated caller.
async fn me(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    let user_repo = UserRepository::new((*state.db).clone());

    match user_repo.find_by_id(auth.user_id()).await {
        Ok(Some(user)) => (StatusCode::OK, Json(json!({ "user": user_to_info(&user) })))
            .into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": "User not found"
            })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Database error resolving caller");
            internal_error("An error occurred")
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

pub(crate) fn user_to_info(user: &expenza_db::entities::users::Model) -> UserInfo {
    let role: UserRole = user.role.clone().into();
    UserInfo {
        id: user.id,
        email: user.email.clone(),
        name: user.name.clone(),
        role: role.as_str().to_string(),
        company_id: user.company_id,
        manager_id: user.manager_id,
    }
}

fn invalid_credentials() -> axum::response::Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "error": "invalid_credentials",
            "message": "Invalid email or password"
        })),
    )
        .into_response()
}

fn internal_error(message: &str) -> axum::response::Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": "internal_error",
            "message": message
        })),
    )
        .into_response()
}

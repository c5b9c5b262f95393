//! API service routes

use axum::{
    Extension, Json, Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;
use common::error::DatabaseError;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::Row;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::{
    error::ApiError,
    middleware::{AuthUser, auth_middleware},
    models::{Credentials, Role},
    state::AppState,
    validation,
};

/// Request for user login
///
/// Fields are optional so a missing field becomes a 400 with the service's
/// own message instead of a framework rejection.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// User projection returned on login; never carries the password
#[derive(Serialize)]
pub struct LoginUser {
    pub id: i64,
    pub username: String,
    pub role: Role,
}

/// Response for a successful login
#[derive(Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
    pub user: LoginUser,
}

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/api/profile", get(get_profile))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/auth/login", post(login))
        .route("/api/db-test", get(db_test))
        .merge(protected_routes)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// User login endpoint
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validation::validate_login_request(payload.username.as_deref(), payload.password.as_deref())
        .map_err(ApiError::BadRequest)?;

    let credentials = Credentials {
        username: payload.username.unwrap_or_default(),
        password: payload.password.unwrap_or_default(),
    };

    info!("Login attempt for user: {}", credentials.username);

    let result = state.login_use_case.execute(&credentials).await;

    if !result.success {
        return Err(ApiError::InvalidCredentials);
    }

    // The use case guarantees both are present on success
    let (user, token) = match (result.user, result.token) {
        (Some(user), Some(token)) => (user, token),
        _ => return Err(ApiError::InternalServerError),
    };

    let response = LoginResponse {
        success: true,
        message: "Login successful".to_string(),
        token,
        user: LoginUser {
            id: user.id,
            username: user.username,
            role: user.role,
        },
    };

    Ok((StatusCode::OK, Json(response)))
}

/// Profile endpoint; guarded by the authentication middleware
pub async fn get_profile(Extension(auth_user): Extension<AuthUser>) -> impl IntoResponse {
    Json(json!({
        "success": true,
        "message": "Profile data retrieved successfully",
        "user": {
            "userId": auth_user.user_id,
            "username": auth_user.username,
        },
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// Database smoke-test endpoint
pub async fn db_test(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let rows = sqlx::query("SELECT id, message, created_at FROM test_table ORDER BY id")
        .fetch_all(&state.db_pool)
        .await
        .map_err(|e| {
            error!("Database smoke test failed: {}", e);
            DatabaseError::Query(e)
        })?;

    let records: Vec<_> = rows
        .iter()
        .map(|row| {
            json!({
                "id": row.get::<i64, _>("id"),
                "message": row.get::<String, _>("message"),
                "created_at": row.get::<String, _>("created_at"),
            })
        })
        .collect();

    Ok(Json(json!({
        "success": true,
        "count": records.len(),
        "records": records,
    })))
}

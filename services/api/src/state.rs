//! Application state shared across handlers

use sqlx::SqlitePool;

use crate::{jwt::JwtService, login::LoginUseCase, repositories::UserRepository};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub jwt_service: JwtService,
    pub login_use_case: LoginUseCase<UserRepository, JwtService>,
}

use anyhow::Result;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

mod error;
mod jwt;
mod login;
mod middleware;
mod models;
mod password;
mod repositories;
mod routes;
mod state;
mod validation;

use common::database::{self, DatabaseConfig};

use crate::{
    jwt::{JwtConfig, JwtService},
    login::LoginUseCase,
    repositories::UserRepository,
    state::AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!("Starting Gestor Fincas API service");

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = database::init_pool(&db_config).await?;

    // Check database connectivity
    if database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    // Bootstrap schema and seed data
    database::init_smoke_table(&pool).await?;

    let user_repository = UserRepository::new(pool.clone());
    user_repository.init().await?;

    info!("Gestor Fincas API service initialized successfully");

    // Wire the auth subsystem
    let jwt_service = JwtService::new(&JwtConfig::from_env());
    let login_use_case = LoginUseCase::new(user_repository, jwt_service.clone());

    let app_state = AppState {
        db_pool: pool,
        jwt_service,
        login_use_case,
    };

    // Start the web server
    let app = routes::create_router(app_state);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3001").await?;
    info!("Gestor Fincas API listening on 0.0.0.0:3001");

    axum::serve(listener, app).await?;

    Ok(())
}

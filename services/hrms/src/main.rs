use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod auth;
mod config;
mod error;
mod extract;
mod jwt;
mod middleware;
mod models;
mod password;
mod repositories;
mod routes;
mod seed;
mod state;
mod validation;

#[cfg(test)]
mod test_support;

use tokio::net::TcpListener;

pub use crate::state::AppState;
use crate::{
    auth::AuthService,
    config::Settings,
    jwt::JwtService,
    password::PasswordService,
    repositories::{
        AttendanceRepository, CredentialRepository, DepartmentRepository, IdentityRepository,
    },
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting HRMS service");

    let settings = Settings::load()?;
    if settings.uses_default_secret() {
        warn!("SECRET_KEY is left at its default value; tokens can be forged");
    }

    // Initialize database connection pool
    let pool = common::database::init_pool(&settings.database()).await?;
    common::database::run_migrations(&pool).await?;

    // Check database connectivity
    if common::database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    let identities = IdentityRepository::new(pool.clone());
    let auth = AuthService::new(
        JwtService::new(settings.jwt()?),
        PasswordService::new(settings.password_params()?),
        identities.clone(),
        CredentialRepository::new(pool.clone()),
    );

    seed::ensure_initial_admin(&settings, &auth, &identities).await?;

    let app_state = AppState {
        auth,
        identities,
        departments: DepartmentRepository::new(pool.clone()),
        attendance: AttendanceRepository::new(pool.clone()),
        db_pool: pool,
    };

    // Start the web server
    let app = routes::create_router(app_state);

    let listener = TcpListener::bind(&settings.bind_address).await?;
    info!("HRMS service listening on {}", settings.bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}

//! Shared fixtures for unit tests

use std::str::FromStr;

use argon2::Params;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::AppState;
use crate::auth::AuthService;
use crate::jwt::{JwtConfig, JwtService};
use crate::models::{NewEmployee, NewUser};
use crate::password::PasswordService;
use crate::repositories::{
    AttendanceRepository, CredentialRepository, DepartmentRepository, IdentityRepository,
};

pub const TEST_SECRET: &str = "test-secret";

/// Migrated in-memory database
///
/// The pool holds a single connection that never expires, since every
/// connection to `sqlite::memory:` opens a separate empty database.
pub async fn test_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .unwrap();

    common::database::run_migrations(&pool).await.unwrap();
    pool
}

/// Argon2 with minimal cost so tests stay fast
pub fn fast_passwords() -> PasswordService {
    PasswordService::new(Params::new(8, 1, 1, None).unwrap())
}

pub fn test_jwt() -> JwtService {
    JwtService::new(JwtConfig::new(TEST_SECRET, "HS256", 1800, 604_800).unwrap())
}

pub fn test_auth(pool: SqlitePool) -> AuthService {
    AuthService::new(
        test_jwt(),
        fast_passwords(),
        IdentityRepository::new(pool.clone()),
        CredentialRepository::new(pool),
    )
}

pub fn test_state(pool: SqlitePool) -> AppState {
    AppState {
        auth: test_auth(pool.clone()),
        identities: IdentityRepository::new(pool.clone()),
        departments: DepartmentRepository::new(pool.clone()),
        attendance: AttendanceRepository::new(pool.clone()),
        db_pool: pool,
    }
}

pub fn new_user(username: &str, email: &str) -> NewUser {
    NewUser {
        username: username.to_string(),
        email: email.to_string(),
        password: "hunter22".to_string(),
    }
}

pub fn new_employee(employee_id: &str, email: &str) -> NewEmployee {
    NewEmployee {
        employee_id: employee_id.to_string(),
        first_name: "Ada".to_string(),
        last_name: Some("Lovelace".to_string()),
        email: email.to_string(),
        department: "Engineering".to_string(),
        password: "secret1".to_string(),
        gender: None,
        address: None,
        pin: None,
        city: None,
    }
}

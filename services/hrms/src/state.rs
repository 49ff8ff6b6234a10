//! Application state shared across handlers

use sqlx::SqlitePool;

use crate::auth::AuthService;
use crate::repositories::{AttendanceRepository, DepartmentRepository, IdentityRepository};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub auth: AuthService,
    pub identities: IdentityRepository,
    pub departments: DepartmentRepository,
    pub attendance: AttendanceRepository,
}

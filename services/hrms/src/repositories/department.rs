//! Department repository for database operations
//!
//! Identities reference departments by name only, so none of these
//! operations touch `users`.

use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::info;

use crate::error::{ServiceError, ServiceResult};
use crate::models::{Department, NewDepartment, UpdateDepartment};

const DUPLICATE_NAME: &str = "Department name already exists.";
const NOT_FOUND: &str = "Department not found.";

/// Department repository
#[derive(Clone)]
pub struct DepartmentRepository {
    pool: SqlitePool,
}

impl DepartmentRepository {
    /// Create a new department repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// List all departments
    pub async fn list(&self) -> ServiceResult<Vec<Department>> {
        let departments: Vec<Department> =
            sqlx::query_as("SELECT id, name, is_active FROM departments ORDER BY id")
                .fetch_all(&self.pool)
                .await?;

        Ok(departments)
    }

    /// Find a department by ID
    pub async fn find_by_id(&self, id: i64) -> ServiceResult<Option<Department>> {
        let department: Option<Department> =
            sqlx::query_as("SELECT id, name, is_active FROM departments WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(department)
    }

    /// Create a department
    pub async fn create(&self, new_department: &NewDepartment) -> ServiceResult<Department> {
        info!("Creating department: {}", new_department.name);

        let result = sqlx::query("INSERT INTO departments (name, is_active) VALUES (?, ?)")
            .bind(&new_department.name)
            .bind(new_department.is_active)
            .execute(&self.pool)
            .await
            .map_err(|e| ServiceError::from_sqlx(e, DUPLICATE_NAME))?;

        Ok(Department {
            id: result.last_insert_rowid(),
            name: new_department.name.clone(),
            is_active: new_department.is_active,
        })
    }

    /// Apply a partial update to a department
    pub async fn update(&self, id: i64, patch: &UpdateDepartment) -> ServiceResult<Department> {
        info!("Updating department: {}", id);

        if patch.name.is_none() && patch.is_active.is_none() {
            return self
                .find_by_id(id)
                .await?
                .ok_or_else(|| ServiceError::NotFound(NOT_FOUND.to_string()));
        }

        let mut builder = QueryBuilder::<Sqlite>::new("UPDATE departments SET ");
        let mut fields = builder.separated(", ");
        if let Some(name) = &patch.name {
            fields.push("name = ").push_bind_unseparated(name.clone());
        }
        if let Some(is_active) = patch.is_active {
            fields.push("is_active = ").push_bind_unseparated(is_active);
        }
        builder.push(" WHERE id = ").push_bind(id);

        let result = builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| ServiceError::from_sqlx(e, DUPLICATE_NAME))?;

        if result.rows_affected() == 0 {
            return Err(ServiceError::NotFound(NOT_FOUND.to_string()));
        }

        self.find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(NOT_FOUND.to_string()))
    }

    /// Delete a department and return the removed row
    pub async fn delete(&self, id: i64) -> ServiceResult<Department> {
        info!("Deleting department: {}", id);

        let department: Option<Department> =
            sqlx::query_as("DELETE FROM departments WHERE id = ? RETURNING id, name, is_active")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        department.ok_or_else(|| ServiceError::NotFound(NOT_FOUND.to_string()))
    }
}

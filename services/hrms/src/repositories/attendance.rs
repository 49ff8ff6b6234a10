//! Attendance repository for database operations

use chrono::NaiveDate;
use sqlx::SqlitePool;
use tracing::info;

use crate::error::{ServiceError, ServiceResult};
use crate::models::{Attendance, AttendanceRow, AttendanceStatus};

const ALREADY_RECORDED: &str = "Attendance for this date is already recorded.";

/// Attendance repository
#[derive(Clone)]
pub struct AttendanceRepository {
    pool: SqlitePool,
}

impl AttendanceRepository {
    /// Create a new attendance repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Record one day's status for an identity
    pub async fn mark(
        &self,
        employee_id: i64,
        date: NaiveDate,
        status: AttendanceStatus,
    ) -> ServiceResult<Attendance> {
        info!("Marking attendance for {} on {}: {}", employee_id, date, status);

        let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE id = ?")
            .bind(employee_id)
            .fetch_optional(&self.pool)
            .await?;
        if exists.is_none() {
            return Err(ServiceError::NotFound("Employee not found.".to_string()));
        }

        let duplicate: Option<i64> =
            sqlx::query_scalar("SELECT id FROM attendance WHERE employee_id = ? AND date = ?")
                .bind(employee_id)
                .bind(date)
                .fetch_optional(&self.pool)
                .await?;
        if duplicate.is_some() {
            return Err(ServiceError::Conflict(ALREADY_RECORDED.to_string()));
        }

        // The unique (employee_id, date) index settles races between the checks
        // above and this insert.
        let result =
            sqlx::query("INSERT INTO attendance (employee_id, date, status) VALUES (?, ?, ?)")
                .bind(employee_id)
                .bind(date)
                .bind(status.as_str())
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    if common::error::is_foreign_key_violation(&e) {
                        ServiceError::NotFound("Employee not found.".to_string())
                    } else {
                        ServiceError::from_sqlx(e, ALREADY_RECORDED)
                    }
                })?;

        Ok(Attendance {
            id: result.last_insert_rowid(),
            employee_id,
            date,
            status,
        })
    }

    /// All attendance rows for an identity, oldest date first
    pub async fn list_for_employee(&self, employee_id: i64) -> ServiceResult<Vec<Attendance>> {
        let rows: Vec<AttendanceRow> = sqlx::query_as(
            "SELECT id, employee_id, date, status FROM attendance
             WHERE employee_id = ? ORDER BY date, id",
        )
        .bind(employee_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| Attendance::try_from(row).map_err(ServiceError::Internal))
            .collect()
    }
}

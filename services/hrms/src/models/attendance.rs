//! Attendance model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

/// Daily attendance status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttendanceStatus {
    Present,
    Absent,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "Present",
            AttendanceStatus::Absent => "Absent",
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttendanceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Present" => Ok(AttendanceStatus::Present),
            "Absent" => Ok(AttendanceStatus::Absent),
            _ => Err("Status must be 'Present' or 'Absent'.".to_string()),
        }
    }
}

/// Attendance entity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attendance {
    pub id: i64,
    pub employee_id: i64,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
}

/// Raw `attendance` row as stored
#[derive(Debug, Clone, FromRow)]
pub struct AttendanceRow {
    pub id: i64,
    pub employee_id: i64,
    pub date: NaiveDate,
    pub status: String,
}

impl TryFrom<AttendanceRow> for Attendance {
    type Error = String;

    fn try_from(row: AttendanceRow) -> Result<Self, Self::Error> {
        Ok(Attendance {
            status: row.status.parse()?,
            id: row.id,
            employee_id: row.employee_id,
            date: row.date,
        })
    }
}

/// Attendance marking payload
///
/// `status` stays a string here so an out-of-set value is reported as a
/// validation failure rather than a body rejection.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAttendance {
    pub employee_id: i64,
    pub date: NaiveDate,
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_is_case_sensitive() {
        assert_eq!("Present".parse(), Ok(AttendanceStatus::Present));
        assert_eq!("Absent".parse(), Ok(AttendanceStatus::Absent));
        assert!("present".parse::<AttendanceStatus>().is_err());
        assert!("Late".parse::<AttendanceStatus>().is_err());
    }
}

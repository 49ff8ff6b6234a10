//! HRMS service models

pub mod attendance;
pub mod credential;
pub mod department;
pub mod identity;

// Re-export for convenience
pub use attendance::{Attendance, AttendanceRow, AttendanceStatus, NewAttendance};
pub use credential::{Credential, CredentialRow, Owner};
pub use department::{Department, NewDepartment, UpdateDepartment};
pub use identity::{Identity, IdentityPatch, IdentityRow, NewEmployee, NewUser, Role};

//! Repositories for database operations

pub mod attendance;
pub mod credential;
pub mod department;
pub mod identity;

pub use attendance::AttendanceRepository;
pub use credential::CredentialRepository;
pub use department::DepartmentRepository;
pub use identity::IdentityRepository;

//! Department model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Department entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Department {
    pub id: i64,
    pub name: String,
    pub is_active: bool,
}

/// New department creation payload
#[derive(Debug, Clone, Deserialize)]
pub struct NewDepartment {
    pub name: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

/// Department update payload
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateDepartment {
    pub name: Option<String>,
    pub is_active: Option<bool>,
}

fn default_active() -> bool {
    true
}

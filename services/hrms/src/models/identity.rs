//! Identity model: the unified user/employee record

use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

/// Role tag stored in `users.role`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "admin")]
    Admin,
    #[serde(rename = "manager")]
    Manager,
    #[serde(rename = "user")]
    StandardUser,
    #[serde(rename = "employee")]
    Employee,
}

impl Role {
    /// Storage representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::StandardUser => "user",
            Role::Employee => "employee",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "manager" => Ok(Role::Manager),
            "user" => Ok(Role::StandardUser),
            "employee" => Ok(Role::Employee),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

/// Identity entity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Identity {
    pub id: i64,
    pub username: Option<String>,
    pub email: String,
    pub employee_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub full_name: Option<String>,
    pub department: Option<String>,
    pub gender: Option<String>,
    pub address: Option<String>,
    pub pin: Option<String>,
    pub city: Option<String>,
    pub role: Role,
    pub is_active: bool,
}

impl Identity {
    pub fn is_employee(&self) -> bool {
        self.role == Role::Employee
    }
}

/// Raw `users` row as stored
#[derive(Debug, Clone, FromRow)]
pub struct IdentityRow {
    pub id: i64,
    pub username: Option<String>,
    pub email: String,
    pub employee_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub full_name: Option<String>,
    pub department: Option<String>,
    pub gender: Option<String>,
    pub address: Option<String>,
    pub pin: Option<String>,
    pub city: Option<String>,
    pub role: String,
    pub is_active: bool,
}

impl TryFrom<IdentityRow> for Identity {
    type Error = String;

    fn try_from(row: IdentityRow) -> Result<Self, Self::Error> {
        Ok(Identity {
            role: row.role.parse()?,
            id: row.id,
            username: row.username,
            email: row.email,
            employee_id: row.employee_id,
            first_name: row.first_name,
            last_name: row.last_name,
            full_name: row.full_name,
            department: row.department,
            gender: row.gender,
            address: row.address,
            pin: row.pin,
            city: row.city,
            is_active: row.is_active,
        })
    }
}

/// Registration payload
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Employee creation payload
#[derive(Debug, Clone, Deserialize)]
pub struct NewEmployee {
    pub employee_id: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
    pub department: String,
    pub password: String,
    pub gender: Option<String>,
    pub address: Option<String>,
    pub pin: Option<String>,
    pub city: Option<String>,
}

impl NewEmployee {
    /// First and last name joined, as kept in `full_name`
    pub fn full_name(&self) -> String {
        match self.last_name.as_deref().map(str::trim) {
            Some(last) if !last.is_empty() => format!("{} {}", self.first_name.trim(), last),
            _ => self.first_name.trim().to_string(),
        }
    }
}

/// Partial update for an identity
///
/// Absent fields are left untouched. For nullable columns an explicit JSON
/// `null` clears the value, which is why those fields are `Option<Option<_>>`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IdentityPatch {
    #[serde(default, deserialize_with = "present")]
    pub username: Option<Option<String>>,
    pub email: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub first_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub last_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub full_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub department: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub gender: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub address: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub pin: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub city: Option<Option<String>>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

impl IdentityPatch {
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.email.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
            && self.full_name.is_none()
            && self.department.is_none()
            && self.gender.is_none()
            && self.address.is_none()
            && self.pin.is_none()
            && self.city.is_none()
            && self.role.is_none()
            && self.is_active.is_none()
    }
}

// A field that is present in the payload, possibly as null.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_storage_mapping() {
        for role in [Role::Admin, Role::Manager, Role::StandardUser, Role::Employee] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert_eq!(Role::StandardUser.to_string(), "user");
        assert!("superuser".parse::<Role>().is_err());
    }

    #[test]
    fn test_patch_distinguishes_absent_from_null() {
        let patch: IdentityPatch =
            serde_json::from_str(r#"{"city": null, "gender": "f"}"#).unwrap();

        assert_eq!(patch.city, Some(None));
        assert_eq!(patch.gender, Some(Some("f".to_string())));
        assert_eq!(patch.address, None);
        assert!(!patch.is_empty());
        assert!(IdentityPatch::default().is_empty());
    }

    #[test]
    fn test_employee_full_name() {
        let mut employee = NewEmployee {
            employee_id: "E-1".into(),
            first_name: "Ada".into(),
            last_name: Some("Lovelace".into()),
            email: "ada@example.com".into(),
            department: "Engineering".into(),
            password: "secret1".into(),
            gender: None,
            address: None,
            pin: None,
            city: None,
        };
        assert_eq!(employee.full_name(), "Ada Lovelace");

        employee.last_name = None;
        assert_eq!(employee.full_name(), "Ada");
    }
}

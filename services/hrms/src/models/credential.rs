//! Credential model: login identifier, password hash and owner reference

use sqlx::FromRow;

/// Record that owns a credential
///
/// Stored as `(table_name, table_id)` in the `auth` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Owner {
    /// A row in `users`
    Identity(i64),
}

impl Owner {
    pub fn table_name(&self) -> &'static str {
        match self {
            Owner::Identity(_) => "users",
        }
    }

    pub fn table_id(&self) -> i64 {
        match self {
            Owner::Identity(id) => *id,
        }
    }

    pub fn from_parts(table_name: &str, table_id: i64) -> Option<Self> {
        match table_name {
            "users" => Some(Owner::Identity(table_id)),
            _ => None,
        }
    }
}

/// Credential entity
#[derive(Debug, Clone)]
pub struct Credential {
    pub id: i64,
    pub login: String,
    pub password_hash: String,
    pub owner: Owner,
}

/// Raw `auth` row as stored
#[derive(Debug, Clone, FromRow)]
pub struct CredentialRow {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub table_name: String,
    pub table_id: i64,
}

impl TryFrom<CredentialRow> for Credential {
    type Error = String;

    fn try_from(row: CredentialRow) -> Result<Self, Self::Error> {
        let owner = Owner::from_parts(&row.table_name, row.table_id)
            .ok_or_else(|| format!("Unknown credential owner table: {}", row.table_name))?;

        Ok(Credential {
            id: row.id,
            login: row.username,
            password_hash: row.password_hash,
            owner,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_storage_mapping() {
        let owner = Owner::Identity(12);
        assert_eq!(owner.table_name(), "users");
        assert_eq!(
            Owner::from_parts(owner.table_name(), owner.table_id()),
            Some(owner)
        );
        assert_eq!(Owner::from_parts("employees", 12), None);
    }
}

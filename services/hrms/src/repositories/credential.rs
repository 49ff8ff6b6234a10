//! Credential repository for database operations

use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::info;

use crate::error::{ServiceError, ServiceResult};
use crate::models::{Credential, CredentialRow, Owner};

const SELECT_CREDENTIAL: &str =
    "SELECT id, username, password_hash, table_name, table_id FROM auth";

/// Credential repository
#[derive(Clone)]
pub struct CredentialRepository {
    pool: SqlitePool,
}

impl CredentialRepository {
    /// Create a new credential repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a credential inside the caller's transaction
    ///
    /// Credentials are only ever created together with their owner, so there
    /// is no standalone variant of this operation.
    pub(crate) async fn insert(
        tx: &mut Transaction<'_, Sqlite>,
        login: &str,
        password_hash: &str,
        owner: Owner,
    ) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO auth (username, password_hash, table_name, table_id)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(login)
        .bind(password_hash)
        .bind(owner.table_name())
        .bind(owner.table_id())
        .execute(&mut **tx)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Find a credential by exact login identifier
    pub async fn find_by_login(&self, login: &str) -> ServiceResult<Option<Credential>> {
        let row: Option<CredentialRow> =
            sqlx::query_as(&format!("{} WHERE username = ?", SELECT_CREDENTIAL))
                .bind(login)
                .fetch_optional(&self.pool)
                .await?;

        row.map(Credential::try_from)
            .transpose()
            .map_err(ServiceError::Internal)
    }

    /// Find the credential owned by a record
    pub async fn find_by_owner(&self, owner: Owner) -> ServiceResult<Option<Credential>> {
        let row: Option<CredentialRow> = sqlx::query_as(&format!(
            "{} WHERE table_name = ? AND table_id = ?",
            SELECT_CREDENTIAL
        ))
        .bind(owner.table_name())
        .bind(owner.table_id())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Credential::try_from)
            .transpose()
            .map_err(ServiceError::Internal)
    }

    /// Replace the password hash of a credential
    pub async fn update_password_hash(
        &self,
        credential_id: i64,
        password_hash: &str,
    ) -> ServiceResult<()> {
        info!("Updating password for credential: {}", credential_id);

        let result = sqlx::query("UPDATE auth SET password_hash = ? WHERE id = ?")
            .bind(password_hash)
            .bind(credential_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ServiceError::NotFound("Credential not found.".to_string()));
        }

        Ok(())
    }

    /// Change the login identifier of the credential owned by a record
    pub(crate) async fn update_login(
        tx: &mut Transaction<'_, Sqlite>,
        owner: Owner,
        login: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE auth SET username = ? WHERE table_name = ? AND table_id = ?")
            .bind(login)
            .bind(owner.table_name())
            .bind(owner.table_id())
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    /// Delete the credential owned by a record
    pub(crate) async fn delete_by_owner(
        tx: &mut Transaction<'_, Sqlite>,
        owner: Owner,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM auth WHERE table_name = ? AND table_id = ?")
            .bind(owner.table_name())
            .bind(owner.table_id())
            .execute(&mut **tx)
            .await?;
        Ok(())
    }
}

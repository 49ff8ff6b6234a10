//! Identity repository for database operations
//!
//! Identities and their credentials are written together: every creation
//! path inserts the `users` row and the `auth` row inside one transaction,
//! so a failed uniqueness check on either side leaves nothing behind.

use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool, Transaction};
use tracing::info;

use crate::error::{ServiceError, ServiceResult};
use crate::models::{Identity, IdentityPatch, IdentityRow, NewEmployee, NewUser, Owner, Role};
use crate::repositories::CredentialRepository;

const SELECT_IDENTITY: &str = r#"
    SELECT id, username, email, employee_id, first_name, last_name, full_name,
           department, gender, address, pin, city, role, is_active
    FROM users
"#;

/// Column values for a new `users` row
#[derive(Debug, Default)]
struct IdentityInsert<'a> {
    username: Option<&'a str>,
    email: &'a str,
    employee_id: Option<&'a str>,
    first_name: Option<&'a str>,
    last_name: Option<&'a str>,
    full_name: Option<String>,
    department: Option<&'a str>,
    gender: Option<&'a str>,
    address: Option<&'a str>,
    pin: Option<&'a str>,
    city: Option<&'a str>,
    role: Option<Role>,
}

fn into_identity(row: IdentityRow) -> ServiceResult<Identity> {
    Identity::try_from(row).map_err(ServiceError::Internal)
}

/// Identity repository
#[derive(Clone)]
pub struct IdentityRepository {
    pool: SqlitePool,
}

impl IdentityRepository {
    /// Create a new identity repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Register an application user with a username login
    pub async fn register(
        &self,
        new_user: &NewUser,
        password_hash: &str,
    ) -> ServiceResult<Identity> {
        info!("Registering new user: {}", new_user.username);

        if self.find_by_username(&new_user.username).await?.is_some() {
            return Err(ServiceError::Conflict("Username already registered.".to_string()));
        }
        if self.find_by_email(&new_user.email).await?.is_some() {
            return Err(ServiceError::Conflict("Email already registered.".to_string()));
        }

        let record = IdentityInsert {
            username: Some(&new_user.username),
            email: &new_user.email,
            role: Some(Role::StandardUser),
            ..Default::default()
        };

        self.create_with_credential(
            record,
            &new_user.username,
            password_hash,
            "Username or email already exists.",
        )
        .await
    }

    /// Create an employee whose login identifier is their email
    pub async fn create_employee(
        &self,
        employee: &NewEmployee,
        password_hash: &str,
    ) -> ServiceResult<Identity> {
        info!("Creating new employee: {}", employee.employee_id);

        let record = IdentityInsert {
            email: &employee.email,
            employee_id: Some(&employee.employee_id),
            first_name: Some(&employee.first_name),
            last_name: employee.last_name.as_deref(),
            full_name: Some(employee.full_name()),
            department: Some(&employee.department),
            gender: employee.gender.as_deref(),
            address: employee.address.as_deref(),
            pin: employee.pin.as_deref(),
            city: employee.city.as_deref(),
            role: Some(Role::Employee),
            ..Default::default()
        };

        self.create_with_credential(
            record,
            &employee.email,
            password_hash,
            "Employee ID or Email already exists.",
        )
        .await
    }

    /// Create an administrator with a username login
    pub async fn create_admin(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> ServiceResult<Identity> {
        info!("Creating administrator: {}", username);

        let record = IdentityInsert {
            username: Some(username),
            email,
            full_name: Some("Administrator".to_string()),
            role: Some(Role::Admin),
            ..Default::default()
        };

        self.create_with_credential(
            record,
            username,
            password_hash,
            "Username or email already exists.",
        )
        .await
    }

    async fn create_with_credential(
        &self,
        record: IdentityInsert<'_>,
        login: &str,
        password_hash: &str,
        conflict_message: &str,
    ) -> ServiceResult<Identity> {
        let conflict = |e: sqlx::Error| ServiceError::from_sqlx(e, conflict_message);

        let mut tx = self.pool.begin().await?;

        let id = Self::insert(&mut tx, &record).await.map_err(conflict)?;
        CredentialRepository::insert(&mut tx, login, password_hash, Owner::Identity(id))
            .await
            .map_err(conflict)?;

        let identity = Self::fetch(&mut tx, id)
            .await?
            .ok_or_else(|| {
                ServiceError::Internal(format!("Identity {} vanished after insert", id))
            })?;

        tx.commit().await.map_err(conflict)?;

        info!("Created identity {} with role {}", identity.id, identity.role);
        Ok(identity)
    }

    async fn insert(
        tx: &mut Transaction<'_, Sqlite>,
        record: &IdentityInsert<'_>,
    ) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (username, email, employee_id, first_name, last_name, full_name,
                               department, gender, address, pin, city, role, is_active)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 1)
            "#,
        )
        .bind(record.username)
        .bind(record.email)
        .bind(record.employee_id)
        .bind(record.first_name)
        .bind(record.last_name)
        .bind(record.full_name.as_deref())
        .bind(record.department)
        .bind(record.gender)
        .bind(record.address)
        .bind(record.pin)
        .bind(record.city)
        .bind(record.role.unwrap_or(Role::StandardUser).as_str())
        .execute(&mut **tx)
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn fetch(conn: &mut SqliteConnection, id: i64) -> ServiceResult<Option<Identity>> {
        let row: Option<IdentityRow> = sqlx::query_as(&format!("{} WHERE id = ?", SELECT_IDENTITY))
            .bind(id)
            .fetch_optional(conn)
            .await?;

        row.map(into_identity).transpose()
    }

    /// Find an identity by ID
    pub async fn find_by_id(&self, id: i64) -> ServiceResult<Option<Identity>> {
        let mut conn = self.pool.acquire().await?;
        Self::fetch(&mut conn, id).await
    }

    /// Find an identity by display username
    pub async fn find_by_username(&self, username: &str) -> ServiceResult<Option<Identity>> {
        let row: Option<IdentityRow> =
            sqlx::query_as(&format!("{} WHERE username = ?", SELECT_IDENTITY))
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;

        row.map(into_identity).transpose()
    }

    /// Find an identity by email
    pub async fn find_by_email(&self, email: &str) -> ServiceResult<Option<Identity>> {
        let row: Option<IdentityRow> =
            sqlx::query_as(&format!("{} WHERE email = ?", SELECT_IDENTITY))
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;

        row.map(into_identity).transpose()
    }

    /// All non-employee identities
    pub async fn list_users(&self) -> ServiceResult<Vec<Identity>> {
        let rows: Vec<IdentityRow> =
            sqlx::query_as(&format!("{} WHERE role != ? ORDER BY id", SELECT_IDENTITY))
                .bind(Role::Employee.as_str())
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(into_identity).collect()
    }

    /// All employee identities
    pub async fn list_employees(&self) -> ServiceResult<Vec<Identity>> {
        let rows: Vec<IdentityRow> =
            sqlx::query_as(&format!("{} WHERE role = ? ORDER BY id", SELECT_IDENTITY))
                .bind(Role::Employee.as_str())
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(into_identity).collect()
    }

    /// Apply a partial update to a non-employee identity
    pub async fn update(&self, id: i64, patch: &IdentityPatch) -> ServiceResult<Identity> {
        info!("Updating identity: {}", id);

        let conflict =
            |e: sqlx::Error| ServiceError::from_sqlx(e, "Username or email already exists.");
        let mut tx = self.pool.begin().await?;

        let current = Self::fetch(&mut tx, id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found.".to_string()))?;

        if current.is_employee() {
            return Err(ServiceError::InvalidOperation(
                "Employee records cannot be edited through the user update path.".to_string(),
            ));
        }
        if patch.role == Some(Role::Employee) {
            return Err(ServiceError::InvalidOperation(
                "Users cannot be converted into employees.".to_string(),
            ));
        }
        // The username is the login of every non-employee identity.
        if matches!(patch.username, Some(None)) {
            return Err(ServiceError::Validation("Username cannot be cleared.".to_string()));
        }
        if patch.is_empty() {
            return Ok(current);
        }

        let mut builder = QueryBuilder::<Sqlite>::new("UPDATE users SET ");
        let mut fields = builder.separated(", ");

        if let Some(username) = &patch.username {
            fields.push("username = ").push_bind_unseparated(username.clone());
        }
        if let Some(email) = &patch.email {
            fields.push("email = ").push_bind_unseparated(email.clone());
        }
        let nullable = [
            ("first_name", &patch.first_name),
            ("last_name", &patch.last_name),
            ("full_name", &patch.full_name),
            ("department", &patch.department),
            ("gender", &patch.gender),
            ("address", &patch.address),
            ("pin", &patch.pin),
            ("city", &patch.city),
        ];
        for (column, value) in nullable {
            if let Some(value) = value {
                fields
                    .push(format!("{} = ", column))
                    .push_bind_unseparated(value.clone());
            }
        }
        if let Some(role) = patch.role {
            fields.push("role = ").push_bind_unseparated(role.as_str());
        }
        if let Some(is_active) = patch.is_active {
            fields.push("is_active = ").push_bind_unseparated(is_active);
        }

        builder.push(" WHERE id = ").push_bind(id);
        builder.build().execute(&mut *tx).await.map_err(conflict)?;

        // Registered users log in with their username; keep the credential in step.
        if let Some(Some(username)) = &patch.username {
            if current.username.as_deref() != Some(username.as_str()) {
                CredentialRepository::update_login(&mut tx, Owner::Identity(id), username)
                    .await
                    .map_err(conflict)?;
            }
        }

        let updated = Self::fetch(&mut tx, id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found.".to_string()))?;

        tx.commit().await.map_err(conflict)?;
        Ok(updated)
    }

    /// Delete any identity together with its credential and attendance
    pub async fn delete(&self, id: i64) -> ServiceResult<Identity> {
        self.delete_where(id, None, "User not found.").await
    }

    /// Delete an identity only if it is an employee
    pub async fn delete_employee(&self, id: i64) -> ServiceResult<Identity> {
        self.delete_where(id, Some(Role::Employee), "Employee not found")
            .await
    }

    async fn delete_where(
        &self,
        id: i64,
        required_role: Option<Role>,
        not_found_message: &str,
    ) -> ServiceResult<Identity> {
        info!("Deleting identity: {}", id);

        let mut tx = self.pool.begin().await?;

        let snapshot = Self::fetch(&mut tx, id)
            .await?
            .filter(|identity| required_role.is_none_or(|role| identity.role == role))
            .ok_or_else(|| ServiceError::NotFound(not_found_message.to_string()))?;

        sqlx::query("DELETE FROM attendance WHERE employee_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        CredentialRepository::delete_by_owner(&mut tx, Owner::Identity(id)).await?;
        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(snapshot)
    }
}

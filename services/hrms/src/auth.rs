//! Authentication service
//!
//! Ties password hashing and token signing to the credential and identity
//! stores. Failures that reach a caller are uniform: a wrong password, an
//! unknown login, a bad token and an inactive subject all look the same.

use tokio::task;
use tracing::{info, warn};

use crate::error::{ServiceError, ServiceResult};
use crate::jwt::{Claims, JwtService, TokenType};
use crate::models::{Credential, Identity, Owner};
use crate::password::PasswordService;
use crate::repositories::{CredentialRepository, IdentityRepository};

/// Access and refresh tokens issued together
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    jwt: JwtService,
    passwords: PasswordService,
    identities: IdentityRepository,
    credentials: CredentialRepository,
}

impl AuthService {
    pub fn new(
        jwt: JwtService,
        passwords: PasswordService,
        identities: IdentityRepository,
        credentials: CredentialRepository,
    ) -> Self {
        Self {
            jwt,
            passwords,
            identities,
            credentials,
        }
    }

    /// Hash a password on the blocking pool
    pub async fn hash_password(&self, plain: &str) -> ServiceResult<String> {
        let passwords = self.passwords.clone();
        let plain = plain.to_string();

        task::spawn_blocking(move || passwords.hash_password(&plain))
            .await
            .map_err(|e| ServiceError::Internal(format!("Password hashing task failed: {}", e)))?
    }

    /// Verify a password on the blocking pool
    pub async fn verify_password(&self, plain: &str, hash: &str) -> ServiceResult<bool> {
        let passwords = self.passwords.clone();
        let plain = plain.to_string();
        let hash = hash.to_string();

        task::spawn_blocking(move || passwords.verify_password(&plain, &hash))
            .await
            .map_err(|e| {
                ServiceError::Internal(format!("Password verification task failed: {}", e))
            })
    }

    /// Resolve a login identifier and password to an active identity
    ///
    /// The identifier is first matched exactly against credential logins. If
    /// nothing matches it is treated as an email, and the credential owned by
    /// the identity with that email is used instead.
    pub async fn authenticate(
        &self,
        login: &str,
        password: &str,
    ) -> ServiceResult<Option<Identity>> {
        let Some(credential) = self.resolve_credential(login).await? else {
            info!("Authentication failed: unknown login");
            return Ok(None);
        };

        if !self.verify_password(password, &credential.password_hash).await? {
            info!("Authentication failed: password mismatch");
            return Ok(None);
        }

        let Owner::Identity(id) = credential.owner;
        match self.identities.find_by_id(id).await? {
            Some(identity) if identity.is_active => Ok(Some(identity)),
            Some(_) => {
                info!("Authentication failed: identity {} is inactive", id);
                Ok(None)
            }
            None => {
                warn!("Credential {} points at missing identity {}", credential.id, id);
                Ok(None)
            }
        }
    }

    async fn resolve_credential(&self, login: &str) -> ServiceResult<Option<Credential>> {
        if let Some(credential) = self.credentials.find_by_login(login).await? {
            return Ok(Some(credential));
        }

        match self.identities.find_by_email(login).await? {
            Some(identity) => {
                self.credentials
                    .find_by_owner(Owner::Identity(identity.id))
                    .await
            }
            None => Ok(None),
        }
    }

    /// Issue an access token for an identity
    pub fn issue_access_token(&self, identity: &Identity) -> ServiceResult<String> {
        self.jwt.generate_access_token(identity.id)
    }

    /// Issue a refresh token for an identity
    pub fn issue_refresh_token(&self, identity: &Identity) -> ServiceResult<String> {
        self.jwt.generate_refresh_token(identity.id)
    }

    /// Issue both tokens for an identity
    pub fn issue_tokens(&self, identity: &Identity) -> ServiceResult<TokenPair> {
        Ok(TokenPair {
            access_token: self.issue_access_token(identity)?,
            refresh_token: self.issue_refresh_token(identity)?,
        })
    }

    /// Validate a token of the expected kind and load its active subject
    pub async fn validate_token(
        &self,
        token: &str,
        expected: TokenType,
    ) -> ServiceResult<(Claims, Identity)> {
        let claims = self.jwt.validate_token(token)?;

        if claims.token_type != expected {
            return Err(ServiceError::InvalidCredentials);
        }

        let id = claims.identity_id().ok_or(ServiceError::InvalidCredentials)?;
        match self.identities.find_by_id(id).await? {
            Some(identity) if identity.is_active => Ok((claims, identity)),
            _ => Err(ServiceError::InvalidCredentials),
        }
    }

    /// Exchange a refresh token for a fresh token pair
    pub async fn refresh(&self, refresh_token: &str) -> ServiceResult<TokenPair> {
        let (_, identity) = self.validate_token(refresh_token, TokenType::Refresh).await?;
        self.issue_tokens(&identity)
    }

    /// Change the password of an identity after checking the current one
    pub async fn change_password(
        &self,
        identity: &Identity,
        current_password: &str,
        new_password: &str,
    ) -> ServiceResult<()> {
        let credential = self
            .credentials
            .find_by_owner(Owner::Identity(identity.id))
            .await?
            .ok_or_else(|| {
                ServiceError::InvalidOperation("No credentials found for this user.".to_string())
            })?;

        if !self
            .verify_password(current_password, &credential.password_hash)
            .await?
        {
            return Err(ServiceError::InvalidOperation(
                "Current password is incorrect.".to_string(),
            ));
        }

        let password_hash = self.hash_password(new_password).await?;
        self.credentials
            .update_password_hash(credential.id, &password_hash)
            .await
    }

    pub fn access_token_expiry(&self) -> u64 {
        self.jwt.access_token_expiry()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::IdentityPatch;
    use crate::test_support::{new_employee, new_user, test_auth, test_pool};

    #[tokio::test]
    async fn test_hash_and_verify_off_the_runtime() {
        let auth = test_auth(test_pool().await);

        let hash = auth.hash_password("hunter22").await.unwrap();

        assert!(auth.verify_password("hunter22", &hash).await.unwrap());
        assert!(!auth.verify_password("hunter23", &hash).await.unwrap());
        assert!(!auth.verify_password("hunter22", "not-a-hash").await.unwrap());
    }

    #[tokio::test]
    async fn test_register_then_authenticate_by_username() {
        let pool = test_pool().await;
        let auth = test_auth(pool.clone());
        let identities = IdentityRepository::new(pool);

        let hash = auth.hash_password("hunter22").await.unwrap();
        let registered = identities
            .register(&new_user("alice", "alice@example.com"), &hash)
            .await
            .unwrap();

        let found = auth.authenticate("alice", "hunter22").await.unwrap();
        assert_eq!(found, Some(registered));
    }

    #[tokio::test]
    async fn test_email_fallback_for_username_login() {
        let pool = test_pool().await;
        let auth = test_auth(pool.clone());
        let identities = IdentityRepository::new(pool);

        let hash = auth.hash_password("hunter22").await.unwrap();
        let registered = identities
            .register(&new_user("alice", "alice@example.com"), &hash)
            .await
            .unwrap();

        let found = auth.authenticate("alice@example.com", "hunter22").await.unwrap();
        assert_eq!(found.map(|i| i.id), Some(registered.id));
    }

    #[tokio::test]
    async fn test_employee_logs_in_with_email() {
        let pool = test_pool().await;
        let auth = test_auth(pool.clone());
        let identities = IdentityRepository::new(pool);

        let hash = auth.hash_password("secret1").await.unwrap();
        let employee = identities
            .create_employee(&new_employee("E-1", "ada@example.com"), &hash)
            .await
            .unwrap();

        let found = auth.authenticate("ada@example.com", "secret1").await.unwrap();
        assert_eq!(found.map(|i| i.id), Some(employee.id));
        assert_eq!(
            auth.authenticate("ada@example.com", "wrong-password").await.unwrap(),
            None
        );
        assert_eq!(auth.authenticate("nobody", "secret1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_inactive_identity_cannot_authenticate_or_use_tokens() {
        let pool = test_pool().await;
        let auth = test_auth(pool.clone());
        let identities = IdentityRepository::new(pool);

        let hash = auth.hash_password("hunter22").await.unwrap();
        let identity = identities
            .register(&new_user("bob", "bob@example.com"), &hash)
            .await
            .unwrap();
        let token = auth.issue_access_token(&identity).unwrap();

        identities
            .update(
                identity.id,
                &IdentityPatch {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(auth.authenticate("bob", "hunter22").await.unwrap(), None);
        assert!(matches!(
            auth.validate_token(&token, TokenType::Access).await,
            Err(ServiceError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_token_round_trip_and_kind_check() {
        let pool = test_pool().await;
        let auth = test_auth(pool.clone());
        let identity = IdentityRepository::new(pool)
            .register(&new_user("carol", "carol@example.com"), "unused")
            .await
            .unwrap();

        let tokens = auth.issue_tokens(&identity).unwrap();

        let (claims, resolved) = auth
            .validate_token(&tokens.access_token, TokenType::Access)
            .await
            .unwrap();
        assert_eq!(claims.sub, identity.id.to_string());
        assert_eq!(resolved, identity);

        assert!(matches!(
            auth.validate_token(&tokens.refresh_token, TokenType::Access).await,
            Err(ServiceError::InvalidCredentials)
        ));
        assert!(auth.refresh(&tokens.refresh_token).await.is_ok());
        assert!(matches!(
            auth.refresh(&tokens.access_token).await,
            Err(ServiceError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_token_for_deleted_identity_is_rejected() {
        let pool = test_pool().await;
        let auth = test_auth(pool.clone());
        let identities = IdentityRepository::new(pool);
        let identity = identities
            .register(&new_user("dave", "dave@example.com"), "unused")
            .await
            .unwrap();
        let token = auth.issue_access_token(&identity).unwrap();

        identities.delete(identity.id).await.unwrap();

        assert!(matches!(
            auth.validate_token(&token, TokenType::Access).await,
            Err(ServiceError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_change_password() {
        let pool = test_pool().await;
        let auth = test_auth(pool.clone());
        let hash = auth.hash_password("old-password").await.unwrap();
        let identity = IdentityRepository::new(pool)
            .register(&new_user("erin", "erin@example.com"), &hash)
            .await
            .unwrap();

        let err = auth
            .change_password(&identity, "not-it", "new-password")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidOperation(_)));

        auth.change_password(&identity, "old-password", "new-password")
            .await
            .unwrap();

        assert_eq!(auth.authenticate("erin", "old-password").await.unwrap(), None);
        assert!(auth.authenticate("erin", "new-password").await.unwrap().is_some());
    }
}

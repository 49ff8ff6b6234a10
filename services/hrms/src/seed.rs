//! Initial administrator seeding

use tracing::info;

use crate::auth::AuthService;
use crate::config::Settings;
use crate::error::ServiceResult;
use crate::models::Identity;
use crate::repositories::IdentityRepository;

/// Create the configured administrator unless one with that username exists
///
/// Does nothing when no admin password is configured. Returns the identity
/// that was created, if any.
pub async fn ensure_initial_admin(
    settings: &Settings,
    auth: &AuthService,
    identities: &IdentityRepository,
) -> ServiceResult<Option<Identity>> {
    let Some(password) = settings.admin_password.as_deref() else {
        info!("No admin password configured, skipping administrator seeding");
        return Ok(None);
    };

    if identities
        .find_by_username(&settings.admin_username)
        .await?
        .is_some()
    {
        info!("Administrator {} already exists", settings.admin_username);
        return Ok(None);
    }

    let password_hash = auth.hash_password(password).await?;
    let admin = identities
        .create_admin(&settings.admin_username, &settings.admin_email, &password_hash)
        .await?;

    info!("Seeded administrator {}", settings.admin_username);
    Ok(Some(admin))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use crate::test_support::{test_auth, test_pool};

    #[tokio::test]
    async fn test_seeding_is_idempotent() {
        let pool = test_pool().await;
        let auth = test_auth(pool.clone());
        let identities = IdentityRepository::new(pool);
        let settings = Settings {
            admin_password: Some("bootstrap".to_string()),
            ..Default::default()
        };

        let admin = ensure_initial_admin(&settings, &auth, &identities)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(admin.role, Role::Admin);
        assert_eq!(admin.full_name.as_deref(), Some("Administrator"));

        assert!(
            ensure_initial_admin(&settings, &auth, &identities)
                .await
                .unwrap()
                .is_none()
        );
        assert!(auth.authenticate("admin", "bootstrap").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_no_password_means_no_admin() {
        let pool = test_pool().await;
        let auth = test_auth(pool.clone());
        let identities = IdentityRepository::new(pool);

        let seeded = ensure_initial_admin(&Settings::default(), &auth, &identities)
            .await
            .unwrap();

        assert!(seeded.is_none());
        assert!(identities.find_by_username("admin").await.unwrap().is_none());
    }
}

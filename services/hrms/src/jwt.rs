//! JWT service for token generation and validation
//!
//! This module provides functionality for creating and validating signed
//! bearer tokens with a symmetric secret. Access and refresh tokens share the
//! same claim shape and are told apart by their `type` claim.

use anyhow::Result;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{ServiceError, ServiceResult};

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Shared secret for signing and verifying tokens
    pub secret: String,
    /// HMAC signing algorithm
    pub algorithm: Algorithm,
    /// Access token expiration time in seconds (default: 30 minutes)
    pub access_token_expiry: u64,
    /// Refresh token expiration time in seconds (default: 7 days)
    pub refresh_token_expiry: u64,
}

impl JwtConfig {
    /// Build a config from an algorithm name such as `HS256`
    ///
    /// Only the HMAC family is accepted since tokens are signed with a
    /// shared secret.
    pub fn new(
        secret: impl Into<String>,
        algorithm: &str,
        access_token_expiry: u64,
        refresh_token_expiry: u64,
    ) -> Result<Self> {
        let algorithm = Algorithm::from_str(algorithm)
            .map_err(|_| anyhow::anyhow!("Unknown JWT algorithm: {}", algorithm))?;

        if !matches!(
            algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            anyhow::bail!("JWT algorithm {:?} requires a key pair, not a secret", algorithm);
        }

        Ok(JwtConfig {
            secret: secret.into(),
            algorithm,
            access_token_expiry,
            refresh_token_expiry,
        })
    }
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Identity ID
    pub sub: String,
    /// Token type (access or refresh)
    #[serde(rename = "type")]
    pub token_type: TokenType,
    /// Issued at time
    pub iat: u64,
    /// Expiration time
    pub exp: u64,
}

impl Claims {
    /// Numeric identity id carried in `sub`, if it parses
    pub fn identity_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }
}

/// Token type enum
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    /// Access token
    Access,
    /// Refresh token
    Refresh,
}

/// JWT service
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    config: JwtConfig,
}

impl JwtService {
    /// Initialize a new JWT service
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        let mut validation = Validation::new(config.algorithm);
        validation.validate_exp = true;
        validation.leeway = 0;

        JwtService {
            encoding_key,
            decoding_key,
            validation,
            config,
        }
    }

    fn now() -> ServiceResult<u64> {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .map_err(|e| ServiceError::Internal(format!("Failed to get current time: {}", e)))
    }

    /// Generate an access token for an identity
    pub fn generate_access_token(&self, identity_id: i64) -> ServiceResult<String> {
        self.generate_token(identity_id, TokenType::Access)
    }

    /// Generate a refresh token for an identity
    pub fn generate_refresh_token(&self, identity_id: i64) -> ServiceResult<String> {
        self.generate_token(identity_id, TokenType::Refresh)
    }

    fn generate_token(&self, identity_id: i64, token_type: TokenType) -> ServiceResult<String> {
        let now = Self::now()?;
        let lifetime = match token_type {
            TokenType::Access => self.config.access_token_expiry,
            TokenType::Refresh => self.config.refresh_token_expiry,
        };

        let claims = Claims {
            sub: identity_id.to_string(),
            token_type,
            iat: now,
            exp: now + lifetime,
        };

        self.encode_claims(&claims)
    }

    /// Sign an arbitrary claim set
    pub fn encode_claims(&self, claims: &Claims) -> ServiceResult<String> {
        encode(&Header::new(self.config.algorithm), claims, &self.encoding_key)
            .map_err(|e| ServiceError::Internal(format!("Failed to sign token: {}", e)))
    }

    /// Validate a token's signature and expiry and return the claims
    ///
    /// Every failure collapses into `InvalidCredentials`.
    pub fn validate_token(&self, token: &str) -> ServiceResult<Claims> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("Token rejected: {}", e);
                ServiceError::InvalidCredentials
            })
    }

    /// Get the access token expiry time
    pub fn access_token_expiry(&self) -> u64 {
        self.config.access_token_expiry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(secret: &str) -> JwtService {
        JwtService::new(JwtConfig::new(secret, "HS256", 1800, 604800).unwrap())
    }

    #[test]
    fn test_access_token_round_trip() {
        let jwt = service("unit-test-secret");
        let token = jwt.generate_access_token(42).unwrap();

        let claims = jwt.validate_token(&token).unwrap();
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.identity_id(), Some(42));
        assert_eq!(claims.token_type, TokenType::Access);
        assert_eq!(claims.exp - claims.iat, 1800);
    }

    #[test]
    fn test_refresh_token_carries_kind_and_long_expiry() {
        let jwt = service("unit-test-secret");
        let token = jwt.generate_refresh_token(7).unwrap();

        let claims = jwt.validate_token(&token).unwrap();
        assert_eq!(claims.token_type, TokenType::Refresh);
        assert_eq!(claims.exp - claims.iat, 604800);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let jwt = service("unit-test-secret");
        let now = JwtService::now().unwrap();
        let token = jwt
            .encode_claims(&Claims {
                sub: "42".to_string(),
                token_type: TokenType::Access,
                iat: now - 7200,
                exp: now - 3600,
            })
            .unwrap();

        assert!(matches!(
            jwt.validate_token(&token),
            Err(ServiceError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_foreign_signature_is_rejected() {
        let token = service("secret-a").generate_access_token(1).unwrap();
        assert!(matches!(
            service("secret-b").validate_token(&token),
            Err(ServiceError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_malformed_token_is_rejected() {
        let jwt = service("unit-test-secret");
        assert!(matches!(
            jwt.validate_token("not.a.token"),
            Err(ServiceError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_algorithm_selection() {
        assert_eq!(
            JwtConfig::new("s", "HS512", 1, 1).unwrap().algorithm,
            Algorithm::HS512
        );
        assert!(JwtConfig::new("s", "RS256", 1, 1).is_err());
        assert!(JwtConfig::new("s", "nope", 1, 1).is_err());
    }

    #[test]
    fn test_token_type_wire_format() {
        let json = serde_json::to_value(TokenType::Refresh).unwrap();
        assert_eq!(json, serde_json::json!("refresh"));
    }
}

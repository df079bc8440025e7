//! JWT token generation and validation.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    AuthError, AuthResult, DEFAULT_ACCESS_EXPIRATION_HOURS, DEFAULT_JWT_ISSUER,
    DEFAULT_REFRESH_EXPIRATION_HOURS,
};

/// Kind of token a set of claims belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    /// Short-lived token presented on API calls.
    Access,
    /// Longer-lived token exchanged for new access tokens.
    Refresh,
}

/// JWT claims for Resonate tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    pub sub: String,
    /// Username.
    pub username: String,
    /// Token type.
    pub token_type: TokenType,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
    /// Issuer.
    pub iss: String,
    /// JWT ID.
    pub jti: String,
}

impl Claims {
    /// Creates new claims for a user.
    pub fn new(
        user_id: Uuid,
        username: String,
        token_type: TokenType,
        expiration_hours: u64,
    ) -> Self {
        let now = Utc::now();
        let exp = now + Duration::hours(expiration_hours as i64);

        Self {
            sub: user_id.to_string(),
            username,
            token_type,
            iat: now.timestamp(),
            exp: exp.timestamp(),
            iss: DEFAULT_JWT_ISSUER.to_string(),
            jti: Uuid::new_v4().to_string(),
        }
    }

    /// Returns the user ID.
    pub fn user_id(&self) -> AuthResult<Uuid> {
        self.sub.parse().map_err(|_| AuthError::InvalidToken)
    }

    /// Returns true if the token is expired.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }
}

/// JWT configuration.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key for signing tokens.
    pub secret: String,
    /// Access token expiration in hours.
    pub access_expiration_hours: u64,
    /// Refresh token expiration in hours.
    pub refresh_expiration_hours: u64,
    /// Token issuer.
    pub issuer: String,
}

impl JwtConfig {
    /// Creates a new JWT configuration.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            access_expiration_hours: DEFAULT_ACCESS_EXPIRATION_HOURS,
            refresh_expiration_hours: DEFAULT_REFRESH_EXPIRATION_HOURS,
            issuer: DEFAULT_JWT_ISSUER.to_string(),
        }
    }

    /// Sets the access token expiration time in hours.
    pub fn with_access_expiration_hours(mut self, hours: u64) -> Self {
        self.access_expiration_hours = hours;
        self
    }

    /// Sets the refresh token expiration time in hours.
    pub fn with_refresh_expiration_hours(mut self, hours: u64) -> Self {
        self.refresh_expiration_hours = hours;
        self
    }

    /// Sets the issuer.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }
}

/// JWT token manager.
#[derive(Clone)]
pub struct JwtManager {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtManager")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl JwtManager {
    /// Creates a new JWT manager.
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Generates an access token for a user.
    pub fn generate_access_token(&self, user_id: Uuid, username: String) -> AuthResult<String> {
        self.generate(user_id, username, TokenType::Access)
    }

    /// Generates a refresh token for a user.
    pub fn generate_refresh_token(&self, user_id: Uuid, username: String) -> AuthResult<String> {
        self.generate(user_id, username, TokenType::Refresh)
    }

    fn generate(
        &self,
        user_id: Uuid,
        username: String,
        token_type: TokenType,
    ) -> AuthResult<String> {
        let hours = match token_type {
            TokenType::Access => self.config.access_expiration_hours,
            TokenType::Refresh => self.config.refresh_expiration_hours,
        };
        let mut claims = Claims::new(user_id, username, token_type, hours);
        claims.iss = self.config.issuer.clone();

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::JwtEncoding(e.to_string()))
    }

    /// Validates and decodes a token of either type.
    pub fn validate_token(&self, token: &str) -> AuthResult<Claims> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.config.issuer]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)?;

        Ok(token_data.claims)
    }

    /// Validates an access token specifically.
    pub fn validate_access_token(&self, token: &str) -> AuthResult<Claims> {
        let claims = self.validate_token(token)?;
        if claims.token_type != TokenType::Access {
            return Err(AuthError::WrongTokenType);
        }
        Ok(claims)
    }

    /// Exchanges a valid refresh token for a new access token.
    pub fn refresh_access_token(&self, refresh_token: &str) -> AuthResult<String> {
        let claims = self.validate_token(refresh_token)?;
        if claims.token_type != TokenType::Refresh {
            return Err(AuthError::WrongTokenType);
        }
        self.generate_access_token(claims.user_id()?, claims.username)
    }

    /// Returns the access token expiration time in seconds.
    pub fn access_expiration_seconds(&self) -> u64 {
        self.config.access_expiration_hours * 3600
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> JwtManager {
        JwtManager::new(JwtConfig::new(
            "test-secret-key-must-be-long-enough-for-security",
        ))
    }

    #[test]
    fn test_jwt_generation_and_validation() {
        let manager = manager();
        let user_id = Uuid::new_v4();

        let token = manager
            .generate_access_token(user_id, "alice".to_string())
            .unwrap();

        let claims = manager.validate_access_token(&token).unwrap();
        assert_eq!(claims.user_id().unwrap(), user_id);
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.token_type, TokenType::Access);
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_invalid_token() {
        let result = manager().validate_token("invalid-token");
        assert!(result.is_err());
    }

    #[test]
    fn test_wrong_secret() {
        let manager1 = JwtManager::new(JwtConfig::new("secret-one-must-be-long-enough"));
        let manager2 = JwtManager::new(JwtConfig::new("secret-two-must-be-long-enough"));

        let token = manager1
            .generate_access_token(Uuid::new_v4(), "alice".to_string())
            .unwrap();

        assert!(manager2.validate_token(&token).is_err());
    }

    #[test]
    fn test_refresh_flow() {
        let manager = manager();
        let user_id = Uuid::new_v4();

        let refresh = manager
            .generate_refresh_token(user_id, "alice".to_string())
            .unwrap();

        // A refresh token is not accepted where an access token is required.
        assert!(matches!(
            manager.validate_access_token(&refresh),
            Err(AuthError::WrongTokenType)
        ));

        let access = manager.refresh_access_token(&refresh).unwrap();
        let claims = manager.validate_access_token(&access).unwrap();
        assert_eq!(claims.user_id().unwrap(), user_id);

        // An access token cannot be used to refresh.
        assert!(matches!(
            manager.refresh_access_token(&access),
            Err(AuthError::WrongTokenType)
        ));
    }
}

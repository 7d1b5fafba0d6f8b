use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::core::config::AuthTokenConfig;
use crate::core::error::{AppError, Result};
use crate::features::auth::model::{AuthenticatedUser, Claims, TokenType};

/// Access/refresh token pair issued at login
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
    pub expires_in: i64,
}

/// Issues and verifies HS256 JWTs.
///
/// Refresh tokens are stateless: they are JWTs with a longer lifetime and
/// `token_type = "refresh"`, never persisted server-side.
pub struct TokenService {
    config: AuthTokenConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenService {
    pub fn new(config: AuthTokenConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    pub fn access_token_ttl_secs(&self) -> i64 {
        self.config.access_token_ttl_secs
    }

    pub fn issue_pair(&self, user_id: Uuid, username: &str) -> Result<TokenPair> {
        Ok(TokenPair {
            access: self.issue(user_id, username, TokenType::Access)?,
            refresh: self.issue(user_id, username, TokenType::Refresh)?,
            expires_in: self.config.access_token_ttl_secs,
        })
    }

    pub fn issue_access_token(&self, user_id: Uuid, username: &str) -> Result<String> {
        self.issue(user_id, username, TokenType::Access)
    }

    fn issue(&self, user_id: Uuid, username: &str, token_type: TokenType) -> Result<String> {
        let ttl = match token_type {
            TokenType::Access => self.config.access_token_ttl_secs,
            TokenType::Refresh => self.config.refresh_token_ttl_secs,
        };
        let now = Utc::now().timestamp();

        let claims = Claims {
            sub: user_id,
            username: username.to_string(),
            token_type: token_type.as_str().to_string(),
            iat: now,
            exp: now + ttl,
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
    }

    /// Decode a token, checking signature, expiry and token type
    fn verify(&self, token: &str, expected: TokenType) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = self.config.leeway_secs;

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| {
                tracing::debug!("Token rejected: {}", e);
                AppError::Unauthorized("Token is invalid or expired".to_string())
            })?
            .claims;

        if claims.token_type != expected.as_str() {
            return Err(AppError::Unauthorized("Token has wrong type".to_string()));
        }

        Ok(claims)
    }

    pub fn verify_access_token(&self, token: &str) -> Result<AuthenticatedUser> {
        self.verify(token, TokenType::Access).map(AuthenticatedUser::from)
    }

    pub fn verify_refresh_token(&self, token: &str) -> Result<Claims> {
        self.verify(token, TokenType::Refresh)
    }
}

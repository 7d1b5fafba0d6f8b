use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::features::auth::dtos::{
    AccessTokenResponseDto, LoginRequestDto, RefreshTokenRequestDto, RegisterRequestDto,
    TokenPairResponseDto, UserResponseDto,
};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::password::{hash_password, verify_password};
use crate::features::auth::services::TokenService;
use crate::features::users::models::NewUser;
use crate::features::users::UserRepository;

const INVALID_CREDENTIALS: &str = "No active account found with the given credentials";
const BEARER: &str = "Bearer";

/// Registration, login and token refresh
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    tokens: Arc<TokenService>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, tokens: Arc<TokenService>) -> Self {
        Self { users, tokens }
    }

    /// Create a user account. Expects an already validated DTO.
    pub async fn register(&self, dto: RegisterRequestDto) -> Result<UserResponseDto> {
        let password = dto.password;
        // Argon2 is CPU-bound; keep it off the async workers
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| AppError::Internal(format!("Password hashing task failed: {}", e)))?
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;

        let user = self
            .users
            .create(&NewUser {
                username: dto.username,
                email: dto.email,
                password_hash,
            })
            .await?;

        tracing::info!(user_id = %user.id, username = %user.username, "User registered");

        Ok(user.into())
    }

    pub async fn login(&self, dto: LoginRequestDto) -> Result<TokenPairResponseDto> {
        let user = self
            .users
            .find_by_username(&dto.username)
            .await?
            .filter(|u| u.is_active)
            .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

        let password = dto.password;
        let stored_hash = user.password_hash.clone();
        let verified = tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
            .await
            .map_err(|e| AppError::Internal(format!("Password verification task failed: {}", e)))?
            .map_err(|e| AppError::Internal(format!("Stored password hash is invalid: {}", e)))?;

        if !verified {
            tracing::debug!(username = %user.username, "Login rejected: wrong password");
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        self.users.touch_last_login(user.id).await?;
        let pair = self.tokens.issue_pair(user.id, &user.username)?;

        tracing::info!(user_id = %user.id, "User logged in");

        Ok(TokenPairResponseDto {
            access: pair.access,
            refresh: pair.refresh,
            token_type: BEARER.to_string(),
            expires_in: pair.expires_in,
        })
    }

    /// Exchange a refresh token for a new access token
    pub async fn refresh_token(&self, dto: RefreshTokenRequestDto) -> Result<AccessTokenResponseDto> {
        let claims = self.tokens.verify_refresh_token(&dto.refresh)?;

        // The account may have been deactivated since the refresh token was issued
        let user = self
            .users
            .find_by_id(claims.sub)
            .await?
            .filter(|u| u.is_active)
            .ok_or_else(|| AppError::Unauthorized("Token is invalid or expired".to_string()))?;

        Ok(AccessTokenResponseDto {
            access: self.tokens.issue_access_token(user.id, &user.username)?,
            token_type: BEARER.to_string(),
            expires_in: self.tokens.access_token_ttl_secs(),
        })
    }

    pub async fn get_current_user(&self, user: AuthenticatedUser) -> Result<UserResponseDto> {
        self.users
            .find_by_id(user.user_id)
            .await?
            .map(UserResponseDto::from)
            .ok_or_else(|| AppError::Unauthorized("User no longer exists".to_string()))
    }
}

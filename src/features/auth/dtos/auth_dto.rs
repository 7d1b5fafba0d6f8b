use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::users::models::User;
use crate::shared::validation::USERNAME_REGEX;

/// Request DTO for user registration
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct RegisterRequestDto {
    #[validate(
        length(min = 1, max = 150, message = "Username must be 1-150 characters"),
        regex(
            path = *USERNAME_REGEX,
            message = "Username may contain only letters, digits and @/./+/-/_"
        )
    )]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: String,

    #[validate(must_match(other = "password", message = "Passwords don't match"))]
    pub password_confirm: String,
}

/// Request DTO for user login
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct LoginRequestDto {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Request DTO for token refresh
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct RefreshTokenRequestDto {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh: String,
}

/// Response DTO for login
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenPairResponseDto {
    /// JWT access token
    pub access: String,
    /// JWT refresh token
    pub refresh: String,
    /// Token type (always "Bearer")
    pub token_type: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
}

/// Response DTO for token refresh
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AccessTokenResponseDto {
    /// New JWT access token
    pub access: String,
    /// Token type (always "Bearer")
    pub token_type: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
}

/// Public view of a user account (never includes the password)
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponseDto {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub date_joined: DateTime<Utc>,
}

impl From<User> for UserResponseDto {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            email: u.email,
            date_joined: u.date_joined,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register_dto(password: &str, confirm: &str) -> RegisterRequestDto {
        RegisterRequestDto {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password: password.to_string(),
            password_confirm: confirm.to_string(),
        }
    }

    #[test]
    fn test_register_dto_valid() {
        assert!(register_dto("s3cret-pass", "s3cret-pass").validate().is_ok());
    }

    #[test]
    fn test_register_dto_password_mismatch() {
        let errors = register_dto("s3cret-pass", "other-pass").validate().unwrap_err();
        assert!(errors.field_errors().contains_key("password_confirm"));
    }

    #[test]
    fn test_register_dto_rejects_bad_username_and_email() {
        let mut dto = register_dto("s3cret-pass", "s3cret-pass");
        dto.username = "has space".to_string();
        dto.email = "not-an-email".to_string();
        let errors = dto.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("username"));
        assert!(fields.contains_key("email"));
    }

    #[test]
    fn test_register_dto_accepts_unicode_username() {
        let mut dto = register_dto("s3cret-pass", "s3cret-pass");
        dto.username = "üser.名前".to_string();
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_register_dto_short_password() {
        let errors = register_dto("short", "short").validate().unwrap_err();
        assert!(errors.field_errors().contains_key("password"));
    }
}

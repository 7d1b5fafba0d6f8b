use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::auth::dtos::{
    AccessTokenResponseDto, LoginRequestDto, RefreshTokenRequestDto, RegisterRequestDto,
    TokenPairResponseDto, UserResponseDto,
};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::services::AuthService;
use crate::shared::types::ApiResponse;
use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;
use validator::Validate;

/// Register a new user
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequestDto,
    responses(
        (status = 201, description = "User registered successfully", body = ApiResponse<UserResponseDto>),
        (status = 400, description = "Validation error (including password mismatch or taken username)")
    ),
    tag = "auth"
)]
pub async fn register(
    State(service): State<Arc<AuthService>>,
    AppJson(dto): AppJson<RegisterRequestDto>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponseDto>>)> {
    dto.validate()?;

    let user = service.register(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(user), None, None)),
    ))
}

/// Obtain an access/refresh token pair
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequestDto,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<TokenPairResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "auth"
)]
pub async fn login(
    State(service): State<Arc<AuthService>>,
    AppJson(dto): AppJson<LoginRequestDto>,
) -> Result<Json<ApiResponse<TokenPairResponseDto>>> {
    dto.validate()?;

    let tokens = service.login(dto).await?;
    Ok(Json(ApiResponse::success(Some(tokens), None, None)))
}

/// Exchange a refresh token for a new access token
#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    request_body = RefreshTokenRequestDto,
    responses(
        (status = 200, description = "Token refreshed successfully", body = ApiResponse<AccessTokenResponseDto>),
        (status = 401, description = "Invalid or expired refresh token")
    ),
    tag = "auth"
)]
pub async fn refresh_token(
    State(service): State<Arc<AuthService>>,
    AppJson(dto): AppJson<RefreshTokenRequestDto>,
) -> Result<Json<ApiResponse<AccessTokenResponseDto>>> {
    dto.validate()?;

    let response = service.refresh_token(dto).await?;
    Ok(Json(ApiResponse::success(Some(response), None, None)))
}

/// Get current authenticated user info
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user retrieved successfully", body = ApiResponse<UserResponseDto>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "auth",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_me(
    user: AuthenticatedUser,
    State(service): State<Arc<AuthService>>,
) -> Result<Json<ApiResponse<UserResponseDto>>> {
    let user_data = service.get_current_user(user).await?;
    Ok(Json(ApiResponse::success(Some(user_data), None, None)))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::{json, Value};

    use crate::shared::test_helpers::{TestApp, TEST_PASSWORD};

    #[tokio::test]
    async fn test_register_then_login_issues_tokens() {
        let app = TestApp::new();

        let response = app
            .server
            .post("/api/auth/register")
            .json(&json!({
                "username": "alice",
                "email": "alice@example.com",
                "password": TEST_PASSWORD,
                "password_confirm": TEST_PASSWORD,
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body = response.json::<Value>();
        assert_eq!(body["data"]["username"], "alice");
        assert!(body["data"].get("password").is_none());
        assert!(body["data"].get("password_hash").is_none());

        let login = app
            .server
            .post("/api/auth/login")
            .json(&json!({ "username": "alice", "password": TEST_PASSWORD }))
            .await;
        login.assert_status_ok();
        let tokens = login.json::<Value>();
        assert_eq!(tokens["data"]["token_type"], "Bearer");
        assert!(tokens["data"]["access"].as_str().is_some_and(|t| !t.is_empty()));
        assert!(tokens["data"]["refresh"].as_str().is_some_and(|t| !t.is_empty()));
    }

    #[tokio::test]
    async fn test_password_mismatch_creates_no_user() {
        let app = TestApp::new();

        let response = app
            .server
            .post("/api/auth/register")
            .json(&json!({
                "username": "bob",
                "email": "bob@example.com",
                "password": TEST_PASSWORD,
                "password_confirm": "something-else",
            }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body = response.json::<Value>();
        assert_eq!(body["success"], false);
        assert_eq!(body["errors"][0], "password_confirm: Passwords don't match");
        assert_eq!(app.db.user_count(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_username_is_field_error() {
        let app = TestApp::new();
        let user = app.user().await;

        let response = app
            .server
            .post("/api/auth/register")
            .json(&json!({
                "username": user.username,
                "email": "other@example.com",
                "password": TEST_PASSWORD,
                "password_confirm": TEST_PASSWORD,
            }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(
            response.json::<Value>()["errors"][0],
            "username: A user with that username already exists."
        );
        assert_eq!(app.db.user_count(), 1);
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_user_look_the_same() {
        let app = TestApp::new();
        let user = app.user().await;

        let wrong_password = app
            .server
            .post("/api/auth/login")
            .json(&json!({ "username": user.username, "password": "not-the-password" }))
            .await;
        wrong_password.assert_status(StatusCode::UNAUTHORIZED);

        let unknown = app
            .server
            .post("/api/auth/login")
            .json(&json!({ "username": "nobody", "password": TEST_PASSWORD }))
            .await;
        unknown.assert_status(StatusCode::UNAUTHORIZED);

        assert_eq!(
            wrong_password.json::<Value>()["message"],
            unknown.json::<Value>()["message"]
        );
    }

    #[tokio::test]
    async fn test_refresh_issues_working_access_token() {
        let app = TestApp::new();
        let user = app.user().await;

        let response = app
            .server
            .post("/api/auth/refresh")
            .json(&json!({ "refresh": user.refresh }))
            .await;
        response.assert_status_ok();
        let access = response.json::<Value>()["data"]["access"]
            .as_str()
            .unwrap()
            .to_string();

        let me = app.server.get("/api/auth/me").authorization_bearer(&access).await;
        me.assert_status_ok();
        assert_eq!(me.json::<Value>()["data"]["id"], user.id.to_string());
    }

    #[tokio::test]
    async fn test_token_types_are_not_interchangeable() {
        let app = TestApp::new();
        let user = app.user().await;

        app.server
            .post("/api/auth/refresh")
            .json(&json!({ "refresh": user.access }))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);

        app.server
            .get("/api/auth/me")
            .authorization_bearer(&user.refresh)
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_protected_routes_require_token() {
        let app = TestApp::new();

        for path in ["/api/auth/me", "/api/categories", "/api/tasks", "/api/attachments"] {
            app.server
                .get(path)
                .await
                .assert_status(StatusCode::UNAUTHORIZED);
        }

        app.server
            .get("/api/tasks")
            .authorization_bearer("garbage")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);

        app.server.get("/health").await.assert_status_ok();
    }
}

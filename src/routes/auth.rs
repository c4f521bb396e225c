use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use validator::Validate;

use crate::{
    dto::auth::{
        AuthTokens, ForgotPasswordRequest, LoginRequest, LoginResponse, RefreshTokenRequest,
        RegisterRequest, ResetPasswordRequest, VerifyOtpRequest,
    },
    error::AppResult,
    middleware::{auth::AuthUser, extract::AppJson},
    models::User,
    response::ApiResponse,
    services::auth_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/refresh-token", post(refresh_token))
        .route("/email/send-otp", post(send_email_otp))
        .route("/email/verify-otp", post(verify_email_otp))
        .route("/phone/send-otp", post(send_phone_otp))
        .route("/phone/verify-otp", post(verify_phone_otp))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password", post(reset_password))
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Register user", body = ApiResponse<User>),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Email or phone already registered")
    ),
    tag = "Auth"
)]
pub async fn register(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<User>>)> {
    payload.validate()?;
    let resp = auth_service::register_user(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login user", body = ApiResponse<LoginResponse>),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> AppResult<Json<ApiResponse<LoginResponse>>> {
    payload.validate()?;
    let resp = auth_service::login_user(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "Refresh token revoked"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn logout(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<RefreshTokenRequest>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    payload.validate()?;
    let resp = auth_service::logout_user(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/auth/refresh-token",
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "New token pair", body = ApiResponse<AuthTokens>),
        (status = 401, description = "Refresh token invalid, expired or revoked")
    ),
    tag = "Auth"
)]
pub async fn refresh_token(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RefreshTokenRequest>,
) -> AppResult<Json<ApiResponse<AuthTokens>>> {
    payload.validate()?;
    let resp = auth_service::refresh_token(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/auth/email/send-otp",
    responses((status = 200, description = "Code sent to the account e-mail")),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn send_email_otp(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = auth_service::send_email_otp(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/auth/email/verify-otp",
    request_body = VerifyOtpRequest,
    responses(
        (status = 200, description = "E-mail verified", body = ApiResponse<User>),
        (status = 400, description = "Code invalid or expired")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn verify_email_otp(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<VerifyOtpRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    payload.validate()?;
    let resp = auth_service::verify_email_otp(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/auth/phone/send-otp",
    responses(
        (status = 200, description = "Code sent by SMS"),
        (status = 400, description = "No phone number on the account")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn send_phone_otp(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = auth_service::send_phone_otp(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/auth/phone/verify-otp",
    request_body = VerifyOtpRequest,
    responses(
        (status = 200, description = "Phone verified", body = ApiResponse<User>),
        (status = 400, description = "Code invalid or expired")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn verify_phone_otp(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<VerifyOtpRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    payload.validate()?;
    let resp = auth_service::verify_phone_otp(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/auth/forgot-password",
    request_body = ForgotPasswordRequest,
    responses((status = 200, description = "Reset code sent when the account exists")),
    tag = "Auth"
)]
pub async fn forgot_password(
    State(state): State<AppState>,
    AppJson(payload): AppJson<ForgotPasswordRequest>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    payload.validate()?;
    let resp = auth_service::forgot_password(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/auth/reset-password",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password replaced, sessions revoked"),
        (status = 400, description = "Code invalid or expired")
    ),
    tag = "Auth"
)]
pub async fn reset_password(
    State(state): State<AppState>,
    AppJson(payload): AppJson<ResetPasswordRequest>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    payload.validate()?;
    let resp = auth_service::reset_password(&state, payload).await?;
    Ok(Json(resp))
}

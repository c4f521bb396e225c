mod common;

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use common::database_state;
use food_delivery_api::{
    domain::UserRole,
    dto::auth::{
        ForgotPasswordRequest, LoginRequest, RefreshTokenRequest, RegisterRequest,
        ResetPasswordRequest, VerifyOtpRequest,
    },
    error::AppError,
    middleware::auth::AuthUser,
    notify::OtpSender,
    services::auth_service::{self, MAX_OTP_ATTEMPTS},
    state::AppState,
};
use uuid::Uuid;

/// Keeps every code handed out so tests can replay them.
#[derive(Default)]
struct CapturedOtp {
    codes: Mutex<Vec<String>>,
}

impl CapturedOtp {
    fn last(&self) -> String {
        self.codes
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("an otp was sent")
    }
}

#[async_trait]
impl OtpSender for CapturedOtp {
    async fn send_email(&self, _email: &str, code: &str) -> anyhow::Result<()> {
        self.codes.lock().unwrap().push(code.to_string());
        Ok(())
    }

    async fn send_sms(&self, _phone: &str, code: &str) -> anyhow::Result<()> {
        self.codes.lock().unwrap().push(code.to_string());
        Ok(())
    }
}

async fn register(state: &AppState, password: &str) -> anyhow::Result<(AuthUser, String)> {
    let email = format!("auth-{}@example.com", Uuid::new_v4().simple());
    let user = auth_service::register_user(
        state,
        RegisterRequest {
            name: "Auth Flow".into(),
            email: email.clone(),
            phone: None,
            password: password.into(),
        },
    )
    .await?
    .data
    .ok_or_else(|| anyhow::anyhow!("user missing"))?;
    Ok((
        AuthUser {
            user_id: user.id,
            role: UserRole::User,
        },
        email,
    ))
}

async fn login(state: &AppState, email: &str, password: &str) -> Result<String, AppError> {
    let response = auth_service::login_user(
        state,
        LoginRequest {
            email: email.into(),
            password: password.into(),
        },
    )
    .await?;
    Ok(response
        .data
        .map(|login| login.tokens.refresh_token)
        .unwrap_or_default())
}

async fn refresh(state: &AppState, token: &str) -> Result<String, AppError> {
    let response = auth_service::refresh_token(
        state,
        RefreshTokenRequest {
            refresh_token: token.into(),
        },
    )
    .await?;
    Ok(response
        .data
        .map(|tokens| tokens.refresh_token)
        .unwrap_or_default())
}

fn reset_request(email: &str, code: &str, new_password: &str) -> ResetPasswordRequest {
    ResetPasswordRequest {
        email: email.into(),
        code: code.into(),
        new_password: new_password.into(),
    }
}

fn other_code(code: &str) -> String {
    let wrong = if code == "000000" { "111111" } else { "000000" };
    wrong.to_string()
}

// Refresh tokens rotate, and logout revokes the presented one.
#[tokio::test]
async fn refresh_tokens_rotate_and_logout_revokes() -> anyhow::Result<()> {
    let Some(state) = database_state("auth-secret").await? else {
        return Ok(());
    };
    let (user, email) = register(&state, "first-password").await?;

    let wrong = login(&state, &email, "not-the-password").await;
    assert!(matches!(wrong, Err(AppError::Unauthorized(_))));

    let original = login(&state, &email, "first-password").await?;
    let rotated = refresh(&state, &original).await?;
    assert_ne!(rotated, original);

    let replayed = refresh(&state, &original).await;
    assert!(matches!(replayed, Err(AppError::Unauthorized(_))));

    auth_service::logout_user(
        &state,
        &user,
        RefreshTokenRequest {
            refresh_token: rotated.clone(),
        },
    )
    .await?;
    let after_logout = refresh(&state, &rotated).await;
    assert!(matches!(after_logout, Err(AppError::Unauthorized(_))));

    Ok(())
}

// Reset codes are single use, superseded by newer codes and revoke every session.
#[tokio::test]
async fn password_reset_codes_are_single_use() -> anyhow::Result<()> {
    let Some(mut state) = database_state("auth-secret").await? else {
        return Ok(());
    };
    let captured = Arc::new(CapturedOtp::default());
    state.otp = captured.clone();
    let (_, email) = register(&state, "first-password").await?;
    let session = login(&state, &email, "first-password").await?;

    let forgot = || ForgotPasswordRequest {
        email: email.clone(),
    };
    auth_service::forgot_password(&state, forgot()).await?;
    let stale = captured.last();
    auth_service::forgot_password(&state, forgot()).await?;
    let fresh = captured.last();

    if stale != fresh {
        let superseded =
            auth_service::reset_password(&state, reset_request(&email, &stale, "second-password"))
                .await;
        assert!(matches!(superseded, Err(AppError::BadRequest(_))));
    }

    auth_service::reset_password(&state, reset_request(&email, &fresh, "second-password")).await?;
    let reused =
        auth_service::reset_password(&state, reset_request(&email, &fresh, "third-password")).await;
    assert!(matches!(reused, Err(AppError::BadRequest(_))));

    assert!(login(&state, &email, "first-password").await.is_err());
    login(&state, &email, "second-password").await?;

    let old_session = refresh(&state, &session).await;
    assert!(matches!(old_session, Err(AppError::Unauthorized(_))));

    Ok(())
}

// Wrong guesses are counted and the code is burned at the limit.
#[tokio::test]
async fn otp_is_burned_after_too_many_wrong_guesses() -> anyhow::Result<()> {
    let Some(mut state) = database_state("auth-secret").await? else {
        return Ok(());
    };
    let captured = Arc::new(CapturedOtp::default());
    state.otp = captured.clone();
    let (_, email) = register(&state, "first-password").await?;

    auth_service::forgot_password(&state, ForgotPasswordRequest { email: email.clone() }).await?;
    let code = captured.last();
    let wrong = other_code(&code);

    for _ in 0..MAX_OTP_ATTEMPTS {
        let guess =
            auth_service::reset_password(&state, reset_request(&email, &wrong, "second-password"))
                .await;
        assert!(matches!(guess, Err(AppError::BadRequest(_))));
    }

    let burned =
        auth_service::reset_password(&state, reset_request(&email, &code, "second-password")).await;
    assert!(matches!(burned, Err(AppError::BadRequest(_))));
    login(&state, &email, "first-password").await?;

    // A few misses below the limit still leave the code usable.
    auth_service::forgot_password(&state, ForgotPasswordRequest { email: email.clone() }).await?;
    let code = captured.last();
    let wrong = other_code(&code);
    for _ in 1..MAX_OTP_ATTEMPTS {
        let guess =
            auth_service::reset_password(&state, reset_request(&email, &wrong, "second-password"))
                .await;
        assert!(matches!(guess, Err(AppError::BadRequest(_))));
    }
    auth_service::reset_password(&state, reset_request(&email, &code, "second-password")).await?;
    login(&state, &email, "second-password").await?;

    Ok(())
}

// Email verification consumes its code once.
#[tokio::test]
async fn email_verification_code_is_single_use() -> anyhow::Result<()> {
    let Some(mut state) = database_state("auth-secret").await? else {
        return Ok(());
    };
    let captured = Arc::new(CapturedOtp::default());
    state.otp = captured.clone();
    let (user, _) = register(&state, "first-password").await?;

    auth_service::send_email_otp(&state, &user).await?;
    let code = captured.last();
    let verified = auth_service::verify_email_otp(&state, &user, VerifyOtpRequest { code: code.clone() })
        .await?
        .data
        .expect("user");
    assert!(verified.email_verified);

    let again = auth_service::verify_email_otp(&state, &user, VerifyOtpRequest { code }).await;
    assert!(matches!(again, Err(AppError::BadRequest(_))));

    let resend = auth_service::send_email_otp(&state, &user).await;
    assert!(matches!(resend, Err(AppError::BadRequest(_))));

    Ok(())
}

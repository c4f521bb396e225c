use chrono::{Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    Set, TransactionTrait,
};
use sea_orm::sea_query::Expr;
use uuid::Uuid;

use crate::{
    audit,
    domain::{OtpPurpose, UserRole},
    dto::auth::{
        AuthTokens, ForgotPasswordRequest, LoginRequest, LoginResponse, RefreshTokenRequest,
        RegisterRequest, ResetPasswordRequest, VerifyOtpRequest,
    },
    entity::{
        otp_codes::{self, ActiveModel as OtpActive, Column as OtpCol, Entity as OtpCodes},
        refresh_tokens::{ActiveModel as RefreshActive, Column as RefreshCol, Entity as RefreshTokens},
        users::{self, ActiveModel as UserActive, Column as UserCol, Entity as Users},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::User,
    response::ApiResponse,
    security,
    state::AppState,
};

/// Wrong guesses allowed against one code before it is burned.
pub const MAX_OTP_ATTEMPTS: i32 = 5;

pub async fn register_user(
    state: &AppState,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<User>> {
    let RegisterRequest {
        name,
        email,
        phone,
        password,
    } = payload;
    let email = email.trim().to_lowercase();

    let mut taken = Condition::any().add(UserCol::Email.eq(email.as_str()));
    if let Some(phone) = phone.as_deref() {
        taken = taken.add(UserCol::Phone.eq(phone));
    }
    if Users::find().filter(taken).one(&state.orm).await?.is_some() {
        return Err(AppError::Conflict("Email or phone is already taken".into()));
    }

    let password_hash = security::hash_password(&password)?;
    let now = Utc::now();
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        email: Set(email),
        phone: Set(phone),
        password_hash: Set(password_hash),
        role: Set(UserRole::User),
        email_verified: Set(false),
        phone_verified: Set(false),
        is_available: Set(false),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.pool,
        user.id,
        "user_register",
        "users",
        serde_json::json!({ "user_id": user.id }),
    )
    .await;
    tracing::info!(user_id = %user.id, "user registered");

    Ok(ApiResponse::ok("User registered", User::from(user)))
}

pub async fn login_user(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    let LoginRequest { email, password } = payload;
    let user = Users::find()
        .filter(UserCol::Email.eq(email.trim().to_lowercase()))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid email or password".into()))?;

    if !security::verify_password(&password, &user.password_hash)? {
        return Err(AppError::Unauthorized("Invalid email or password".into()));
    }

    let tokens = issue_tokens(state, &state.orm, &user).await?;

    audit::record(
        &state.pool,
        user.id,
        "user_login",
        "users",
        serde_json::json!({ "user_id": user.id }),
    )
    .await;

    Ok(ApiResponse::ok(
        "Logged in",
        LoginResponse {
            tokens,
            user: User::from(user),
        },
    ))
}

pub async fn logout_user(
    state: &AppState,
    user: &AuthUser,
    payload: RefreshTokenRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = RefreshTokens::update_many()
        .col_expr(RefreshCol::RevokedAt, Expr::value(Utc::now().fixed_offset()))
        .filter(RefreshCol::TokenHash.eq(security::digest(&payload.refresh_token)))
        .filter(RefreshCol::UserId.eq(user.user_id))
        .filter(RefreshCol::RevokedAt.is_null())
        .exec(&state.orm)
        .await?;

    tracing::debug!(user_id = %user.user_id, revoked = result.rows_affected, "logout");
    Ok(ApiResponse::ok("Logged out", serde_json::json!({})))
}

/// Exchanges a live refresh token for a new pair; the old token is revoked.
pub async fn refresh_token(
    state: &AppState,
    payload: RefreshTokenRequest,
) -> AppResult<ApiResponse<AuthTokens>> {
    let txn = state.orm.begin().await?;
    let now = Utc::now();

    let stored = RefreshTokens::find()
        .filter(RefreshCol::TokenHash.eq(security::digest(&payload.refresh_token)))
        .one(&txn)
        .await?
        .filter(|t| t.revoked_at.is_none() && t.expires_at.with_timezone(&Utc) > now)
        .ok_or_else(|| AppError::Unauthorized("Invalid or expired refresh token".into()))?;

    let user = Users::find_by_id(stored.user_id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid or expired refresh token".into()))?;

    // Guarded on revoked_at so two concurrent refreshes cannot both succeed.
    let revoked = RefreshTokens::update_many()
        .col_expr(RefreshCol::RevokedAt, Expr::value(now.fixed_offset()))
        .filter(RefreshCol::Id.eq(stored.id))
        .filter(RefreshCol::RevokedAt.is_null())
        .exec(&txn)
        .await?;
    if revoked.rows_affected == 0 {
        return Err(AppError::Unauthorized("Invalid or expired refresh token".into()));
    }

    let tokens = issue_tokens(state, &txn, &user).await?;
    txn.commit().await?;

    Ok(ApiResponse::ok("Token refreshed", tokens))
}

pub async fn send_email_otp(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let account = find_user(state, user.user_id).await?;
    if account.email_verified {
        return Err(AppError::BadRequest("Email is already verified".into()));
    }
    let code = issue_otp(state, account.id, OtpPurpose::EmailVerification).await?;
    state.otp.send_email(&account.email, &code).await?;
    Ok(otp_sent(state))
}

pub async fn verify_email_otp(
    state: &AppState,
    user: &AuthUser,
    payload: VerifyOtpRequest,
) -> AppResult<ApiResponse<User>> {
    let account = find_user(state, user.user_id).await?;
    consume_otp(&state.orm, account.id, OtpPurpose::EmailVerification, &payload.code).await?;

    let mut active: UserActive = account.into();
    active.email_verified = Set(true);
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(&state.orm).await?;
    Ok(ApiResponse::ok("Email verified", User::from(updated)))
}

pub async fn send_phone_otp(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let account = find_user(state, user.user_id).await?;
    let phone = account
        .phone
        .clone()
        .ok_or_else(|| AppError::BadRequest("No phone number on this account".into()))?;
    if account.phone_verified {
        return Err(AppError::BadRequest("Phone is already verified".into()));
    }
    let code = issue_otp(state, account.id, OtpPurpose::PhoneVerification).await?;
    state.otp.send_sms(&phone, &code).await?;
    Ok(otp_sent(state))
}

pub async fn verify_phone_otp(
    state: &AppState,
    user: &AuthUser,
    payload: VerifyOtpRequest,
) -> AppResult<ApiResponse<User>> {
    let account = find_user(state, user.user_id).await?;
    consume_otp(&state.orm, account.id, OtpPurpose::PhoneVerification, &payload.code).await?;

    let mut active: UserActive = account.into();
    active.phone_verified = Set(true);
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(&state.orm).await?;
    Ok(ApiResponse::ok("Phone verified", User::from(updated)))
}

/// Always answers the same way so callers cannot tell which emails are registered.
pub async fn forgot_password(
    state: &AppState,
    payload: ForgotPasswordRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let account = Users::find()
        .filter(UserCol::Email.eq(payload.email.trim().to_lowercase()))
        .one(&state.orm)
        .await?;

    if let Some(account) = account {
        let code = issue_otp(state, account.id, OtpPurpose::PasswordReset).await?;
        state.otp.send_email(&account.email, &code).await?;
    }

    Ok(ApiResponse::ok(
        "If the email is registered, a reset code has been sent",
        serde_json::json!({}),
    ))
}

pub async fn reset_password(
    state: &AppState,
    payload: ResetPasswordRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let account = Users::find()
        .filter(UserCol::Email.eq(payload.email.trim().to_lowercase()))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::BadRequest("Invalid or expired code".into()))?;

    // Consumed outside the transaction so a failed guess still counts.
    consume_otp(&state.orm, account.id, OtpPurpose::PasswordReset, &payload.code).await?;

    let txn = state.orm.begin().await?;

    let user_id = account.id;
    let mut active: UserActive = account.into();
    active.password_hash = Set(security::hash_password(&payload.new_password)?);
    active.updated_at = Set(Utc::now().into());
    active.update(&txn).await?;

    revoke_all_refresh_tokens(&txn, user_id).await?;
    txn.commit().await?;

    audit::record(
        &state.pool,
        user_id,
        "password_reset",
        "users",
        serde_json::json!({ "user_id": user_id }),
    )
    .await;

    Ok(ApiResponse::ok("Password has been reset", serde_json::json!({})))
}

pub(crate) async fn revoke_all_refresh_tokens<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
) -> AppResult<u64> {
    let result = RefreshTokens::update_many()
        .col_expr(RefreshCol::RevokedAt, Expr::value(Utc::now().fixed_offset()))
        .filter(RefreshCol::UserId.eq(user_id))
        .filter(RefreshCol::RevokedAt.is_null())
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

async fn find_user(state: &AppState, user_id: Uuid) -> AppResult<users::Model> {
    Users::find_by_id(user_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("User"))
}

async fn issue_tokens<C: ConnectionTrait>(
    state: &AppState,
    db: &C,
    user: &users::Model,
) -> AppResult<AuthTokens> {
    let config = &state.config;
    let access_token = security::issue_access_token(
        &config.jwt_secret,
        user.id,
        user.role,
        config.access_token_ttl_minutes,
    )?;

    let refresh_token = security::new_refresh_token();
    let now = Utc::now();
    RefreshActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.id),
        token_hash: Set(security::digest(&refresh_token)),
        expires_at: Set((now + Duration::days(config.refresh_token_ttl_days)).into()),
        revoked_at: Set(None),
        created_at: Set(now.into()),
    }
    .insert(db)
    .await?;

    Ok(AuthTokens {
        access_token,
        refresh_token,
        expires_in: config.access_token_ttl_minutes * 60,
        token_type: "Bearer".to_string(),
    })
}

/// Creates a fresh code for the purpose and retires any earlier one.
async fn issue_otp(state: &AppState, user_id: Uuid, purpose: OtpPurpose) -> AppResult<String> {
    let now = Utc::now();
    OtpCodes::update_many()
        .col_expr(OtpCol::ConsumedAt, Expr::value(now.fixed_offset()))
        .filter(OtpCol::UserId.eq(user_id))
        .filter(OtpCol::Purpose.eq(purpose))
        .filter(OtpCol::ConsumedAt.is_null())
        .exec(&state.orm)
        .await?;

    let code = security::new_otp_code();
    OtpActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        purpose: Set(purpose),
        code_hash: Set(security::digest(&code)),
        expires_at: Set((now + Duration::minutes(state.config.otp_ttl_minutes)).into()),
        consumed_at: Set(None),
        attempts: Set(0),
        created_at: Set(now.into()),
    }
    .insert(&state.orm)
    .await?;

    tracing::debug!(%user_id, purpose = purpose.as_str(), "otp issued");
    Ok(code)
}

/// Checks a code against the newest live one and consumes it on a match.
///
/// Every mismatch is counted; the code is burned once the count reaches
/// [`MAX_OTP_ATTEMPTS`].
async fn consume_otp<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    purpose: OtpPurpose,
    code: &str,
) -> AppResult<()> {
    let invalid = || AppError::BadRequest("Invalid or expired code".into());
    let now = Utc::now();

    let otp: otp_codes::Model = OtpCodes::find()
        .filter(OtpCol::UserId.eq(user_id))
        .filter(OtpCol::Purpose.eq(purpose))
        .filter(OtpCol::ConsumedAt.is_null())
        .order_by_desc(OtpCol::CreatedAt)
        .one(db)
        .await?
        .ok_or_else(invalid)?;

    if otp.expires_at.with_timezone(&Utc) <= now {
        return Err(invalid());
    }

    if otp.code_hash != security::digest(code.trim()) {
        OtpCodes::update_many()
            .col_expr(OtpCol::Attempts, Expr::col(OtpCol::Attempts).add(1))
            .filter(OtpCol::Id.eq(otp.id))
            .exec(db)
            .await?;
        let burned = OtpCodes::update_many()
            .col_expr(OtpCol::ConsumedAt, Expr::value(now.fixed_offset()))
            .filter(OtpCol::Id.eq(otp.id))
            .filter(OtpCol::ConsumedAt.is_null())
            .filter(OtpCol::Attempts.gte(MAX_OTP_ATTEMPTS))
            .exec(db)
            .await?;
        if burned.rows_affected > 0 {
            tracing::warn!(%user_id, purpose = purpose.as_str(), "otp burned after too many attempts");
        }
        return Err(invalid());
    }

    // Only one caller can flip a live code to consumed.
    let consumed = OtpCodes::update_many()
        .col_expr(OtpCol::ConsumedAt, Expr::value(now.fixed_offset()))
        .filter(OtpCol::Id.eq(otp.id))
        .filter(OtpCol::ConsumedAt.is_null())
        .exec(db)
        .await?;
    if consumed.rows_affected == 0 {
        return Err(invalid());
    }
    Ok(())
}

fn otp_sent(state: &AppState) -> ApiResponse<serde_json::Value> {
    ApiResponse::ok(
        "Verification code sent",
        serde_json::json!({ "expiresInMinutes": state.config.otp_ttl_minutes }),
    )
}

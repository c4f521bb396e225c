use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use password_hash::rand_core::{OsRng, RngCore};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::{
    domain::UserRole,
    dto::auth::Claims,
    error::{AppError, AppResult},
};

pub const OTP_DIGITS: u32 = 6;

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

pub fn verify_password(password: &str, password_hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

pub fn issue_access_token(
    secret: &str,
    user_id: Uuid,
    role: UserRole,
    ttl_minutes: i64,
) -> AppResult<String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::minutes(ttl_minutes))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: user_id.to_string(),
        role: role.as_str().to_string(),
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

pub fn decode_access_token(secret: &str, token: &str) -> AppResult<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::Unauthorized("Invalid or expired token".into()))
}

/// SHA-256 hex digest; refresh tokens and OTP codes are only stored in this form.
pub fn digest(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    format!("{:x}", hasher.finalize())
}

pub fn new_refresh_token() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}

pub fn new_otp_code() -> String {
    let bound = 10u32.pow(OTP_DIGITS);
    let code = OsRng.next_u32() % bound;
    format!("{:0width$}", code, width = OTP_DIGITS as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_verifies() {
        let hash = hash_password("correct horse").unwrap();
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("battery staple", &hash).unwrap());
    }

    #[test]
    fn access_token_round_trip_keeps_role() {
        let user_id = Uuid::new_v4();
        let token = issue_access_token("test-secret", user_id, UserRole::Delivery, 5).unwrap();
        let claims = decode_access_token("test-secret", &token).unwrap();
        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.role, "delivery");
    }

    #[test]
    fn access_token_rejects_wrong_secret_and_expiry() {
        let token = issue_access_token("a", Uuid::new_v4(), UserRole::User, 5).unwrap();
        assert!(matches!(
            decode_access_token("b", &token),
            Err(AppError::Unauthorized(_))
        ));
        let expired = issue_access_token("a", Uuid::new_v4(), UserRole::User, -10).unwrap();
        assert!(decode_access_token("a", &expired).is_err());
    }

    #[test]
    fn otp_codes_are_six_digits() {
        for _ in 0..50 {
            let code = new_otp_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn digest_is_stable_hex() {
        assert_eq!(digest("123456"), digest("123456"));
        assert_ne!(digest("123456"), digest("654321"));
        assert_eq!(digest("x").len(), 64);
        assert_ne!(new_refresh_token(), new_refresh_token());
    }
}

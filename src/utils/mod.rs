use axum::Json;
use bcrypt::{hash, verify};
use chrono::{TimeDelta, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Config;
use crate::ids::RecordId;

pub fn hash_password(password: &str, cost: u32) -> Result<String, bcrypt::BcryptError> {
    hash(password.as_bytes(), cost)
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, bcrypt::BcryptError> {
    verify(password.as_bytes(), hash)
}

// 角色不放进令牌，每次请求由认证中间件从存储重新读取
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // 用户ID
    pub exp: i64,    // 过期时间
    pub iat: i64,    // 签发时间
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token lifetime out of range")]
    Lifetime,
    #[error(transparent)]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

pub fn generate_token(user_id: RecordId, config: &Config) -> Result<(String, i64), TokenError> {
    let now = Utc::now();
    let lifetime = i64::try_from(config.jwt_expiration().as_secs())
        .ok()
        .and_then(TimeDelta::try_seconds)
        .ok_or(TokenError::Lifetime)?;
    let expiration = now
        .checked_add_signed(lifetime)
        .ok_or(TokenError::Lifetime)?
        .timestamp();

    let claims = Claims {
        sub: user_id.to_string(),
        exp: expiration,
        iat: now.timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )?;

    Ok((token, expiration))
}

pub fn verify_token(token: &str, config: &Config) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &Validation::default(),
    )?;

    Ok(token_data.claims)
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resp_data: Option<T>,
}

pub fn success_to_api_response<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        code: error_codes::SUCCESS,
        msg: "success".into(),
        resp_data: Some(data),
    })
}

pub fn error_to_api_response<T>(code: i32, msg: String) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        code,
        msg,
        resp_data: None,
    })
}

pub mod error_codes {
    pub const SUCCESS: i32 = 0;
    pub const VALIDATION_ERROR: i32 = 1000;
    pub const EMAIL_TAKEN: i32 = 1001;
    pub const AUTH_FAILED: i32 = 1002;
    pub const PERMISSION_DENIED: i32 = 1003;
    pub const NOT_FOUND: i32 = 1004;
    pub const RATE_LIMIT: i32 = 1005;
    pub const NOT_ELIGIBLE: i32 = 1100;
    pub const ALREADY_REGISTERED: i32 = 1101;
    pub const NOT_REGISTERED: i32 = 1102;
    pub const INTERNAL_ERROR: i32 = 5000;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config::from_lookup(|key| match key {
            "JWT_SECRET" => Some("segredo-de-teste".into()),
            "STORAGE_BACKEND" => Some("memory".into()),
            _ => None,
        })
        .unwrap()
    }

    #[test]
    fn token_round_trip_keeps_subject() {
        let config = test_config();
        let (token, exp) = generate_token(RecordId::new(9), &config).unwrap();
        let claims = verify_token(&token, &config).unwrap();
        assert_eq!(claims.sub, "9");
        assert_eq!(claims.exp, exp);
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[test]
    fn lifetime_beyond_calendar_range_is_an_error() {
        let mut config = test_config();
        config.jwt_expiration_secs = 10_000_000_000_000 * 3600;
        assert!(matches!(
            generate_token(RecordId::new(1), &config),
            Err(TokenError::Lifetime)
        ));
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let config = test_config();
        let (token, _) = generate_token(RecordId::new(1), &config).unwrap();
        let mut other = config.clone();
        other.jwt_secret = "outro".into();
        assert!(verify_token(&token, &other).is_err());
    }

    #[test]
    fn password_hash_verifies() {
        let hashed = hash_password("segredo1", 4).unwrap();
        assert!(verify_password("segredo1", &hashed).unwrap());
        assert!(!verify_password("errado", &hashed).unwrap());
    }
}

pub mod activity;
pub mod agriculture;
pub mod auth;
pub mod dashboard;
pub mod extract;
pub mod participation;
pub mod recipe;
pub mod user;

use crate::error::{AppError, AppResult};
use crate::ids::RecordId;
use crate::repository::StoreError;

pub(crate) const MIN_PASSWORD_LEN: usize = 6;

// 路径里的 id 统一在这里解析
pub(crate) fn parse_id(raw: &str) -> AppResult<RecordId> {
    raw.parse::<RecordId>().map_err(AppError::from)
}

/// 去掉首尾空白，空字符串视为缺失
pub(crate) fn required(value: &str, field: &str) -> AppResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::Validation(format!("O campo {field} é obrigatório")));
    }
    Ok(value.to_string())
}

pub(crate) fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub(crate) fn normalize_email(email: &str) -> AppResult<String> {
    let email = required(email, "email")?.to_lowercase();
    if !email.contains('@') {
        return Err(AppError::Validation("Email inválido".into()));
    }
    Ok(email)
}

pub(crate) fn validate_password(password: &str) -> AppResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "A senha deve ter pelo menos {MIN_PASSWORD_LEN} caracteres"
        )));
    }
    Ok(())
}

/// 存储层的 NotFound 换成具体实体的提示
pub(crate) fn or_not_found(message: &'static str) -> impl FnOnce(StoreError) -> AppError {
    move |e| match e {
        StoreError::NotFound => AppError::NotFound(message),
        other => other.into(),
    }
}

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::ids::InvalidRecordId;
use crate::ledger::LedgerError;
use crate::repository::StoreError;
use crate::schedule::ScheduleError;
use crate::utils::{TokenError, error_codes, error_to_api_response};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Não autorizado")]
    Unauthorized,
    #[error("Acesso restrito a administradores")]
    Forbidden,
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(&'static str),
    #[error("Este email já está em uso")]
    EmailTaken,
    #[error("Atividade não encontrada ou inativa")]
    NotEligible,
    #[error("Você já está inscrito nesta atividade")]
    AlreadyRegistered,
    #[error("Participação não encontrada")]
    NotRegistered,
    #[error("Erro interno do servidor")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    fn status_and_code(&self) -> (StatusCode, i32) {
        match self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, error_codes::AUTH_FAILED),
            AppError::Forbidden => (StatusCode::FORBIDDEN, error_codes::PERMISSION_DENIED),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, error_codes::VALIDATION_ERROR),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, error_codes::NOT_FOUND),
            AppError::EmailTaken => (StatusCode::CONFLICT, error_codes::EMAIL_TAKEN),
            AppError::NotEligible => (StatusCode::NOT_FOUND, error_codes::NOT_ELIGIBLE),
            AppError::AlreadyRegistered => (StatusCode::CONFLICT, error_codes::ALREADY_REGISTERED),
            AppError::NotRegistered => (StatusCode::NOT_FOUND, error_codes::NOT_REGISTERED),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_codes::INTERNAL_ERROR,
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if let AppError::Internal(detail) = &self {
            tracing::error!("Internal error: {}", detail);
        }

        (status, error_to_api_response::<()>(code, self.to_string())).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::UniqueViolation(_) => AppError::EmailTaken,
            StoreError::NotFound => AppError::NotFound("Registro não encontrado"),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<LedgerError> for AppError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::NotEligible => AppError::NotEligible,
            LedgerError::AlreadyRegistered => AppError::AlreadyRegistered,
            LedgerError::NotRegistered => AppError::NotRegistered,
            LedgerError::Store(e) => AppError::Internal(e.to_string()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(format!(
            "Corpo da requisição inválido: {}",
            rejection.body_text()
        ))
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(format!(
            "Parâmetros de consulta inválidos: {}",
            rejection.body_text()
        ))
    }
}

impl From<ScheduleError> for AppError {
    fn from(e: ScheduleError) -> Self {
        AppError::Validation(e.to_string())
    }
}

impl From<InvalidRecordId> for AppError {
    fn from(e: InvalidRecordId) -> Self {
        AppError::Validation(e.to_string())
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(e: bcrypt::BcryptError) -> Self {
        AppError::Internal(format!("password hashing failed: {e}"))
    }
}

impl From<TokenError> for AppError {
    fn from(e: TokenError) -> Self {
        AppError::Internal(format!("token signing failed: {e}"))
    }
}

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    AppState,
    auth::{AuthContext, Role},
    error::{AppError, AppResult},
    models::NewUser,
    routes::{extract::Json, normalize_email, or_not_found, required, validate_password},
    utils::{generate_token, hash_password, success_to_api_response, verify_password},
};

use super::model::{
    ChangePasswordRequest, LoginRequest, LoginResponse, MessageResponse, SignupRequest,
};

#[axum::debug_handler]
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> AppResult<impl IntoResponse> {
    let name = required(&req.name, "nome")?;
    let email = normalize_email(&req.email)?;
    validate_password(&req.password)?;

    // 先查一次给出明确提示，唯一约束兜底
    if state.users.find_by_email(&email).await?.is_some() {
        return Err(AppError::EmailTaken);
    }

    let password_hash = hash_password(&req.password, state.config.bcrypt_cost)?;
    let user = state
        .users
        .create(NewUser {
            name,
            email,
            password_hash,
            role: Role::Standard,
            active: true,
        })
        .await?;

    tracing::info!("User {} signed up", user.id);
    Ok((StatusCode::CREATED, success_to_api_response(user)))
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    let email = req.email.trim();
    if email.is_empty() || req.password.is_empty() {
        return Err(AppError::Validation("Email e senha são obrigatórios".into()));
    }

    // 未知用户、停用用户和错误密码返回同样的错误
    let user = state
        .users
        .find_by_email(email)
        .await?
        .filter(|u| u.active)
        .ok_or(AppError::Unauthorized)?;
    if !verify_password(&req.password, &user.password_hash)? {
        return Err(AppError::Unauthorized);
    }

    let (token, expires_at) = generate_token(user.id, &state.config)?;
    Ok(success_to_api_response(LoginResponse {
        token,
        expires_at,
        user,
    }))
}

#[axum::debug_handler]
pub async fn me(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthContext>,
) -> AppResult<impl IntoResponse> {
    let user = state
        .users
        .find_by_id(caller.user_id)
        .await?
        .ok_or(AppError::NotFound("Usuário não encontrado"))?;
    Ok(success_to_api_response(user))
}

#[axum::debug_handler]
pub async fn change_password(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthContext>,
    Json(req): Json<ChangePasswordRequest>,
) -> AppResult<impl IntoResponse> {
    validate_password(&req.new_password)?;

    let user = state
        .users
        .find_by_id(caller.user_id)
        .await?
        .ok_or(AppError::NotFound("Usuário não encontrado"))?;
    if !verify_password(&req.current_password, &user.password_hash)? {
        return Err(AppError::Validation("Senha atual incorreta".into()));
    }

    let password_hash = hash_password(&req.new_password, state.config.bcrypt_cost)?;
    state
        .users
        .update_password(user.id, password_hash)
        .await
        .map_err(or_not_found("Usuário não encontrado"))?;

    tracing::info!("User {} changed password", user.id);
    Ok(success_to_api_response(MessageResponse::new(
        "Senha alterada com sucesso",
    )))
}

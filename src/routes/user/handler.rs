use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    AppState,
    auth::AuthContext,
    error::{AppError, AppResult},
    models::{ListFilter, ListParams, NewUser, UserChanges},
    routes::{
        auth::MessageResponse,
        extract::{Json, Query},
        normalize_email, optional, or_not_found, parse_id, required, validate_password,
    },
    utils::{hash_password, success_to_api_response},
};

use super::model::{CreateUserRequest, UpdateUserRequest};

const USER_NOT_FOUND: &str = "Usuário não encontrado";

#[axum::debug_handler]
pub async fn list(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthContext>,
    Query(params): Query<ListParams>,
) -> AppResult<impl IntoResponse> {
    caller.require_admin()?;
    let filter = ListFilter::from_params(params, state.config.max_page_size);
    let page = state.users.list(&filter).await?;
    Ok(success_to_api_response(page))
}

#[axum::debug_handler]
pub async fn create(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthContext>,
    Json(req): Json<CreateUserRequest>,
) -> AppResult<impl IntoResponse> {
    caller.require_admin()?;
    let name = required(&req.name, "nome")?;
    let email = normalize_email(&req.email)?;
    validate_password(&req.password)?;

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
            role: req.role.unwrap_or_default(),
            active: req.active.unwrap_or(true),
        })
        .await?;

    tracing::info!("Admin {} created user {}", caller.user_id, user.id);
    Ok((StatusCode::CREATED, success_to_api_response(user)))
}

#[axum::debug_handler]
pub async fn get(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthContext>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    caller.require_admin()?;
    let id = parse_id(&id)?;
    let user = state
        .users
        .find_by_id(id)
        .await?
        .ok_or(AppError::NotFound(USER_NOT_FOUND))?;
    Ok(success_to_api_response(user))
}

#[axum::debug_handler]
pub async fn update(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthContext>,
    Path(id): Path<String>,
    Json(req): Json<UpdateUserRequest>,
) -> AppResult<impl IntoResponse> {
    caller.require_admin()?;
    let id = parse_id(&id)?;
    let existing = state
        .users
        .find_by_id(id)
        .await?
        .ok_or(AppError::NotFound(USER_NOT_FOUND))?;

    let name = required(&req.name, "nome")?;
    let email = normalize_email(&req.email)?;
    // 邮箱只需在其他用户之间唯一
    if state
        .users
        .find_by_email(&email)
        .await?
        .is_some_and(|other| other.id != id)
    {
        return Err(AppError::EmailTaken);
    }

    // 只有非空密码才重新哈希
    let password_hash = match optional(req.password) {
        Some(password) => {
            validate_password(&password)?;
            Some(hash_password(&password, state.config.bcrypt_cost)?)
        }
        None => None,
    };

    let user = state
        .users
        .update(
            id,
            UserChanges {
                name,
                email,
                role: req.role.unwrap_or(existing.role),
                active: req.active.unwrap_or(existing.active),
                password_hash,
            },
        )
        .await
        .map_err(or_not_found(USER_NOT_FOUND))?;

    tracing::info!("Admin {} updated user {}", caller.user_id, user.id);
    Ok(success_to_api_response(user))
}

#[axum::debug_handler]
pub async fn remove(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthContext>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    caller.require_admin()?;
    let id = parse_id(&id)?;
    state
        .users
        .delete(id)
        .await
        .map_err(or_not_found(USER_NOT_FOUND))?;

    tracing::info!("Admin {} deleted user {}", caller.user_id, id);
    Ok(success_to_api_response(MessageResponse::new(
        "Usuário excluído com sucesso",
    )))
}

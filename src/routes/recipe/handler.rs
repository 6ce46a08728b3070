use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    AppState,
    auth::AuthContext,
    error::{AppError, AppResult},
    models::{ListFilter, ListParams},
    routes::{auth::MessageResponse, extract::{Json, Query}, or_not_found, parse_id},
    utils::success_to_api_response,
};

use super::model::RecipeRequest;

const RECIPE_NOT_FOUND: &str = "Receita não encontrada";

// 会员可见的全部食谱
pub async fn list_all(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let recipes = state.recipes.list_all().await?;
    Ok(success_to_api_response(recipes))
}

pub async fn list(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthContext>,
    Query(params): Query<ListParams>,
) -> AppResult<impl IntoResponse> {
    caller.require_admin()?;
    let filter = ListFilter::from_params(params, state.config.max_page_size);
    let page = state.recipes.list(&filter).await?;
    Ok(success_to_api_response(page))
}

// 作者为当前管理员
pub async fn create(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthContext>,
    Json(req): Json<RecipeRequest>,
) -> AppResult<impl IntoResponse> {
    caller.require_admin()?;
    let recipe = state
        .recipes
        .create(req.into_draft()?, caller.user_id)
        .await?;

    tracing::info!("Admin {} created recipe {}", caller.user_id, recipe.id);
    Ok((StatusCode::CREATED, success_to_api_response(recipe)))
}

pub async fn get(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthContext>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    caller.require_admin()?;
    let id = parse_id(&id)?;
    let recipe = state
        .recipes
        .find_by_id(id)
        .await?
        .ok_or(AppError::NotFound(RECIPE_NOT_FOUND))?;
    Ok(success_to_api_response(recipe))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthContext>,
    Path(id): Path<String>,
    Json(req): Json<RecipeRequest>,
) -> AppResult<impl IntoResponse> {
    caller.require_admin()?;
    let id = parse_id(&id)?;
    let recipe = state
        .recipes
        .update(id, req.into_draft()?)
        .await
        .map_err(or_not_found(RECIPE_NOT_FOUND))?;
    Ok(success_to_api_response(recipe))
}

pub async fn remove(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthContext>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    caller.require_admin()?;
    let id = parse_id(&id)?;
    state
        .recipes
        .delete(id)
        .await
        .map_err(or_not_found(RECIPE_NOT_FOUND))?;

    tracing::info!("Admin {} deleted recipe {}", caller.user_id, id);
    Ok(success_to_api_response(MessageResponse::new(
        "Receita excluída com sucesso",
    )))
}

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

use super::model::ArticleRequest;

const ARTICLE_NOT_FOUND: &str = "Artigo não encontrado";

// 已发布的文章，最新的在前
pub async fn list_published(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let articles = state.articles.list_published().await?;
    Ok(success_to_api_response(articles))
}

pub async fn list(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthContext>,
    Query(params): Query<ListParams>,
) -> AppResult<impl IntoResponse> {
    caller.require_admin()?;
    let filter = ListFilter::from_params(params, state.config.max_page_size);
    let page = state.articles.list(&filter).await?;
    Ok(success_to_api_response(page))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthContext>,
    Json(req): Json<ArticleRequest>,
) -> AppResult<impl IntoResponse> {
    caller.require_admin()?;
    let article = state.articles.create(req.into_draft()?).await?;

    tracing::info!("Admin {} created article {}", caller.user_id, article.id);
    Ok((StatusCode::CREATED, success_to_api_response(article)))
}

pub async fn get(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthContext>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    caller.require_admin()?;
    let id = parse_id(&id)?;
    let article = state
        .articles
        .find_by_id(id)
        .await?
        .ok_or(AppError::NotFound(ARTICLE_NOT_FOUND))?;
    Ok(success_to_api_response(article))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthContext>,
    Path(id): Path<String>,
    Json(req): Json<ArticleRequest>,
) -> AppResult<impl IntoResponse> {
    caller.require_admin()?;
    let id = parse_id(&id)?;
    let article = state
        .articles
        .update(id, req.into_draft()?)
        .await
        .map_err(or_not_found(ARTICLE_NOT_FOUND))?;
    Ok(success_to_api_response(article))
}

pub async fn remove(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthContext>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    caller.require_admin()?;
    let id = parse_id(&id)?;
    state
        .articles
        .delete(id)
        .await
        .map_err(or_not_found(ARTICLE_NOT_FOUND))?;

    tracing::info!("Admin {} deleted article {}", caller.user_id, id);
    Ok(success_to_api_response(MessageResponse::new(
        "Artigo excluído com sucesso",
    )))
}

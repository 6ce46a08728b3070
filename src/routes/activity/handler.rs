use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    AppState,
    auth::AuthContext,
    error::{AppError, AppResult},
    models::{ListFilter, ListParams, Page},
    routes::{auth::MessageResponse, extract::{Json, Query}, or_not_found, parse_id},
    utils::success_to_api_response,
};

use super::model::{ActivityDetail, ActivityRequest, ActivityView};

const ACTIVITY_NOT_FOUND: &str = "Atividade não encontrada";

// 会员活动列表：启用的活动按日期正序，附带报名情况
pub async fn list_board(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthContext>,
) -> AppResult<impl IntoResponse> {
    let ledger = state.ledger();
    let activities = state.activities.list_active().await?;

    let mut board = Vec::with_capacity(activities.len());
    for activity in activities {
        let overview = ledger.overview(&caller, activity.id).await?;
        board.push(ActivityView::new(activity, overview));
    }
    Ok(success_to_api_response(board))
}

// 管理端活动列表，每一项附带报名名单和人数
pub async fn list(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthContext>,
    Query(params): Query<ListParams>,
) -> AppResult<impl IntoResponse> {
    caller.require_admin()?;
    let filter = ListFilter::from_params(params, state.config.max_page_size);
    let page = state.activities.list(&filter).await?;

    let ledger = state.ledger();
    let mut items = Vec::with_capacity(page.items.len());
    for activity in page.items {
        let participants = ledger.list_for_activity(activity.id).await?;
        items.push(ActivityDetail::new(activity, participants));
    }
    Ok(success_to_api_response(Page {
        items,
        pagination: page.pagination,
    }))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthContext>,
    Json(req): Json<ActivityRequest>,
) -> AppResult<impl IntoResponse> {
    caller.require_admin()?;
    let activity = state.activities.create(req.into_draft()?).await?;

    tracing::info!("Admin {} created activity {}", caller.user_id, activity.id);
    Ok((StatusCode::CREATED, success_to_api_response(activity)))
}

pub async fn get(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthContext>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    caller.require_admin()?;
    let id = parse_id(&id)?;
    let activity = state
        .activities
        .find_by_id(id)
        .await?
        .ok_or(AppError::NotFound(ACTIVITY_NOT_FOUND))?;
    let participants = state.ledger().list_for_activity(id).await?;

    Ok(success_to_api_response(ActivityDetail::new(
        activity,
        participants,
    )))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthContext>,
    Path(id): Path<String>,
    Json(req): Json<ActivityRequest>,
) -> AppResult<impl IntoResponse> {
    caller.require_admin()?;
    let id = parse_id(&id)?;
    let activity = state
        .activities
        .update(id, req.into_draft()?)
        .await
        .map_err(or_not_found(ACTIVITY_NOT_FOUND))?;

    tracing::info!("Admin {} updated activity {}", caller.user_id, id);
    Ok(success_to_api_response(activity))
}

pub async fn remove(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthContext>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    caller.require_admin()?;
    let id = parse_id(&id)?;
    state
        .activities
        .delete(id)
        .await
        .map_err(or_not_found(ACTIVITY_NOT_FOUND))?;

    tracing::info!("Admin {} deleted activity {}", caller.user_id, id);
    Ok(success_to_api_response(MessageResponse::new(
        "Atividade excluída com sucesso",
    )))
}

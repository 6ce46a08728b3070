use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use crate::{
    AppState,
    auth::AuthContext,
    error::AppResult,
    ids::RecordId,
    routes::{auth::MessageResponse, extract::Json, parse_id},
    utils::success_to_api_response,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub activity_id: RecordId,
}

// 报名参加活动
pub async fn register(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthContext>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<impl IntoResponse> {
    let participation = state.ledger().register(&caller, req.activity_id).await?;
    Ok((StatusCode::CREATED, success_to_api_response(participation)))
}

// 取消报名
pub async fn cancel(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthContext>,
    Path(activity_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let activity_id = parse_id(&activity_id)?;
    state.ledger().cancel(&caller, activity_id).await?;
    Ok(success_to_api_response(MessageResponse::new(
        "Participação cancelada com sucesso",
    )))
}

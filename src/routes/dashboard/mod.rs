use axum::{
    extract::{Extension, State},
    response::IntoResponse,
};
use serde::Serialize;

use crate::{AppState, auth::AuthContext, error::AppResult, utils::success_to_api_response};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: i64, // 服务器时间
}

#[derive(Debug, Serialize)]
pub struct DashboardSummary {
    pub users: u64,
    pub activities: u64,
    pub recipes: u64,
    pub articles: u64,
}

// 健康检查
pub async fn health() -> impl IntoResponse {
    success_to_api_response(HealthResponse {
        status: "ok",
        timestamp: chrono::Utc::now().timestamp(),
    })
}

// 管理后台首页的统计数字
pub async fn summary(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthContext>,
) -> AppResult<impl IntoResponse> {
    caller.require_admin()?;
    Ok(success_to_api_response(DashboardSummary {
        users: state.users.count().await?,
        activities: state.activities.count().await?,
        recipes: state.recipes.count().await?,
        articles: state.articles.count().await?,
    }))
}

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};

use crate::{
    AppState,
    auth::AuthContext,
    error::AppError,
    ids::RecordId,
    utils::verify_token,
};

// 校验 Bearer 令牌并重新加载用户，角色以数据库为准
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let bearer = req
        .headers()
        .typed_get::<Authorization<Bearer>>()
        .ok_or(AppError::Unauthorized)?;

    let claims = verify_token(bearer.token(), &state.config).map_err(|e| {
        tracing::debug!("Rejected token: {}", e);
        AppError::Unauthorized
    })?;
    let user_id: RecordId = claims.sub.parse().map_err(|_| AppError::Unauthorized)?;

    // 已删除或停用的账号不能继续使用旧令牌
    let user = state
        .users
        .find_by_id(user_id)
        .await?
        .filter(|u| u.active)
        .ok_or(AppError::Unauthorized)?;

    req.extensions_mut()
        .insert(AuthContext::new(user.id, user.role));
    Ok(next.run(req).await)
}

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::AppError;

// 请求体和查询参数解析失败时也返回统一的 ApiResponse 结构

#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct Json<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct Query<T>(pub T);

use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post},
};
use tower_http::{
    LatencyUnit,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::{
    AppState,
    middleware::{auth_middleware, log_errors},
    routes,
};

// 无需登录的路由
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(routes::dashboard::health))
        .route("/auth/signup", post(routes::auth::signup))
        .route("/auth/login", post(routes::auth::login))
}

// 会员路由
pub fn member_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/me", get(routes::auth::me))
        .route("/auth/change-password", post(routes::auth::change_password))
        .route("/activities", get(routes::activity::list_board))
        .route("/participations", post(routes::participation::register))
        .route(
            "/participations/{activity_id}",
            delete(routes::participation::cancel),
        )
        .route("/recipes", get(routes::recipe::list_all))
        .route("/agriculture", get(routes::agriculture::list_published))
}

// 管理员路由，角色在处理函数里通过 AuthContext 检查
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/dashboard", get(routes::dashboard::summary))
        .route(
            "/admin/users",
            get(routes::user::list).post(routes::user::create),
        )
        .route(
            "/admin/users/{id}",
            get(routes::user::get)
                .put(routes::user::update)
                .delete(routes::user::remove),
        )
        .route(
            "/admin/activities",
            get(routes::activity::list).post(routes::activity::create),
        )
        .route(
            "/admin/activities/{id}",
            get(routes::activity::get)
                .put(routes::activity::update)
                .delete(routes::activity::remove),
        )
        .route(
            "/admin/recipes",
            get(routes::recipe::list).post(routes::recipe::create),
        )
        .route(
            "/admin/recipes/{id}",
            get(routes::recipe::get)
                .put(routes::recipe::update)
                .delete(routes::recipe::remove),
        )
        .route(
            "/admin/agriculture",
            get(routes::agriculture::list).post(routes::agriculture::create),
        )
        .route(
            "/admin/agriculture/{id}",
            get(routes::agriculture::get)
                .put(routes::agriculture::update)
                .delete(routes::agriculture::remove),
        )
}

// 创建主路由，限流与 CORS 由 main 按配置追加
pub fn create_router(state: AppState) -> Router {
    let protected_routes = member_routes()
        .merge(admin_routes())
        .layer(from_fn_with_state(state.clone(), auth_middleware));

    let api = public_routes().merge(protected_routes);
    // axum 不允许在根路径 nest
    let base = state.config.api_base_uri.trim_end_matches('/');
    let router = if base.is_empty() {
        api
    } else {
        Router::new().nest(base, api)
    };

    router
        .layer(from_fn(log_errors))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .latency_unit(LatencyUnit::Millis),
                ),
        )
        .with_state(state)
}

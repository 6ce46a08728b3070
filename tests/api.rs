// 在内存存储上驱动完整路由的 HTTP 测试

#![allow(clippy::unwrap_used, clippy::expect_used)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt;

use saberes::{AppState, config::Config, create_router, ensure_admin, utils::error_codes};

const ADMIN_EMAIL: &str = "admin@saberes.com";
const ADMIN_PASSWORD: &str = "admin123";

async fn app() -> Router {
    let config = Config::from_lookup(|key| {
        let value = match key {
            "STORAGE_BACKEND" => "memory",
            "JWT_SECRET" => "segredo-de-teste",
            "BCRYPT_COST" => "4",
            "ADMIN_EMAIL" => ADMIN_EMAIL,
            "ADMIN_PASSWORD" => ADMIN_PASSWORD,
            "MAX_PAGE_SIZE" => "50",
            _ => return None,
        };
        Some(value.to_string())
    })
    .unwrap();

    let state = AppState::memory(config);
    ensure_admin(&state).await.unwrap();
    create_router(state)
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn login(app: &Router, email: &str, password: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": email, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["resp_data"]["token"].as_str().unwrap().to_string()
}

async fn member(app: &Router, name: &str, email: &str) -> String {
    let (status, _) = send(
        app,
        Method::POST,
        "/api/auth/signup",
        None,
        Some(json!({ "name": name, "email": email, "password": "segredo1" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    login(app, email, "segredo1").await
}

async fn create_activity(app: &Router, admin: &str, body: Value) -> String {
    let (status, body) = send(app, Method::POST, "/api/admin/activities", Some(admin), Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["resp_data"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_is_public() {
    let app = app().await;
    let (status, body) = send(&app, Method::GET, "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], error_codes::SUCCESS);
    assert_eq!(body["resp_data"]["status"], "ok");
}

#[tokio::test]
async fn signup_login_and_me() {
    let app = app().await;
    let token = member(&app, "Ana Souza", "ana@saberes.com").await;

    let (status, body) = send(&app, Method::GET, "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["resp_data"]["email"], "ana@saberes.com");
    assert_eq!(body["resp_data"]["role"], "STANDARD");
    assert!(body["resp_data"]["id"].is_string());
    assert!(body["resp_data"].get("passwordHash").is_none());

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/signup",
        None,
        Some(json!({ "name": "Outra Ana", "email": "ANA@saberes.com", "password": "segredo1" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], error_codes::EMAIL_TAKEN);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "ana@saberes.com", "password": "errada" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], error_codes::AUTH_FAILED);
}

#[tokio::test]
async fn signup_validates_input() {
    let app = app().await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/signup",
        None,
        Some(json!({ "name": "Curto", "email": "curto@saberes.com", "password": "123" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], error_codes::VALIDATION_ERROR);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/auth/signup",
        None,
        Some(json!({ "email": "semnome@saberes.com", "password": "segredo1" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn change_password_requires_current_password() {
    let app = app().await;
    let token = member(&app, "Bruno", "bruno@saberes.com").await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/auth/change-password",
        Some(&token),
        Some(json!({ "currentPassword": "errada", "newPassword": "novasenha" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/auth/change-password",
        Some(&token),
        Some(json!({ "currentPassword": "segredo1", "newPassword": "novasenha" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    login(&app, "bruno@saberes.com", "novasenha").await;
}

#[tokio::test]
async fn protected_routes_need_token_and_admin_role() {
    let app = app().await;
    let (status, body) = send(&app, Method::GET, "/api/activities", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], error_codes::AUTH_FAILED);

    let (status, _) = send(&app, Method::GET, "/api/activities", Some("lixo"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = member(&app, "Carla", "carla@saberes.com").await;
    let (status, body) = send(&app, Method::GET, "/api/admin/users", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], error_codes::PERMISSION_DENIED);
}

#[tokio::test]
async fn participation_flow_through_the_board() {
    let app = app().await;
    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let token = member(&app, "Dora", "dora@saberes.com").await;

    // 旧前端传来的时间戳格式
    let activity_id = create_activity(
        &app,
        &admin,
        json!({
            "name": "Mutirão na Horta",
            "description": "Plantio coletivo",
            "date": "2024-03-15T00:00:00.000Z",
            "startTime": "1970-01-01T14:30:00.000Z",
            "endTime": "16:00",
            "location": "Horta Comunitária"
        }),
    )
    .await;

    let (status, body) = send(&app, Method::GET, "/api/activities", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let item = &body["resp_data"][0];
    assert_eq!(item["id"], activity_id.as_str());
    assert_eq!(item["date"], "2024-03-15");
    assert_eq!(item["startTime"], "14:30");
    assert_eq!(item["dateLabel"], "15/03/2024");
    assert_eq!(item["timeRange"], "14:30 - 16:00");
    assert_eq!(item["participantCount"], 0);
    assert_eq!(item["isParticipating"], false);

    let register = json!({ "activityId": activity_id });
    let (status, body) = send(&app, Method::POST, "/api/participations", Some(&token), Some(register.clone())).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["resp_data"]["activityId"], activity_id.as_str());

    let (status, body) = send(&app, Method::POST, "/api/participations", Some(&token), Some(register)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], error_codes::ALREADY_REGISTERED);

    let (_, body) = send(&app, Method::GET, "/api/activities", Some(&token), None).await;
    let item = &body["resp_data"][0];
    assert_eq!(item["participantCount"], 1);
    assert_eq!(item["isParticipating"], true);
    assert_eq!(item["participants"][0]["userName"], "Dora");

    let uri = format!("/api/participations/{activity_id}");
    let (status, _) = send(&app, Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], error_codes::NOT_REGISTERED);
}

#[tokio::test]
async fn inactive_activity_is_hidden_and_not_eligible() {
    let app = app().await;
    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let token = member(&app, "Elisa", "elisa@saberes.com").await;

    let activity_id = create_activity(
        &app,
        &admin,
        json!({
            "name": "Feira de Trocas",
            "date": "2024-04-20",
            "startTime": "09:00",
            "endTime": "12:00",
            "location": "Escola Municipal",
            "active": false
        }),
    )
    .await;

    let (_, body) = send(&app, Method::GET, "/api/activities", Some(&token), None).await;
    assert_eq!(body["resp_data"].as_array().unwrap().len(), 0);

    // 数字形式的 id 也能接受
    let numeric: i64 = activity_id.parse().unwrap();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/participations",
        Some(&token),
        Some(json!({ "activityId": numeric })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], error_codes::NOT_ELIGIBLE);
}

#[tokio::test]
async fn malformed_body_or_query_gets_error_envelope() {
    let app = app().await;
    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let token = member(&app, "Kátia", "katia@saberes.com").await;

    for register in [json!({ "activityId": "abc" }), json!({})] {
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/participations",
            Some(&token),
            Some(register.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{register}");
        assert_eq!(body["code"], error_codes::VALIDATION_ERROR);
        assert!(body["msg"].is_string());
        assert!(body.get("resp_data").is_none());
    }

    let (status, body) = send(&app, Method::GET, "/api/admin/users?page=-1", Some(&admin), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], error_codes::VALIDATION_ERROR);
}

#[tokio::test]
async fn invalid_schedule_values_are_rejected() {
    let app = app().await;
    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    for (date, start) in [("2024-02-30", "10:00"), ("2024-03-15", "14:65"), ("amanhã", "10:00")] {
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/admin/activities",
            Some(&admin),
            Some(json!({
                "name": "Aula",
                "date": date,
                "startTime": start,
                "endTime": "11:00",
                "location": "Sala 1"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{date} {start}");
        assert_eq!(body["code"], error_codes::VALIDATION_ERROR);
    }
}

#[tokio::test]
async fn admin_activity_detail_lists_participants() {
    let app = app().await;
    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let token = member(&app, "Fábio", "fabio@saberes.com").await;
    let activity_id = create_activity(
        &app,
        &admin,
        json!({
            "name": "Cozinha Ancestral",
            "date": "2024-05-02",
            "startTime": "18:00",
            "endTime": "20:00",
            "location": "Cozinha Coletiva"
        }),
    )
    .await;
    send(
        &app,
        Method::POST,
        "/api/participations",
        Some(&token),
        Some(json!({ "activityId": activity_id })),
    )
    .await;

    let (status, body) = send(&app, Method::GET, "/api/admin/activities", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    let listed = &body["resp_data"]["items"][0];
    assert_eq!(listed["id"], activity_id.as_str());
    assert_eq!(listed["participantCount"], 1);
    assert_eq!(listed["participants"][0]["userName"], "Fábio");

    let uri = format!("/api/admin/activities/{activity_id}");
    let (status, body) = send(&app, Method::GET, &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["resp_data"]["participantCount"], 1);
    assert_eq!(body["resp_data"]["participants"][0]["userName"], "Fábio");

    let (status, _) = send(&app, Method::DELETE, &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, Method::GET, &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::GET, "/api/admin/activities/abc", Some(&admin), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn admin_user_list_is_paginated_and_searchable() {
    let app = app().await;
    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    for (name, email) in [
        ("Gabriela", "gabi@saberes.com"),
        ("Heitor", "heitor@saberes.com"),
        ("Helena", "helena@saberes.com"),
    ] {
        member(&app, name, email).await;
    }

    let (status, body) = send(&app, Method::GET, "/api/admin/users?page=1&limit=2", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["resp_data"]["items"].as_array().unwrap().len(), 2);
    assert_eq!(body["resp_data"]["pagination"]["total"], 4);
    assert_eq!(body["resp_data"]["pagination"]["totalPages"], 2);

    let (_, body) = send(&app, Method::GET, "/api/admin/users?search=he&status=all", Some(&admin), None).await;
    let names: Vec<_> = body["resp_data"]["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Heitor", "Helena"]);
}

#[tokio::test]
async fn deactivated_member_loses_access() {
    let app = app().await;
    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let token = member(&app, "Igor", "igor@saberes.com").await;

    let (_, me) = send(&app, Method::GET, "/api/auth/me", Some(&token), None).await;
    let uri = format!("/api/admin/users/{}", me["resp_data"]["id"].as_str().unwrap());
    let (status, body) = send(
        &app,
        Method::PUT,
        &uri,
        Some(&admin),
        Some(json!({ "name": "Igor", "email": "igor@saberes.com", "active": false })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["resp_data"]["active"], false);

    let (status, _) = send(&app, Method::GET, "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "igor@saberes.com", "password": "segredo1" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn recipes_and_articles_for_members() {
    let app = app().await;
    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let token = member(&app, "Júlia", "julia@saberes.com").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/admin/recipes",
        Some(&admin),
        Some(json!({
            "name": "Pão de Milho",
            "ingredients": "Fubá, leite, ovos",
            "preparation": "Misture e asse"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["resp_data"]["authorName"], "Administrador");

    for (title, active) in [("Compostagem", true), ("Rascunho", false)] {
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/admin/agriculture",
            Some(&admin),
            Some(json!({
                "title": title,
                "content": "Texto",
                "author": "Equipe",
                "active": active
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, body) = send(&app, Method::GET, "/api/recipes", Some(&token), None).await;
    assert_eq!(body["resp_data"][0]["name"], "Pão de Milho");

    let (_, body) = send(&app, Method::GET, "/api/agriculture", Some(&token), None).await;
    let articles = body["resp_data"].as_array().unwrap();
    assert_eq!(articles.len(), 1);
    assert_eq!(articles[0]["title"], "Compostagem");

    let (_, body) = send(&app, Method::GET, "/api/admin/dashboard", Some(&admin), None).await;
    assert_eq!(body["resp_data"]["users"], 2);
    assert_eq!(body["resp_data"]["recipes"], 1);
    assert_eq!(body["resp_data"]["articles"], 2);
}

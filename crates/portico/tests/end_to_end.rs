//! End-to-end tests: a real `reqwest` transport against a mock backend.

use httpmock::prelude::*;
use portico::prelude::*;
use serde_json::json;

fn config(server: &MockServer) -> PorticoConfig {
    PorticoConfig {
        api_base: server.base_url(),
        ..PorticoConfig::default()
    }
}

fn admin_user() -> serde_json::Value {
    json!({
        "id": 1,
        "username": "admin",
        "nickname": "Administrator",
        "avatar": "/static/avatars/admin.jpg",
        "permission": 3
    })
}

#[tokio::test]
async fn test_full_login_navigate_logout_cycle() {
    let server = MockServer::start_async().await;
    let login = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/auth/login")
                .json_body(json!({"username": "admin", "password": "admin123"}));
            then.status(200).json_body(json!({
                "code": 200,
                "message": "登录成功",
                "data": {"token": "abc123", "user": admin_user(), "expires_at": "2024-01-22T10:30:00"}
            }));
        })
        .await;
    let logout = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/auth/logout")
                .header("authorization", "Bearer abc123");
            then.status(200)
                .json_body(json!({"code": 200, "message": "登出成功", "data": {"logged_out": true}}));
        })
        .await;

    let mut app = Portico::builder().config(config(&server)).build().unwrap();

    let snap = app.start().await;
    assert!(!snap.is_logged_in());

    let nav = app.navigate("/admin/users").await.unwrap();
    assert_eq!(nav.route.name, "login");
    assert_eq!(nav.route.location.query("redirect"), Some("/admin/users"));

    let user = app.session().login("admin", "admin123").await.unwrap();
    assert_eq!(user.permission, PermissionLevel::SuperAdmin);
    login.assert_async().await;

    let nav = app.navigate("/admin/users").await.unwrap();
    assert_eq!(nav.route.name, "admin");
    assert!(!nav.was_redirected());

    let outcome = app.session().logout().await;
    assert!(outcome.is_confirmed());
    logout.assert_async().await;

    let nav = app.navigate("/profile").await.unwrap();
    assert_eq!(nav.route.name, "login");

    app.shutdown().await;
}

#[tokio::test]
async fn test_start_restores_session_from_cookie() {
    let server = MockServer::start_async().await;
    let status = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/auth/status")
                .header("authorization", "Bearer from-cookie");
            then.status(200).json_body(json!({
                "code": 200,
                "message": "已登录",
                "data": {"isLoggedIn": true, "user": admin_user()}
            }));
        })
        .await;

    let mut app = Portico::builder()
        .config(config(&server))
        .cookies("session_token=from-cookie")
        .build()
        .unwrap();

    let snap = app.start().await;

    status.assert_async().await;
    assert!(snap.is_logged_in());
    assert_eq!(snap.nickname(), "Administrator");
    // Idempotent: no second status call.
    app.start().await;
    status.assert_hits_async(1).await;
}

#[tokio::test]
async fn test_expired_session_forces_login_redirect() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/auth/login");
            then.status(200).json_body(json!({
                "code": 200,
                "data": {"token": "abc123", "user": admin_user()}
            }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/user/info");
            then.status(401)
                .json_body(json!({"code": 401, "message": "会话已过期", "data": {}}));
        })
        .await;

    let app = Portico::builder().config(config(&server)).build().unwrap();
    app.session().login("admin", "admin123").await.unwrap();

    let err = app.session().fetch_user_info().await.unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(app.session().api().client().tokens().get(), None);

    let nav = app.follow_forced_redirect().await.unwrap().unwrap();
    assert_eq!(nav.route.name, "login");
    assert!(!app.session().snapshot().is_logged_in());
}

#[tokio::test]
async fn test_wrong_password_surfaces_business_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/auth/login");
            then.status(400)
                .json_body(json!({"code": 400, "message": "用户名或密码错误", "data": {}}));
        })
        .await;

    let app = Portico::builder().config(config(&server)).build().unwrap();

    let err: PorticoError = app
        .session()
        .login("admin", "wrong")
        .await
        .unwrap_err()
        .into();

    assert!(matches!(
        err,
        PorticoError::Session(portico::session::SessionError::Api(ApiError::BadRequest))
    ));
    assert_eq!(app.session().snapshot().state, SessionState::Anonymous);
}

#[tokio::test]
async fn test_backend_down_is_network_error() {
    let config = PorticoConfig {
        api_base: "http://127.0.0.1:9".into(),
        ..PorticoConfig::default()
    };
    let mut app = Portico::builder().config(config).cookies("session_token=t").build().unwrap();

    // The status check fails, so start settles on anonymous and drops the token.
    let snap = app.start().await;
    assert!(!snap.is_logged_in());
    assert_eq!(app.session().api().client().tokens().get(), None);

    let err = app.session().login("a", "b").await.unwrap_err();
    assert!(matches!(
        err,
        portico::session::SessionError::Api(ApiError::Network(_))
    ));
}

#[tokio::test]
async fn test_token_file_survives_restart() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/auth/login");
            then.status(200).json_body(json!({
                "code": 200,
                "data": {"token": "persisted", "user": admin_user()}
            }));
        })
        .await;
    let status = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/auth/status")
                .header("authorization", "Bearer persisted");
            then.status(200)
                .json_body(json!({"code": 200, "data": {"is_authenticated": true, "user": admin_user()}}));
        })
        .await;
    let dir = tempfile::tempdir().unwrap();
    let config = PorticoConfig {
        token_file: Some(dir.path().join("token.json")),
        ..config(&server)
    };

    let first = Portico::builder().config(config.clone()).build().unwrap();
    first.session().login("admin", "admin123").await.unwrap();
    first.shutdown().await;

    let mut second = Portico::builder().config(config).build().unwrap();
    let snap = second.start().await;

    status.assert_async().await;
    assert_eq!(snap.username(), Some("admin"));
}

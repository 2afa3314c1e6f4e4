//! Typed wrappers for the auth and user endpoints.
//!
//! Each method is one request through [`ApiClient`] plus one rule: a
//! `code` other than 200 becomes [`ApiError::Business`], and a 200 has its
//! `data` decoded into the endpoint's payload type. Nothing here touches
//! session state; that is the session store's job.

use portico_protocol::{
    Envelope, LoginRequest, LoginResponse, LogoutResponse, RefreshResponse,
    RegisterRequest, RegisterResponse, SessionStatus, UserInfo, UserSession,
    ValidateRequest, ValidateResponse,
};
use portico_transport::Transport;
use serde::de::DeserializeOwned;

use crate::{ApiClient, ApiError};

pub const REGISTER: &str = "/auth/register";
pub const LOGIN: &str = "/auth/login";
pub const LOGOUT: &str = "/auth/logout";
pub const STATUS: &str = "/auth/status";
pub const REFRESH: &str = "/auth/refresh";
pub const VALIDATE: &str = "/auth/validate";
pub const USER_SESSION: &str = "/user/session";
pub const USER_INFO: &str = "/user/info";

/// The auth API surface.
pub struct AuthApi<T> {
    client: ApiClient<T>,
}

impl<T: Transport> AuthApi<T> {
    pub fn new(client: ApiClient<T>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient<T> {
        &self.client
    }

    /// `POST /auth/register`. Blank required fields are rejected locally
    /// with [`ApiError::BadRequest`] before any request is made.
    pub async fn register(
        &self,
        request: &RegisterRequest,
    ) -> Result<RegisterResponse, ApiError> {
        let missing = request.missing_fields();
        if !missing.is_empty() {
            tracing::debug!(?missing, "register rejected locally");
            return Err(ApiError::BadRequest);
        }
        let env = self.client.post(REGISTER, request).await?;
        data(env)
    }

    /// `POST /auth/login`.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<LoginResponse, ApiError> {
        let env = self
            .client
            .post(LOGIN, &LoginRequest::new(username, password))
            .await?;
        data(env)
    }

    /// `POST /auth/logout`. The backend may send an empty payload.
    pub async fn logout(&self) -> Result<LogoutResponse, ApiError> {
        let env = self.client.post_empty(LOGOUT).await?;
        data::<Option<LogoutResponse>>(env).map(Option::unwrap_or_default)
    }

    /// `GET /user/session`.
    pub async fn get_session(&self) -> Result<UserSession, ApiError> {
        let env = self.client.get(USER_SESSION).await?;
        data(env)
    }

    /// `GET /user/info`.
    pub async fn get_user_info(&self) -> Result<UserInfo, ApiError> {
        let env = self.client.get(USER_INFO).await?;
        data(env)
    }

    /// `GET /auth/status`, normalized (see [`SessionStatus`]).
    pub async fn check_status(&self) -> Result<SessionStatus, ApiError> {
        let env = self.client.get(STATUS).await?;
        data(env)
    }

    /// `POST /auth/refresh`.
    pub async fn refresh_token(&self) -> Result<RefreshResponse, ApiError> {
        let env = self.client.post_empty(REFRESH).await?;
        data(env)
    }

    /// `POST /auth/validate`.
    pub async fn validate_token(
        &self,
        token: &str,
    ) -> Result<ValidateResponse, ApiError> {
        let body = ValidateRequest {
            token: token.to_owned(),
        };
        let env = self.client.post(VALIDATE, &body).await?;
        data(env)
    }
}

fn data<D: DeserializeOwned>(env: Envelope) -> Result<D, ApiError> {
    if !env.is_success() {
        tracing::debug!(code = env.code, message = %env.message, "business failure");
        return Err(ApiError::Business {
            code: env.code,
            message: env.message,
        });
    }
    Ok(env.decode::<D>()?.data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ClientConfig, TokenStorage, TokenStore};
    use portico_protocol::{PermissionLevel, UserId};
    use portico_transport::HttpResponse;
    use portico_transport::mock::ScriptedTransport;
    use std::sync::Arc;

    fn api() -> AuthApi<ScriptedTransport> {
        AuthApi::new(ApiClient::new(
            ScriptedTransport::new(),
            Arc::new(TokenStorage::in_memory()),
            ClientConfig::new("http://api.test"),
        ))
    }

    fn reply(api: &AuthApi<ScriptedTransport>, body: &str) {
        api.client()
            .transport()
            .push_response(HttpResponse::new(200, body.to_owned()));
    }

    #[tokio::test]
    async fn test_login_success_returns_token_and_user() {
        let api = api();
        reply(
            &api,
            r#"{"code":200,"message":"登录成功","data":{
                "token":"abc123",
                "user":{"id":1,"username":"admin","nickname":"Administrator","permission":3},
                "expires_at":"2024-01-22T10:30:00"}}"#,
        );

        let resp = api.login("admin", "admin123").await.unwrap();

        assert_eq!(resp.token, "abc123");
        assert_eq!(resp.user.permission, PermissionLevel::SuperAdmin);
        let sent = &api.client().transport().requests()[0];
        assert!(sent.url.ends_with("/api/auth/login"));
        assert_eq!(
            sent.body.as_deref(),
            Some(br#"{"username":"admin","password":"admin123"}"#.as_slice())
        );
    }

    #[tokio::test]
    async fn test_login_bad_credentials_is_business_error() {
        let api = api();
        reply(&api, r#"{"code":400,"message":"用户名或密码错误","data":{}}"#);

        let err = api.login("admin", "wrong").await.unwrap_err();

        assert!(matches!(err, ApiError::Business { code: 400, .. }));
    }

    #[tokio::test]
    async fn test_logout_empty_data_defaults() {
        let api = api();
        reply(&api, r#"{"code":200,"message":"登出成功","data":null}"#);

        let resp = api.logout().await.unwrap();

        assert!(!resp.logged_out);
    }

    #[tokio::test]
    async fn test_check_status_accepts_is_authenticated() {
        let api = api();
        reply(
            &api,
            r#"{"code":200,"data":{"is_authenticated":true,"user":{"id":2,"username":"u"}}}"#,
        );

        let status = api.check_status().await.unwrap();

        assert!(status.is_logged_in);
        assert_eq!(status.user.unwrap().id, UserId(2));
    }

    #[tokio::test]
    async fn test_get_session_user_without_flag_is_logged_in() {
        let api = api();
        reply(
            &api,
            r#"{"code":200,"data":{"user":{"id":5,"username":"s"},"session":{"created_at":"2024-01-15T10:30:00"}}}"#,
        );

        let session = api.get_session().await.unwrap();

        assert!(session.is_logged_in);
        assert!(session.session.is_some());
        assert!(api.client().transport().requests()[0].url.ends_with("/api/user/session"));
    }

    #[tokio::test]
    async fn test_get_user_info_decodes_user() {
        let api = api();
        reply(&api, r#"{"code":200,"data":{"id":7,"username":"neo","nickname":"Neo"}}"#);

        let user = api.get_user_info().await.unwrap();

        assert_eq!(user.nickname, "Neo");
    }

    #[tokio::test]
    async fn test_register_blank_fields_rejected_without_request() {
        let api = api();
        let req = RegisterRequest {
            username: "new".into(),
            nickname: String::new(),
            email: "n@x.io".into(),
            password: "pw".into(),
            avatar: None,
            permission: None,
        };

        let err = api.register(&req).await.unwrap_err();

        assert!(matches!(err, ApiError::BadRequest));
        assert_eq!(api.client().transport().request_count(), 0);
    }

    #[tokio::test]
    async fn test_register_success() {
        let api = api();
        reply(
            &api,
            r#"{"code":200,"data":{"user_id":3,"username":"new","nickname":"New"}}"#,
        );
        let req = RegisterRequest {
            username: "new".into(),
            nickname: "New".into(),
            email: "n@x.io".into(),
            password: "pw".into(),
            avatar: None,
            permission: Some(PermissionLevel::Member),
        };

        let resp = api.register(&req).await.unwrap();

        assert_eq!(resp.user_id, UserId(3));
    }

    #[tokio::test]
    async fn test_refresh_token_sends_bearer() {
        let api = api();
        api.client().tokens().set("old");
        reply(&api, r#"{"code":200,"data":{"token":"old","refreshed_at":"now"}}"#);

        let resp = api.refresh_token().await.unwrap();

        assert_eq!(resp.token, "old");
        let sent = &api.client().transport().requests()[0];
        assert_eq!(sent.header("authorization"), Some("Bearer old"));
    }

    #[tokio::test]
    async fn test_validate_token_posts_token() {
        let api = api();
        reply(&api, r#"{"code":200,"data":{"valid":false,"user":null}}"#);

        let resp = api.validate_token("xyz").await.unwrap();

        assert!(!resp.valid);
        let sent = &api.client().transport().requests()[0];
        assert_eq!(sent.body.as_deref(), Some(br#"{"token":"xyz"}"#.as_slice()));
    }

    #[tokio::test]
    async fn test_success_code_with_wrong_data_is_protocol_error() {
        let api = api();
        reply(&api, r#"{"code":200,"data":{"unexpected":true}}"#);

        let err = api.get_user_info().await.unwrap_err();

        assert!(matches!(err, ApiError::Protocol(_)));
    }
}

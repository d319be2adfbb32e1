//! API 客户端模块
//!
//! 所有到后端的出站请求都经过这里：统一的 base URL、bearer 凭据附加、
//! 以及按协议定义（`medflow-shared::protocol`）派发的请求构造。
//! 本层不做重试。

use async_trait::async_trait;
use gloo_net::http::Request;
use medflow_shared::protocol::{
    ApiRequest, DeletePatientRequest, HttpMethod, ListPatientsRequest, UpdatePatientCommand,
    ValidateTokenRequest,
};
use medflow_shared::{CreatePatientRequest, LoginRequest, LoginResponse, Patient};
use serde::de::DeserializeOwned;

use crate::error::{ApiError, ApiResult, ErrorBody};
use crate::session::AuthGateway;

/// 默认 base URL：同源。开发环境由外部的反向代理把 /auth、/api 转给后端。
pub const DEFAULT_BASE_URL: &str = "";

#[derive(Clone, Debug, PartialEq)]
pub struct ApiClient {
    pub base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// 匿名客户端（登录前）
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            token: None,
        }
    }

    /// 附加 bearer 凭据
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// 按协议定义发送请求
    ///
    /// 统一处理：方法派发、bearer 头、JSON 体、非 2xx 的结构化错误。
    async fn send<R: ApiRequest>(&self, request: &R) -> ApiResult<R::Response> {
        let url = self.url(&request.path());

        let mut builder = match R::METHOD {
            HttpMethod::Get => Request::get(&url),
            HttpMethod::Post => Request::post(&url),
            HttpMethod::Put => Request::put(&url),
            HttpMethod::Delete => Request::delete(&url),
        };

        if let Some(token) = &self.token {
            builder = builder.header("Authorization", &format!("Bearer {}", token));
        }

        let response = if R::METHOD.has_body() {
            let body = serde_json_wasm::to_string(request)
                .map_err(|e| ApiError::serialization(e.to_string()))?;
            builder
                .header("Content-Type", "application/json")
                .body(body)
                .map_err(|e| ApiError::network(e.to_string()))?
                .send()
                .await
        } else {
            builder.send().await
        }
        .map_err(|e| ApiError::network(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::network(e.to_string()))?;

        if !(200..300).contains(&status) {
            // 尽力提取服务端附带的 message，失败则回落到状态码文案
            let server_message = serde_json_wasm::from_str::<ErrorBody>(&text)
                .ok()
                .and_then(|body| body.message);
            return Err(ApiError::from_response(status, server_message));
        }

        parse_body(&text)
    }

    // --- 认证端点 ---

    pub async fn login(&self, request: &LoginRequest) -> ApiResult<LoginResponse> {
        self.send(request).await
    }

    pub async fn validate_token(&self) -> ApiResult<()> {
        self.send(&ValidateTokenRequest).await
    }

    // --- 患者端点 ---

    pub async fn list_patients(&self) -> ApiResult<Vec<Patient>> {
        self.send(&ListPatientsRequest).await
    }

    pub async fn create_patient(&self, request: &CreatePatientRequest) -> ApiResult<Patient> {
        self.send(request).await
    }

    pub async fn update_patient(&self, command: &UpdatePatientCommand) -> ApiResult<Patient> {
        self.send(command).await
    }

    pub async fn delete_patient(&self, request: &DeletePatientRequest) -> ApiResult<()> {
        self.send(request).await
    }
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// 解析响应体。空体（204 / validate）按 JSON null 处理，
/// 使 `Response = ()` 的端点无需特判。
fn parse_body<T: DeserializeOwned>(text: &str) -> ApiResult<T> {
    let source = if text.trim().is_empty() { "null" } else { text };
    serde_json_wasm::from_str(source).map_err(|e| ApiError::serialization(e.to_string()))
}

// =========================================================
// 会话层适配
// =========================================================

#[async_trait(?Send)]
impl AuthGateway for ApiClient {
    async fn login(&self, request: &LoginRequest) -> ApiResult<LoginResponse> {
        ApiClient::login(self, request).await
    }

    async fn validate(&self, token: &str) -> ApiResult<()> {
        self.clone().with_token(token).validate_token().await
    }
}

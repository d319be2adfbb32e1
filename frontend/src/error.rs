//! API 错误模块
//!
//! 客户端侧的结构化错误：保留 HTTP 状态与服务端附带的 message，
//! 供上层（缓存层 / 表单）决定呈现与重试策略。
//! 本层不做任何重试：读路径的重试属于缓存层，写路径直接上报用户。

use std::fmt;

use serde::{Deserialize, Serialize};

// =========================================================
// 错误状态枚举
// =========================================================

/// 错误状态枚举
/// 包含错误对应的语义（来源状态码）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApiErrorKind {
    /// 401: 鉴权失败（登录凭据无效 / 令牌过期）
    Unauthorized,
    /// 404: 资源未找到
    NotFound,
    /// 400: 请求被服务端拒绝
    InvalidInput,
    /// 409: 资源冲突
    Conflict,
    /// 其他非 2xx: 服务端错误
    Server,
    /// 请求根本没有到达后端（连接失败、超时、跨域被拒）
    Network,
    /// 响应体无法解析
    Serialization,
}

impl ApiErrorKind {
    /// 从 HTTP 状态码归类
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => ApiErrorKind::InvalidInput,
            401 => ApiErrorKind::Unauthorized,
            404 => ApiErrorKind::NotFound,
            409 => ApiErrorKind::Conflict,
            _ => ApiErrorKind::Server,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ApiErrorKind::Unauthorized => "UNAUTHORIZED",
            ApiErrorKind::NotFound => "RESOURCE_NOT_FOUND",
            ApiErrorKind::InvalidInput => "INVALID_INPUT",
            ApiErrorKind::Conflict => "RESOURCE_CONFLICT",
            ApiErrorKind::Server => "SERVER_ERROR",
            ApiErrorKind::Network => "NETWORK_ERROR",
            ApiErrorKind::Serialization => "JSON_PARSE_ERROR",
        }
    }
}

// =========================================================
// 核心错误类型
// =========================================================

/// Client-side API error
///
/// - kind: 错误语义
/// - status: 原始 HTTP 状态码（网络层失败时为 None）
/// - message: 服务端附带的 message，或本地生成的描述
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub status: Option<u16>,
    pub message: String,
}

impl ApiError {
    // --- Convenience constructors ---

    /// 请求未能到达后端
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::Network,
            status: None,
            message: message.into(),
        }
    }

    /// 响应体解析失败
    pub fn serialization(message: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::Serialization,
            status: None,
            message: message.into(),
        }
    }

    /// 非 2xx 响应；`server_message` 为服务端 body 中的 message 字段（若有）
    pub fn from_response(status: u16, server_message: Option<String>) -> Self {
        let kind = ApiErrorKind::from_status(status);
        let message =
            server_message.unwrap_or_else(|| format!("请求失败: HTTP {}", status));
        Self {
            kind,
            status: Some(status),
            message,
        }
    }

    // --- Accessors ---

    pub fn is_unauthorized(&self) -> bool {
        self.kind == ApiErrorKind::Unauthorized
    }

    pub fn is_network(&self) -> bool {
        self.kind == ApiErrorKind::Network
    }

    /// 获取机器可读的错误代码
    pub fn error_code(&self) -> &'static str {
        self.kind.error_code()
    }

    /// 面向用户的文案。网络类错误统一为连接性提示，避免把底层细节抛给用户。
    pub fn user_message(&self) -> String {
        match self.kind {
            ApiErrorKind::Network => "无法连接到服务器，请稍后重试。".to_string(),
            _ => self.message.clone(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.error_code(), self.message)
    }
}

impl std::error::Error for ApiError {}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

// =========================================================
// 传输用错误类型
// =========================================================

/// 服务端错误响应 body 的通用形状，只关心 message 字段
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_map_to_kinds() {
        assert_eq!(ApiErrorKind::from_status(400), ApiErrorKind::InvalidInput);
        assert_eq!(ApiErrorKind::from_status(401), ApiErrorKind::Unauthorized);
        assert_eq!(ApiErrorKind::from_status(404), ApiErrorKind::NotFound);
        assert_eq!(ApiErrorKind::from_status(409), ApiErrorKind::Conflict);
        assert_eq!(ApiErrorKind::from_status(500), ApiErrorKind::Server);
        assert_eq!(ApiErrorKind::from_status(502), ApiErrorKind::Server);
    }

    #[test]
    fn server_message_wins_over_generated_text() {
        let err = ApiError::from_response(404, Some("patient not found".into()));
        assert_eq!(err.message, "patient not found");
        assert_eq!(err.status, Some(404));
        assert!(!err.is_unauthorized());

        let fallback = ApiError::from_response(500, None);
        assert!(fallback.message.contains("500"));
    }

    #[test]
    fn display_carries_machine_code() {
        let err = ApiError::network("fetch failed");
        assert_eq!(err.to_string(), "[NETWORK_ERROR] fetch failed");
        assert!(err.is_network());
        assert_eq!(err.status, None);
    }

    #[test]
    fn network_user_message_is_generic() {
        let err = ApiError::network("DNS lookup failed: example.internal");
        assert!(!err.user_message().contains("DNS"));
    }
}

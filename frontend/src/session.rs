//! 会话核心模块
//!
//! 与 UI 框架完全解耦的会话生命周期逻辑：冷启动校验、登录、注销。
//! 持久化与网络通过注入的适配器完成，`auth` 模块负责把结果写入信号。
//!
//! 不变量：内存会话与持久化凭据保持一致；唯一的例外是
//! `initialize` 校验请求尚未落定的短暂窗口。

use async_trait::async_trait;
use medflow_shared::{LoginRequest, LoginResponse};

use crate::error::{ApiError, ApiResult};

/// 持久化的凭据对。token 与 email 总是成对写入、成对清除。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCredentials {
    pub token: String,
    pub email: String,
}

/// 已确立的会话
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub email: String,
    pub token: String,
}

// =========================================================
// 抽象适配器接口
// =========================================================

/// 凭据持久化适配器：负责 token/email 对的读写
///
/// 实现方保证 `save` / `clear` 的原子语义：两个键要么都在，要么都不在。
pub trait CredentialStorage {
    fn load(&self) -> Option<StoredCredentials>;
    fn save(&self, credentials: &StoredCredentials);
    fn clear(&self);
}

/// 认证网关：到后端 /auth 命名空间的两次往返
#[async_trait(?Send)]
pub trait AuthGateway {
    async fn login(&self, request: &LoginRequest) -> ApiResult<LoginResponse>;
    /// 2xx 即有效；任何失败（拒绝或网络）都视为会话不可用
    async fn validate(&self, token: &str) -> ApiResult<()>;
}

// =========================================================
// 会话管理器
// =========================================================

pub struct SessionManager<S, G> {
    storage: S,
    gateway: G,
}

impl<S, G> SessionManager<S, G>
where
    S: CredentialStorage,
    G: AuthGateway,
{
    pub fn new(storage: S, gateway: G) -> Self {
        Self { storage, gateway }
    }

    /// 冷启动初始化。每次应用加载只执行一次。
    ///
    /// - 无持久化凭据：直接返回 `None`，不发起任何网络请求
    /// - 有凭据且校验通过：返回会话
    /// - 有凭据但校验失败：静默降级，内存与持久化一并清空
    ///
    /// 校验失败的具体原因（令牌被拒 vs 网络不可达）由返回的 Err 区分，
    /// 仅用于诊断输出，状态处理完全一致。
    pub async fn initialize(&self) -> Result<Option<Session>, ApiError> {
        let Some(credentials) = self.storage.load() else {
            return Ok(None);
        };

        match self.gateway.validate(&credentials.token).await {
            Ok(()) => Ok(Some(Session {
                email: credentials.email,
                token: credentials.token,
            })),
            Err(err) => {
                self.storage.clear();
                Err(err)
            }
        }
    }

    /// 登录。成功后才持久化；失败时不触碰任何已存储状态。
    pub async fn login(&self, request: LoginRequest) -> ApiResult<Session> {
        let response = self.gateway.login(&request).await?;

        let credentials = StoredCredentials {
            token: response.token,
            email: request.email,
        };
        self.storage.save(&credentials);

        Ok(Session {
            email: credentials.email,
            token: credentials.token,
        })
    }

    /// 注销：同步清除持久化凭据，无网络副作用。
    pub fn logout(&self) {
        self.storage.clear();
    }
}

#[cfg(test)]
mod tests;

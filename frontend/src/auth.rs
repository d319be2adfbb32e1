//! 认证模块
//!
//! 管理用户认证状态，与路由系统解耦。
//! 路由服务通过注入的认证相位信号来检查认证状态。
//! 生命周期逻辑在 `session` 模块；这里只负责把结果写入信号。

use leptos::prelude::*;
use leptos::task::spawn_local;
use medflow_shared::LoginRequest;

use crate::api::{ApiClient, DEFAULT_BASE_URL};
use crate::error::ApiResult;
use crate::session::SessionManager;
use crate::web::BrowserCredentialStorage;

/// 认证相位（路由守卫的三态）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthPhase {
    /// 冷启动校验尚未落定
    #[default]
    Verifying,
    Authenticated,
    Unauthenticated,
}

/// 已认证的用户身份
#[derive(Clone, Debug, PartialEq)]
pub struct AuthUser {
    pub email: String,
}

/// 认证状态
#[derive(Clone, Default)]
pub struct AuthState {
    /// API 客户端实例（凭据已附加，仅在认证成功后存在）
    pub api: Option<ApiClient>,
    /// 当前用户（仅在认证成功后存在）
    pub user: Option<AuthUser>,
    /// 当前相位
    pub phase: AuthPhase,
}

/// 认证上下文
///
/// 包含读写信号，通过 Context 在组件间共享。
#[derive(Clone, Copy)]
pub struct AuthContext {
    /// 认证状态（只读）
    pub state: ReadSignal<AuthState>,
    /// 设置认证状态（写入）
    pub set_state: WriteSignal<AuthState>,
}

impl AuthContext {
    /// 创建新的认证上下文
    pub fn new() -> Self {
        let (state, set_state) = signal(AuthState::default());
        Self { state, set_state }
    }

    /// 获取认证相位信号（用于路由服务注入）
    pub fn phase_signal(&self) -> Signal<AuthPhase> {
        let state = self.state;
        Signal::derive(move || state.get().phase)
    }
}

impl Default for AuthContext {
    fn default() -> Self {
        Self::new()
    }
}

/// 从 Context 获取认证上下文
pub fn use_auth() -> AuthContext {
    use_context::<AuthContext>().expect("AuthContext should be provided")
}

fn session_manager() -> SessionManager<BrowserCredentialStorage, ApiClient> {
    SessionManager::new(BrowserCredentialStorage, ApiClient::new(DEFAULT_BASE_URL))
}

/// 初始化认证状态
///
/// 每次应用加载恰好执行一次：读取持久化凭据并异步向后端校验。
/// 校验落定前相位保持 `Verifying`，路由出口在此期间不渲染受保护内容。
pub fn init_auth(ctx: &AuthContext) {
    let set_state = ctx.set_state;

    spawn_local(async move {
        let manager = session_manager();

        let session = match manager.initialize().await {
            Ok(session) => session,
            Err(err) => {
                // 静默降级；令牌被拒与网络不可达仅在诊断输出中区分
                if err.is_network() {
                    web_sys::console::warn_1(
                        &"[Auth] Startup validation unreachable, session dropped.".into(),
                    );
                } else {
                    web_sys::console::warn_1(
                        &"[Auth] Stored session rejected by server, session dropped.".into(),
                    );
                }
                None
            }
        };

        set_state.update(|state| match session {
            Some(session) => {
                state.api =
                    Some(ApiClient::new(DEFAULT_BASE_URL).with_token(session.token.clone()));
                state.user = Some(AuthUser {
                    email: session.email,
                });
                state.phase = AuthPhase::Authenticated;
            }
            None => {
                state.api = None;
                state.user = None;
                state.phase = AuthPhase::Unauthenticated;
            }
        });
    });
}

/// 登录并保存状态
///
/// 成功后持久化凭据并更新内存状态；失败时把错误原样交还调用方，
/// 不触碰任何已存储状态。导航由路由服务的相位监听自动处理。
pub async fn login(ctx: &AuthContext, email: String, password: String) -> ApiResult<()> {
    let manager = session_manager();
    let session = manager.login(LoginRequest { email, password }).await?;

    ctx.set_state.update(|state| {
        state.api = Some(ApiClient::new(DEFAULT_BASE_URL).with_token(session.token.clone()));
        state.user = Some(AuthUser {
            email: session.email,
        });
        state.phase = AuthPhase::Authenticated;
    });
    Ok(())
}

/// 注销并清除状态
///
/// 同步完成，无网络副作用。
/// 注意：不需要手动导航，路由服务会监听相位变化并自动重定向。
pub fn logout(ctx: &AuthContext) {
    session_manager().logout();

    ctx.set_state.update(|state| {
        state.api = None;
        state.user = None;
        state.phase = AuthPhase::Unauthenticated;
    });
}

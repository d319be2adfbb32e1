//! 路由服务模块 - 核心引擎
//!
//! 封装了 web_sys 的 History API，实现高内聚：
//! 所有对 window.history 的操作都集中在此模块。
//! 实现了"监听 -> 验证 -> 处理 -> 加载"的导航流程。
//!
//! 守卫是一个三态机：`Verifying` 期间既不渲染受保护内容也不重定向；
//! 落定后由认证相位变化的 Effect 自动完成迁移。

use leptos::prelude::*;
use wasm_bindgen::prelude::*;

use super::route::AppRoute;
use crate::auth::AuthPhase;

/// 获取当前浏览器路径
fn current_path() -> String {
    web_sys::window()
        .and_then(|w| w.location().pathname().ok())
        .unwrap_or_else(|| "/".to_string())
}

/// 推送 History 状态（内部工具函数）
fn push_history_state(path: &str) {
    if let Some(window) = web_sys::window() {
        if let Ok(history) = window.history() {
            let _ = history.push_state_with_url(&JsValue::NULL, "", Some(path));
        }
    }
}

/// 替换 History 状态（内部工具函数，用于重定向）
fn replace_history_state(path: &str) {
    if let Some(window) = web_sys::window() {
        if let Ok(history) = window.history() {
            let _ = history.replace_state_with_url(&JsValue::NULL, "", Some(path));
        }
    }
}

/// 路由器服务
///
/// 封装所有路由操作，通过 Signal 驱动界面更新。
/// 通过注入认证相位信号实现与认证系统的解耦；
/// `pending_redirect` 显式承载"登录后要回到哪里"。
#[derive(Clone, Copy)]
pub struct RouterService {
    /// 当前路由（只读信号）
    current_route: ReadSignal<AppRoute>,
    /// 设置当前路由（写入信号）
    set_route: WriteSignal<AppRoute>,
    /// 认证相位（注入的信号，实现解耦）
    phase: Signal<AuthPhase>,
    /// 守卫弹回登录页时记下的原目标，登录成功后在此恢复
    pending_redirect: RwSignal<Option<AppRoute>>,
}

impl RouterService {
    /// 创建新的路由服务
    ///
    /// # Arguments
    /// * `phase` - 认证相位信号，由外部注入实现解耦
    fn new(phase: Signal<AuthPhase>) -> Self {
        // 初始路由从 URL 解析；冷启动时相位是 Verifying，
        // 守卫裁决推迟到相位落定的 Effect 中进行
        let initial_route = AppRoute::from_path(&current_path());
        let (current_route, set_route) = signal(initial_route);

        Self {
            current_route,
            set_route,
            phase,
            pending_redirect: RwSignal::new(None),
        }
    }

    /// 获取当前路由信号
    pub fn current_route(&self) -> ReadSignal<AppRoute> {
        self.current_route
    }

    /// 认证相位信号（供出口组件决定是否渲染加载指示）
    pub fn phase(&self) -> Signal<AuthPhase> {
        self.phase
    }

    /// **核心方法：导航与守卫**
    ///
    /// 流程：请求 -> 验证(Guard) -> 处理 -> 加载
    pub fn navigate(&self, path: &str) {
        self.navigate_to_route(AppRoute::from_path(path), true);
    }

    /// 导航到指定路由
    ///
    /// # Arguments
    /// * `target_route` - 目标路由
    /// * `use_push` - true 使用 pushState, false 使用 replaceState
    fn navigate_to_route(&self, target_route: AppRoute, use_push: bool) {
        match self.phase.get_untracked() {
            // --- 校验期：不裁决，先落位 ---
            // 受保护路由此时由出口渲染加载指示，既不暴露内容也不弹走用户
            AuthPhase::Verifying => {
                self.apply(target_route, use_push);
            }
            AuthPhase::Unauthenticated => {
                if target_route.requires_auth() {
                    web_sys::console::log_1(
                        &"[Router] Access denied. Redirecting to login.".into(),
                    );
                    // 记下原目标，登录成功后恢复
                    self.pending_redirect.set(Some(target_route));
                    self.apply(AppRoute::auth_failure_redirect(), false);
                    return;
                }
                self.apply(target_route, use_push);
            }
            AuthPhase::Authenticated => {
                if target_route.should_redirect_when_authenticated() {
                    web_sys::console::log_1(
                        &"[Router] Already authenticated. Redirecting to dashboard.".into(),
                    );
                    self.apply(AppRoute::auth_success_redirect(), use_push);
                    return;
                }
                self.apply(target_route, use_push);
            }
        }
    }

    /// 验证通过后的统一落位：写 History 并更新信号
    fn apply(&self, route: AppRoute, use_push: bool) {
        if use_push {
            push_history_state(route.to_path());
        } else {
            replace_history_state(route.to_path());
        }
        self.set_route.set(route);
    }

    /// 初始化浏览器后退/前进按钮监听
    fn init_popstate_listener(&self) {
        let service = *self;

        let closure = Closure::<dyn Fn()>::new(move || {
            // popstate 时也执行守卫逻辑；重定向用 replace 避免污染历史栈
            service.navigate_to_route(AppRoute::from_path(&current_path()), false);
        });

        if let Some(window) = web_sys::window() {
            let _ = window
                .add_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref());
        }

        // 泄漏闭包以保持监听器存活
        closure.forget();
    }

    /// 设置认证相位变化时的自动重定向
    fn setup_auth_redirect(&self) {
        let service = *self;

        Effect::new(move |_| {
            let phase = service.phase.get();
            let route = service.current_route.get_untracked();

            match phase {
                // 校验尚未落定：出口正在渲染加载指示，不做任何迁移
                AuthPhase::Verifying => {}
                AuthPhase::Authenticated => {
                    // 用户刚登录：离开登录页，优先回到被弹走前的目标
                    if route.should_redirect_when_authenticated() {
                        let target = service
                            .pending_redirect
                            .try_update(Option::take)
                            .flatten()
                            .unwrap_or_else(AppRoute::auth_success_redirect);
                        web_sys::console::log_1(
                            &format!("[Router] Logged in, resuming at {}.", target).into(),
                        );
                        service.apply(target, true);
                    }
                }
                AuthPhase::Unauthenticated => {
                    // 注销或会话失效：受保护页面立即弹回登录页
                    if route.requires_auth() {
                        web_sys::console::log_1(
                            &"[Router] Session ended, redirecting to login.".into(),
                        );
                        service.pending_redirect.set(Some(route));
                        service.apply(AppRoute::auth_failure_redirect(), false);
                    }
                }
            }
        });
    }
}

/// 提供路由服务到 Context 并初始化
fn provide_router(phase: Signal<AuthPhase>) -> RouterService {
    let router = RouterService::new(phase);

    // 初始化监听器
    router.init_popstate_listener();
    router.setup_auth_redirect();

    provide_context(router);
    router
}

/// 从 Context 获取路由服务
pub fn use_router() -> RouterService {
    use_context::<RouterService>()
        .expect("RouterService not found in context. Ensure Router is provided.")
}

// ============================================================================
// UI 组件
// ============================================================================

/// 路由器根组件
///
/// 提供路由上下文，应在 App 根部使用。
#[component]
pub fn Router(
    /// 认证相位信号
    phase: Signal<AuthPhase>,
    /// 子组件
    children: Children,
) -> impl IntoView {
    // 提供路由服务到 Context
    provide_router(phase);

    children()
}

/// 路由出口组件
///
/// 根据当前路由状态渲染对应的组件。
/// 会话校验期间，受保护路由渲染中性的加载指示。
#[component]
pub fn RouterOutlet(
    /// 路由匹配函数：接收当前路由，返回对应视图
    matcher: fn(AppRoute) -> AnyView,
) -> impl IntoView {
    let router = use_router();

    move || {
        let current = router.current_route().get();
        if current.requires_auth() && router.phase().get() == AuthPhase::Verifying {
            return view! {
                <div class="flex items-center justify-center min-h-screen bg-base-200">
                    <div class="flex flex-col items-center gap-3">
                        <span class="loading loading-spinner loading-lg text-primary"></span>
                        <p class="text-sm text-base-content/60">"正在校验会话..."</p>
                    </div>
                </div>
            }
            .into_any();
        }
        matcher(current)
    }
}

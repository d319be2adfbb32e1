//! MedFlow 前端应用
//!
//! 采用 Context-Driven 的高内聚低耦合架构：
//! - `web::route`: 路由定义（领域模型）
//! - `web::router`: 路由服务（核心引擎，三态守卫）
//! - `session`: 会话生命周期（框架无关，适配器注入）
//! - `auth`: 认证状态管理（信号层）
//! - `query`: 患者集合缓存（新鲜度 / 去重 / 失效）
//! - `api`: HTTP 客户端
//! - `components`: UI 组件层

mod api;
mod auth;
mod components {
    pub mod dashboard;
    mod icons;
    pub mod layout;
    pub mod login;
    mod patient_form_dialog;
    pub mod patients;
}
mod error;
mod query;
mod session;

use crate::auth::{AuthContext, init_auth};
use crate::components::dashboard::DashboardPage;
use crate::components::layout::AppShell;
use crate::components::login::LoginPage;
use crate::components::patients::PatientsPage;
use crate::query::PatientStore;

use leptos::prelude::*;

// 原生 Web API 封装模块
// 此模块提供对浏览器原生 API 的轻量级封装，替代 gloo-* 系列 crate，
// 以减小 WASM 二进制体积。
pub(crate) mod web;

use web::route::AppRoute;
use web::router::{Router, RouterOutlet};

/// 路由匹配函数
///
/// 根据 AppRoute 枚举返回对应的视图组件。
fn route_matcher(route: AppRoute) -> AnyView {
    match route {
        AppRoute::Login => view! { <LoginPage /> }.into_any(),
        AppRoute::Dashboard => view! {
            <AppShell>
                <DashboardPage />
            </AppShell>
        }
        .into_any(),
        AppRoute::Patients => view! {
            <AppShell>
                <PatientsPage />
            </AppShell>
        }
        .into_any(),
        AppRoute::NotFound => view! {
            <div class="flex items-center justify-center min-h-screen bg-base-200">
                <div class="text-center">
                    <h1 class="text-6xl font-bold text-error">"404"</h1>
                    <p class="text-xl mt-4">"页面未找到"</p>
                </div>
            </div>
        }
        .into_any(),
    }
}

#[component]
pub fn App() -> impl IntoView {
    // 1. 创建认证上下文
    let auth_ctx = AuthContext::new();
    provide_context(auth_ctx);

    // 2. 初始化认证状态（读取持久化凭据并异步校验，每次加载恰好一次）
    init_auth(&auth_ctx);

    // 3. 患者集合缓存，跨页面共享
    provide_context(PatientStore::new());

    // 4. 获取认证相位信号，用于注入路由服务（解耦！）
    let phase = auth_ctx.phase_signal();

    view! {
        // 5. 路由器组件：注入认证相位实现三态守卫
        <Router phase=phase>
            <RouterOutlet matcher=route_matcher />
        </Router>
    }
}

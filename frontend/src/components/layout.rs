use crate::auth::{logout, use_auth};
use crate::components::icons::{Activity, LayoutDashboard, LogOut, Users};
use crate::query::use_patients;
use crate::web::route::AppRoute;
use crate::web::router::use_router;
use leptos::prelude::*;

/// 受保护页面的公共外壳：导航栏 + 内容区
#[component]
pub fn AppShell(children: Children) -> impl IntoView {
    let auth = use_auth();
    let patients = use_patients();
    let router = use_router();

    let on_logout = move |_| {
        // 先清缓存再注销，避免下一个会话看到上一个会话的数据
        patients.reset();
        logout(&auth);
        // 跳转由路由服务的相位监听自动处理
    };

    let email = move || {
        auth.state
            .with(|state| state.user.as_ref().map(|user| user.email.clone()))
            .unwrap_or_default()
    };
    let email_initial = move || {
        email()
            .chars()
            .next()
            .map(|c| c.to_uppercase().to_string())
            .unwrap_or_else(|| "U".to_string())
    };

    let nav_class = move |route: AppRoute| {
        if router.current_route().get() == route {
            "btn btn-ghost btn-sm gap-2 btn-active"
        } else {
            "btn btn-ghost btn-sm gap-2"
        }
    };

    view! {
        <div class="min-h-screen bg-base-200">
            <div class="navbar bg-base-100 shadow-md px-4">
                <div class="flex-1 gap-3">
                    <div class="flex items-center gap-2">
                        <div class="p-2 bg-primary/10 rounded-xl text-primary">
                            <Activity attr:class="h-5 w-5" />
                        </div>
                        <div>
                            <span class="text-lg font-bold">"MedFlow"</span>
                            <p class="text-[11px] text-base-content/50 uppercase tracking-widest">
                                "患者管理"
                            </p>
                        </div>
                    </div>
                    <div class="hidden sm:flex gap-1 ml-4">
                        <button
                            class=move || nav_class(AppRoute::Dashboard)
                            on:click=move |_| router.navigate("/dashboard")
                        >
                            <LayoutDashboard attr:class="h-4 w-4" /> "仪表盘"
                        </button>
                        <button
                            class=move || nav_class(AppRoute::Patients)
                            on:click=move |_| router.navigate("/patients")
                        >
                            <Users attr:class="h-4 w-4" /> "患者"
                        </button>
                    </div>
                </div>
                <div class="flex-none gap-3">
                    <div class="flex items-center gap-2">
                        <div class="avatar placeholder">
                            <div class="bg-primary text-primary-content rounded-full w-8">
                                <span class="text-xs font-bold">{email_initial}</span>
                            </div>
                        </div>
                        <span class="text-sm hidden md:inline">{email}</span>
                    </div>
                    <button on:click=on_logout class="btn btn-outline btn-error btn-sm gap-2">
                        <LogOut attr:class="h-4 w-4" /> "注销"
                    </button>
                </div>
            </div>

            <main class="p-4 md:p-8">{children()}</main>
        </div>
    }
}

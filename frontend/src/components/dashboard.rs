use crate::auth::use_auth;
use crate::components::icons::{TrendingUp, UserPlus, Users};
use crate::query::use_patients;
use crate::web::router::use_router;
use chrono::Datelike;
use leptos::prelude::*;
use medflow_shared::Patient;

/// 本月注册人数（`month` 为 1 起始的自然月）
fn registered_in_month(patients: &[Patient], year: i32, month: u32) -> usize {
    patients
        .iter()
        .filter(|p| p.registered_date.year() == year && p.registered_date.month() == month)
        .count()
}

#[component]
pub fn DashboardPage() -> impl IntoView {
    let auth = use_auth();
    let store = use_patients();
    let router = use_router();

    // 认证就绪后加载集合；新鲜窗口内重复进入本页不会再次回源
    Effect::new(move |_| {
        if let Some(api) = auth.state.with(|state| state.api.clone()) {
            store.ensure_fetched(&api);
        }
    });

    let patients = store.patients();
    let is_loading = store.is_loading();
    let load_error = store.load_error();

    let total = move || patients.with(|p| p.as_ref().map(|list| list.len()).unwrap_or(0));
    let this_month = move || {
        patients.with(|p| {
            p.as_ref()
                .map(|list| {
                    let now = js_sys::Date::new_0();
                    registered_in_month(
                        list,
                        now.get_full_year() as i32,
                        now.get_month() + 1,
                    )
                })
                .unwrap_or(0)
        })
    };
    // 最近注册的五位，新者在前
    let recent = move || {
        patients.with(|p| {
            p.as_ref()
                .map(|list| list.iter().rev().take(5).cloned().collect::<Vec<_>>())
                .unwrap_or_default()
        })
    };

    let welcome_email = move || {
        auth.state
            .with(|state| state.user.as_ref().map(|user| user.email.clone()))
            .unwrap_or_default()
    };

    view! {
        <div class="max-w-7xl mx-auto space-y-8">
            <div>
                <h1 class="text-3xl font-bold">"仪表盘"</h1>
                <p class="mt-1 text-base-content/60">
                    "欢迎回来，" <span class="font-medium">{welcome_email}</span>
                </p>
            </div>

            <div class="stats shadow w-full stats-vertical md:stats-horizontal bg-base-100">
                <div class="stat">
                    <div class="stat-figure text-primary">
                        <Users attr:class="h-8 w-8" />
                    </div>
                    <div class="stat-title">"患者总数"</div>
                    <div class="stat-value text-primary">
                        {move || if is_loading.get() && total() == 0 {
                            view! { <span class="loading loading-dots loading-md"></span> }.into_any()
                        } else {
                            total().into_any()
                        }}
                    </div>
                </div>

                <div class="stat">
                    <div class="stat-figure text-secondary">
                        <TrendingUp attr:class="h-8 w-8" />
                    </div>
                    <div class="stat-title">"本月新增"</div>
                    <div class="stat-value text-secondary">{this_month}</div>
                </div>

                <div class="stat">
                    <div class="stat-title">"活跃档案"</div>
                    <div class="stat-value">{total}</div>
                    <div class="stat-desc">"全部由服务端托管"</div>
                </div>
            </div>

            <div class="grid grid-cols-1 lg:grid-cols-3 gap-6">
                <div class="lg:col-span-2 card bg-base-100 shadow-xl">
                    <div class="card-body p-0">
                        <div class="flex items-center justify-between p-6 pb-2">
                            <div>
                                <h3 class="card-title">"最近注册"</h3>
                                <p class="text-base-content/70 text-sm">"最新的五条患者档案。"</p>
                            </div>
                            <button
                                class="btn btn-ghost btn-sm"
                                on:click=move |_| router.navigate("/patients")
                            >
                                "查看全部"
                            </button>
                        </div>

                        <Show when=move || load_error.get().is_some()>
                            <div class="px-6 py-8 text-center text-error text-sm">
                                "加载患者失败，请检查网络连接。"
                            </div>
                        </Show>

                        <Show when=move || load_error.get().is_none()>
                            <Show
                                when=move || !recent().is_empty()
                                fallback=move || view! {
                                    <div class="flex flex-col items-center py-10 text-base-content/50">
                                        <Users attr:class="h-10 w-10 mb-3" />
                                        <p class="text-sm">
                                            {move || if is_loading.get() { "加载中..." } else { "暂无患者，创建第一条档案以开始。" }}
                                        </p>
                                    </div>
                                }
                            >
                                <div class="divide-y divide-base-200 pb-2">
                                    <For
                                        each=recent
                                        key=|p| p.id.clone()
                                        children=move |patient| {
                                            view! {
                                                <div class="flex items-center gap-4 px-6 py-3">
                                                    <div class="avatar placeholder">
                                                        <div class="bg-primary/15 text-primary rounded-full w-10">
                                                            <span class="text-xs font-bold">{patient.initials()}</span>
                                                        </div>
                                                    </div>
                                                    <div class="flex-1 min-w-0">
                                                        <p class="text-sm font-semibold truncate">{patient.name.clone()}</p>
                                                        <p class="text-xs text-base-content/60 truncate">{patient.email.clone()}</p>
                                                    </div>
                                                    <span class="text-xs text-base-content/50 hidden sm:block">
                                                        {patient.registered_date.format("%Y-%m-%d").to_string()}
                                                    </span>
                                                </div>
                                            }
                                        }
                                    />
                                </div>
                            </Show>
                        </Show>
                    </div>
                </div>

                <div class="card bg-base-100 shadow-xl">
                    <div class="card-body">
                        <h3 class="card-title">"快捷操作"</h3>
                        <div class="space-y-3 mt-2">
                            <button
                                class="btn btn-primary w-full gap-2"
                                on:click=move |_| router.navigate("/patients")
                            >
                                <UserPlus attr:class="h-5 w-5" /> "新增患者"
                            </button>
                            <button
                                class="btn btn-outline w-full gap-2"
                                on:click=move |_| router.navigate("/patients")
                            >
                                <Users attr:class="h-5 w-5" /> "管理患者"
                            </button>
                        </div>
                    </div>
                </div>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn patient(registered: &str) -> Patient {
        Patient {
            id: registered.to_string(),
            name: "P".into(),
            email: "p@example.com".into(),
            address: "-".into(),
            date_of_birth: NaiveDate::parse_from_str("1990-01-01", "%Y-%m-%d").unwrap(),
            registered_date: NaiveDate::parse_from_str(registered, "%Y-%m-%d").unwrap(),
        }
    }

    #[test]
    fn monthly_count_matches_year_and_month() {
        let list = vec![
            patient("2026-08-01"),
            patient("2026-08-30"),
            patient("2026-07-31"),
            patient("2025-08-15"),
        ];
        assert_eq!(registered_in_month(&list, 2026, 8), 2);
        assert_eq!(registered_in_month(&list, 2026, 7), 1);
        assert_eq!(registered_in_month(&list, 2024, 1), 0);
    }
}

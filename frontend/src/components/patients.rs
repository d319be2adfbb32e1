use crate::auth::use_auth;
use crate::components::icons::{Pencil, RefreshCw, Search, Trash2, UserPlus, Users};
use crate::components::patient_form_dialog::{PatientFormData, PatientFormDialog};
use crate::query::use_patients;
use leptos::prelude::*;
use leptos::task::spawn_local;
use medflow_shared::{CreatePatientRequest, Patient, UpdatePatientRequest};

#[component]
pub fn PatientsPage() -> impl IntoView {
    let auth = use_auth();
    let store = use_patients();

    let (search, set_search) = signal(String::new());
    // 两步删除确认：记录待确认的患者 id
    let (delete_confirm, set_delete_confirm) = signal(Option::<String>::None);
    let (notification, set_notification) = signal(Option::<(String, bool)>::None); // 消息内容, 是否出错

    // 对话框状态归本页所有：写路径失败时对话框保持打开并展示错误
    let dialog_open = RwSignal::new(false);
    let editing = RwSignal::new(Option::<Patient>::None);
    let submitting = RwSignal::new(false);
    let form_error = RwSignal::new(Option::<String>::None);

    // 认证就绪后加载集合（新鲜窗口内不重复回源）
    Effect::new(move |_| {
        if let Some(api) = auth.state.with(|state| state.api.clone()) {
            store.ensure_fetched(&api);
        }
    });

    let patients = store.patients();
    let is_loading = store.is_loading();
    let load_error = store.load_error();

    let filtered = move || {
        let term = search.get();
        patients.with(|p| {
            p.as_ref()
                .map(|list| {
                    list.iter()
                        .filter(|patient| patient.matches(&term))
                        .cloned()
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default()
        })
    };
    let total = move || patients.with(|p| p.as_ref().map(|list| list.len()).unwrap_or(0));
    let loaded = move || patients.with(|p| p.is_some());

    let api = move || auth.state.with(|state| state.api.clone());

    let open_create = move |_| {
        editing.set(None);
        form_error.set(None);
        dialog_open.set(true);
    };

    let open_edit = move |patient: Patient| {
        editing.set(Some(patient));
        form_error.set(None);
        dialog_open.set(true);
    };

    let handle_submit = move |data: PatientFormData| {
        let Some(api) = api() else { return };

        submitting.set(true);
        form_error.set(None);

        spawn_local(async move {
            let result = match editing.get_untracked() {
                Some(patient) => store
                    .update(
                        &api,
                        patient.id.clone(),
                        UpdatePatientRequest {
                            name: data.name,
                            email: data.email,
                            address: data.address,
                            date_of_birth: data.date_of_birth,
                        },
                    )
                    .await
                    .map(|_| "患者信息已更新"),
                None => store
                    .create(
                        &api,
                        CreatePatientRequest {
                            name: data.name,
                            email: data.email,
                            address: data.address,
                            date_of_birth: data.date_of_birth,
                            registered_date: data.registered_date,
                        },
                    )
                    .await
                    .map(|_| "患者创建成功"),
            };

            match result {
                Ok(message) => {
                    dialog_open.set(false);
                    editing.set(None);
                    set_notification.set(Some((message.to_string(), false)));
                }
                Err(err) => {
                    // 缓存未被触碰；错误只呈现给发起操作的表单
                    form_error.set(Some(err.user_message()));
                }
            }
            submitting.set(false);
        });
    };

    let handle_delete = move |id: String| {
        let Some(api) = api() else { return };

        spawn_local(async move {
            match store.remove(&api, id).await {
                Ok(()) => {
                    set_notification.set(Some(("患者已删除".to_string(), false)));
                }
                Err(err) => {
                    // 删除失败（如 id 不存在）：集合缓存保持原样
                    set_notification.set(Some((format!("删除失败: {}", err.user_message()), true)));
                }
            }
            set_delete_confirm.set(None);
        });
    };

    let refresh = move |_| {
        if let Some(api) = api() {
            store.refresh(&api);
        }
    };

    // 3秒后清除通知
    Effect::new(move |_| {
        if notification.get().is_some() {
            set_timeout(
                move || set_notification.set(None),
                std::time::Duration::from_secs(3),
            );
        }
    });

    view! {
        <div class="max-w-7xl mx-auto space-y-6">
            // 通知提示框
            <Show when=move || notification.get().is_some()>
                <div class="toast toast-top toast-end z-50">
                    <div class=move || {
                        let is_err = notification.get().map(|(_, e)| e).unwrap_or(false);
                        if is_err {
                            "alert alert-error shadow-lg"
                        } else {
                            "alert alert-success shadow-lg"
                        }
                    }>
                        <span>{move || notification.get().map(|(msg, _)| msg).unwrap_or_default()}</span>
                    </div>
                </div>
            </Show>

            <div class="flex flex-col sm:flex-row sm:items-center sm:justify-between gap-4">
                <div>
                    <h1 class="text-3xl font-bold">"患者"</h1>
                    <p class="mt-1 text-base-content/60">
                        {move || if loaded() {
                            format!("已登记 {} 位患者", total())
                        } else {
                            "加载中...".to_string()
                        }}
                    </p>
                </div>
                <button on:click=open_create class="btn btn-primary gap-2">
                    <UserPlus attr:class="h-4 w-4" /> "新增患者"
                </button>
            </div>

            // 搜索栏
            <label class="input input-bordered flex items-center gap-2 w-full">
                <Search attr:class="h-4 w-4 opacity-50" />
                <input
                    type="text"
                    class="grow"
                    placeholder="按姓名、邮箱或地址搜索..."
                    on:input=move |ev| set_search.set(event_target_value(&ev))
                    prop:value=search
                />
            </label>

            <div class="card bg-base-100 shadow-xl">
                <div class="card-body p-0">
                    <div class="flex items-center justify-end p-4 pb-0">
                        <button
                            on:click=refresh
                            disabled=move || is_loading.get()
                            class="btn btn-ghost btn-circle btn-sm"
                        >
                            <RefreshCw attr:class=move || if is_loading.get() { "h-4 w-4 animate-spin" } else { "h-4 w-4" } />
                        </button>
                    </div>

                    <div class="overflow-x-auto w-full">
                        <table class="table table-zebra w-full">
                            <thead>
                                <tr>
                                    <th>"患者"</th>
                                    <th class="hidden md:table-cell">"邮箱"</th>
                                    <th class="hidden lg:table-cell">"地址"</th>
                                    <th class="hidden sm:table-cell">"出生日期"</th>
                                    <th class="hidden sm:table-cell">"注册日期"</th>
                                    <th></th>
                                </tr>
                            </thead>
                            <tbody>
                                <Show when=move || load_error.get().is_some()>
                                    <tr>
                                        <td colspan="6" class="text-center py-10 text-error">
                                            "加载患者失败，请检查网络连接后重试。"
                                        </td>
                                    </tr>
                                </Show>
                                <Show when=move || load_error.get().is_none() && is_loading.get() && !loaded()>
                                    <tr>
                                        <td colspan="6" class="text-center py-10 text-base-content/50">
                                            <span class="loading loading-spinner loading-md"></span> " 加载中..."
                                        </td>
                                    </tr>
                                </Show>
                                <Show when=move || load_error.get().is_none() && loaded() && filtered().is_empty()>
                                    <tr>
                                        <td colspan="6" class="text-center py-10 text-base-content/50">
                                            <div class="flex flex-col items-center gap-2">
                                                <Users attr:class="h-8 w-8" />
                                                {move || if search.get().is_empty() {
                                                    "暂无患者。点击\"新增患者\"创建一条档案。"
                                                } else {
                                                    "没有匹配搜索条件的患者。"
                                                }}
                                            </div>
                                        </td>
                                    </tr>
                                </Show>
                                <For
                                    each=filtered
                                    key=|p| p.id.clone()
                                    children=move |patient| {
                                        let edit_patient = patient.clone();
                                        let delete_id = patient.id.clone();
                                        let confirm_id = patient.id.clone();
                                        let row_id = patient.id.clone();
                                        view! {
                                            <tr>
                                                <td>
                                                    <div class="flex items-center gap-3">
                                                        <div class="avatar placeholder">
                                                            <div class="bg-primary/15 text-primary rounded-full w-9">
                                                                <span class="text-xs font-bold">{patient.initials()}</span>
                                                            </div>
                                                        </div>
                                                        <div class="min-w-0">
                                                            <p class="text-sm font-semibold truncate">{patient.name.clone()}</p>
                                                            <p class="text-xs text-base-content/50 truncate md:hidden">{patient.email.clone()}</p>
                                                        </div>
                                                    </div>
                                                </td>
                                                <td class="hidden md:table-cell text-sm">{patient.email.clone()}</td>
                                                <td class="hidden lg:table-cell text-sm max-w-[200px] truncate">{patient.address.clone()}</td>
                                                <td class="hidden sm:table-cell text-sm">
                                                    {patient.date_of_birth.format("%Y-%m-%d").to_string()}
                                                </td>
                                                <td class="hidden sm:table-cell text-sm">
                                                    {patient.registered_date.format("%Y-%m-%d").to_string()}
                                                </td>
                                                <td>
                                                    <div class="flex items-center justify-end gap-1">
                                                        <button
                                                            class="btn btn-ghost btn-sm btn-square"
                                                            title="编辑患者"
                                                            on:click=move |_| open_edit(edit_patient.clone())
                                                        >
                                                            <Pencil attr:class="h-4 w-4" />
                                                        </button>
                                                        {move || {
                                                            if delete_confirm.get().as_deref() == Some(row_id.as_str()) {
                                                                let delete_id = delete_id.clone();
                                                                view! {
                                                                    <div class="flex items-center gap-1">
                                                                        <button
                                                                            class="btn btn-error btn-xs"
                                                                            on:click=move |_| handle_delete(delete_id.clone())
                                                                        >
                                                                            "确认"
                                                                        </button>
                                                                        <button
                                                                            class="btn btn-ghost btn-xs"
                                                                            on:click=move |_| set_delete_confirm.set(None)
                                                                        >
                                                                            "取消"
                                                                        </button>
                                                                    </div>
                                                                }.into_any()
                                                            } else {
                                                                let confirm_id = confirm_id.clone();
                                                                view! {
                                                                    <button
                                                                        class="btn btn-ghost btn-sm btn-square text-error"
                                                                        title="删除患者"
                                                                        on:click=move |_| set_delete_confirm.set(Some(confirm_id.clone()))
                                                                    >
                                                                        <Trash2 attr:class="h-4 w-4" />
                                                                    </button>
                                                                }.into_any()
                                                            }
                                                        }}
                                                    </div>
                                                </td>
                                            </tr>
                                        }
                                    }
                                />
                            </tbody>
                        </table>
                    </div>
                </div>
            </div>

            <PatientFormDialog
                open=dialog_open
                editing=editing
                submitting=submitting
                error=form_error
                on_submit=handle_submit
            />
        </div>
    }
}

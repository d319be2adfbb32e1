use crate::components::icons::AlertCircle;
use chrono::NaiveDate;
use leptos::prelude::*;
use medflow_shared::Patient;

/// 表单提交载荷。日期已在对话框内解析完毕。
#[derive(Debug, Clone, PartialEq)]
pub struct PatientFormData {
    pub name: String,
    pub email: String,
    pub address: String,
    pub date_of_birth: NaiveDate,
    pub registered_date: NaiveDate,
}

/// 今天的日期（注册日期的默认值）
fn today() -> String {
    let now = js_sys::Date::new_0();
    format!(
        "{:04}-{:02}-{:02}",
        now.get_full_year(),
        now.get_month() + 1,
        now.get_date()
    )
}

/// 新建 / 编辑患者对话框
///
/// 写路径失败时不关闭：错误经 `error` 信号展示在表单顶部，
/// 成功与否由父组件裁决（置 `open` 为 false 即关闭）。
#[component]
pub fn PatientFormDialog(
    /// 打开状态（父组件持有）
    open: RwSignal<bool>,
    /// 编辑对象；None 表示新建
    editing: RwSignal<Option<Patient>>,
    /// 提交中
    submitting: RwSignal<bool>,
    /// 写路径错误信息
    error: RwSignal<Option<String>>,
    /// 提交回调
    #[prop(into)] on_submit: Callback<PatientFormData>,
) -> impl IntoView {
    let dialog_ref = NodeRef::<leptos::html::Dialog>::new();

    // 表单字段
    let (name, set_name) = signal(String::new());
    let (email, set_email) = signal(String::new());
    let (address, set_address) = signal(String::new());
    let (birth_date, set_birth_date) = signal(String::new());
    let (registered_date, set_registered_date) = signal(String::new());

    let is_editing = move || editing.with(|e| e.is_some());

    // 打开时装填：编辑模式取现有档案，新建模式取空表单 + 今天
    Effect::new(move |_| {
        if !open.get() {
            return;
        }
        match editing.get_untracked() {
            Some(patient) => {
                set_name.set(patient.name);
                set_email.set(patient.email);
                set_address.set(patient.address);
                set_birth_date.set(patient.date_of_birth.format("%Y-%m-%d").to_string());
                set_registered_date.set(patient.registered_date.format("%Y-%m-%d").to_string());
            }
            None => {
                set_name.set(String::new());
                set_email.set(String::new());
                set_address.set(String::new());
                set_birth_date.set(String::new());
                set_registered_date.set(today());
            }
        }
    });

    Effect::new(move |_| {
        if let Some(dialog) = dialog_ref.get() {
            if open.get() {
                if !dialog.open() {
                    let _ = dialog.show_modal();
                }
            } else if dialog.open() {
                dialog.close();
            }
        }
    });

    let on_form_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();

        // required + type=date 已挡掉空值；这里兜底解析
        let (Ok(date_of_birth), Ok(registered)) = (
            birth_date.get().parse::<NaiveDate>(),
            registered_date.get().parse::<NaiveDate>(),
        ) else {
            error.set(Some("日期格式无效".to_string()));
            return;
        };

        on_submit.run(PatientFormData {
            name: name.get(),
            email: email.get(),
            address: address.get(),
            date_of_birth,
            registered_date: registered,
        });
    };

    view! {
        <dialog class="modal" node_ref=dialog_ref on:close=move |_| open.set(false)>
            <div class="modal-box">
                <h3 class="font-bold text-lg">
                    {move || if is_editing() { "编辑患者" } else { "新增患者" }}
                </h3>
                <p class="py-2 text-base-content/70">
                    {move || if is_editing() {
                        "更新下方的患者信息。"
                    } else {
                        "填写信息以登记一位新患者。"
                    }}
                </p>

                <Show when=move || error.get().is_some()>
                    <div role="alert" class="alert alert-error text-sm py-2 mb-2">
                        <AlertCircle attr:class="h-5 w-5 shrink-0" />
                        <span>{move || error.get().unwrap_or_default()}</span>
                    </div>
                </Show>

                <form on:submit=on_form_submit class="space-y-4">
                    <div class="form-control">
                        <label for="patient-name" class="label">
                            <span class="label-text">"姓名"</span>
                        </label>
                        <input id="patient-name" required
                            type="text"
                            placeholder="张三"
                            on:input=move |ev| set_name.set(event_target_value(&ev))
                            prop:value=name
                            class="input input-bordered w-full"
                        />
                    </div>

                    <div class="form-control">
                        <label for="patient-email" class="label">
                            <span class="label-text">"邮箱"</span>
                        </label>
                        <input id="patient-email" required
                            type="email"
                            placeholder="zhangsan@example.com"
                            on:input=move |ev| set_email.set(event_target_value(&ev))
                            prop:value=email
                            class="input input-bordered w-full"
                        />
                    </div>

                    <div class="form-control">
                        <label for="patient-address" class="label">
                            <span class="label-text">"地址"</span>
                        </label>
                        <input id="patient-address" required
                            type="text"
                            placeholder="某市某路 123 号"
                            on:input=move |ev| set_address.set(event_target_value(&ev))
                            prop:value=address
                            class="input input-bordered w-full"
                        />
                    </div>

                    <div class="grid grid-cols-2 gap-4">
                        <div class="form-control">
                            <label for="patient-dob" class="label">
                                <span class="label-text">"出生日期"</span>
                            </label>
                            <input id="patient-dob" required
                                type="date"
                                on:input=move |ev| set_birth_date.set(event_target_value(&ev))
                                prop:value=birth_date
                                class="input input-bordered w-full"
                            />
                        </div>
                        <Show when=move || !is_editing()>
                            <div class="form-control">
                                <label for="patient-registered" class="label">
                                    <span class="label-text">"注册日期"</span>
                                </label>
                                <input id="patient-registered" required
                                    type="date"
                                    on:input=move |ev| set_registered_date.set(event_target_value(&ev))
                                    prop:value=registered_date
                                    class="input input-bordered w-full"
                                />
                            </div>
                        </Show>
                    </div>

                    <div class="modal-action">
                        <button type="button" class="btn btn-ghost" on:click=move |_| open.set(false)>
                            "取消"
                        </button>
                        <button type="submit" disabled=move || submitting.get() class="btn btn-primary">
                            {move || if submitting.get() {
                                view! { <span class="loading loading-spinner"></span> "保存中..." }.into_any()
                            } else if is_editing() {
                                "保存修改".into_any()
                            } else {
                                "创建患者".into_any()
                            }}
                        </button>
                    </div>
                </form>
            </div>
            <form method="dialog" class="modal-backdrop">
                <button>"close"</button>
            </form>
        </dialog>
    }
}

use crate::auth::{AuthPhase, login, use_auth};
use crate::components::icons::{Activity, AlertCircle, Eye, EyeOff};
use leptos::prelude::*;
use leptos::task::spawn_local;

#[component]
pub fn LoginPage() -> impl IntoView {
    let auth = use_auth();

    let (email, set_email) = signal(String::new());
    let (password, set_password) = signal(String::new());
    let (show_password, set_show_password) = signal(false);
    let (is_submitting, set_is_submitting) = signal(false);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);

    // 校验期间只显示加载指示；已认证时路由服务会自动离开本页
    let is_verifying = move || auth.state.get().phase == AuthPhase::Verifying;

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        if email.get().is_empty() || password.get().is_empty() {
            set_error_msg.set(Some("Please fill in all fields".to_string()));
            return;
        }

        set_is_submitting.set(true);
        set_error_msg.set(None);

        spawn_local(async move {
            // 成功后的跳转由路由服务的相位监听完成，这里只处理失败
            if let Err(err) = login(&auth, email.get_untracked(), password.get_untracked()).await {
                let message = if err.is_unauthorized() {
                    "Invalid email or password. Please try again.".to_string()
                } else if err.is_network() {
                    "Unable to connect to the server. Please try again later.".to_string()
                } else {
                    err.user_message()
                };
                set_error_msg.set(Some(message));
            }
            set_is_submitting.set(false);
        });
    };

    view! {
        <Show
            when=move || !is_verifying()
            fallback=|| view! {
                <div class="flex items-center justify-center min-h-screen">
                    <span class="loading loading-spinner loading-lg text-primary"></span>
                </div>
            }
        >
            <div class="hero min-h-screen bg-base-200">
                <div class="hero-content flex-col w-full max-w-md">
                    <div class="text-center mb-4">
                        <div class="flex flex-col items-center gap-2">
                            <div class="p-3 bg-primary/10 rounded-2xl text-primary">
                                <Activity attr:class="h-8 w-8" />
                            </div>
                            <h1 class="text-3xl font-bold">"MedFlow"</h1>
                            <p class="text-base-content/70">
                                "Sign in to access the patient management portal"
                            </p>
                        </div>
                    </div>

                    <div class="card shrink-0 w-full shadow-2xl bg-base-100">
                        <form class="card-body" on:submit=on_submit>
                            <Show when=move || error_msg.get().is_some()>
                                <div role="alert" class="alert alert-error text-sm py-2">
                                    <AlertCircle attr:class="h-5 w-5 shrink-0" />
                                    <span>{move || error_msg.get().unwrap_or_default()}</span>
                                </div>
                            </Show>

                            <div class="form-control">
                                <label class="label" for="email">
                                    <span class="label-text">"Email Address"</span>
                                </label>
                                <input
                                    id="email"
                                    type="email"
                                    placeholder="you@example.com"
                                    autocomplete="email"
                                    on:input=move |ev| set_email.set(event_target_value(&ev))
                                    prop:value=email
                                    class="input input-bordered"
                                    required
                                />
                            </div>
                            <div class="form-control">
                                <label class="label" for="password">
                                    <span class="label-text">"Password"</span>
                                </label>
                                <div class="join w-full">
                                    <input
                                        id="password"
                                        type=move || if show_password.get() { "text" } else { "password" }
                                        placeholder="••••••••"
                                        autocomplete="current-password"
                                        on:input=move |ev| set_password.set(event_target_value(&ev))
                                        prop:value=password
                                        class="input input-bordered join-item w-full"
                                        required
                                    />
                                    <button
                                        type="button"
                                        class="btn btn-ghost join-item"
                                        on:click=move |_| set_show_password.update(|v| *v = !*v)
                                    >
                                        {move || if show_password.get() {
                                            view! { <EyeOff attr:class="h-4 w-4" /> }.into_any()
                                        } else {
                                            view! { <Eye attr:class="h-4 w-4" /> }.into_any()
                                        }}
                                    </button>
                                </div>
                            </div>
                            <div class="form-control mt-6">
                                <button
                                    class="btn btn-primary"
                                    disabled=move || {
                                        is_submitting.get()
                                            || email.get().is_empty()
                                            || password.get().is_empty()
                                    }
                                >
                                    {move || if is_submitting.get() {
                                        view! { <span class="loading loading-spinner"></span> "Signing in..." }.into_any()
                                    } else {
                                        "Sign In".into_any()
                                    }}
                                </button>
                            </div>

                            <p class="mt-4 text-center text-xs text-base-content/40">
                                "Secured with bearer token authentication"
                            </p>
                        </form>
                    </div>
                </div>
            </div>
        </Show>
    }
}

use crate::api::use_api;
use crate::auth::register;
use crate::components::icons::Activity;
use crate::components::ui::Alert;
use crate::web::route::AppRoute;
use crate::web::router::Link;
use leptos::prelude::*;
use leptos::task::spawn_local;
use vitalwatch_shared::forms::RegisterForm;

#[component]
fn Field(
    id: &'static str,
    #[prop(into)] label: String,
    input_type: &'static str,
    value: RwSignal<String>,
) -> impl IntoView {
    view! {
        <div class="form-control">
            <label class="label" for=id>
                <span class="label-text">{label}</span>
            </label>
            <input
                id=id
                type=input_type
                on:input=move |ev| value.set(event_target_value(&ev))
                prop:value=value
                class="input input-bordered"
                required
            />
        </div>
    }
}

#[component]
pub fn RegisterPage() -> impl IntoView {
    let api = use_api();

    let username = RwSignal::new(String::new());
    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let password2 = RwSignal::new(String::new());
    let is_submitting = RwSignal::new(false);
    let error_msg = RwSignal::new(Option::<String>::None);

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let form = RegisterForm {
            username: username.get(),
            email: email.get(),
            password: password.get(),
            password2: password2.get(),
        };

        // 本地校验失败时不发请求
        if let Err(e) = form.to_request() {
            error_msg.set(Some(e.to_string()));
            return;
        }

        is_submitting.set(true);
        error_msg.set(None);

        let api = api.get_value();
        spawn_local(async move {
            if let Err(msg) = register(&api, &form).await {
                error_msg.set(Some(msg));
            }
            is_submitting.set(false);
        });
    };

    view! {
        <div class="hero min-h-screen bg-base-200">
            <div class="hero-content flex-col w-full max-w-md">
                <div class="flex flex-col items-center gap-2 mb-4">
                    <div class="p-3 bg-primary/10 rounded-2xl text-primary">
                        <Activity attr:class="h-8 w-8" />
                    </div>
                    <h1 class="text-3xl font-bold">"Create an account"</h1>
                </div>

                <div class="card shrink-0 w-full shadow-2xl bg-base-100">
                    <form class="card-body" on:submit=on_submit>
                        <Alert message=error_msg />

                        <Field id="username" label="Username" input_type="text" value=username />
                        <Field id="email" label="Email" input_type="email" value=email />
                        <Field id="password" label="Password" input_type="password" value=password />
                        <Field id="password2" label="Confirm Password" input_type="password" value=password2 />

                        <div class="form-control mt-6">
                            <button class="btn btn-primary" disabled=move || is_submitting.get()>
                                {move || if is_submitting.get() {
                                    view! { <span class="loading loading-spinner"></span> "Creating account..." }.into_any()
                                } else {
                                    "Register".into_any()
                                }}
                            </button>
                        </div>
                        <p class="text-center text-sm text-base-content/70">
                            "Already have an account? "
                            <Link route=AppRoute::Login class="link link-primary">"Sign in"</Link>
                        </p>
                    </form>
                </div>
            </div>
        </div>
    }
}

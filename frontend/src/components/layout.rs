use crate::api::use_api;
use crate::auth::{logout, use_auth};
use crate::components::icons::*;
use crate::web::route::AppRoute;
use crate::web::router::{Link, use_router};
use leptos::prelude::*;

const NAV_ITEMS: [(AppRoute, &str); 4] = [
    (AppRoute::Dashboard, "Dashboard"),
    (AppRoute::Patients, "Patients"),
    (AppRoute::Measurements, "Measurements"),
    (AppRoute::Predictions, "Predictions"),
];

fn nav_icon(route: AppRoute) -> AnyView {
    match route {
        AppRoute::Patients => view! { <Users attr:class="h-5 w-5" /> }.into_any(),
        AppRoute::Measurements => view! { <HeartPulse attr:class="h-5 w-5" /> }.into_any(),
        AppRoute::Predictions => view! { <TrendingUp attr:class="h-5 w-5" /> }.into_any(),
        _ => view! { <LayoutDashboard attr:class="h-5 w-5" /> }.into_any(),
    }
}

/// 受保护页面的外壳：侧边导航、用户信息、注销
#[component]
pub fn Layout(children: Children) -> impl IntoView {
    let auth = use_auth();
    let api = use_api();
    let router = use_router();
    let user = auth.user_signal();
    let restoring = auth.is_loading_signal();

    // RouterOutlet 在路由变化时重建 Layout，这里读一次即可
    let active = router.current_route().get_untracked().nav_section();

    let on_logout = move |_| logout(&api.get_value());

    view! {
        <div class="flex min-h-screen bg-base-200 font-sans">
            <aside class="w-64 shrink-0 bg-base-100 shadow-xl flex flex-col">
                <div class="flex items-center gap-2 px-6 py-5 border-b border-base-200">
                    <Activity attr:class="h-7 w-7 text-primary" />
                    <span class="text-xl font-bold">"VitalWatch"</span>
                </div>

                <ul class="menu flex-1 p-4 gap-1">
                    {NAV_ITEMS
                        .into_iter()
                        .map(|(route, label)| {
                            view! {
                                <li>
                                    <Link
                                        route=route
                                        class=if active == route { "active" } else { "" }
                                    >
                                        {nav_icon(route)}
                                        {label}
                                    </Link>
                                </li>
                            }
                        })
                        .collect_view()}
                </ul>

                <div class="border-t border-base-200 p-4 space-y-3">
                    <Show
                        when=move || !restoring.get()
                        fallback=|| view! { <span class="loading loading-dots loading-sm"></span> }
                    >
                        <div>
                            <div class="font-semibold">
                                {move || user.get().map(|u| u.username).unwrap_or_else(|| "...".to_string())}
                            </div>
                            <div class="text-xs text-base-content/60">
                                {move || {
                                    user.get()
                                        .map(|u| u.subtitle().to_string())
                                        .unwrap_or_else(|| "Medical Professional".to_string())
                                }}
                            </div>
                        </div>
                    </Show>
                    <button on:click=on_logout class="btn btn-outline btn-error btn-sm w-full gap-2">
                        <LogOut attr:class="h-4 w-4" /> "Logout"
                    </button>
                </div>
            </aside>

            <main class="flex-1 p-4 md:p-8 overflow-x-hidden">
                <div class="max-w-7xl mx-auto space-y-6">{children()}</div>
            </main>
        </div>
    }
}

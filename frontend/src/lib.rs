//! VitalWatch 前端应用
//!
//! 采用 Context-Driven 的架构：
//! - `web::route`: 路由定义（领域模型）
//! - `web::router`: 路由服务（核心引擎）
//! - `auth`: 会话状态管理
//! - `stores`: 病人与测量集合
//! - `components`: UI 组件层

mod api;
mod auth;
mod stores;
mod components {
    pub mod dashboard;
    mod icons;
    pub mod layout;
    pub mod login;
    mod measurement_card;
    mod measurement_form;
    pub mod measurements;
    pub mod patient_detail;
    pub mod patients;
    pub mod predictions;
    pub mod register;
    mod ui;
}

use crate::api::create_api;
use crate::auth::{AuthContext, init_auth};
use crate::components::dashboard::DashboardPage;
use crate::components::layout::Layout;
use crate::components::login::LoginPage;
use crate::components::measurements::MeasurementsPage;
use crate::components::patient_detail::PatientDetailPage;
use crate::components::patients::PatientsPage;
use crate::components::predictions::PredictionsPage;
use crate::components::register::RegisterPage;
use crate::stores::StoreContext;

use leptos::prelude::*;

// 原生 Web API 封装模块
pub(crate) mod web {
    mod dialog;
    mod http;
    pub mod route;
    pub mod router;
    mod storage;

    pub use dialog::confirm;
    pub use http::FetchTransport;
    pub use storage::LocalStorage;
}

use web::route::AppRoute;
use web::router::{Router, RouterOutlet};

/// 路由匹配函数
///
/// 受保护页面统一包在 `Layout` 中。
fn route_matcher(route: AppRoute) -> AnyView {
    match route {
        AppRoute::Login => view! { <LoginPage /> }.into_any(),
        AppRoute::Register => view! { <RegisterPage /> }.into_any(),
        AppRoute::Dashboard => view! { <Layout><DashboardPage /></Layout> }.into_any(),
        AppRoute::Patients => view! { <Layout><PatientsPage /></Layout> }.into_any(),
        AppRoute::PatientDetail(id) => {
            view! { <Layout><PatientDetailPage id=id /></Layout> }.into_any()
        }
        AppRoute::Measurements => view! { <Layout><MeasurementsPage /></Layout> }.into_any(),
        AppRoute::Predictions => view! { <Layout><PredictionsPage /></Layout> }.into_any(),
    }
}

#[component]
pub fn App() -> impl IntoView {
    // 1. 认证上下文与 API 客户端
    let auth_ctx = AuthContext::new();
    provide_context(auth_ctx);

    let api = create_api(auth_ctx);
    provide_context(StoredValue::new(api.clone()));

    // 2. 集合状态
    let stores = StoreContext::new();
    provide_context(stores);

    // 3. 从 LocalStorage 恢复会话
    init_auth(&auth_ctx, api);

    let is_authenticated = auth_ctx.is_authenticated_signal();

    // 会话结束（注销或凭据失效）时清空集合
    Effect::new(move |_| {
        if !is_authenticated.get() {
            stores.reset();
        }
    });

    view! {
        <Router is_authenticated=is_authenticated>
            <RouterOutlet matcher=route_matcher />
        </Router>
    }
}

//! 认证模块
//!
//! 管理会话状态，与路由系统解耦。
//! 路由服务通过注入的认证信号来检查认证状态。

use crate::api::HealthApi;
use crate::web::LocalStorage;
use leptos::prelude::*;
use leptos::task::spawn_local;
use vitalwatch_shared::forms::{LoginForm, RegisterForm};
use vitalwatch_shared::session::{SessionState, SessionStore};
use vitalwatch_shared::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, User, log_info, log_warn};

/// 认证状态
#[derive(Clone, Default)]
pub struct AuthState {
    pub session: SessionState,
    /// 启动时正在拉取用户信息
    pub is_loading: bool,
}

/// 认证上下文
///
/// 包含读写信号，通过 Context 在组件间共享。
#[derive(Clone, Copy)]
pub struct AuthContext {
    pub state: ReadSignal<AuthState>,
    pub set_state: WriteSignal<AuthState>,
}

impl AuthContext {
    pub fn new() -> Self {
        let (state, set_state) = signal(AuthState::default());
        Self { state, set_state }
    }

    /// 获取认证状态信号（用于路由服务注入）
    pub fn is_authenticated_signal(&self) -> Signal<bool> {
        let state = self.state;
        Signal::derive(move || state.with(|s| s.session.is_authenticated()))
    }

    /// 启动时是否仍在恢复用户信息
    pub fn is_loading_signal(&self) -> Signal<bool> {
        let state = self.state;
        Signal::derive(move || state.with(|s| s.is_loading))
    }

    pub fn user_signal(&self) -> Signal<Option<User>> {
        let state = self.state;
        Signal::derive(move || state.with(|s| s.session.user.clone()))
    }
}

impl Default for AuthContext {
    fn default() -> Self {
        Self::new()
    }
}

/// 从 Context 获取认证上下文
pub fn use_auth() -> AuthContext {
    use_context::<AuthContext>().expect("AuthContext should be provided")
}

// =========================================================
// BrowserSession
// =========================================================

/// LocalStorage + 信号镜像的会话实现
///
/// access 凭据和用户信息镜像在 `AuthContext` 中驱动界面；
/// refresh 凭据只存在 LocalStorage 中。
#[derive(Clone, Copy)]
pub struct BrowserSession {
    ctx: AuthContext,
}

impl BrowserSession {
    pub fn new(ctx: AuthContext) -> Self {
        Self { ctx }
    }
}

impl SessionStore for BrowserSession {
    fn access_token(&self) -> Option<String> {
        self.ctx.state.with_untracked(|s| s.session.access.clone())
    }

    fn refresh_token(&self) -> Option<String> {
        LocalStorage::get(REFRESH_TOKEN_KEY)
    }

    fn set_access_token(&self, token: &str) {
        LocalStorage::set(ACCESS_TOKEN_KEY, token);
        self.ctx
            .set_state
            .update(|s| s.session.access = Some(token.to_string()));
    }

    fn set_refresh_token(&self, token: &str) {
        LocalStorage::set(REFRESH_TOKEN_KEY, token);
    }

    fn user(&self) -> Option<User> {
        self.ctx.state.with_untracked(|s| s.session.user.clone())
    }

    fn set_user(&self, user: Option<User>) {
        self.ctx.set_state.update(|s| s.session.user = user);
    }

    fn clear(&self) {
        LocalStorage::remove_all(&[ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY]);
        self.ctx.set_state.update(|s| {
            s.session = SessionState::default();
            s.is_loading = false;
        });
    }
}

// =========================================================
// 会话操作
// =========================================================

/// 初始化认证状态
///
/// 从 LocalStorage 恢复 access 凭据；存在时在后台拉取用户信息。
pub fn init_auth(ctx: &AuthContext, api: HealthApi) {
    let Some(access) = LocalStorage::get(ACCESS_TOKEN_KEY) else {
        return;
    };

    ctx.set_state.update(|state| {
        state.session.access = Some(access);
        state.is_loading = true;
    });

    let set_state = ctx.set_state;
    spawn_local(async move {
        match api.profile().await {
            Ok(user) => log_info!("[Auth] session restored for {}", user.username),
            // 凭据失效时客户端已清空会话，路由守卫会跳转到登录页
            Err(e) => log_warn!("[Auth] failed to restore profile: {}", e),
        }
        set_state.update(|state| state.is_loading = false);
    });
}

/// 拉取用户信息；失败时只保留用户名
async fn load_profile(api: &HealthApi, username: &str) {
    if let Err(e) = api.profile().await {
        log_warn!("[Auth] profile fetch after sign-in failed: {}", e);
        api.session().set_user(Some(User::from_username(username)));
    }
}

/// 登录并载入用户信息
pub async fn login(api: &HealthApi, form: &LoginForm) -> Result<(), String> {
    let request = form.to_request().map_err(|e| e.to_string())?;
    api.login(&request)
        .await
        .map_err(|e| e.user_message("Login failed. Please check your credentials."))?;
    load_profile(api, &request.username).await;
    Ok(())
}

/// 注册；成功后与登录相同
pub async fn register(api: &HealthApi, form: &RegisterForm) -> Result<(), String> {
    let request = form.to_request().map_err(|e| e.to_string())?;
    api.register(&request)
        .await
        .map_err(|e| e.user_message("Registration failed. Please try again."))?;
    load_profile(api, &request.username).await;
    Ok(())
}

/// 注销并清除状态
///
/// 导航由路由服务的认证状态监听自动处理。
pub fn logout(api: &HealthApi) {
    api.logout();
}

//! 路由定义模块 - 领域模型
//!
//! 纯业务逻辑，不依赖 DOM 或 web_sys。

use std::fmt::Display;
use vitalwatch_shared::PatientId;

/// 应用路由枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppRoute {
    Login,
    Register,
    /// `/`、未知路径都落到这里
    #[default]
    Dashboard,
    Patients,
    PatientDetail(PatientId),
    Measurements,
    Predictions,
}

impl AppRoute {
    /// 将 URL path 解析为路由枚举
    pub fn from_path(path: &str) -> Self {
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "/login" => Self::Login,
            "/register" => Self::Register,
            "/dashboard" => Self::Dashboard,
            "/patients" => Self::Patients,
            "/measurements" => Self::Measurements,
            "/predictions" => Self::Predictions,
            _ => trimmed
                .strip_prefix("/patients/")
                .and_then(|id| id.parse::<PatientId>().ok())
                .map(Self::PatientDetail)
                .unwrap_or_default(),
        }
    }

    /// 获取路由对应的 URL path
    pub fn to_path(&self) -> String {
        match self {
            Self::Login => "/login".to_string(),
            Self::Register => "/register".to_string(),
            Self::Dashboard => "/dashboard".to_string(),
            Self::Patients => "/patients".to_string(),
            Self::PatientDetail(id) => format!("/patients/{}", id),
            Self::Measurements => "/measurements".to_string(),
            Self::Predictions => "/predictions".to_string(),
        }
    }

    /// **核心守卫逻辑：定义该路由是否需要认证**
    pub fn requires_auth(&self) -> bool {
        !matches!(self, Self::Login | Self::Register)
    }

    /// 已认证用户访问登录/注册页时离开
    pub fn should_redirect_when_authenticated(&self) -> bool {
        matches!(self, Self::Login | Self::Register)
    }

    pub fn auth_failure_redirect() -> Self {
        Self::Login
    }

    pub fn auth_success_redirect() -> Self {
        Self::Dashboard
    }

    /// 守卫：根据认证状态给出实际应进入的路由
    pub fn guard(self, is_authenticated: bool) -> Self {
        if self.requires_auth() && !is_authenticated {
            return Self::auth_failure_redirect();
        }
        if self.should_redirect_when_authenticated() && is_authenticated {
            return Self::auth_success_redirect();
        }
        self
    }

    /// 认证状态变化后需要离开当前路由时返回目标；已在目标上时为 `None`
    pub fn redirect_after_auth_change(self, is_authenticated: bool) -> Option<Self> {
        let target = self.guard(is_authenticated);
        (target != self).then_some(target)
    }

    /// 侧边栏高亮：病人详情归入病人列表
    pub fn nav_section(&self) -> Self {
        match self {
            Self::PatientDetail(_) => Self::Patients,
            other => *other,
        }
    }
}

impl Display for AppRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path() {
        assert_eq!(AppRoute::from_path("/login"), AppRoute::Login);
        assert_eq!(AppRoute::from_path("/register/"), AppRoute::Register);
        assert_eq!(AppRoute::from_path("/patients"), AppRoute::Patients);
        assert_eq!(AppRoute::from_path("/patients/42"), AppRoute::PatientDetail(42));
        assert_eq!(AppRoute::from_path("/predictions"), AppRoute::Predictions);
    }

    #[test]
    fn test_unknown_paths_fall_back_to_dashboard() {
        assert_eq!(AppRoute::from_path("/"), AppRoute::Dashboard);
        assert_eq!(AppRoute::from_path(""), AppRoute::Dashboard);
        assert_eq!(AppRoute::from_path("/settings"), AppRoute::Dashboard);
        assert_eq!(AppRoute::from_path("/patients/abc"), AppRoute::Dashboard);
    }

    #[test]
    fn test_round_trip_paths() {
        let route = AppRoute::PatientDetail(7);
        assert_eq!(route.to_path(), "/patients/7");
        assert_eq!(AppRoute::from_path(&route.to_path()), route);
    }

    #[test]
    fn test_guard_flags() {
        assert!(!AppRoute::Login.requires_auth());
        assert!(!AppRoute::Register.requires_auth());
        assert!(AppRoute::Dashboard.requires_auth());
        assert!(AppRoute::PatientDetail(1).requires_auth());
        assert!(AppRoute::Register.should_redirect_when_authenticated());
        assert!(!AppRoute::Measurements.should_redirect_when_authenticated());
        assert_eq!(AppRoute::PatientDetail(3).nav_section(), AppRoute::Patients);
    }

    #[test]
    fn test_guard() {
        assert_eq!(AppRoute::Patients.guard(false), AppRoute::Login);
        assert_eq!(AppRoute::PatientDetail(2).guard(true), AppRoute::PatientDetail(2));
        assert_eq!(AppRoute::Login.guard(true), AppRoute::Dashboard);
        assert_eq!(AppRoute::Register.guard(false), AppRoute::Register);
    }

    #[test]
    fn test_sign_in_redirects_exactly_once() {
        // 登录成功：离开登录页，落地后不再跳转
        let landed = AppRoute::Login.redirect_after_auth_change(true);
        assert_eq!(landed, Some(AppRoute::Dashboard));
        assert_eq!(AppRoute::Dashboard.redirect_after_auth_change(true), None);

        // 会话过期：受保护页面跳回登录页
        assert_eq!(
            AppRoute::PatientDetail(4).redirect_after_auth_change(false),
            Some(AppRoute::Login)
        );
        assert_eq!(AppRoute::Register.redirect_after_auth_change(false), None);
    }
}

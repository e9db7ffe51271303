use crate::{TokenPair, User};
use std::cell::RefCell;

/// 会话凭据存储
///
/// 浏览器端写入 LocalStorage，测试中使用 [`MemorySession`]。
/// 认证状态只看 access 凭据是否存在，不校验过期和签名。
pub trait SessionStore {
    fn access_token(&self) -> Option<String>;
    fn refresh_token(&self) -> Option<String>;
    fn set_access_token(&self, token: &str);
    fn set_refresh_token(&self, token: &str);
    fn user(&self) -> Option<User>;
    fn set_user(&self, user: Option<User>);
    /// 清空所有凭据和用户信息
    fn clear(&self);

    fn set_tokens(&self, tokens: &TokenPair) {
        self.set_access_token(&tokens.access);
        self.set_refresh_token(&tokens.refresh);
    }

    fn is_authenticated(&self) -> bool {
        self.access_token().is_some()
    }
}

/// 内存中的会话镜像
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub access: Option<String>,
    pub user: Option<User>,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        self.access.is_some()
    }
}

// =========================================================
// MemorySession
// =========================================================

#[derive(Debug, Default)]
pub struct MemorySession {
    state: RefCell<SessionState>,
    refresh: RefCell<Option<String>>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tokens(access: &str, refresh: &str) -> Self {
        let session = Self::new();
        session.set_tokens(&TokenPair {
            access: access.to_string(),
            refresh: refresh.to_string(),
        });
        session
    }

    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }
}

impl SessionStore for MemorySession {
    fn access_token(&self) -> Option<String> {
        self.state.borrow().access.clone()
    }

    fn refresh_token(&self) -> Option<String> {
        self.refresh.borrow().clone()
    }

    fn set_access_token(&self, token: &str) {
        self.state.borrow_mut().access = Some(token.to_string());
    }

    fn set_refresh_token(&self, token: &str) {
        *self.refresh.borrow_mut() = Some(token.to_string());
    }

    fn user(&self) -> Option<User> {
        self.state.borrow().user.clone()
    }

    fn set_user(&self, user: Option<User>) {
        self.state.borrow_mut().user = user;
    }

    fn clear(&self) {
        *self.state.borrow_mut() = SessionState::default();
        *self.refresh.borrow_mut() = None;
    }
}

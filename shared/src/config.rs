//! 客户端配置

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";

/// 运行时覆盖 API 地址的 LocalStorage 键
pub const API_URL_STORAGE_KEY: &str = "vitalwatch_api_url";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
        }
    }

    /// 编译期环境变量 `VITALWATCH_API_URL`，缺省为本地开发地址
    pub fn from_build_env() -> Self {
        match option_env!("VITALWATCH_API_URL") {
            Some(url) if !url.trim().is_empty() => Self::new(url),
            _ => Self::default(),
        }
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

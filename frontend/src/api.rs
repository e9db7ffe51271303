use crate::auth::{AuthContext, BrowserSession};
use crate::web::{FetchTransport, LocalStorage};
use leptos::prelude::*;
use vitalwatch_shared::client::ApiClient;
use vitalwatch_shared::config::{API_URL_STORAGE_KEY, ClientConfig};

/// 浏览器端的 API 客户端
pub type HealthApi = ApiClient<FetchTransport, BrowserSession>;

/// 创建客户端：LocalStorage 中的地址优先，其次是编译期配置
pub fn create_api(auth: AuthContext) -> HealthApi {
    let config = match LocalStorage::get(API_URL_STORAGE_KEY) {
        Some(url) if !url.trim().is_empty() => ClientConfig::new(&url),
        _ => ClientConfig::from_build_env(),
    };
    ApiClient::new(config, FetchTransport, BrowserSession::new(auth))
}

/// 从 Context 获取 API 客户端
pub fn use_api() -> StoredValue<HealthApi> {
    use_context::<StoredValue<HealthApi>>().expect("HealthApi should be provided")
}

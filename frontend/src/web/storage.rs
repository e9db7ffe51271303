//! LocalStorage 封装模块
//!
//! 存储不可用（隐私模式、非浏览器环境）时读取返回 `None`，写入静默失败。

pub struct LocalStorage;

impl LocalStorage {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok()?
    }

    pub fn get(key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok()?
    }

    /// 写入值，返回是否成功
    pub fn set(key: &str, value: &str) -> bool {
        Self::storage()
            .and_then(|s| s.set_item(key, value).ok())
            .is_some()
    }

    /// 删除一组键
    pub fn remove_all(keys: &[&str]) {
        if let Some(storage) = Self::storage() {
            for key in keys {
                let _ = storage.remove_item(key);
            }
        }
    }
}

//! LocalStorage 封装模块
//!
//! 使用 `web_sys::Storage` 提供简洁的本地存储接口，
//! 并在其上实现会话凭据对的持久化适配器。

use crate::session::{CredentialStorage, StoredCredentials};

/// 持久化键：承载凭据的 bearer token
const STORAGE_TOKEN_KEY: &str = "token";
/// 持久化键：展示身份用的邮箱
const STORAGE_EMAIL_KEY: &str = "user_email";

/// 本地存储操作封装
///
/// 提供静态方法访问浏览器 LocalStorage API。
pub struct LocalStorage;

impl LocalStorage {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok()?
    }

    /// 获取存储的字符串值；键不存在或发生错误时返回 None
    pub fn get(key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok()?
    }

    /// 设置存储值，返回操作是否成功
    pub fn set(key: &str, value: &str) -> bool {
        Self::storage()
            .and_then(|s| s.set_item(key, value).ok())
            .is_some()
    }

    /// 删除存储的键值对，返回操作是否成功
    pub fn delete(key: &str) -> bool {
        Self::storage()
            .and_then(|s| s.remove_item(key).ok())
            .is_some()
    }
}

/// 基于 LocalStorage 的凭据持久化
///
/// token 与 user_email 两个键总是成对写入、成对清除，
/// 不存在只剩其一的中间状态（`load` 对半残数据按不存在处理）。
pub struct BrowserCredentialStorage;

impl CredentialStorage for BrowserCredentialStorage {
    fn load(&self) -> Option<StoredCredentials> {
        let token = LocalStorage::get(STORAGE_TOKEN_KEY)?;
        let email = LocalStorage::get(STORAGE_EMAIL_KEY)?;
        Some(StoredCredentials { token, email })
    }

    fn save(&self, credentials: &StoredCredentials) {
        LocalStorage::set(STORAGE_TOKEN_KEY, &credentials.token);
        LocalStorage::set(STORAGE_EMAIL_KEY, &credentials.email);
    }

    fn clear(&self) {
        LocalStorage::delete(STORAGE_TOKEN_KEY);
        LocalStorage::delete(STORAGE_EMAIL_KEY);
    }
}

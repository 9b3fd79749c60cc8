use chrono::Utc;
use serde_json::json;

use crate::backend::{BoxError, Collections, Functions};
use crate::common::UserProfile;
use crate::storage::{CacheDatabase, CachedSession};

/// Phiên đăng nhập hiện tại: openid + hồ sơ hiển thị.
///
/// Thay cho global app state của bản gốc: tạo tường minh khi login,
/// truyền cho thành phần nào cần danh tính, xóa cache khi logout.
#[derive(Debug, Clone)]
pub struct Session {
    pub openid: String,
    pub profile: UserProfile,
}

impl Session {
    /// Đăng nhập: lấy openid từ cloud function, lưu hồ sơ vào collection
    /// `users` (upsert) và cache phiên xuống đĩa.
    pub async fn login(
        functions: &Functions,
        collections: &Collections,
        profile: UserProfile,
        cache: &CacheDatabase,
    ) -> Result<Self, BoxError> {
        let openid = functions.get_openid().await?;

        let patch = json!({
            "nickName": profile.nick_name,
            "avatarUrl": profile.avatar_url,
        });
        let filter = json!({ "_openid": openid });
        let updated = collections.update("users", &filter, &patch).await?;
        if updated == 0 {
            let doc = json!({
                "_openid": openid,
                "nickName": profile.nick_name,
                "avatarUrl": profile.avatar_url,
            });
            collections.add("users", &doc).await?;
        }

        cache.save_session(&CachedSession {
            openid: openid.clone(),
            nick_name: profile.nick_name.clone(),
            avatar_url: profile.avatar_url.clone(),
            logged_in_at: Utc::now().timestamp(),
        })?;

        log::info!("Logged in as {openid}");
        Ok(Self { openid, profile })
    }

    /// Khôi phục phiên từ cache cục bộ, nếu đã login trước đó.
    pub fn restore(cache: &CacheDatabase) -> Result<Option<Self>, BoxError> {
        let Some(cached) = cache.load_session()? else {
            return Ok(None);
        };
        Ok(Some(Self {
            openid: cached.openid,
            profile: UserProfile {
                nick_name: cached.nick_name,
                avatar_url: cached.avatar_url,
            },
        }))
    }

    /// Đăng xuất: chỉ xóa cache cục bộ, dữ liệu trên backend giữ nguyên.
    pub fn logout(cache: &CacheDatabase) -> Result<(), BoxError> {
        cache.clear_session()?;
        log::info!("Session cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::CacheDatabase;

    #[test]
    fn restore_without_login_is_none() {
        let cache = CacheDatabase::in_memory().unwrap();
        assert!(Session::restore(&cache).unwrap().is_none());
    }

    #[test]
    fn restore_reads_back_the_cached_profile() {
        let cache = CacheDatabase::in_memory().unwrap();
        cache
            .save_session(&CachedSession {
                openid: "oid-9".to_string(),
                nick_name: "Minh".to_string(),
                avatar_url: "https://example.com/m.png".to_string(),
                logged_in_at: 1,
            })
            .unwrap();

        let session = Session::restore(&cache).unwrap().unwrap();
        assert_eq!(session.openid, "oid-9");
        assert_eq!(session.profile.nick_name, "Minh");
    }

    #[test]
    fn logout_clears_the_cached_row() {
        let cache = CacheDatabase::in_memory().unwrap();
        cache
            .save_session(&CachedSession {
                openid: "oid-9".to_string(),
                nick_name: String::new(),
                avatar_url: String::new(),
                logged_in_at: 1,
            })
            .unwrap();

        Session::logout(&cache).unwrap();
        assert!(Session::restore(&cache).unwrap().is_none());
    }
}

/// Cached login session (single row, the local analog of the old
/// process-wide user globals)
#[derive(Debug, Clone)]
pub struct CachedSession {
    pub openid: String,
    pub nick_name: String,
    pub avatar_url: String,
    pub logged_in_at: i64,
}

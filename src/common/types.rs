use serde::{Deserialize, Serialize};

/// Domain model đại diện một tin nhắn chat giữa hai người dùng.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Document id do backend cấp khi insert.
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub content: String,
    /// Giờ gửi dạng chữ, chỉ dùng để hiển thị.
    #[serde(rename = "sendTime")]
    pub send_time: String,
    /// Timestamp gửi (ms) — khóa sắp xếp duy nhất của feed.
    #[serde(rename = "sendTimeTS")]
    pub send_time_ts: i64,
    pub sender: String,
    pub recipient: String,
}

/// Sách cũ đang rao bán (document trong collection `goods`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookDetail {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Openid của người đăng bán.
    #[serde(rename = "_openid", default)]
    pub seller_openid: String,
    pub name: String,
    pub isbn: String,
    /// Giá rao hiện tại; chưa có khi người bán mới tạo tin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    pub original_price: f64,
    #[serde(default)]
    pub grade: String,
    #[serde(default)]
    pub college: String,
    #[serde(default)]
    pub introduction: String,
    /// Thời điểm đăng tin (ms).
    pub post_date: i64,
    #[serde(default)]
    pub image_list: Vec<String>,
    /// 0 = đang bán, 1 = đã có người đặt.
    #[serde(default)]
    pub state: i64,
}

/// Yêu cầu giao dịch (document trong collection `trade`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeRecord {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub goods_id: String,
    /// 0 = đang chờ người bán xác nhận.
    pub state: i64,
    pub trade_price: f64,
    pub trade_time: String,
    #[serde(default)]
    pub trade_spot: String,
    pub original_price: f64,
    pub seller_openid: String,
    #[serde(default)]
    pub grade: String,
    #[serde(default)]
    pub college: String,
    pub name: String,
    pub isbn: String,
    #[serde(default)]
    pub image_list: Vec<String>,
}

/// Một dòng trong giỏ (collection `cart`), chỉ trỏ tới goods.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "_openid", default)]
    pub owner_openid: String,
    pub goods_id: String,
}

/// Hồ sơ hiển thị của người dùng (nickname + avatar).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(rename = "nickName")]
    pub nick_name: String,
    #[serde(rename = "avatarUrl")]
    pub avatar_url: String,
}

/// Document trong collection `users`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(rename = "_openid")]
    pub openid: String,
    #[serde(rename = "nickName", default)]
    pub nick_name: String,
    #[serde(rename = "avatarUrl", default)]
    pub avatar_url: String,
}

/// Quan hệ chat giữa hai người dùng (collection `relationship`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relationship {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub user1: String,
    pub user2: String,
    #[serde(default)]
    pub last_content: String,
    pub last_conversation_time: i64,
}

/// Thông tin sách trả về từ cloud function `getBookInfo`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookInfo {
    pub isbn: String,
    pub name: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub publisher: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

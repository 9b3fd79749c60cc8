use crate::common::types::ChatMessage;
use crate::feed::FeedEvent;

/// Sự kiện từ tầng backend gửi lên UI.
#[derive(Debug, Clone)]
pub enum BackendEvent {
    /// Subscription chatroom giao một đợt dữ liệu (snapshot hoặc thay đổi).
    Feed(FeedEvent),
    /// Tin nhắn của mình đã ghi thành công vào collection.
    MessageSent(ChatMessage),
    /// Gửi tin thất bại (backend từ chối hoặc mất kết nối).
    SendFailed(String),
}

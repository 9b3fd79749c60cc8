use crate::common::ChatMessage;

/// Một đợt dữ liệu do subscription chatroom giao xuống.
///
/// Lần giao đầu tiên luôn là `Snapshot` (toàn bộ lịch sử hội thoại tại thời
/// điểm đăng ký); các lần sau là `ChangeBatch` chứa các thay đổi lẻ.
#[derive(Debug, Clone)]
pub enum FeedEvent {
    Snapshot { messages: Vec<ChatMessage> },
    ChangeBatch { changes: Vec<ChangeRecord> },
}

/// Một thay đổi lẻ trong `ChangeBatch`.
#[derive(Debug, Clone)]
pub struct ChangeRecord {
    pub kind: ChangeKind,
    pub doc: ChatMessage,
}

/// Loại thay đổi mà backend gắn cho từng record (trường `queueType`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// Record mới đi vào danh sách đang theo dõi.
    Enqueue,
    /// Nội dung record trong danh sách thay đổi.
    Update,
    /// Record rời khỏi danh sách.
    Dequeue,
    /// Tag lạ từ backend; bỏ qua.
    Other,
}

/// Gộp một đợt dữ liệu vào feed hiện tại, trả về feed mới đã sắp xếp.
///
/// - `Snapshot`: nối toàn bộ messages vào feed rồi sắp xếp lại. Chỉ đúng khi
///   feed còn rỗng lúc đăng ký subscription — caller phải đảm bảo.
/// - `ChangeBatch`: chỉ xử lý `Enqueue` (thêm tin mới); `Update` và `Dequeue`
///   cố ý không đụng tới feed, giữ nguyên hành vi của trang chatroom gốc.
///
/// Sắp xếp duy nhất theo `send_time_ts`, tăng dần; sort ổn định nên hai tin
/// cùng timestamp giữ thứ tự đến. Không khử trùng lặp: cùng một tin được giao
/// hai lần (snapshot + enqueue, hoặc qua reconnect) sẽ nằm hai lần trong feed.
pub fn reconcile(current: &[ChatMessage], event: &FeedEvent) -> Vec<ChatMessage> {
    let mut next = current.to_vec();

    match event {
        FeedEvent::Snapshot { messages } => {
            next.extend(messages.iter().cloned());
        }
        FeedEvent::ChangeBatch { changes } => {
            for change in changes {
                if change.kind == ChangeKind::Enqueue {
                    next.push(change.doc.clone());
                }
            }
        }
    }

    next.sort_by_key(|message| message.send_time_ts);
    next
}

/// Feed của một phiên chat: danh sách tin nhắn đã gộp, thuộc về đúng một
/// trang chat và bị hủy cùng trang đó.
#[derive(Debug, Default)]
pub struct MessageFeed {
    messages: Vec<ChatMessage>,
}

impl MessageFeed {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
        }
    }

    pub fn apply(&mut self, event: &FeedEvent) {
        self.messages = reconcile(&self.messages, event);
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

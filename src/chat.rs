use chrono::Local;
use serde_json::{Value, json};

use crate::backend::{BoxError, Collections};
use crate::common::{ChatMessage, Relationship, UserRecord};
use crate::feed::{FeedEvent, MessageFeed};

/// Filter chọn mọi tin nhắn giữa hai openid, bất kể chiều gửi.
pub fn conversation_filter(openid: &str, peer: &str) -> Value {
    json!({
        "$or": [
            { "sender": openid, "recipient": peer },
            { "sender": peer, "recipient": openid },
        ]
    })
}

/// Filter chọn document quan hệ của một cặp người dùng (hai chiều).
pub fn relationship_filter(openid: &str, peer: &str) -> Value {
    json!({
        "$or": [
            { "user1": openid, "user2": peer },
            { "user1": peer, "user2": openid },
        ]
    })
}

/// Dựng document tin nhắn gửi đi: `send_time` để hiển thị,
/// `send_time_ts` (ms) làm khóa sắp xếp.
pub fn build_message(sender: &str, recipient: &str, content: &str) -> ChatMessage {
    let now = Local::now();
    ChatMessage {
        id: None,
        content: content.to_string(),
        send_time: now.format("%Y/%-m/%-d %H:%M:%S").to_string(),
        send_time_ts: now.timestamp_millis(),
        sender: sender.to_string(),
        recipient: recipient.to_string(),
    }
}

/// Trạng thái một phiên chat hai người: feed đã gộp, avatar hai bên và
/// quan hệ hội thoại. Sống cùng trang chat, hủy cùng trang chat.
pub struct ChatSession {
    openid: String,
    peer_openid: String,
    feed: MessageFeed,
    /// Avatar của đối phương (hiện bên trái).
    pub peer_avatar: String,
    /// Avatar của mình (hiện bên phải).
    pub own_avatar: String,
    pub relationship: Option<Relationship>,
}

impl ChatSession {
    pub fn new(openid: &str, peer_openid: &str) -> Self {
        Self {
            openid: openid.to_string(),
            peer_openid: peer_openid.to_string(),
            feed: MessageFeed::new(),
            peer_avatar: String::new(),
            own_avatar: String::new(),
            relationship: None,
        }
    }

    pub fn openid(&self) -> &str {
        &self.openid
    }

    pub fn peer_openid(&self) -> &str {
        &self.peer_openid
    }

    /// Chuẩn bị phiên chat: đảm bảo đã có document quan hệ và lấy avatar
    /// hai bên. Gọi một lần trước khi bắt đầu nhận sự kiện.
    pub async fn open(&mut self, collections: &Collections) -> Result<(), BoxError> {
        self.ensure_relationship(collections).await?;
        self.fetch_avatars(collections).await?;
        Ok(())
    }

    /// Nếu cặp này chưa từng chat với nhau thì tạo document quan hệ mới.
    async fn ensure_relationship(&mut self, collections: &Collections) -> Result<(), BoxError> {
        let filter = relationship_filter(&self.openid, &self.peer_openid);
        let existing: Vec<Relationship> = collections.get("relationship", &filter).await?;

        if let Some(relationship) = existing.into_iter().next() {
            self.relationship = Some(relationship);
            return Ok(());
        }

        let fresh = Relationship {
            id: None,
            user1: self.openid.clone(),
            user2: self.peer_openid.clone(),
            last_content: String::new(),
            last_conversation_time: Local::now().timestamp_millis(),
        };
        collections
            .add("relationship", &serde_json::to_value(&fresh)?)
            .await?;
        self.relationship = Some(fresh);
        Ok(())
    }

    async fn fetch_avatars(&mut self, collections: &Collections) -> Result<(), BoxError> {
        let peers: Vec<UserRecord> = collections
            .get("users", &json!({ "_openid": self.peer_openid }))
            .await?;
        let peer = peers
            .into_iter()
            .next()
            .ok_or_else(|| format!("user `{}` does not exist", self.peer_openid))?;
        self.peer_avatar = peer.avatar_url;

        let own: Vec<UserRecord> = collections
            .get("users", &json!({ "_openid": self.openid }))
            .await?;
        if let Some(own) = own.into_iter().next() {
            self.own_avatar = own.avatar_url;
        }
        Ok(())
    }

    /// Gộp một đợt dữ liệu subscription vào feed. Việc render lại và cuộn
    /// xuống cuối trang là chuyện của caller.
    pub fn apply_event(&mut self, event: &FeedEvent) {
        self.feed.apply(event);
    }

    pub fn feed(&self) -> &[ChatMessage] {
        self.feed.messages()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::{ChangeKind, ChangeRecord};

    #[test]
    fn outgoing_message_carries_both_timestamps() {
        let message = build_message("me", "you", "hello");

        assert_eq!(message.sender, "me");
        assert_eq!(message.recipient, "you");
        assert_eq!(message.content, "hello");
        assert!(message.send_time_ts > 0);
        assert!(!message.send_time.is_empty());
        assert!(message.id.is_none());
    }

    #[test]
    fn conversation_filter_covers_both_directions() {
        let filter = conversation_filter("a", "b");
        let arms = filter["$or"].as_array().unwrap();

        assert_eq!(arms.len(), 2);
        assert_eq!(arms[0]["sender"], "a");
        assert_eq!(arms[0]["recipient"], "b");
        assert_eq!(arms[1]["sender"], "b");
        assert_eq!(arms[1]["recipient"], "a");
    }

    #[test]
    fn relationship_filter_covers_both_orderings() {
        let filter = relationship_filter("a", "b");
        let arms = filter["$or"].as_array().unwrap();

        assert_eq!(arms[0]["user1"], "a");
        assert_eq!(arms[1]["user1"], "b");
    }

    #[test]
    fn session_feed_starts_empty_and_tracks_events() {
        let mut session = ChatSession::new("me", "you");
        assert!(session.feed().is_empty());

        let mine = build_message("me", "you", "first");
        session.apply_event(&FeedEvent::Snapshot {
            messages: vec![mine],
        });
        session.apply_event(&FeedEvent::ChangeBatch {
            changes: vec![ChangeRecord {
                kind: ChangeKind::Enqueue,
                doc: build_message("you", "me", "reply"),
            }],
        });

        assert_eq!(session.feed().len(), 2);
        assert_eq!(session.feed()[0].content, "first");
        assert_eq!(session.feed()[1].content, "reply");
    }
}

use serde::Deserialize;

use crate::common::ChatMessage;
use crate::feed::{ChangeKind, ChangeRecord, FeedEvent};

/// Payload thô backend trả về cho một lần long-poll watch.
///
/// Lần giao đầu tiên có `type: "init"` kèm `docs` (toàn bộ lịch sử);
/// các lần sau chỉ có `docChanges` với `queueType` cho từng record.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchDelivery {
    /// Cursor để resume lần poll kế tiếp.
    #[serde(default)]
    pub id: u64,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub docs: Vec<ChatMessage>,
    #[serde(default)]
    pub doc_changes: Vec<DocChange>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocChange {
    pub queue_type: String,
    pub doc: ChatMessage,
}

/// Map tag `queueType` của backend sang `ChangeKind`; tag lạ thành `Other`.
fn change_kind(tag: &str) -> ChangeKind {
    match tag {
        "enqueue" => ChangeKind::Enqueue,
        "update" => ChangeKind::Update,
        "dequeue" => ChangeKind::Dequeue,
        _ => ChangeKind::Other,
    }
}

impl WatchDelivery {
    pub fn is_init(&self) -> bool {
        self.kind.as_deref() == Some("init")
    }

    /// Đổi payload thô thành sự kiện cho feed reconciler.
    pub fn into_feed_event(self) -> FeedEvent {
        if self.is_init() {
            FeedEvent::Snapshot {
                messages: self.docs,
            }
        } else {
            FeedEvent::ChangeBatch {
                changes: self
                    .doc_changes
                    .into_iter()
                    .map(|change| ChangeRecord {
                        kind: change_kind(&change.queue_type),
                        doc: change.doc,
                    })
                    .collect(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::ChangeKind;

    #[test]
    fn init_delivery_becomes_snapshot() {
        let raw = r#"{
            "id": 1,
            "type": "init",
            "docs": [
                {"content": "hi", "sendTime": "2026/8/29 10:00:00", "sendTimeTS": 100,
                 "sender": "a", "recipient": "b"}
            ]
        }"#;

        let delivery: WatchDelivery = serde_json::from_str(raw).unwrap();
        assert!(delivery.is_init());

        match delivery.into_feed_event() {
            FeedEvent::Snapshot { messages } => {
                assert_eq!(messages.len(), 1);
                assert_eq!(messages[0].send_time_ts, 100);
            }
            other => panic!("expected snapshot, got {other:?}"),
        }
    }

    #[test]
    fn doc_changes_become_change_batch() {
        let raw = r#"{
            "id": 7,
            "docChanges": [
                {"queueType": "enqueue",
                 "doc": {"content": "new", "sendTime": "t", "sendTimeTS": 200,
                         "sender": "a", "recipient": "b"}},
                {"queueType": "dequeue",
                 "doc": {"content": "old", "sendTime": "t", "sendTimeTS": 50,
                         "sender": "b", "recipient": "a"}}
            ]
        }"#;

        let delivery: WatchDelivery = serde_json::from_str(raw).unwrap();
        assert_eq!(delivery.id, 7);

        match delivery.into_feed_event() {
            FeedEvent::ChangeBatch { changes } => {
                assert_eq!(changes.len(), 2);
                assert_eq!(changes[0].kind, ChangeKind::Enqueue);
                assert_eq!(changes[1].kind, ChangeKind::Dequeue);
            }
            other => panic!("expected change batch, got {other:?}"),
        }
    }

    #[test]
    fn unknown_queue_type_maps_to_other() {
        let raw = r#"{
            "docChanges": [
                {"queueType": "remove",
                 "doc": {"content": "x", "sendTime": "t", "sendTimeTS": 1,
                         "sender": "a", "recipient": "b"}}
            ]
        }"#;

        let delivery: WatchDelivery = serde_json::from_str(raw).unwrap();
        match delivery.into_feed_event() {
            FeedEvent::ChangeBatch { changes } => {
                assert_eq!(changes[0].kind, ChangeKind::Other);
            }
            other => panic!("expected change batch, got {other:?}"),
        }
    }

    #[test]
    fn empty_delivery_is_an_empty_batch() {
        let delivery: WatchDelivery = serde_json::from_str("{}").unwrap();
        match delivery.into_feed_event() {
            FeedEvent::ChangeBatch { changes } => assert!(changes.is_empty()),
            other => panic!("expected change batch, got {other:?}"),
        }
    }
}

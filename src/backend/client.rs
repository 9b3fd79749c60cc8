use std::time::Duration;

use serde_json::json;
use tokio::sync::mpsc;

use crate::chat;
use crate::common::{BackendEvent, ClientCommand};

use super::BoxError;
use super::collections::Collections;

/// Vòng lặp sự kiện của một phiên chat: long-poll subscription chatroom và
/// nhận lệnh từ UI qua channel, đẩy `BackendEvent` ngược lên.
pub struct BackendClient {
    event_sender: mpsc::Sender<BackendEvent>,
    command_receiver: mpsc::Receiver<ClientCommand>,
    collections: Collections,
    openid: String,
    peer_openid: String,
}

impl BackendClient {
    pub fn new(
        event_sender: mpsc::Sender<BackendEvent>,
        command_receiver: mpsc::Receiver<ClientCommand>,
        collections: Collections,
        openid: String,
        peer_openid: String,
    ) -> Self {
        Self {
            event_sender,
            command_receiver,
            collections,
            openid,
            peer_openid,
        }
    }

    pub async fn run(mut self) -> Result<(), BoxError> {
        let collections = self.collections.clone();
        let filter = chat::conversation_filter(&self.openid, &self.peer_openid);
        let mut cursor = 0u64;

        log::info!(
            "Chat event loop started for conversation {} <-> {}",
            self.openid,
            self.peer_openid
        );

        loop {
            tokio::select! {
                command = self.command_receiver.recv() => {
                    if let Some(command) = command {
                        self.handle_command(command, &collections).await;
                    } else {
                        break;
                    }
                }
                delivery = collections.watch("chatroom", &filter, cursor) => {
                    match delivery {
                        Ok(delivery) => {
                            cursor = cursor.max(delivery.id);
                            let event = BackendEvent::Feed(delivery.into_feed_event());
                            if self.event_sender.send(event).await.is_err() {
                                // UI đã đóng, không còn ai nhận.
                                break;
                            }
                        }
                        Err(err) => {
                            log::warn!("Watch poll failed: {err}");
                            tokio::time::sleep(Duration::from_secs(1)).await;
                        }
                    }
                }
            }
        }

        Ok(())
    }

    async fn handle_command(&mut self, command: ClientCommand, collections: &Collections) {
        match command {
            ClientCommand::SendMessage(content) => {
                let message = chat::build_message(&self.openid, &self.peer_openid, &content);

                let doc = match serde_json::to_value(&message) {
                    Ok(doc) => doc,
                    Err(err) => {
                        log::warn!("Failed to serialize message: {err:?}");
                        return;
                    }
                };

                match collections.add("chatroom", &doc).await {
                    Ok(_id) => {
                        // Ghi xong tin thì cập nhật quan hệ của cặp hội thoại,
                        // như trang chatroom gốc làm sau khi gửi thành công.
                        let patch = json!({
                            "last_content": message.content,
                            "last_conversation_time": message.send_time_ts,
                        });
                        let filter =
                            chat::relationship_filter(&self.openid, &self.peer_openid);
                        if let Err(err) =
                            collections.update("relationship", &filter, &patch).await
                        {
                            log::warn!("Failed to refresh relationship: {err}");
                        }

                        let _ = self
                            .event_sender
                            .send(BackendEvent::MessageSent(message))
                            .await;
                    }
                    Err(err) => {
                        log::warn!("Failed to send message: {err}");
                        let _ = self
                            .event_sender
                            .send(BackendEvent::SendFailed(err.to_string()))
                            .await;
                    }
                }
            }
        }
    }
}

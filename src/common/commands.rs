/// Lệnh UI gửi xuống tầng backend.
#[derive(Debug, Clone)]
pub enum ClientCommand {
    SendMessage(String),
}

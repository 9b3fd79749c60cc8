pub mod commands;
pub mod events;
pub mod types;

pub use commands::ClientCommand;
pub use events::BackendEvent;
pub use types::{
    BookDetail, BookInfo, CartItem, ChatMessage, Relationship, TradeRecord, UserProfile, UserRecord,
};

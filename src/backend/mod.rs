pub mod client;
pub mod collections;
pub mod functions;
pub mod subscription;

pub use client::BackendClient;
pub use collections::{AddOutcome, Collections};
pub use functions::Functions;

/// Lỗi chung ở biên backend; các tầng trên chỉ log hoặc propagate.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

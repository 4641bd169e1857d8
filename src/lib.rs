pub mod api;
pub mod app;
pub mod chat;
pub mod config;
pub mod error;
pub mod handler;
pub mod reconnect;
pub mod transcript;
pub mod tui;
pub mod ui;

// Re-export main types for convenience
pub use api::{AnalysisApi, HttpAnalysisApi};
pub use chat::{format_message, ChatClient, ChatView, Message, Role};
pub use config::{Config, QuickAction};
pub use error::ApiError;

//! Chat client core: conversation thread, connection state and the send
//! flow. Nothing in here touches the terminal.

mod client;
mod format;
mod message;
mod state;

pub use client::{
    send_error_text, ChatClient, ChatView, PendingSend, LOADING_MODEL, NO_RESPONSE,
    UNKNOWN_MODEL,
};
pub use format::{escape_html, format_message, paragraphs};
pub use message::{Entry, Message, Role, Thread};
pub use state::{ClientState, ConnectionState, Transition};

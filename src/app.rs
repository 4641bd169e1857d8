use ratatui::layout::Rect;
use tracing::debug;

use crate::api::ChatResponse;
use crate::chat::{ChatClient, PendingSend, UNKNOWN_MODEL};
use crate::config::QuickAction;
use crate::error::ApiError;
use crate::tui::{AppEvent, EventSender};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// Byte offset of character `cursor` in `input`; the end of the string once
/// the cursor runs past the last character.
fn byte_offset(input: &str, cursor: usize) -> usize {
    input
        .char_indices()
        .map(|(at, _)| at)
        .chain(std::iter::once(input.len()))
        .nth(cursor)
        .unwrap_or(input.len())
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub client: ChatClient,
    pub quick_actions: Vec<QuickAction>,

    // Input cursor, in characters
    pub input_cursor: usize,

    // Chat pane scrolling
    pub chat_scroll: u16,
    pub chat_height: u16, // Height of chat area for scroll calculations
    pub chat_width: u16,  // Width of chat area for wrap calculations
    pub follow_tail: bool,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Panel area for mouse hit-testing (updated during render)
    pub chat_area: Option<Rect>,

    events: EventSender,
}

impl App {
    pub fn new(client: ChatClient, quick_actions: Vec<QuickAction>, events: EventSender) -> Self {
        Self {
            should_quit: false,
            input_mode: InputMode::Editing,
            client,
            quick_actions,
            input_cursor: 0,
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            follow_tail: true,
            animation_frame: 0,
            chat_area: None,
            events,
        }
    }

    // Background work. Every task reports back through the event channel so
    // state is only touched from the main loop.

    /// Initial probe, then the model lookup, in that order.
    pub fn start_initialize(&mut self) {
        if !self.client.begin_probe() {
            return;
        }
        let api = self.client.api();
        let tx = self.events.clone();
        tokio::spawn(async move {
            let probe = api.probe().await;
            if tx.send(AppEvent::ProbeFinished(probe)).is_err() {
                return;
            }
            let _ = tx.send(AppEvent::ModelInfoLoaded(api.model_info().await));
        });
    }

    pub fn start_probe(&mut self) {
        if !self.client.begin_probe() {
            return;
        }
        let api = self.client.api();
        let tx = self.events.clone();
        tokio::spawn(async move {
            let _ = tx.send(AppEvent::ProbeFinished(api.probe().await));
        });
    }

    fn start_model_info(&self) {
        let api = self.client.api();
        let tx = self.events.clone();
        tokio::spawn(async move {
            let _ = tx.send(AppEvent::ModelInfoLoaded(api.model_info().await));
        });
    }

    /// Runs the chat request for `pending` on its own task. The reply event
    /// is sent even if the request task dies, so loading always ends.
    fn start_request(&mut self, pending: PendingSend) {
        let api = self.client.api();
        let tx = self.events.clone();
        let query = pending.query.clone();
        let request = tokio::spawn(async move { api.chat(&query).await });
        tokio::spawn(async move {
            let result = request.await.unwrap_or_else(|e| Err(ApiError::from(e)));
            let _ = tx.send(AppEvent::ReplyReceived { pending, result });
        });

        self.input_cursor = 0;
        self.follow_tail = true;
    }

    // Event reactions

    pub fn on_reconnect_due(&mut self) {
        if self.client.should_reconnect() {
            debug!("reconnect probe");
            self.start_probe();
        }
    }

    pub fn on_probe_finished(&mut self, result: Result<(), ApiError>) {
        let was_connected = self.client.state().is_connected();
        let connected = self.client.finish_probe(result);

        // Recovered after a failed start; the startup lookup gave up.
        if connected && !was_connected && self.client.model_label() == UNKNOWN_MODEL {
            self.start_model_info();
        }
    }

    pub fn on_reply(&mut self, pending: PendingSend, result: Result<ChatResponse, ApiError>) {
        self.client.finish_send(pending, result);
        self.follow_tail = true;
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.client.state().is_loading() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    // Sending

    pub fn submit(&mut self) {
        let input = self.client.input().to_string();
        if let Some(pending) = self.client.begin_send(&input) {
            self.start_request(pending);
        }
    }

    pub fn trigger_quick_action(&mut self, index: usize) {
        let Some(action) = self.quick_actions.get(index) else {
            return;
        };
        let query = action.query.clone();
        match self.client.begin_quick_action(&query) {
            Some(pending) => self.start_request(pending),
            None => self.input_cursor = self.client.input().chars().count(),
        }
    }

    // Input editing

    pub fn insert_char(&mut self, c: char) {
        let mut text = self.client.input().to_string();
        let byte_pos = byte_offset(&text, self.input_cursor);
        text.insert(byte_pos, c);
        if self.client.set_input(text) {
            self.input_cursor += 1;
        }
    }

    pub fn backspace(&mut self) {
        if self.input_cursor == 0 {
            return;
        }
        let mut text = self.client.input().to_string();
        let byte_pos = byte_offset(&text, self.input_cursor - 1);
        text.remove(byte_pos);
        if self.client.set_input(text) {
            self.input_cursor -= 1;
        }
    }

    pub fn delete(&mut self) {
        let mut text = self.client.input().to_string();
        if self.input_cursor >= text.chars().count() {
            return;
        }
        let byte_pos = byte_offset(&text, self.input_cursor);
        text.remove(byte_pos);
        self.client.set_input(text);
    }

    pub fn cursor_left(&mut self) {
        self.input_cursor = self.input_cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        let char_count = self.client.input().chars().count();
        self.input_cursor = (self.input_cursor + 1).min(char_count);
    }

    pub fn cursor_home(&mut self) {
        self.input_cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.input_cursor = self.client.input().chars().count();
    }

    // Scrolling

    pub fn scroll_up(&mut self, lines: u16) {
        self.follow_tail = false;
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_add(lines);
    }

    pub fn scroll_to_bottom(&mut self) {
        self.follow_tail = true;
    }

    pub fn half_page(&self) -> u16 {
        (self.chat_height / 2).max(1)
    }
}

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::message::{Entry, Message, Role, Thread};
use super::state::{ClientState, Transition};
use crate::api::{AnalysisApi, ChatResponse, ModelInfo};
use crate::error::ApiError;

pub const NO_RESPONSE: &str = "No response received";
pub const UNKNOWN_MODEL: &str = "Unknown";
pub const LOADING_MODEL: &str = "Loading...";

pub fn send_error_text(err: &ApiError) -> String {
    format!(
        "Sorry, I encountered an error: {}. Please make sure the analysis API is running and accessible.",
        err
    )
}

/// Ticket for a chat request that has been started with
/// [`ChatClient::begin_send`] and must be completed with
/// [`ChatClient::finish_send`].
#[derive(Debug)]
pub struct PendingSend {
    pub query: String,
    placeholder_id: String,
}

/// Snapshot of everything the UI needs to draw one frame.
#[derive(Debug, Clone, Copy)]
pub struct ChatView<'a> {
    pub connected: bool,
    pub loading: bool,
    pub status_text: &'a str,
    pub model_label: &'a str,
    pub entries: &'a [Entry],
    pub input: &'a str,
    pub input_enabled: bool,
    pub send_enabled: bool,
}

pub struct ChatClient {
    api: Arc<dyn AnalysisApi>,
    state: ClientState,
    thread: Thread,
    input: String,
    model_label: String,
    probe_in_flight: bool,
}

impl ChatClient {
    pub fn new(api: Arc<dyn AnalysisApi>) -> Self {
        Self {
            api,
            state: ClientState::default(),
            thread: Thread::new(),
            input: String::new(),
            model_label: LOADING_MODEL.to_string(),
            probe_in_flight: false,
        }
    }

    pub fn api(&self) -> Arc<dyn AnalysisApi> {
        Arc::clone(&self.api)
    }

    /// Initial probe followed by the model lookup.
    pub async fn initialize(&mut self) {
        self.check_connection().await;
        self.load_model_info().await;
    }

    // Connectivity

    /// Probe the API and update the connection state. Returns the new
    /// connected flag. Failures never escape.
    pub async fn check_connection(&mut self) -> bool {
        if !self.begin_probe() {
            return self.state.is_connected();
        }
        let result = self.api.probe().await;
        self.finish_probe(result)
    }

    /// Marks a probe as running. Returns false if one already is.
    pub fn begin_probe(&mut self) -> bool {
        if self.probe_in_flight {
            return false;
        }
        self.probe_in_flight = true;
        true
    }

    pub fn finish_probe(&mut self, result: Result<(), ApiError>) -> bool {
        self.probe_in_flight = false;
        match result {
            Ok(()) => {
                if !self.state.is_connected() {
                    info!("connected to analysis API");
                }
                self.state.apply(Transition::Connected);
            }
            Err(err) => {
                warn!(error = %err, "connection check failed");
                self.state.apply(Transition::Disconnected);
            }
        }
        self.state.is_connected()
    }

    /// Whether the periodic reconnect probe should fire now.
    pub fn should_reconnect(&self) -> bool {
        !self.state.is_connected() && !self.state.is_loading() && !self.probe_in_flight
    }

    pub async fn load_model_info(&mut self) {
        let result = self.api.model_info().await;
        self.apply_model_info(result);
    }

    pub fn apply_model_info(&mut self, result: Result<ModelInfo, ApiError>) {
        let label = match result {
            Ok(info) => info.display_name(),
            Err(err) => {
                warn!(error = %err, "failed to load model info");
                None
            }
        };
        self.model_label = label.unwrap_or_else(|| UNKNOWN_MODEL.to_string());
    }

    // Input

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Replaces the input buffer. Rejected while a request is outstanding.
    pub fn set_input(&mut self, text: impl Into<String>) -> bool {
        if self.state.is_loading() {
            return false;
        }
        self.input = text.into();
        true
    }

    pub fn input_enabled(&self) -> bool {
        !self.state.is_loading()
    }

    pub fn send_enabled(&self) -> bool {
        self.state.can_send(&self.input)
    }

    // Sending

    /// Validates and records a send, leaving the request itself to the
    /// caller. Returns `None` when the send is not allowed.
    pub fn begin_send(&mut self, text: &str) -> Option<PendingSend> {
        let query = text.trim();
        if !self.state.can_send(query) {
            debug!(
                empty = query.is_empty(),
                loading = self.state.is_loading(),
                connected = self.state.is_connected(),
                "send ignored"
            );
            return None;
        }

        let query = query.to_string();
        self.thread.push(Message::new(Role::User, query.clone()));
        self.input.clear();
        self.state.apply(Transition::LoadStart);
        let placeholder_id = self.thread.push_placeholder();

        Some(PendingSend {
            query,
            placeholder_id,
        })
    }

    /// Completes a send started by [`Self::begin_send`]. Always leaves the
    /// loading state.
    pub fn finish_send(&mut self, pending: PendingSend, result: Result<ChatResponse, ApiError>) {
        self.thread.remove(&pending.placeholder_id);

        match result {
            Ok(response) => {
                let text = response
                    .analysis
                    .filter(|analysis| !analysis.is_empty())
                    .unwrap_or_else(|| NO_RESPONSE.to_string());
                self.thread.push(Message::new(Role::Assistant, text));
            }
            Err(err) => {
                warn!(error = %err, "chat request failed");
                self.thread.push(Message::error(send_error_text(&err)));
            }
        }

        self.state.apply(Transition::LoadEnd);
    }

    /// Sends `text` and waits for the reply. Returns false if the send was
    /// not allowed.
    pub async fn send_message(&mut self, text: &str) -> bool {
        let Some(pending) = self.begin_send(text) else {
            return false;
        };
        let result = self.api.chat(&pending.query).await;
        self.finish_send(pending, result);
        true
    }

    /// Starts a preset query: fills the input, then sends it.
    pub fn begin_quick_action(&mut self, query: &str) -> Option<PendingSend> {
        if !self.set_input(query) {
            return None;
        }
        let input = self.input.clone();
        self.begin_send(&input)
    }

    pub async fn quick_action(&mut self, query: &str) -> bool {
        let Some(pending) = self.begin_quick_action(query) else {
            return false;
        };
        let result = self.api.chat(&pending.query).await;
        self.finish_send(pending, result);
        true
    }

    // Rendering

    pub fn state(&self) -> &ClientState {
        &self.state
    }

    pub fn thread(&self) -> &Thread {
        &self.thread
    }

    pub fn model_label(&self) -> &str {
        &self.model_label
    }

    pub fn view(&self) -> ChatView<'_> {
        ChatView {
            connected: self.state.is_connected(),
            loading: self.state.is_loading(),
            status_text: self.state.status_text(),
            model_label: &self.model_label,
            entries: self.thread.entries(),
            input: &self.input,
            input_enabled: self.input_enabled(),
            send_enabled: self.send_enabled(),
        }
    }
}

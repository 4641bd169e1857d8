//! Connection and loading state for the chat client
//!
//! All mutation goes through [`ClientState::apply`], so the send gate and the
//! status line can never disagree.

pub const STATUS_CONNECTING: &str = "Connecting...";
pub const STATUS_CONNECTED: &str = "Connected";
pub const STATUS_FAILED: &str = "Connection Failed";
pub const STATUS_PROCESSING: &str = "Processing...";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionState {
    pub connected: bool,
    pub status_text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Connected,
    Disconnected,
    LoadStart,
    LoadEnd,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientState {
    pub connection: ConnectionState,
    pub loading: bool,
}

impl Default for ClientState {
    fn default() -> Self {
        Self {
            connection: ConnectionState {
                connected: false,
                status_text: STATUS_CONNECTING.to_string(),
            },
            loading: false,
        }
    }
}

impl ClientState {
    pub fn apply(&mut self, transition: Transition) {
        match transition {
            Transition::Connected => self.connection.connected = true,
            Transition::Disconnected => self.connection.connected = false,
            Transition::LoadStart => self.loading = true,
            Transition::LoadEnd => self.loading = false,
        }

        let status = match (self.connection.connected, self.loading) {
            (false, _) => STATUS_FAILED,
            (true, true) => STATUS_PROCESSING,
            (true, false) => STATUS_CONNECTED,
        };
        self.connection.status_text = status.to_string();
    }

    pub fn is_connected(&self) -> bool {
        self.connection.connected
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn status_text(&self) -> &str {
        &self.connection.status_text
    }

    /// Whether the send action is available for `input`.
    pub fn can_send(&self, input: &str) -> bool {
        !input.trim().is_empty() && !self.loading && self.connection.connected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_disconnected() {
        let state = ClientState::default();
        assert!(!state.is_connected());
        assert!(!state.can_send("hello"));
        assert_eq!(state.status_text(), STATUS_CONNECTING);
    }

    #[test]
    fn test_send_gate() {
        let mut state = ClientState::default();
        state.apply(Transition::Connected);
        assert!(state.can_send("hello"));
        assert!(!state.can_send("   \n"));

        state.apply(Transition::LoadStart);
        assert!(!state.can_send("hello"));
        assert_eq!(state.status_text(), STATUS_PROCESSING);

        state.apply(Transition::LoadEnd);
        assert!(state.can_send("hello"));
        assert_eq!(state.status_text(), STATUS_CONNECTED);

        state.apply(Transition::Disconnected);
        assert!(!state.can_send("hello"));
        assert_eq!(state.status_text(), STATUS_FAILED);
    }

    #[test]
    fn test_connected_while_loading_keeps_processing_status() {
        let mut state = ClientState::default();
        state.apply(Transition::Connected);
        state.apply(Transition::LoadStart);
        state.apply(Transition::Connected);
        assert!(state.is_loading());
        assert_eq!(state.status_text(), STATUS_PROCESSING);
    }

    #[test]
    fn test_load_end_keeps_connection_flag() {
        let mut state = ClientState::default();
        state.apply(Transition::Connected);
        state.apply(Transition::LoadStart);
        state.apply(Transition::Disconnected);
        state.apply(Transition::LoadEnd);
        assert!(!state.is_connected());
        assert_eq!(state.status_text(), STATUS_FAILED);
    }
}

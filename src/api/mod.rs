//! Analysis API access
//!
//! The chat client only talks to the server through [`AnalysisApi`], so the
//! state machine can be driven by an in-memory fake in tests.

mod client;
mod types;

use async_trait::async_trait;

pub use client::HttpAnalysisApi;
pub use types::{ChatRequest, ChatResponse, ModelInfo};

use crate::error::ApiError;

#[async_trait]
pub trait AnalysisApi: Send + Sync {
    /// Lightweight connectivity check. Any success status counts as up.
    async fn probe(&self) -> Result<(), ApiError>;

    /// Model identity shown in the header.
    async fn model_info(&self) -> Result<ModelInfo, ApiError>;

    /// Submit one query and wait for the analysis.
    async fn chat(&self, ask: &str) -> Result<ChatResponse, ApiError>;
}

#[cfg(test)]
pub mod fake {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;

    /// Scripted API. Each call pops the next queued outcome; an empty queue
    /// behaves like an unreachable server.
    #[derive(Default)]
    pub struct FakeApi {
        pub probes: Mutex<VecDeque<Result<(), ApiError>>>,
        pub models: Mutex<VecDeque<Result<ModelInfo, ApiError>>>,
        pub chats: Mutex<VecDeque<Result<ChatResponse, ApiError>>>,
        pub asked: Mutex<Vec<String>>,
        pub probe_calls: AtomicUsize,
    }

    pub fn unreachable() -> ApiError {
        ApiError::Aborted("connection refused".to_string())
    }

    impl FakeApi {
        pub fn online() -> Self {
            let api = Self::default();
            api.push_probe(Ok(()));
            api
        }

        pub fn push_probe(&self, outcome: Result<(), ApiError>) {
            self.probes.lock().unwrap().push_back(outcome);
        }

        pub fn push_model(&self, outcome: Result<ModelInfo, ApiError>) {
            self.models.lock().unwrap().push_back(outcome);
        }

        pub fn push_chat(&self, outcome: Result<ChatResponse, ApiError>) {
            self.chats.lock().unwrap().push_back(outcome);
        }

        pub fn asked(&self) -> Vec<String> {
            self.asked.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl AnalysisApi for FakeApi {
        async fn probe(&self) -> Result<(), ApiError> {
            self.probe_calls.fetch_add(1, Ordering::SeqCst);
            self.probes.lock().unwrap().pop_front().unwrap_or_else(|| Err(unreachable()))
        }

        async fn model_info(&self) -> Result<ModelInfo, ApiError> {
            self.models.lock().unwrap().pop_front().unwrap_or_else(|| Err(unreachable()))
        }

        async fn chat(&self, ask: &str) -> Result<ChatResponse, ApiError> {
            self.asked.lock().unwrap().push(ask.to_string());
            self.chats.lock().unwrap().pop_front().unwrap_or_else(|| Err(unreachable()))
        }
    }
}

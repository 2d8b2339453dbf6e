//! Scripted model for testing without a real backend.
//!
//! Replies are served from a queue in order and every call is recorded
//! for assertion in tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Semaphore;

use crate::error::{AdvisorError, AdvisorResult};
use crate::model::GenerativeModel;

/// A recorded `generate` call.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub prompt: String,
    pub schema: Option<Value>,
}

/// Mock implementation of the `GenerativeModel` trait.
///
/// An exhausted queue answers with a transport error. An optional gate
/// holds every call until a permit is released, which lets tests observe
/// the store mid-cycle.
pub struct ScriptedModel {
    replies: Mutex<VecDeque<AdvisorResult<String>>>,
    calls: Mutex<Vec<RecordedCall>>,
    gate: Option<Arc<Semaphore>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    /// Queue a successful reply.
    pub fn reply(self, text: impl Into<String>) -> Self {
        self.replies.lock().unwrap().push_back(Ok(text.into()));
        self
    }

    /// Queue a failure.
    pub fn fail(self, error: AdvisorError) -> Self {
        self.replies.lock().unwrap().push_back(Err(error));
        self
    }

    /// Hold each call until the semaphore grants a permit.
    pub fn gated(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// All calls made so far.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Replies still queued.
    pub fn remaining(&self) -> usize {
        self.replies.lock().unwrap().len()
    }
}

impl Default for ScriptedModel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerativeModel for ScriptedModel {
    async fn generate(&self, prompt: &str, schema: Option<&Value>) -> AdvisorResult<String> {
        self.calls.lock().unwrap().push(RecordedCall {
            prompt: prompt.to_string(),
            schema: schema.cloned(),
        });

        if let Some(gate) = &self.gate {
            let permit = gate
                .acquire()
                .await
                .map_err(|_| AdvisorError::Transport("gate closed".into()))?;
            permit.forget();
        }

        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AdvisorError::Transport("no scripted reply left".into())))
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

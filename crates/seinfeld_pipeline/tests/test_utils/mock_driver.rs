//! Mock completion driver for testing.

use async_trait::async_trait;
use seinfeld_core::{GenerateRequest, GenerateResponse};
use seinfeld_error::{GenerationError, GenerationErrorKind};
use seinfeld_interface::CompletionDriver;
use std::sync::{Arc, Mutex};

/// Behavior configuration for mock responses.
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Always return success with the given text
    Success(String),
    /// Always return the specified error
    Error(GenerationErrorKind),
    /// Succeed with numbered text, failing on the given 1-based call
    FailOnCall {
        call: usize,
        error: GenerationErrorKind,
    },
    /// Return a sequence of responses (errors or success)
    Sequence(Vec<MockResponse>),
}

/// A single mock response (success or error).
#[derive(Debug, Clone)]
pub enum MockResponse {
    Success(String),
    Error(GenerationErrorKind),
}

/// Mock driver that records every request it receives.
#[derive(Debug, Clone)]
pub struct MockDriver {
    behavior: MockBehavior,
    call_count: Arc<Mutex<usize>>,
    requests: Arc<Mutex<Vec<GenerateRequest>>>,
    model_name: String,
}

impl MockDriver {
    fn new_with_behavior(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            call_count: Arc::new(Mutex::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
            model_name: "mock-model".to_string(),
        }
    }

    /// Create a mock driver that always succeeds with the given text.
    pub fn new_success(text: impl Into<String>) -> Self {
        Self::new_with_behavior(MockBehavior::Success(text.into()))
    }

    /// Create a mock driver that always fails with the given error.
    pub fn new_error(error: GenerationErrorKind) -> Self {
        Self::new_with_behavior(MockBehavior::Error(error))
    }

    /// Create a mock driver that answers "output N" and fails on call `call`.
    pub fn new_fail_on_call(call: usize, error: GenerationErrorKind) -> Self {
        Self::new_with_behavior(MockBehavior::FailOnCall { call, error })
    }

    /// Create a mock driver with a sequence of responses.
    pub fn new_sequence(responses: Vec<MockResponse>) -> Self {
        Self::new_with_behavior(MockBehavior::Sequence(responses))
    }

    /// Get the number of times generate() was called.
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    /// Every request received, in order.
    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// The user message of the n-th (0-indexed) request.
    pub fn user_prompt(&self, n: usize) -> String {
        self.requests()[n]
            .messages
            .last()
            .map(|m| m.content.clone())
            .unwrap_or_default()
    }

    fn next_response(&self) -> Result<GenerateResponse, GenerationError> {
        let mut count = self.call_count.lock().unwrap();
        let current_count = *count;
        *count += 1;

        match &self.behavior {
            MockBehavior::Success(text) => Ok(GenerateResponse::from_text(text.clone())),
            MockBehavior::Error(kind) => Err(GenerationError::new(kind.clone())),
            MockBehavior::FailOnCall { call, error } => {
                if current_count + 1 == *call {
                    Err(GenerationError::new(error.clone()))
                } else {
                    Ok(GenerateResponse::from_text(format!(
                        "output {}",
                        current_count + 1
                    )))
                }
            }
            MockBehavior::Sequence(responses) => match responses.get(current_count) {
                Some(MockResponse::Success(text)) => Ok(GenerateResponse::from_text(text.clone())),
                Some(MockResponse::Error(kind)) => Err(GenerationError::new(kind.clone())),
                None => Err(GenerationError::new(GenerationErrorKind::Api {
                    status: 500,
                    message: format!(
                        "Mock sequence exhausted (call {} beyond {} responses)",
                        current_count + 1,
                        responses.len()
                    ),
                })),
            },
        }
    }
}

#[async_trait]
impl CompletionDriver for MockDriver {
    async fn generate(&self, req: &GenerateRequest) -> Result<GenerateResponse, GenerationError> {
        tokio::time::sleep(tokio::time::Duration::from_millis(1)).await;
        self.requests.lock().unwrap().push(req.clone());
        self.next_response()
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

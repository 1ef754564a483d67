use crate::models::{CompletionEnvelope, UserRecord};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

// --- Typed Failure ---

/// StatusError
///
/// Everything that can go wrong while resolving the visitor's completion
/// status. Callers receive the concrete failure and decide what to do with
/// it; this layer never swallows errors or substitutes defaults.
#[derive(Debug, Error)]
pub enum StatusError {
    /// Transport-level failure: connection refused, timeout at the OS level,
    /// or a non-2xx response from the endpoint.
    #[error("completion check request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The endpoint answered 2xx but the body did not match the expected
    /// `{ "data": { "completed": bool } }` envelope.
    #[error("completion check returned a malformed body: {0}")]
    MalformedResponse(#[from] serde_json::Error),
}

// 1. CompletionCheck Contract
/// CompletionCheck
///
/// Defines the abstract contract for asking the campaign backend whether a
/// registered visitor has already finished the quiz. One navigation asks at
/// most once; there is no retry and no caching at this layer.
///
/// **Send + Sync + async_trait** are required to make the trait object
/// (`Arc<dyn CompletionCheck>`) safely shareable across Axum's asynchronous
/// task boundaries.
#[async_trait]
pub trait CompletionCheck: Send + Sync {
    /// Returns whether `user` has completed the quiz.
    ///
    /// Implementations report failures as typed `StatusError`s instead of a
    /// default value; deciding that a failed check counts as "not completed"
    /// belongs to the caller.
    async fn quiz_completed(&self, user: &UserRecord) -> Result<bool, StatusError>;
}

// 2. The Real Implementation (Remote Endpoint)
/// HttpCompletionClient
///
/// The concrete implementation backed by the campaign's completion-check
/// endpoint. Issues a single unauthenticated GET with the visitor's phone as
/// `user_id` and session token as `tks`, the query contract the endpoint
/// expects.
///
/// *Note*: the client sets no request timeout. A hung endpoint holds up the
/// navigation that asked rather than degrading it into the not-completed
/// path.
#[derive(Clone)]
pub struct HttpCompletionClient {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpCompletionClient {
    /// new
    ///
    /// Constructs the client for the given endpoint URL (taken from AppConfig
    /// at startup).
    pub fn new(endpoint: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.to_string(),
        }
    }
}

#[async_trait]
impl CompletionCheck for HttpCompletionClient {
    async fn quiz_completed(&self, user: &UserRecord) -> Result<bool, StatusError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("user_id", user.phone.as_str()),
                ("tks", user.tks.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?;

        // Read the raw body first so a non-JSON payload surfaces as a
        // malformed response rather than a transport failure.
        let body = response.text().await?;
        let envelope: CompletionEnvelope = serde_json::from_str(&body)?;

        Ok(envelope.data.completed)
    }
}

// 3. The Mock Implementation (For Unit Tests)
/// MockCompletionCheck
///
/// A mock implementation of `CompletionCheck` used exclusively for testing.
/// This allows guard scenarios to pin the remote answer (or its failure)
/// without requiring a network connection, isolating the test boundary.
#[derive(Clone)]
pub struct MockCompletionCheck {
    /// The canned answer returned on success.
    pub completed: bool,
    /// When true, all checks return a simulated typed failure.
    pub should_fail: bool,
}

impl MockCompletionCheck {
    pub fn new(completed: bool) -> Self {
        Self {
            completed,
            should_fail: false,
        }
    }

    pub fn new_failing() -> Self {
        Self {
            completed: false,
            should_fail: true,
        }
    }
}

#[async_trait]
impl CompletionCheck for MockCompletionCheck {
    async fn quiz_completed(&self, _user: &UserRecord) -> Result<bool, StatusError> {
        if self.should_fail {
            // Surface a typed failure without touching the network. An empty
            // body never parses, so this always yields the error arm.
            return serde_json::from_str::<CompletionEnvelope>("")
                .map(|envelope| envelope.data.completed)
                .map_err(StatusError::from);
        }

        Ok(self.completed)
    }
}

/// StatusState
///
/// The concrete type used to share completion-check access across the application state.
pub type StatusState = Arc<dyn CompletionCheck>;

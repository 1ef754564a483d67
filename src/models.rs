use serde::{Deserialize, Serialize};

// --- Core Application Schemas (Cached Identity) ---

/// UserRecord
///
/// Represents the registered visitor's identity as cached by the registration flow.
/// The record is stored as a JSON string under the token-derived key and read back
/// on every navigation the guard evaluates.
///
/// *Note*: both fields are required. A cached value missing either one does not parse
/// and is treated as a corrupt record, not as a partial identity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserRecord {
    // The visitor's phone number, doubling as the user id for the completion check.
    pub phone: String,
    // The session token echoed into the record at registration time.
    pub tks: String,
}

// --- Completion Check Wire Schemas ---

/// CompletionEnvelope
///
/// Response body of the remote completion-check endpoint. The payload nests the
/// flag one level down, so we mirror that shape instead of flattening it.
#[derive(Debug, Deserialize)]
pub struct CompletionEnvelope {
    pub data: CompletionData,
}

/// CompletionData
///
/// Inner payload of the completion-check response.
#[derive(Debug, Deserialize)]
pub struct CompletionData {
    pub completed: bool,
}

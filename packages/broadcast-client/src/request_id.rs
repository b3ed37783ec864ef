//! Idempotency keys for job submissions.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An idempotency key, generated once per user-initiated submission and reused
/// verbatim on every retry of that submission so the server can deduplicate.
///
/// Shape: `req_<unix_millis>_<random>` — unique with overwhelming probability
/// within a client session, no global counter required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    pub fn generate() -> Self {
        let millis = chrono::Utc::now().timestamp_millis();
        let suffix = Uuid::new_v4().simple().to_string();
        Self(format!("req_{}_{}", millis, &suffix[..8]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use interview_fields::FormValues;

use crate::response::InterviewStateResponse;

/// Number of state-token characters that make up a record id.
pub const DEFAULT_ID_PREFIX_LEN: usize = 64;

/// Caller-supplied data carried along every record of an interview.
pub type Metadata = Map<String, Value>;

/// A cached interview step: the response, the values that produced it and
/// caller metadata. Persisted as `{ "r", "v", "m" }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewStateRecord {
    #[serde(rename = "r")]
    pub response: InterviewStateResponse,
    #[serde(rename = "v", default)]
    pub field_values: FormValues,
    #[serde(rename = "m", default)]
    pub metadata: Metadata,
}

impl InterviewStateRecord {
    pub fn new(
        response: InterviewStateResponse,
        field_values: FormValues,
        metadata: Metadata,
    ) -> Self {
        Self {
            response,
            field_values,
            metadata,
        }
    }
}

/// Record id of a state token: its first `prefix_len` characters.
///
/// Tokens sharing that prefix map to the same record. Stores key records
/// with their configured length, see `InterviewStateStore::record_id`.
pub fn record_id(state: &str, prefix_len: usize) -> String {
    state.chars().take(prefix_len).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_is_state_prefix() {
        let long = "a".repeat(70) + "tail";
        assert_eq!(record_id(&long, DEFAULT_ID_PREFIX_LEN), "a".repeat(64));
        assert_eq!(record_id("short", DEFAULT_ID_PREFIX_LEN), "short");
        assert_eq!(record_id("éèêë", 2), "éè");
    }

    #[test]
    fn shared_prefix_collides() {
        let base = "x".repeat(64);
        assert_eq!(
            record_id(&format!("{base}one"), DEFAULT_ID_PREFIX_LEN),
            record_id(&format!("{base}two"), DEFAULT_ID_PREFIX_LEN)
        );
    }
}

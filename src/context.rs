//! Opaque conversation context

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Continuity data owned by the remote assistant.
///
/// The client never looks inside. It keeps the latest value the service
/// returned and sends it back verbatim with the next turn.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationContext(Map<String, Value>);

impl ConversationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Interpret a wire value as a context. Only JSON objects qualify.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }
}

impl From<Map<String, Value>> for ConversationContext {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

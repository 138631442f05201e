use serde::{Deserialize, Serialize};

/// Counters exposed on the engine's status route.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct EngineStatus {
    pub envelopes: usize,
    pub answered: usize,
    pub rejected: usize,
    pub last_request_id: Option<String>,
    pub description: Option<String>,
}

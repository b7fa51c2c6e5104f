use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

/// Temperature used when an agent is created without one.
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Unique identifier for an agent, wrapping a UUID v7 (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(pub Uuid);

impl AgentId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for AgentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AgentId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A lightweight chat agent: a system prompt bound to a model key.
///
/// `description` doubles as the system prompt sent upstream. `model_key` is a
/// free-form selector; whether it routes to the upstream model or to the
/// simulated generator is decided by the relay's prefix list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    pub description: String,
    pub model_key: String,
    pub temperature: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create-or-update payload for an agent.
///
/// With `id` set the existing agent is updated in place; without it a new
/// agent is created. Omitted fields keep their current (or default) value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpsertAgentRequest {
    #[serde(default)]
    pub id: Option<AgentId>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "modelKey")]
    pub model_key: Option<String>,
    #[serde(default)]
    pub temperature: Option<f64>,
}

/// Entry in the model catalogue served to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub key: String,
    pub label: String,
    pub provider: String,
    #[serde(default)]
    pub description: String,
}

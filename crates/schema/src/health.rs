use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::Metadata;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub service: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Metadata>,
}

/// The backend reports a service either as a full status object or as a
/// bare status string such as `"running"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ServiceHealth {
    Detailed(ServiceStatus),
    Plain(String),
}

impl ServiceHealth {
    pub fn status(&self) -> &str {
        match self {
            ServiceHealth::Detailed(s) => &s.status,
            ServiceHealth::Plain(s) => s,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthDetails {
    #[serde(default)]
    pub chroma: Metadata,
    #[serde(default)]
    pub neo4j: Metadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub services: BTreeMap<String, ServiceHealth>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<HealthDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HealthResponse {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// Health of the query service itself, with what it sees of each store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryServiceHealth {
    pub status: String,
    #[serde(default)]
    pub chroma: Metadata,
    #[serde(default)]
    pub neo4j: Metadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
}

impl QueryServiceHealth {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

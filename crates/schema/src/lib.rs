pub mod document;
pub mod graph;
pub mod health;
pub mod query;

pub use document::{DocumentResponse, DocumentStats, DocumentUpload};
pub use graph::{Entity, GraphContext, Relationship};
pub use health::{HealthDetails, HealthResponse, QueryServiceHealth, ServiceHealth, ServiceStatus};
pub use query::{QueryRequest, QueryResponse, Source};

/// Open-ended key/value map the backend attaches to sources, entities,
/// relationships and documents. Keys keep the order they arrived in.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

use serde::{Deserialize, Serialize};

use crate::Metadata;
use crate::graph::GraphContext;

/// Number of sources the console asks for on every question.
pub const DEFAULT_MAX_RESULTS: u32 = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_results: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_graph_context: Option<bool>,
}

impl QueryRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            max_results: None,
            include_graph_context: None,
        }
    }

    /// The request the console sends: five sources plus graph context.
    pub fn with_graph_context(query: impl Into<String>) -> Self {
        Self {
            max_results: Some(DEFAULT_MAX_RESULTS),
            include_graph_context: Some(true),
            ..Self::new(query)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub answer: String,
    #[serde(default)]
    pub sources: Vec<Source>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph_context: Option<GraphContext>,
    /// Backend-reported certainty in [0, 1].
    pub confidence_score: f64,
    /// Seconds the backend spent answering.
    pub processing_time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    /// Dissimilarity to the query; lower is closer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
}

impl Source {
    /// Complement of the distance, when the backend reported one.
    pub fn similarity(&self) -> Option<f64> {
        self.distance.map(|d| 1.0 - d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn console_request_carries_defaults() {
        let body = serde_json::to_value(QueryRequest::with_graph_context("What is GraphRAG?")).unwrap();

        assert_eq!(
            body,
            json!({
                "query": "What is GraphRAG?",
                "max_results": 5,
                "include_graph_context": true
            })
        );
    }

    #[test]
    fn bare_request_omits_optional_fields() {
        let body = serde_json::to_value(QueryRequest::new("hello")).unwrap();
        assert_eq!(body, json!({ "query": "hello" }));
    }

    #[test]
    fn response_without_sources_or_graph_decodes() {
        let resp: QueryResponse = serde_json::from_value(json!({
            "answer": "42",
            "confidence_score": 0.5,
            "processing_time": 0.25
        }))
        .unwrap();

        assert!(resp.sources.is_empty());
        assert!(resp.graph_context.is_none());
    }

    #[test]
    fn source_metadata_keeps_arrival_order() {
        let source: Source = serde_json::from_value(json!({
            "content": "chunk",
            "metadata": { "zeta": 1, "alpha": "two", "mid": null },
            "distance": 0.2
        }))
        .unwrap();

        let keys: Vec<_> = source.metadata.as_ref().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
        assert!((source.similarity().unwrap() - 0.8).abs() < 1e-9);
    }

    #[test]
    fn missing_distance_has_no_similarity() {
        let source: Source = serde_json::from_value(json!({ "content": "chunk" })).unwrap();
        assert_eq!(source.similarity(), None);
    }
}

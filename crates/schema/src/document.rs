use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Metadata;

pub const TEXT_DOCUMENT: &str = "text";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentUpload {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_type: Option<String>,
}

impl DocumentUpload {
    /// Text pasted into the console's document draft.
    pub fn manual(content: impl Into<String>, uploaded_at: DateTime<Utc>) -> Self {
        let mut metadata = Metadata::new();
        metadata.insert("source".into(), Value::from("manual_upload"));
        metadata.insert("timestamp".into(), Value::from(iso_timestamp(uploaded_at)));

        Self {
            content: content.into(),
            metadata: Some(metadata),
            document_type: Some(TEXT_DOCUMENT.to_string()),
        }
    }

    /// One file of a batch upload.
    pub fn from_file(
        content: impl Into<String>,
        filename: impl Into<String>,
        uploaded_at: DateTime<Utc>,
    ) -> Self {
        let mut metadata = Metadata::new();
        metadata.insert("source".into(), Value::from("batch_upload"));
        metadata.insert("filename".into(), Value::from(filename.into()));
        metadata.insert("timestamp".into(), Value::from(iso_timestamp(uploaded_at)));

        Self {
            content: content.into(),
            metadata: Some(metadata),
            document_type: Some(TEXT_DOCUMENT.to_string()),
        }
    }
}

/// `2024-05-01T12:30:00.123Z`
fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentResponse {
    pub id: String,
    pub status: String,
    pub message: String,
}

impl DocumentResponse {
    pub fn succeeded(&self) -> bool {
        self.status == "success"
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentStats {
    pub documents: DocumentCounts,
    pub entities: EntityCounts,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentCounts {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub collection: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityCounts {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub relationships: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn manual_upload_body() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        let body = serde_json::to_value(DocumentUpload::manual("GraphRAG notes", at)).unwrap();

        assert_eq!(
            body,
            json!({
                "content": "GraphRAG notes",
                "metadata": {
                    "source": "manual_upload",
                    "timestamp": "2024-05-01T12:30:00.000Z"
                },
                "document_type": "text"
            })
        );
    }

    #[test]
    fn batch_file_metadata_names_the_file() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let doc = DocumentUpload::from_file("body", "notes.md", at);
        let metadata = doc.metadata.unwrap();

        assert_eq!(metadata["source"], "batch_upload");
        assert_eq!(metadata["filename"], "notes.md");
    }

    #[test]
    fn stats_tolerate_missing_counts() {
        let stats: DocumentStats = serde_json::from_value(json!({
            "documents": { "total": 12, "collection": "documents" },
            "entities": {},
            "status": "healthy"
        }))
        .unwrap();

        assert_eq!(stats.documents.total, 12);
        assert_eq!(stats.entities.relationships, 0);
    }
}

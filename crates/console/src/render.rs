use std::fmt;

use schema::{
    DocumentResponse, DocumentStats, Entity, HealthResponse, Metadata, QueryServiceHealth,
    Relationship,
};

use crate::state::{QueryPanel, UploadPanel};

/// Source excerpts are clamped to this many display lines.
pub const SOURCE_LINES: usize = 3;

pub fn confidence(score: f64) -> String {
    format!("{:.1}%", score * 100.0)
}

pub fn processing_time(seconds: f64) -> String {
    format!("{:.2}s", seconds)
}

pub fn similarity(distance: f64) -> String {
    format!("{:.3}", 1.0 - distance)
}

pub fn entity_label(entity: &Entity) -> String {
    format!("{} ({})", entity.name, entity.entity_type)
}

pub fn relationship_line(rel: &Relationship) -> String {
    format!("{} → {} → {}", rel.source_id, rel.relationship_type, rel.target_id)
}

/// Word-wraps `text` at `width` columns and keeps at most `max_lines`
/// lines, appending `…` when something was cut. Whitespace runs, newlines
/// included, collapse to a single space.
pub fn clamp_lines(text: &str, max_lines: usize, width: usize) -> String {
    let width = width.max(1);
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut len = 0;

    for word in text.split_whitespace() {
        let mut chars: Vec<char> = word.chars().collect();

        if len > 0 && len + 1 + chars.len() > width {
            lines.push(std::mem::take(&mut current));
            len = 0;
        }

        // Longer than a whole line: hard split.
        while chars.len() > width {
            let rest = chars.split_off(width);
            lines.push(chars.into_iter().collect());
            chars = rest;
        }

        if len > 0 {
            current.push(' ');
            len += 1;
        }
        len += chars.len();
        current.extend(chars);
    }
    if len > 0 {
        lines.push(current);
    }

    if lines.len() > max_lines {
        lines.truncate(max_lines);
        if let Some(last) = lines.last_mut() {
            last.push('…');
        }
    }
    lines.join("\n")
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnswerView {
    pub text: String,
    pub confidence: String,
    pub time: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SourceView {
    pub excerpt: String,
    pub similarity: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GraphView {
    pub entities: Option<Vec<String>>,
    pub relationships: Option<Vec<String>>,
}

/// What the results side of the console shows for the current query state.
/// Panels that should not be shown are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    pub loading: bool,
    pub answer: Option<AnswerView>,
    pub sources: Option<Vec<SourceView>>,
    pub graph: Option<GraphView>,
}

impl View {
    pub fn of(panel: &QueryPanel, width: usize) -> Self {
        let Some(response) = panel.response() else {
            return Self {
                loading: panel.is_loading(),
                answer: None,
                sources: None,
                graph: None,
            };
        };

        let answer = AnswerView {
            text: response.answer.clone(),
            confidence: confidence(response.confidence_score),
            time: processing_time(response.processing_time),
        };

        let sources = (!response.sources.is_empty()).then(|| {
            response
                .sources
                .iter()
                .map(|source| SourceView {
                    excerpt: clamp_lines(&source.content, SOURCE_LINES, width),
                    similarity: source.distance.map(similarity),
                })
                .collect()
        });

        let graph = response.graph_context.as_ref().map(|ctx| GraphView {
            entities: (!ctx.entities.is_empty())
                .then(|| ctx.entities.iter().map(entity_label).collect()),
            relationships: (!ctx.relationships.is_empty())
                .then(|| ctx.relationships.iter().map(relationship_line).collect()),
        });

        Self {
            loading: false,
            answer: Some(answer),
            sources,
            graph,
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.loading && self.answer.is_none()
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.loading {
            writeln!(f, "Processing...")?;
        }

        if let Some(answer) = &self.answer {
            writeln!(f, "== Answer ==")?;
            writeln!(f, "{}", answer.text)?;
            writeln!(f, "Confidence: {}   Time: {}", answer.confidence, answer.time)?;
        }

        if let Some(sources) = &self.sources {
            writeln!(f)?;
            writeln!(f, "== Sources ({}) ==", sources.len())?;
            for (i, source) in sources.iter().enumerate() {
                let mut lines = source.excerpt.lines();
                writeln!(f, "[{}] {}", i + 1, lines.next().unwrap_or_default())?;
                for line in lines {
                    writeln!(f, "    {}", line)?;
                }
                if let Some(sim) = &source.similarity {
                    writeln!(f, "    Similarity: {}", sim)?;
                }
            }
        }

        if let Some(graph) = &self.graph {
            writeln!(f)?;
            writeln!(f, "== Knowledge Graph Context ==")?;
            if let Some(entities) = &graph.entities {
                writeln!(f, "Entities ({})", entities.len())?;
                writeln!(f, "  {}", entities.join(", "))?;
            }
            if let Some(relationships) = &graph.relationships {
                writeln!(f, "Relationships ({})", relationships.len())?;
                for rel in relationships {
                    writeln!(f, "  {}", rel)?;
                }
            }
        }
        Ok(())
    }
}

/// Status line of the upload panel, with the pending indicator taking
/// precedence over a finished status.
pub fn upload_line(panel: &UploadPanel) -> Option<String> {
    if panel.is_uploading() {
        return Some("Uploading...".to_string());
    }
    panel.status().map(|status| {
        let marker = if status.is_error() { "✗" } else { "✓" };
        format!("{} {}", marker, status.message())
    })
}

pub fn draft_summary(panel: &UploadPanel) -> String {
    let draft = panel.draft();
    if draft.trim().is_empty() {
        return "Document draft is empty.".to_string();
    }
    let lines = draft.lines().count();
    let chars = draft.chars().count();
    format!("Document draft ({} lines, {} chars):\n{}", lines, chars, draft)
}

pub fn batch_report(filenames: &[String], results: &[DocumentResponse]) -> String {
    let succeeded = results.iter().filter(|r| r.succeeded()).count();
    let mut out = format!(
        "Batch upload: {}/{} documents succeeded",
        succeeded,
        results.len()
    );
    for (i, result) in results.iter().enumerate() {
        let name = filenames.get(i).map(String::as_str).unwrap_or("?");
        let marker = if result.succeeded() { "✓" } else { "✗" };
        out.push_str(&format!("\n  {} {} -> {} ({})", marker, name, result.id, result.message));
    }
    out
}

pub fn health_report(health: &HealthResponse) -> String {
    let mut out = format!("Backend status: {}", health.status);
    if let Some(ts) = &health.timestamp {
        out.push_str(&format!(" at {}", ts));
    }
    for (name, service) in &health.services {
        out.push_str(&format!("\n  {:<8} {}", name, service.status()));
    }
    if let Some(err) = &health.error {
        out.push_str(&format!("\n  error: {}", err));
    }
    out
}

pub fn query_health_report(health: &QueryServiceHealth) -> String {
    let mut out = format!("Query service status: {}", health.status);
    if let Some(service) = &health.service {
        out.push_str(&format!(" ({})", service));
    }
    for (store, info) in [("chroma", &health.chroma), ("neo4j", &health.neo4j)] {
        out.push_str(&format!("\n  {:<8} {}", store, metadata_pairs(info)));
    }
    out
}

fn metadata_pairs(info: &Metadata) -> String {
    if info.is_empty() {
        return "-".to_string();
    }
    info.iter()
        .map(|(key, value)| match value {
            serde_json::Value::String(s) => format!("{key}={s}"),
            other => format!("{key}={other}"),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn stats_report(stats: &DocumentStats) -> String {
    format!(
        "Documents: {} (collection {})\nEntities: {}\nRelationships: {}\nStatus: {}",
        stats.documents.total,
        stats.documents.collection,
        stats.entities.total,
        stats.entities.relationships,
        stats.status
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::QueryPanel;
    use pretty_assertions::assert_eq;
    use schema::{GraphContext, QueryResponse, Source};

    fn entity(id: &str, name: &str, ty: &str) -> Entity {
        Entity {
            id: id.to_string(),
            name: name.to_string(),
            entity_type: ty.to_string(),
            properties: None,
        }
    }

    fn rel(from: &str, ty: &str, to: &str) -> Relationship {
        Relationship {
            source_id: from.to_string(),
            target_id: to.to_string(),
            relationship_type: ty.to_string(),
            properties: None,
        }
    }

    fn answered(response: QueryResponse) -> QueryPanel {
        let mut panel = QueryPanel::default();
        let (ticket, _) = panel.submit("q").unwrap();
        panel.resolve(ticket, Ok(response));
        panel
    }

    fn response() -> QueryResponse {
        QueryResponse {
            answer: "GraphRAG links chunks through entities.".to_string(),
            sources: vec![],
            graph_context: None,
            confidence_score: 0.873,
            processing_time: 1.5,
        }
    }

    #[test]
    fn number_formats() {
        assert_eq!(confidence(0.873), "87.3%");
        assert_eq!(confidence(1.0), "100.0%");
        assert_eq!(processing_time(1.5), "1.50s");
        assert_eq!(similarity(0.2), "0.800");
        assert_eq!(similarity(0.0), "1.000");
    }

    #[test]
    fn labels() {
        assert_eq!(entity_label(&entity("e1", "Neo4j", "TECHNOLOGY")), "Neo4j (TECHNOLOGY)");
        assert_eq!(relationship_line(&rel("e1", "USES", "e2")), "e1 → USES → e2");
    }

    #[test]
    fn nothing_shown_without_response() {
        let view = View::of(&QueryPanel::default(), 80);
        assert!(view.is_empty());
        assert_eq!(view.to_string(), "");
    }

    #[test]
    fn pending_query_shows_indicator_only() {
        let mut panel = QueryPanel::default();
        panel.submit("q").unwrap();

        let view = View::of(&panel, 80);
        assert!(view.loading);
        assert!(view.answer.is_none());
        assert_eq!(view.to_string(), "Processing...\n");
    }

    #[test]
    fn answer_panel_without_sources_or_graph() {
        let view = View::of(&answered(response()), 80);

        assert_eq!(
            view.answer,
            Some(AnswerView {
                text: "GraphRAG links chunks through entities.".to_string(),
                confidence: "87.3%".to_string(),
                time: "1.50s".to_string(),
            })
        );
        assert!(view.sources.is_none());
        assert!(view.graph.is_none());
    }

    #[test]
    fn similarity_only_when_distance_present() {
        let mut resp = response();
        resp.sources = vec![
            Source { content: "close".to_string(), metadata: None, distance: Some(0.2) },
            Source { content: "unknown".to_string(), metadata: None, distance: None },
        ];

        let view = View::of(&answered(resp), 80);
        let sources = view.sources.clone().unwrap();

        assert_eq!(sources[0].similarity.as_deref(), Some("0.800"));
        assert_eq!(sources[1].similarity, None);

        let text = view.to_string();
        assert!(text.contains("== Sources (2) =="));
        assert_eq!(text.matches("Similarity:").count(), 1);
    }

    #[test]
    fn relationships_without_entities() {
        let mut resp = response();
        resp.graph_context = Some(GraphContext {
            entities: vec![],
            relationships: vec![rel("a", "USES", "b"), rel("b", "STORES", "c")],
            subgraph: None,
        });

        let view = View::of(&answered(resp), 80);
        let graph = view.graph.clone().unwrap();

        assert!(graph.entities.is_none());
        assert_eq!(
            graph.relationships,
            Some(vec!["a → USES → b".to_string(), "b → STORES → c".to_string()])
        );

        let text = view.to_string();
        assert!(text.contains("Relationships (2)"));
        assert!(!text.contains("Entities"));
    }

    #[test]
    fn empty_graph_context_still_shows_panel() {
        let mut resp = response();
        resp.graph_context = Some(GraphContext {
            entities: vec![],
            relationships: vec![],
            subgraph: None,
        });

        let view = View::of(&answered(resp), 80);
        assert_eq!(
            view.graph,
            Some(GraphView { entities: None, relationships: None })
        );
        assert!(view.to_string().contains("Knowledge Graph Context"));
    }

    #[test]
    fn entities_render_as_name_and_type() {
        let mut resp = response();
        resp.graph_context = Some(GraphContext {
            entities: vec![entity("e1", "GraphRAG", "CONCEPT"), entity("e2", "Qdrant", "TECHNOLOGY")],
            relationships: vec![],
            subgraph: None,
        });

        let graph = View::of(&answered(resp), 80).graph.unwrap();
        assert_eq!(
            graph.entities,
            Some(vec!["GraphRAG (CONCEPT)".to_string(), "Qdrant (TECHNOLOGY)".to_string()])
        );
        assert!(graph.relationships.is_none());
    }

    #[test]
    fn clamp_keeps_short_text() {
        assert_eq!(clamp_lines("one two three", 3, 20), "one two three");
        assert_eq!(clamp_lines("one\n\ntwo", 3, 20), "one two");
    }

    #[test]
    fn clamp_wraps_and_cuts() {
        let text = "alpha beta gamma delta epsilon zeta eta theta";
        assert_eq!(clamp_lines(text, 2, 11), "alpha beta\ngamma delta…");
    }

    #[test]
    fn clamp_hard_splits_long_words() {
        assert_eq!(clamp_lines("abcdefghij", 5, 4), "abcd\nefgh\nij");
        assert_eq!(clamp_lines("abcdefghij", 1, 4), "abcd…");
    }

    #[test]
    fn upload_line_reflects_phase() {
        let mut panel = UploadPanel::default();
        assert_eq!(upload_line(&panel), None);

        panel.set_draft("text");
        panel.submit(chrono::Utc::now()).unwrap();
        assert_eq!(upload_line(&panel).as_deref(), Some("Uploading..."));
    }

    #[test]
    fn batch_report_counts_successes() {
        let results = vec![
            DocumentResponse { id: "d1".into(), status: "success".into(), message: "ok".into() },
            DocumentResponse { id: "unknown".into(), status: "error".into(), message: "boom".into() },
        ];
        let report = batch_report(&["a.txt".into(), "b.txt".into()], &results);

        assert!(report.starts_with("Batch upload: 1/2 documents succeeded"));
        assert!(report.contains("✗ b.txt -> unknown (boom)"));
    }

    #[test]
    fn query_health_lists_store_details() {
        let health: QueryServiceHealth = serde_json::from_value(serde_json::json!({
            "status": "healthy",
            "chroma": { "name": "documents", "count": 12 },
            "neo4j": {},
            "service": "Graph RAG Query Service"
        }))
        .unwrap();

        assert_eq!(
            query_health_report(&health),
            "Query service status: healthy (Graph RAG Query Service)\n  chroma   name=documents, count=12\n  neo4j    -"
        );
    }
}

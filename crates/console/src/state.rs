//! Per-action state for the console.
//!
//! Asking a question and uploading a document are independent cycles
//! (`idle -> pending -> answered | failed`). Each submission is stamped with a
//! [`Ticket`]; a completion carrying anything but the newest ticket is stale
//! and leaves the state alone, so an older response that arrives late can never
//! replace the answer to a newer question.

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use client::RequestFailure;
use schema::{DocumentResponse, DocumentUpload, QueryRequest, QueryResponse};

pub const QUERY_ALERT: &str = "Error processing query. Please try again.";
pub const UPLOAD_ERROR: &str = "Error uploading document. Please try again.";

/// Monotonic sequence number of a submission within one panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn seq(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Default)]
struct TicketCounter {
    last: u64,
}

impl TicketCounter {
    fn issue(&mut self) -> Ticket {
        self.last += 1;
        Ticket(self.last)
    }

    fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.last
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Applied,
    Stale,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum QueryPhase {
    #[default]
    Idle,
    Pending(Ticket),
    Answered(QueryResponse),
    Failed,
}

#[derive(Debug, Default)]
pub struct QueryPanel {
    phase: QueryPhase,
    tickets: TicketCounter,
    alert: Option<&'static str>,
}

impl QueryPanel {
    /// Starts a query for `input`, sent as typed. Blank input is ignored and
    /// returns `None`.
    pub fn submit(&mut self, input: &str) -> Option<(Ticket, QueryRequest)> {
        if input.trim().is_empty() {
            return None;
        }

        let ticket = self.tickets.issue();
        self.phase = QueryPhase::Pending(ticket);
        self.alert = None;
        Some((ticket, QueryRequest::with_graph_context(input)))
    }

    pub fn resolve(
        &mut self,
        ticket: Ticket,
        outcome: Result<QueryResponse, RequestFailure>,
    ) -> Resolution {
        if !self.tickets.is_current(ticket) {
            debug!(ticket = ticket.seq(), "Dropping response for superseded query");
            return Resolution::Stale;
        }

        match outcome {
            Ok(response) => {
                info!(
                    ticket = ticket.seq(),
                    confidence = response.confidence_score,
                    sources = response.sources.len(),
                    "Query answered"
                );
                self.phase = QueryPhase::Answered(response);
            }
            Err(failure) => {
                error!(
                    ticket = ticket.seq(),
                    kind = failure.kind(),
                    error = %failure,
                    "Error processing query"
                );
                self.phase = QueryPhase::Failed;
                self.alert = Some(QUERY_ALERT);
            }
        }
        Resolution::Applied
    }

    pub fn phase(&self) -> &QueryPhase {
        &self.phase
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.phase, QueryPhase::Pending(_))
    }

    /// The current answer, if the latest query succeeded.
    pub fn response(&self) -> Option<&QueryResponse> {
        match &self.phase {
            QueryPhase::Answered(response) => Some(response),
            _ => None,
        }
    }

    /// Takes the pending alert so it is shown once.
    pub fn take_alert(&mut self) -> Option<&'static str> {
        self.alert.take()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadStatus {
    Uploaded { id: String },
    Failed,
}

impl UploadStatus {
    pub fn message(&self) -> String {
        match self {
            UploadStatus::Uploaded { id } => format!("Document uploaded successfully! ID: {id}"),
            UploadStatus::Failed => UPLOAD_ERROR.to_string(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, UploadStatus::Failed)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum UploadPhase {
    #[default]
    Idle,
    Pending(Ticket),
    Done(UploadStatus),
}

#[derive(Debug, Default)]
pub struct UploadPanel {
    draft: String,
    phase: UploadPhase,
    tickets: TicketCounter,
}

impl UploadPanel {
    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn push_line(&mut self, line: &str) {
        if !self.draft.is_empty() {
            self.draft.push('\n');
        }
        self.draft.push_str(line);
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    pub fn discard_draft(&mut self) {
        self.draft.clear();
    }

    /// Starts uploading the draft. A blank draft is ignored.
    pub fn submit(&mut self, now: DateTime<Utc>) -> Option<(Ticket, DocumentUpload)> {
        if self.draft.trim().is_empty() {
            return None;
        }

        let ticket = self.tickets.issue();
        self.phase = UploadPhase::Pending(ticket);
        Some((ticket, DocumentUpload::manual(self.draft.clone(), now)))
    }

    pub fn resolve(
        &mut self,
        ticket: Ticket,
        outcome: Result<DocumentResponse, RequestFailure>,
    ) -> Resolution {
        if !self.tickets.is_current(ticket) {
            debug!(ticket = ticket.seq(), "Dropping response for superseded upload");
            return Resolution::Stale;
        }

        let status = match outcome {
            Ok(doc) => {
                info!(ticket = ticket.seq(), id = %doc.id, status = %doc.status, "Document uploaded");
                self.draft.clear();
                UploadStatus::Uploaded { id: doc.id }
            }
            Err(failure) => {
                // The draft stays so the user can retry.
                warn!(
                    ticket = ticket.seq(),
                    kind = failure.kind(),
                    error = %failure,
                    "Error uploading document"
                );
                UploadStatus::Failed
            }
        };
        self.phase = UploadPhase::Done(status);
        Resolution::Applied
    }

    pub fn phase(&self) -> &UploadPhase {
        &self.phase
    }

    pub fn is_uploading(&self) -> bool {
        matches!(self.phase, UploadPhase::Pending(_))
    }

    pub fn status(&self) -> Option<&UploadStatus> {
        match &self.phase {
            UploadPhase::Done(status) => Some(status),
            _ => None,
        }
    }
}

/// Everything the console shows, owned by the event loop.
#[derive(Debug, Default)]
pub struct AppState {
    pub query: QueryPanel,
    pub upload: UploadPanel,
}

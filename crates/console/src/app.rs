use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, warn};

use client::{BackendClient, RequestFailure};
use schema::{
    DocumentResponse, DocumentStats, DocumentUpload, HealthResponse, QueryResponse,
    QueryServiceHealth,
};

use crate::command::{Command, HELP};
use crate::render::{self, View};
use crate::state::{AppState, Resolution, Ticket};

/// Completion of a backend call, delivered back to the event loop.
#[derive(Debug)]
pub enum Event {
    QueryFinished {
        ticket: Ticket,
        outcome: Result<QueryResponse, RequestFailure>,
    },
    UploadFinished {
        ticket: Ticket,
        outcome: Result<DocumentResponse, RequestFailure>,
    },
    BatchFinished {
        filenames: Vec<String>,
        outcome: Result<Vec<DocumentResponse>, RequestFailure>,
    },
    HealthChecked(Result<HealthResponse, RequestFailure>),
    QueryHealthChecked(Result<QueryServiceHealth, RequestFailure>),
    StatsFetched(Result<DocumentStats, RequestFailure>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Print(String),
    Silent,
    Quit,
}

/// Owns the console state. Commands start backend calls on their own tasks;
/// the results come back as [`Event`]s on the receiver handed out by
/// [`App::new`] and are folded in with [`App::apply`].
pub struct App {
    client: BackendClient,
    state: AppState,
    events: UnboundedSender<Event>,
    wrap_width: usize,
    in_flight: usize,
    failures: usize,
}

impl App {
    pub fn new(client: BackendClient, wrap_width: usize) -> (Self, UnboundedReceiver<Event>) {
        let (events, rx) = mpsc::unbounded_channel();
        let app = Self {
            client,
            state: AppState::default(),
            events,
            wrap_width,
            in_flight: 0,
            failures: 0,
        };
        (app, rx)
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Backend calls started but not yet applied.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Commands that sent nothing plus failed outcomes applied so far
    /// (stale ones excluded).
    pub fn failures(&self) -> usize {
        self.failures
    }

    pub fn load_draft(&mut self, text: impl Into<String>) {
        self.state.upload.set_draft(text);
    }

    pub async fn dispatch(&mut self, command: Command) -> Reply {
        match command {
            Command::Ask(question) => self.ask(&question),
            Command::Doc(line) => {
                self.state.upload.push_line(&line);
                Reply::Silent
            }
            Command::Draft => Reply::Print(render::draft_summary(&self.state.upload)),
            Command::Discard => {
                self.state.upload.discard_draft();
                Reply::Print("Document draft cleared.".to_string())
            }
            Command::Upload => self.upload(),
            Command::UploadFile(path) => match read_document(&path).await {
                Ok(text) if !text.trim().is_empty() => {
                    self.state.upload.set_draft(text);
                    self.upload()
                }
                Ok(_) => {
                    self.failures += 1;
                    Reply::Print(format!("{} is empty, nothing to upload.", path.display()))
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Could not read document");
                    self.failures += 1;
                    Reply::Print(format!("{e:#}"))
                }
            },
            Command::Batch(paths) => self.batch(&paths).await,
            Command::Show => Reply::Print(self.render_all()),
            Command::Health => {
                let client = self.client.clone();
                self.spawn(async move { Event::HealthChecked(client.health().await) });
                Reply::Silent
            }
            Command::QueryHealth => {
                let client = self.client.clone();
                self.spawn(async move { Event::QueryHealthChecked(client.query_health().await) });
                Reply::Silent
            }
            Command::Stats => {
                let client = self.client.clone();
                self.spawn(async move { Event::StatsFetched(client.document_stats().await) });
                Reply::Silent
            }
            Command::Help => Reply::Print(HELP.to_string()),
            Command::Quit => Reply::Quit,
        }
    }

    fn ask(&mut self, question: &str) -> Reply {
        let Some((ticket, request)) = self.state.query.submit(question) else {
            return Reply::Silent;
        };

        let client = self.client.clone();
        self.spawn(async move {
            let outcome = client.query(&request).await;
            Event::QueryFinished { ticket, outcome }
        });
        Reply::Print("Processing...".to_string())
    }

    fn upload(&mut self) -> Reply {
        let Some((ticket, document)) = self.state.upload.submit(Utc::now()) else {
            self.failures += 1;
            return Reply::Print(render::draft_summary(&self.state.upload));
        };

        let client = self.client.clone();
        self.spawn(async move {
            let outcome = client.upload_document(&document).await;
            Event::UploadFinished { ticket, outcome }
        });
        Reply::Print("Uploading...".to_string())
    }

    async fn batch(&mut self, paths: &[PathBuf]) -> Reply {
        let now = Utc::now();
        let mut filenames = Vec::new();
        let mut documents = Vec::new();
        let mut skipped = Vec::new();

        for path in paths {
            match read_document(path).await {
                Ok(text) if !text.trim().is_empty() => {
                    let name = display_name(path);
                    documents.push(DocumentUpload::from_file(text, name.clone(), now));
                    filenames.push(name);
                }
                Ok(_) => skipped.push(format!("{} is empty, skipped", path.display())),
                Err(e) => skipped.push(format!("{e:#}, skipped")),
            }
        }

        if documents.is_empty() {
            self.failures += 1;
            skipped.push("Nothing to upload.".to_string());
            return Reply::Print(skipped.join("\n"));
        }

        skipped.push(format!("Uploading {} documents...", documents.len()));

        let client = self.client.clone();
        self.spawn(async move {
            let outcome = client.batch_upload(&documents).await;
            Event::BatchFinished { filenames, outcome }
        });
        Reply::Print(skipped.join("\n"))
    }

    /// Folds a completion into the state and returns what to print.
    pub fn apply(&mut self, event: Event) -> Option<String> {
        self.in_flight = self.in_flight.saturating_sub(1);

        match event {
            Event::QueryFinished { ticket, outcome } => {
                let failed = outcome.is_err();
                if self.state.query.resolve(ticket, outcome) == Resolution::Stale {
                    return None;
                }
                if failed {
                    self.failures += 1;
                }
                match self.state.query.take_alert() {
                    Some(alert) => Some(format!("⚠ {alert}")),
                    None => Some(self.render_view()),
                }
            }
            Event::UploadFinished { ticket, outcome } => {
                let failed = outcome.is_err();
                if self.state.upload.resolve(ticket, outcome) == Resolution::Stale {
                    return None;
                }
                if failed {
                    self.failures += 1;
                }
                render::upload_line(&self.state.upload)
            }
            Event::BatchFinished { filenames, outcome } => match outcome {
                Ok(results) => {
                    if results.iter().any(|r| !r.succeeded()) {
                        self.failures += 1;
                    }
                    Some(render::batch_report(&filenames, &results))
                }
                Err(failure) => {
                    warn!(kind = failure.kind(), error = %failure, "Error in batch upload");
                    self.failures += 1;
                    Some("✗ Error uploading documents. Please try again.".to_string())
                }
            },
            Event::HealthChecked(outcome) => match outcome {
                Ok(health) => {
                    if !health.is_healthy() {
                        self.failures += 1;
                    }
                    Some(render::health_report(&health))
                }
                Err(failure) => {
                    warn!(kind = failure.kind(), error = %failure, "Health check failed");
                    self.failures += 1;
                    Some(format!("✗ Backend health check failed: {failure}"))
                }
            },
            Event::QueryHealthChecked(outcome) => match outcome {
                Ok(health) => {
                    if !health.is_healthy() {
                        self.failures += 1;
                    }
                    Some(render::query_health_report(&health))
                }
                Err(failure) => {
                    warn!(kind = failure.kind(), error = %failure, "Query service health check failed");
                    self.failures += 1;
                    Some(format!("✗ Query service health check failed: {failure}"))
                }
            },
            Event::StatsFetched(outcome) => match outcome {
                Ok(stats) => Some(render::stats_report(&stats)),
                Err(failure) => {
                    warn!(kind = failure.kind(), error = %failure, "Fetching document stats failed");
                    self.failures += 1;
                    Some(format!("✗ Could not fetch document stats: {failure}"))
                }
            },
        }
    }

    /// Waits for every in-flight call and applies it, in completion order.
    pub async fn drain(&mut self, events: &mut UnboundedReceiver<Event>) -> Vec<String> {
        let mut printed = Vec::new();
        while self.in_flight > 0 {
            let Some(event) = events.recv().await else {
                break;
            };
            if let Some(text) = self.apply(event) {
                printed.push(text);
            }
        }
        printed
    }

    /// Reads commands from `input` until `quit` or end of input, printing
    /// replies and completions to `out` as they happen. At end of input the
    /// calls still in flight are awaited first.
    pub async fn run<R, W>(
        &mut self,
        events: &mut UnboundedReceiver<Event>,
        input: R,
        out: &mut W,
    ) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let mut lines = input.lines();

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line.context("Failed to read console input")? else {
                        for text in self.drain(events).await {
                            writeln!(out, "{text}")?;
                        }
                        return Ok(());
                    };

                    match Command::parse(&line) {
                        Ok(Some(command)) => match self.dispatch(command).await {
                            Reply::Print(text) => writeln!(out, "{text}")?,
                            Reply::Silent => {}
                            Reply::Quit => return Ok(()),
                        },
                        Ok(None) => {}
                        Err(e) => writeln!(out, "{e}")?,
                    }
                }
                Some(event) = events.recv() => {
                    if let Some(text) = self.apply(event) {
                        writeln!(out, "{text}")?;
                    }
                }
            }
            out.flush()?;
        }
    }

    /// Runs a single command to completion. Returns `false` if anything failed.
    pub async fn run_once<W: Write>(
        &mut self,
        events: &mut UnboundedReceiver<Event>,
        command: Command,
        out: &mut W,
    ) -> Result<bool> {
        let failures_before = self.failures;

        if let Reply::Print(text) = self.dispatch(command).await {
            writeln!(out, "{text}")?;
        }
        for text in self.drain(events).await {
            writeln!(out, "{text}")?;
        }
        Ok(self.failures == failures_before)
    }

    fn spawn<F>(&mut self, task: F)
    where
        F: Future<Output = Event> + Send + 'static,
    {
        let events = self.events.clone();
        self.in_flight += 1;
        tokio::spawn(async move {
            let event = task.await;
            if events.send(event).is_err() {
                debug!("Console closed before a backend call finished");
            }
        });
    }

    fn render_view(&self) -> String {
        View::of(&self.state.query, self.wrap_width)
            .to_string()
            .trim_end()
            .to_string()
    }

    fn render_all(&self) -> String {
        let mut sections = Vec::new();

        let view = View::of(&self.state.query, self.wrap_width);
        if view.is_empty() {
            sections.push("No answer yet. Ask a question with `ask <question>`.".to_string());
        } else {
            sections.push(view.to_string().trim_end().to_string());
        }
        if let Some(line) = render::upload_line(&self.state.upload) {
            sections.push(line);
        }
        sections.join("\n\n")
    }
}

async fn read_document(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Could not read {}", path.display()))
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

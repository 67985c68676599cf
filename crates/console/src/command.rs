use std::path::PathBuf;

use thiserror::Error;

pub const HELP: &str = "\
Commands:
  ask <question>        ask the backend a question (also: ? <question>)
  doc <text>            append a line to the document draft
  draft                 show the document draft
  discard               clear the document draft
  upload                upload the document draft
  upload-file <path>    load a file into the draft and upload it
  batch <path>...       upload several files in one request
  show                  show the current answer and upload status
  health                check backend health
  query-health          check the query service and what it sees of each store
  stats                 show document and entity counts
  help                  show this help
  quit                  leave the console";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Ask(String),
    Doc(String),
    Draft,
    Discard,
    Upload,
    UploadFile(PathBuf),
    Batch(Vec<PathBuf>),
    Show,
    Health,
    QueryHealth,
    Stats,
    Help,
    Quit,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command `{0}`; type `help` for the list")]
    Unknown(String),

    #[error("`{0}` needs an argument")]
    MissingArgument(&'static str),
}

impl Command {
    /// Parses one console line. Blank lines yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Command>, CommandError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word.to_ascii_lowercase().as_str() {
            // An empty question is passed through; submitting it is a no-op.
            "ask" | "?" => Command::Ask(rest.to_string()),
            "doc" => Command::Doc(rest.to_string()),
            "draft" => Command::Draft,
            "discard" => Command::Discard,
            "upload" => Command::Upload,
            "upload-file" => {
                if rest.is_empty() {
                    return Err(CommandError::MissingArgument("upload-file"));
                }
                Command::UploadFile(PathBuf::from(rest))
            }
            "batch" => {
                let files: Vec<PathBuf> = rest.split_whitespace().map(PathBuf::from).collect();
                if files.is_empty() {
                    return Err(CommandError::MissingArgument("batch"));
                }
                Command::Batch(files)
            }
            "show" => Command::Show,
            "health" => Command::Health,
            "query-health" => Command::QueryHealth,
            "stats" => Command::Stats,
            "help" | "h" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(Some(command))
    }
}

pub mod app;
pub mod command;
pub mod config;
pub mod logging;
pub mod render;
pub mod state;

pub use app::{App, Event, Reply};
pub use command::Command;
pub use config::{AppConfig, LogFormat};

pub mod backend;
pub mod error;

pub use backend::{BackendClient, DEFAULT_BASE_URL};
pub use error::RequestFailure;

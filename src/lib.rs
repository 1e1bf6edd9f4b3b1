//! Core of an AI chat assistant for code editors: builds prompts from editor
//! context, talks to a pluggable chat backend, parses replies into edit
//! proposals, and applies file changes with backups.

pub mod api;
pub mod cli;
pub mod commands;
pub mod errors;
pub mod file_processing;
pub mod models;
pub mod session;
pub mod utils;

pub use api::{build_prompt, BackendError, ChatBackend};
pub use errors::{AppError, FileSystemError};
pub use file_processing::{parse_response, FileChangeApplier, Preview, ResolutionContext};
pub use models::{ChatRequest, FileSet, ParsedResponse, PendingFileChange};
pub use session::ChatSession;

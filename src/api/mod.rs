pub mod client;
pub mod config;
pub mod errors;
pub mod prompt;

pub use client::{backend_from_config, ChatBackend, LocalChatApi, RemoteChatApi};
pub use config::{BackendConfig, BackendKind, SYSTEM_INSTRUCTION};
pub use errors::BackendError;
pub use prompt::{build_prompt, DEFAULT_LANGUAGE};

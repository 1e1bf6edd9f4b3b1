// src/api/config.rs

/// Base URL for the hosted, OpenAI-compatible chat API.
pub const REMOTE_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Base URL for a locally hosted Ollama server.
pub const LOCAL_BASE_URL: &str = "http://localhost:11434";

pub const DEFAULT_REMOTE_MODEL: &str = "deepseek-r1-distill-llama-70b";
pub const DEFAULT_LOCAL_MODEL: &str = "deepseek-r1:8b";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Shortest credential the remote backend will accept.
pub const MIN_API_KEY_LEN: usize = 10;

/// System instruction sent with every prompt.
///
/// The response parser relies on the model following it: language-tagged
/// fences for a single suggestion, filename-tagged fences for multi-file edits.
pub const SYSTEM_INSTRUCTION: &str = "You are a helpful AI programming assistant. When asked to improve or modify code:
1. Always provide a clear explanation of the changes.
2. Present the complete modified code in a fenced code block tagged with its language, for example ```python.
3. Explain the benefits of the changes.
4. If multiple files are involved, put each file in its own fenced block whose opening fence is the file name, for example ```src/utils.py, followed by the full content of that file.
";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Remote,
    Local,
}

/// Everything needed to construct a chat backend.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendConfig {
    pub kind: BackendKind,
    pub remote_model: String,
    pub remote_base_url: String,
    pub api_key: Option<String>,
    pub local_model: String,
    pub local_base_url: String,
    pub request_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: BackendKind::Remote,
            remote_model: DEFAULT_REMOTE_MODEL.to_string(),
            remote_base_url: REMOTE_BASE_URL.to_string(),
            api_key: None,
            local_model: DEFAULT_LOCAL_MODEL.to_string(),
            local_base_url: LOCAL_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl BackendConfig {
    /// Model name for the selected backend.
    pub fn model(&self) -> &str {
        match self.kind {
            BackendKind::Remote => &self.remote_model,
            BackendKind::Local => &self.local_model,
        }
    }
}

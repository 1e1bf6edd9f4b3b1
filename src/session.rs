//! Per-conversation state shared between the shell and the core.
//!
//! A session tracks the single outstanding chat request and owns the pending
//! file changes of the latest reply. The backend call runs on a tokio task so
//! the caller's event loop stays responsive.

use crate::api::{build_prompt, BackendError, ChatBackend, SYSTEM_INSTRUCTION};
use crate::file_processing::{parse_response, FileChangeApplier, ResolutionContext};
use crate::models::{ChatRequest, FileSet, ParsedResponse};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// A chat request running on a worker task.
pub struct RequestHandle {
    pub id: u64,
    handle: JoinHandle<Result<ParsedResponse, BackendError>>,
}

impl RequestHandle {
    /// Waits for the worker and returns its parsed reply.
    pub async fn wait(self) -> Result<ParsedResponse, BackendError> {
        self.handle
            .await
            .map_err(|e| BackendError::WorkerFailed(e.to_string()))?
    }
}

pub struct ChatSession {
    context: ResolutionContext,
    language: String,
    backup_before_overwrite: bool,
    next_request_id: u64,
    pending_request: Option<u64>,
    pending_changes: Option<FileChangeApplier>,
}

impl ChatSession {
    pub fn new(context: ResolutionContext, language: impl Into<String>) -> Self {
        Self {
            context,
            language: language.into(),
            backup_before_overwrite: true,
            next_request_id: 1,
            pending_request: None,
            pending_changes: None,
        }
    }

    pub fn backup_before_overwrite(mut self, enabled: bool) -> Self {
        self.backup_before_overwrite = enabled;
        self
    }

    /// Builds the prompt for `request` and sends it on a worker task.
    ///
    /// Starting a new request replaces the pending one without cancelling
    /// it; the older reply still arrives and can be displayed.
    pub fn send_request(
        &mut self,
        backend: Arc<dyn ChatBackend>,
        request: &ChatRequest,
    ) -> RequestHandle {
        let id = self.next_request_id;
        self.next_request_id += 1;
        if let Some(previous) = self.pending_request.replace(id) {
            log::debug!("Request {} superseded by {}", previous, id);
        }

        let prompt = build_prompt(
            &request.query,
            &request.primary_context,
            &request.auxiliary_files,
            &self.language,
        );
        log::debug!("Sending request {} to {}", id, backend.describe());

        let handle = tokio::spawn(async move {
            let raw = backend.send(&prompt, SYSTEM_INSTRUCTION).await?;
            Ok(parse_response(&raw))
        });

        RequestHandle { id, handle }
    }

    /// Id of the request whose reply the shell is waiting on.
    pub fn pending_request(&self) -> Option<u64> {
        self.pending_request
    }

    /// Marks request `id` as answered. Returns false when a newer request has
    /// replaced it.
    pub fn complete(&mut self, id: u64) -> bool {
        if self.pending_request == Some(id) {
            self.pending_request = None;
            true
        } else {
            false
        }
    }

    /// Starts an apply session for a multi-file proposal, dropping the
    /// previous turn's pending changes.
    pub fn accept_changes(&mut self, files: &FileSet) -> &mut FileChangeApplier {
        let applier = FileChangeApplier::new(files, self.context.clone())
            .backup_before_overwrite(self.backup_before_overwrite);
        self.pending_changes.insert(applier)
    }

    pub fn pending_changes(&mut self) -> Option<&mut FileChangeApplier> {
        self.pending_changes.as_mut()
    }

    /// Ends the apply session.
    pub fn finish_changes(&mut self) -> Option<FileChangeApplier> {
        self.pending_changes.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Replies with canned text and remembers what it was sent.
    struct ScriptedBackend {
        reply: Result<String, String>,
        prompts: Mutex<Vec<(String, String)>>,
    }

    impl ScriptedBackend {
        fn replying(text: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(text.to_string()),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn failing(reason: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(reason.to_string()),
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ChatBackend for ScriptedBackend {
        async fn send(
            &self,
            prompt: &str,
            system_instruction: &str,
        ) -> Result<String, BackendError> {
            self.prompts
                .lock()
                .unwrap()
                .push((prompt.to_string(), system_instruction.to_string()));
            self.reply.clone().map_err(BackendError::ApiError)
        }

        fn describe(&self) -> String {
            "scripted".to_string()
        }
    }

    fn session() -> ChatSession {
        ChatSession::new(ResolutionContext::new("/work"), "python")
    }

    #[tokio::test]
    async fn request_is_built_sent_and_parsed() {
        let backend = ScriptedBackend::replying("Fixed:\n```python\nx = 2\n```");
        let mut session = session();
        let request = ChatRequest::new(
            "fix x",
            "x = 1",
            vec![("/work/a.py".to_string(), "a = 1".to_string())],
        );

        let handle = session.send_request(backend.clone(), &request);
        let id = handle.id;
        let response = handle.wait().await.unwrap();

        assert_eq!(
            response,
            ParsedResponse::CodeSuggestion {
                code: "x = 2\n".to_string(),
                explanation: "Fixed:".to_string(),
            }
        );
        assert!(session.complete(id));
        assert_eq!(session.pending_request(), None);

        let prompts = backend.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].0.starts_with("Here's my main code:\n```python\nx = 1\n```"));
        assert!(prompts[0].0.contains("File: /work/a.py"));
        assert!(prompts[0].0.ends_with("My question: fix x"));
        assert_eq!(prompts[0].1, SYSTEM_INSTRUCTION);
    }

    #[tokio::test]
    async fn backend_failure_is_returned_verbatim() {
        let backend = ScriptedBackend::failing("invalid api key");
        let mut session = session();

        let err = session
            .send_request(backend, &ChatRequest::new("q", "", Vec::new()))
            .wait()
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "API returned an error: invalid api key");
    }

    #[tokio::test]
    async fn stale_reply_is_still_delivered() {
        let mut session = session();
        let first = session.send_request(
            ScriptedBackend::replying("first answer"),
            &ChatRequest::new("one", "", Vec::new()),
        );
        let second = session.send_request(
            ScriptedBackend::replying("second answer"),
            &ChatRequest::new("two", "", Vec::new()),
        );
        let (first_id, second_id) = (first.id, second.id);
        assert_eq!(session.pending_request(), Some(second_id));

        let stale = first.wait().await.unwrap();
        assert_eq!(stale.explanation(), "first answer");
        assert!(!session.complete(first_id));
        assert_eq!(session.pending_request(), Some(second_id));

        second.wait().await.unwrap();
        assert!(session.complete(second_id));
    }

    #[test]
    fn accepting_changes_replaces_previous_turn() {
        let mut session = session();
        let first: FileSet = [("a.py", "a")].into_iter().collect();
        let second: FileSet = [("b.py", "b"), ("c.py", "c")].into_iter().collect();

        assert_eq!(session.accept_changes(&first).len(), 1);
        assert_eq!(session.accept_changes(&second).len(), 2);

        let applier = session.finish_changes().unwrap();
        assert_eq!(applier.filenames().collect::<Vec<_>>(), vec!["b.py", "c.py"]);
        assert!(session.pending_changes().is_none());
    }
}

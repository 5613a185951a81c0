//! Asking the user for a line of text.
//!
//! An `askstring` effect suspends the whole effect queue until the user
//! answers: nothing the server sent after the question is shown before
//! the answer goes out.

use std::future::Future;

use tokio::sync::{mpsc, oneshot};

/// Something that can put a question to the user.
pub trait Prompter: Send + 'static {
    /// Shows `prompt` and waits for the answer. `None` means the user
    /// dismissed the prompt.
    fn ask(&mut self, prompt: &str) -> impl Future<Output = Option<String>> + Send;
}

/// A question waiting for an answer, handed out by [`ChannelPrompter`].
///
/// Dropping the request without answering counts as a dismissal.
#[derive(Debug)]
pub struct PromptRequest {
    pub prompt: String,
    reply: oneshot::Sender<Option<String>>,
}

impl PromptRequest {
    pub fn answer(self, answer: impl Into<String>) {
        let _ = self.reply.send(Some(answer.into()));
    }

    pub fn dismiss(self) {
        let _ = self.reply.send(None);
    }
}

/// Forwards each question over a channel to whoever owns the user
/// interface, then waits for their reply.
#[derive(Debug, Clone)]
pub struct ChannelPrompter {
    requests: mpsc::UnboundedSender<PromptRequest>,
}

impl ChannelPrompter {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<PromptRequest>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { requests: tx }, rx)
    }
}

impl Prompter for ChannelPrompter {
    async fn ask(&mut self, prompt: &str) -> Option<String> {
        let (reply, answer) = oneshot::channel();
        let request = PromptRequest {
            prompt: prompt.to_string(),
            reply,
        };
        if self.requests.send(request).is_err() {
            tracing::warn!(prompt, "nobody is listening for prompts, dismissing");
            return None;
        }
        answer.await.unwrap_or(None)
    }
}

/// Dismisses every prompt straight away.
#[derive(Debug, Clone, Copy, Default)]
pub struct DismissPrompts;

impl Prompter for DismissPrompts {
    async fn ask(&mut self, prompt: &str) -> Option<String> {
        tracing::debug!(prompt, "prompt dismissed");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_channel_prompter_round_trip() {
        let (mut prompter, mut requests) = ChannelPrompter::new();
        let ui = tokio::spawn(async move {
            let request = requests.recv().await.unwrap();
            assert_eq!(request.prompt, "Promote to?");
            request.answer("Q");
        });

        assert_eq!(prompter.ask("Promote to?").await.as_deref(), Some("Q"));
        ui.await.unwrap();
    }

    #[tokio::test]
    async fn test_dropped_request_is_a_dismissal() {
        let (mut prompter, mut requests) = ChannelPrompter::new();
        tokio::spawn(async move {
            drop(requests.recv().await);
        });
        assert_eq!(prompter.ask("name?").await, None);
    }

    #[tokio::test]
    async fn test_closed_receiver_is_a_dismissal() {
        let (mut prompter, requests) = ChannelPrompter::new();
        drop(requests);
        assert_eq!(prompter.ask("name?").await, None);
    }
}

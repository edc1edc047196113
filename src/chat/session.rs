//! A single learner's chat session with the study assistant.
//!
//! The session owns its transcript and a busy flag. `send` appends the
//! user's message right away and returns an `Exchange`: a lazy stream
//! of transcript snapshots, one per content delta, that ends when the
//! reply is complete. Only one exchange may be in flight per session.
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use futures::stream::BoxStream;
use futures_util::StreamExt;
use uuid::Uuid;

use super::endpoint::BoxedChatEndpoint;
use super::error::{ExchangeError, SendError};
use super::models::{ChatRequest, Message, Role, Transcript};
use super::prompts::suggested_questions;
use super::stream::content_deltas;
use crate::core::AppConfig;
use crate::notify::{BoxedNotifier, Notice, Notifier};

/// Snapshots of the transcript while a reply streams in. Finite and not
/// restartable; dropping it abandons the request.
pub type Exchange = BoxStream<'static, Result<Transcript, ExchangeError>>;

/// Explicit session state. At most the trailing assistant message is
/// open; everything before it is immutable.
#[derive(Debug, Default)]
pub struct SessionState {
    transcript: Transcript,
    busy: bool,
    assistant_open: bool,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// True between sending and the first content delta.
    pub fn awaiting_reply(&self) -> bool {
        self.busy && matches!(self.transcript.last(), Some(m) if m.role == Role::User)
    }

    pub fn append_user(&mut self, content: &str) -> Result<(), SendError> {
        if self.busy {
            return Err(SendError::Busy);
        }
        if content.trim().is_empty() {
            return Err(SendError::EmptyMessage);
        }
        self.transcript.push(Message::user(content));
        self.busy = true;
        self.assistant_open = false;
        Ok(())
    }

    pub fn begin_assistant(&mut self, content: &str) {
        if !self.busy {
            tracing::warn!("Ignoring assistant message outside of an exchange");
            return;
        }
        if self.assistant_open {
            self.update_assistant(content);
            return;
        }
        self.transcript.push(Message::assistant(content));
        self.assistant_open = true;
    }

    /// Sets the open assistant message to `content`, creating it on the
    /// first call. Replaces rather than appends, so repeating a call
    /// with the same content changes nothing.
    pub fn update_assistant(&mut self, content: &str) {
        if !self.assistant_open {
            self.begin_assistant(content);
            return;
        }
        if let Some(last) = self.transcript.last_mut() {
            if last.content != content {
                last.content = content.to_string();
            }
        }
    }

    pub fn complete_exchange(&mut self) {
        self.busy = false;
        self.assistant_open = false;
    }

    /// Closes the exchange. Partial assistant content stays visible.
    pub fn fail_exchange(&mut self, error: &ExchangeError) {
        tracing::error!("Chat exchange failed: {}", error);
        self.complete_exchange();
    }
}

fn read_state(state: &RwLock<SessionState>) -> RwLockReadGuard<'_, SessionState> {
    state.read().unwrap_or_else(PoisonError::into_inner)
}

fn write_state(state: &RwLock<SessionState>) -> RwLockWriteGuard<'_, SessionState> {
    state.write().unwrap_or_else(PoisonError::into_inner)
}

/// Closes the exchange on every exit path, including the consumer
/// dropping the stream part way through.
struct ExchangeGuard {
    state: Arc<RwLock<SessionState>>,
    finished: bool,
}

impl ExchangeGuard {
    fn new(state: Arc<RwLock<SessionState>>) -> Self {
        Self {
            state,
            finished: false,
        }
    }

    fn update(&self, content: &str) -> Transcript {
        let mut state = write_state(&self.state);
        state.update_assistant(content);
        state.transcript().clone()
    }

    fn complete(&mut self) {
        write_state(&self.state).complete_exchange();
        self.finished = true;
    }

    fn fail(&mut self, error: &ExchangeError, notifier: &dyn Notifier) {
        write_state(&self.state).fail_exchange(error);
        self.finished = true;
        notifier.notify(Notice::error(&error.to_string()));
    }
}

impl Drop for ExchangeGuard {
    fn drop(&mut self) {
        if !self.finished {
            tracing::debug!("Exchange abandoned before the reply finished");
            write_state(&self.state).complete_exchange();
        }
    }
}

#[derive(Clone)]
pub struct ChatSession {
    id: Uuid,
    subject: Option<String>,
    idle_timeout: Duration,
    endpoint: BoxedChatEndpoint,
    notifier: BoxedNotifier,
    state: Arc<RwLock<SessionState>>,
}

impl ChatSession {
    pub fn new(endpoint: BoxedChatEndpoint, notifier: BoxedNotifier) -> Self {
        Self {
            id: Uuid::new_v4(),
            subject: None,
            idle_timeout: AppConfig::default().idle_timeout,
            endpoint,
            notifier,
            state: Arc::new(RwLock::new(SessionState::new())),
        }
    }

    pub fn from_config(
        config: &AppConfig,
        endpoint: BoxedChatEndpoint,
        notifier: BoxedNotifier,
    ) -> Self {
        Self::new(endpoint, notifier)
            .with_subject(config.subject.clone())
            .with_idle_timeout(config.idle_timeout)
    }

    pub fn with_subject(mut self, subject: Option<String>) -> Self {
        self.subject = subject;
        self
    }

    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    pub fn suggested_questions(&self) -> Vec<String> {
        suggested_questions(self.subject())
    }

    pub fn transcript(&self) -> Transcript {
        read_state(&self.state).transcript().clone()
    }

    pub fn is_busy(&self) -> bool {
        read_state(&self.state).is_busy()
    }

    pub fn awaiting_reply(&self) -> bool {
        read_state(&self.state).awaiting_reply()
    }

    /// Appends `content` as the user's message and starts the reply.
    /// Nothing is sent until the returned stream is polled.
    pub fn send(&self, content: &str) -> Result<Exchange, SendError> {
        let request = {
            let mut state = write_state(&self.state);
            state.append_user(content)?;
            ChatRequest {
                messages: state.transcript().messages(),
                subject: self.subject.clone(),
            }
        };

        tracing::debug!(
            session_id = %self.id,
            messages = request.messages.len(),
            "Sending chat request"
        );

        let mut exchange = ExchangeGuard::new(Arc::clone(&self.state));
        let endpoint = Arc::clone(&self.endpoint);
        let notifier = Arc::clone(&self.notifier);
        let idle_timeout = self.idle_timeout;
        let session_id = self.id;

        Ok(Box::pin(async_stream::stream! {
            let body = match endpoint.open(&request).await {
                Ok(body) => body,
                Err(e) => {
                    exchange.fail(&e, notifier.as_ref());
                    yield Err(e);
                    return;
                }
            };

            let mut deltas = content_deltas(body, idle_timeout);
            let mut accumulated = String::new();

            while let Some(delta) = deltas.next().await {
                match delta {
                    Ok(delta) => {
                        accumulated.push_str(&delta);
                        yield Ok(exchange.update(&accumulated));
                    }
                    Err(e) => {
                        exchange.fail(&e, notifier.as_ref());
                        yield Err(e);
                        return;
                    }
                }
            }

            exchange.complete();
            tracing::debug!(
                session_id = %session_id,
                chars = accumulated.chars().count(),
                "Chat reply complete"
            );
        }))
    }
}

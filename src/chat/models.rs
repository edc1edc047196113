//! The core models for a study assistant chat session.
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub enum Role {
    #[serde(rename = "assistant")]
    Assistant,
    #[serde(rename = "user")]
    User,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: &str) -> Self {
        Message {
            role,
            content: content.to_string(),
        }
    }

    pub fn user(content: &str) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: &str) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Conversation in insertion order. Only the owning session appends to
/// it or rewrites the trailing assistant message.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Transcript(Vec<Message>);

impl Transcript {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn messages(&self) -> Vec<Message> {
        self.0.clone()
    }

    pub fn push(&mut self, msg: Message) {
        self.0.push(msg)
    }

    pub fn last(&self) -> Option<&Message> {
        self.0.last()
    }

    pub fn last_mut(&mut self) -> Option<&mut Message> {
        self.0.last_mut()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.0.iter()
    }
}

/// Body posted to the chat endpoint.
#[derive(Clone, Serialize, Debug)]
pub struct ChatRequest {
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

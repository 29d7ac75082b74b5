// The chat widget's transcript: role-tagged messages in append order.

use chrono::Local;
use serde::Serialize;

pub const GREETING: &str =
    "Hello! Describe your interests, skills and location so I can help you find social causes.";

/// Who produced a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    Error,
    Loading,
    Info,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Error => "error",
            Role::Loading => "loading",
            Role::Info => "info",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub timestamp: String,
    pub role: Role,
    pub text: String,
}

#[derive(Debug, Default)]
pub struct Chat {
    messages: Vec<ChatMessage>,
}

impl Chat {
    pub fn new() -> Self {
        Self::default()
    }

    /// A transcript that opens with the assistant's greeting, as shown on a fresh page.
    pub fn with_greeting() -> Self {
        let mut chat = Self::new();
        chat.append(GREETING, Role::Assistant);
        chat
    }

    pub fn append(&mut self, text: impl Into<String>, role: Role) {
        let timestamp = Local::now().format("%H:%M:%S").to_string();
        self.messages.push(ChatMessage {
            timestamp,
            role,
            text: text.into(),
        });
    }

    /// Removes the first message tagged with `role`, if any.
    pub fn remove(&mut self, role: Role) -> Option<ChatMessage> {
        let idx = self.messages.iter().position(|m| m.role == role)?;
        Some(self.messages.remove(idx))
    }

    pub fn clear(&mut self) {
        self.messages.clear();
        self.append(GREETING, Role::Assistant);
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn count(&self, role: Role) -> usize {
        self.messages.iter().filter(|m| m.role == role).count()
    }

    /// Plain-text rendering used by the `ask` command.
    pub fn to_plain_text(&self) -> String {
        self.messages
            .iter()
            .map(|m| match m.role {
                Role::Error => format!("{} {}: Error: {}", m.timestamp, m.role.as_str(), m.text),
                _ => format!("{} {}: {}", m.timestamp, m.role.as_str(), m.text),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

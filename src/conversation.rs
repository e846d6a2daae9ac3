//! Append-only conversation log
//!
//! Entries are never edited. The only removal is `clear`, which drops every
//! user and assistant entry and keeps the welcome message.

use chrono::{DateTime, Local};

use crate::client::{ResponseEnvelope, ResponseMetadata};
use crate::models::Mode;

pub const WELCOME: &str = "Welcome! Ask anything and press Enter. \
F2 switches mode, F3 picks a model, F4 toggles web access.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

/// Timing summary attached to an assistant entry
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Timing {
    pub started_at: Option<String>,
    pub finished_at: Option<String>,
    pub duration_seconds: Option<f64>,
    pub iteration_count: Option<u32>,
    pub search_count: Option<u32>,
    pub network_allowed: Option<bool>,
}

impl From<ResponseMetadata> for Timing {
    fn from(m: ResponseMetadata) -> Self {
        Self {
            started_at: m.started_at,
            finished_at: m.finished_at,
            duration_seconds: m.duration_seconds,
            iteration_count: m.iteration_count,
            search_count: m.search_count,
            network_allowed: m.network_allowed,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatEntry {
    pub role: Role,
    pub text: String,
    pub mode: Option<Mode>,
    pub model_used: Option<String>,
    pub reasoning_steps: Option<Vec<String>>,
    pub timing: Option<Timing>,
    pub created_at: DateTime<Local>,
}

impl ChatEntry {
    pub fn user(text: &str) -> Self {
        Self {
            role: Role::User,
            text: text.to_string(),
            mode: None,
            model_used: None,
            reasoning_steps: None,
            timing: None,
            created_at: Local::now(),
        }
    }

    /// Build the assistant entry for a successful reply.
    /// `reasoning` overrides whatever trace the envelope carries.
    pub fn assistant(resp: ResponseEnvelope, reasoning: Option<Vec<String>>) -> Self {
        let mode = resp.mode();
        let reasoning_steps = reasoning.or_else(|| resp.reasoning());
        Self {
            role: Role::Assistant,
            text: resp.answer_text.unwrap_or_default(),
            mode,
            model_used: resp.model_used,
            reasoning_steps,
            timing: resp.metadata.map(Timing::from),
            created_at: Local::now(),
        }
    }

    /// Reasoning worth showing: present and non-empty
    pub fn visible_reasoning(&self) -> Option<&[String]> {
        match &self.reasoning_steps {
            Some(steps) if !steps.is_empty() => Some(steps.as_slice()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Conversation {
    welcome: String,
    entries: Vec<ChatEntry>,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new(WELCOME)
    }
}

impl Conversation {
    pub fn new(welcome: &str) -> Self {
        Self {
            welcome: welcome.to_string(),
            entries: Vec::new(),
        }
    }

    pub fn welcome(&self) -> &str {
        &self.welcome
    }

    pub fn entries(&self) -> &[ChatEntry] {
        &self.entries
    }

    pub fn append(&mut self, entry: ChatEntry) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn count(&self, role: Role) -> usize {
        self.entries.iter().filter(|e| e.role == role).count()
    }

    /// Drop all user/assistant entries; returns how many went
    pub fn clear(&mut self) -> usize {
        let removed = self.entries.len();
        self.entries.clear();
        removed
    }
}

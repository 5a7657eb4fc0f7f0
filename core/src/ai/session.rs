use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::ai::{AiError, ChatProvider, ImportError, ImportProvider, ImportSource};
use crate::model::entity::Entity;
use crate::model::import::AiImportResult;
use crate::model::school::SchoolState;
use crate::service::import_service;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImportStatus {
    #[default]
    Idle,
    Processing,
    Review,
    Completed,
    Error,
}

/// Proof that a caller started the import currently in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportTicket(u64);

/// Tracks one AI import from request to merge. Only one request may be in
/// flight; cancelling makes any outstanding ticket stale so its result is
/// dropped when it eventually arrives.
#[derive(Debug, Default)]
pub struct ImportSession {
    status: ImportStatus,
    result: Option<AiImportResult>,
    last_error: Option<String>,
    generation: u64,
}

impl ImportSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> ImportStatus {
        self.status
    }

    pub fn result(&self) -> Option<&AiImportResult> {
        self.result.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn begin(&mut self) -> Result<ImportTicket, ImportError> {
        if self.status == ImportStatus::Processing {
            return Err(ImportError::Busy);
        }
        self.generation += 1;
        self.status = ImportStatus::Processing;
        self.result = None;
        self.last_error = None;
        Ok(ImportTicket(self.generation))
    }

    /// Delivers the outcome for `ticket`. Returns false if the ticket is
    /// stale and the outcome was discarded.
    pub fn complete(&mut self, ticket: ImportTicket, outcome: Result<AiImportResult, AiError>) -> bool {
        if ticket.0 != self.generation || self.status != ImportStatus::Processing {
            debug!("discarding stale import result");
            return false;
        }
        match outcome {
            Ok(result) => {
                self.result = Some(result);
                self.status = ImportStatus::Review;
            }
            Err(e) => {
                warn!(error = %e, "AI import failed");
                self.last_error = Some(e.to_string());
                self.status = ImportStatus::Error;
            }
        }
        true
    }

    /// Synchronous begin, extract and complete.
    pub fn run(
        &mut self,
        provider: &dyn ImportProvider,
        source: &ImportSource,
    ) -> Result<&AiImportResult, ImportError> {
        let ticket = self.begin()?;
        match provider.extract(source) {
            Ok(result) => {
                self.complete(ticket, Ok(result));
                self.result.as_ref().ok_or(ImportError::NotInReview)
            }
            Err(e) => {
                warn!(error = %e, "AI import failed");
                self.last_error = Some(e.to_string());
                self.status = ImportStatus::Error;
                Err(ImportError::Gateway(e))
            }
        }
    }

    pub fn cancel(&mut self) {
        self.generation += 1;
        self.status = ImportStatus::Idle;
        self.result = None;
        self.last_error = None;
    }

    /// Merges the reviewed result into `entities` and closes the session.
    pub fn finalize(
        &mut self,
        entities: &[Entity],
        mappings: &BTreeMap<String, String>,
    ) -> Result<Vec<Entity>, ImportError> {
        if self.status != ImportStatus::Review {
            return Err(ImportError::NotInReview);
        }
        let result = self.result.take().ok_or(ImportError::NotInReview)?;
        let merged = import_service::finalize(entities, &result, mappings);
        self.status = ImportStatus::Completed;
        Ok(merged)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    fn new(role: ChatRole, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

pub const CHAT_ERROR_REPLY: &str = "Error processing request.";
const CHAT_EMPTY_REPLY: &str = "I couldn't generate a response.";

/// System instruction carrying the school's timetable. Only entities with
/// at least one slot are included.
pub fn chat_instruction(state: &SchoolState) -> String {
    let scheduled: Vec<&Entity> = state
        .entities
        .iter()
        .filter(|e| !e.schedule.is_empty())
        .collect();
    let data = serde_json::to_string(&serde_json::json!({
        "entities": scheduled,
        "timeSlots": state.time_slots,
    }))
    .unwrap_or_default();
    format!(
        "You are an AI assistant for {}.\nAnswer questions based on this data: {}\nBe helpful and concise.",
        state.school_name, data
    )
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatSession {
    messages: Vec<ChatMessage>,
}

impl ChatSession {
    pub fn new(school_name: &str) -> Self {
        Self {
            messages: vec![ChatMessage::new(
                ChatRole::Model,
                format!(
                    "Hello! I am the {} Assistant. Ask me about the timetable, teachers, or class schedules.",
                    school_name
                ),
            )],
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Appends the question and the model's reply. A failed call still
    /// appends a reply, carrying a fixed error text.
    pub fn ask(&mut self, provider: &dyn ChatProvider, state: &SchoolState, question: &str) -> &ChatMessage {
        self.messages.push(ChatMessage::new(ChatRole::User, question));
        let reply = match provider.answer(&chat_instruction(state), question) {
            Ok(text) if text.trim().is_empty() => CHAT_EMPTY_REPLY.to_string(),
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "AI chat failed");
                CHAT_ERROR_REPLY.to_string()
            }
        };
        self.messages.push(ChatMessage::new(ChatRole::Model, reply));
        &self.messages[self.messages.len() - 1]
    }
}

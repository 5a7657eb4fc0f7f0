//! Ports to the hosted model. The core never talks to the network itself;
//! callers hand in an [`ImportProvider`] or [`ChatProvider`].

pub mod command;
pub mod response;
pub mod session;

use thiserror::Error;

use crate::model::import::AiImportResult;

pub use command::CommandProvider;
pub use response::parse_import_response;
pub use session::{ChatMessage, ChatRole, ChatSession, ImportSession, ImportStatus, ImportTicket};

#[derive(Debug, Error)]
pub enum AiError {
    #[error("No AI command configured (set ai.command in config.json)")]
    NotConfigured,
    #[error("Nothing to import")]
    EmptyInput,
    #[error("Failed to run AI command: {0}")]
    Io(#[from] std::io::Error),
    #[error("AI command exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },
    #[error("AI response is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("AI response is not valid UTF-8")]
    Utf8,
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("An import is already in progress")]
    Busy,
    #[error("No import is awaiting review")]
    NotInReview,
    #[error(transparent)]
    Gateway(#[from] AiError),
}

/// What to extract a timetable from.
#[derive(Debug, Clone, PartialEq)]
pub enum ImportSource {
    Document { bytes: Vec<u8>, mime_type: String },
    Text(String),
}

pub trait ImportProvider {
    fn extract(&self, source: &ImportSource) -> Result<AiImportResult, AiError>;
}

pub trait ChatProvider {
    fn answer(&self, system_instruction: &str, prompt: &str) -> Result<String, AiError>;
}

pub const IMPORT_INSTRUCTION: &str = r#"You are an expert timetable data extractor.
Analyze the provided document (PDF, image or text) and extract the timetable data exactly.

First decide whether the document is "TEACHER_WISE" (main headers are teacher names) or
"CLASS_WISE" (main headers are class names).

Return a JSON object with this exact structure:
{
  "detectedType": "TEACHER_WISE" or "CLASS_WISE",
  "profiles": [
    {
      "name": "Name of the teacher or class",
      "schedule": {
        "Mon": { "1": { "subject": "MATH", "room": "R1", "code": "The code found in this slot" } }
      }
    }
  ],
  "unknownCodes": ["every", "unique", "code", "found", "inside", "the", "slots"]
}

Rules:
1. In a TEACHER_WISE timetable the "code" inside a slot is the class code (e.g. "10A", "G9").
2. In a CLASS_WISE timetable the "code" inside a slot is the teacher code (e.g. "JD", "SMT").
3. Extract ALL profiles found in the document.
4. Days are Sat, Sun, Mon, Tue, Wed, Thu.
5. "unknownCodes" lists each slot code once."#;

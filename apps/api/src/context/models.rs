use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;

/// The two kinds of fact a user can accumulate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextKind {
    Qa,
    Document,
}

impl ContextKind {
    pub const ALL: [ContextKind; 2] = [ContextKind::Qa, ContextKind::Document];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContextKind::Qa => "qa",
            ContextKind::Document => "document",
        }
    }
}

impl fmt::Display for ContextKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContextKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContextKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| {
                let valid: Vec<&str> = ContextKind::ALL.iter().map(|k| k.as_str()).collect();
                AppError::Validation(format!(
                    "Invalid context type: {s}. Valid types are: {}",
                    valid.join(", ")
                ))
            })
    }
}

/// A validated fact ready to be appended to a user's context.
#[derive(Debug, Clone, PartialEq)]
pub enum ContextPayload {
    Qa { question: String, answer: String },
    Document { title: String, content: String },
}

/// Loosely-typed `data` object as it arrives on the wire. Which fields are
/// required depends on the accompanying context kind.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContextFields {
    pub question: Option<String>,
    pub answer: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
}

impl ContextPayload {
    /// Builds a payload from a kind and its raw fields, rejecting missing or
    /// blank required fields.
    pub fn from_fields(kind: ContextKind, fields: ContextFields) -> Result<Self, AppError> {
        let payload = match kind {
            ContextKind::Qa => ContextPayload::Qa {
                question: required(fields.question, "question", kind)?,
                answer: required(fields.answer, "answer", kind)?,
            },
            ContextKind::Document => ContextPayload::Document {
                title: required(fields.title, "title", kind)?,
                content: required(fields.content, "content", kind)?,
            },
        };
        Ok(payload)
    }

    pub fn kind(&self) -> ContextKind {
        match self {
            ContextPayload::Qa { .. } => ContextKind::Qa,
            ContextPayload::Document { .. } => ContextKind::Document,
        }
    }

    /// Re-checks required fields. Payloads can be constructed directly, so the
    /// store calls this before appending.
    pub fn validate(&self) -> Result<(), AppError> {
        let kind = self.kind();
        let fields: [(&str, &str); 2] = match self {
            ContextPayload::Qa { question, answer } => {
                [("question", question.as_str()), ("answer", answer.as_str())]
            }
            ContextPayload::Document { title, content } => {
                [("title", title.as_str()), ("content", content.as_str())]
            }
        };
        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(missing_field(name, kind));
            }
        }
        Ok(())
    }
}

fn required(value: Option<String>, name: &str, kind: ContextKind) -> Result<String, AppError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(missing_field(name, kind)),
    }
}

fn missing_field(name: &str, kind: ContextKind) -> AppError {
    AppError::Validation(format!("{kind} context requires a non-empty '{name}'"))
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QaEntry {
    pub id: Uuid,
    pub question: String,
    pub answer: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentEntry {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Everything accumulated for one user. Entries are append-only and kept in
/// insertion order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserContext {
    pub qa: Vec<QaEntry>,
    pub documents: Vec<DocumentEntry>,
    /// `None` for the empty view returned for unknown users.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl UserContext {
    pub fn is_empty(&self) -> bool {
        self.qa.is_empty() && self.documents.is_empty()
    }

    pub fn len(&self) -> usize {
        self.qa.len() + self.documents.len()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreAck {
    pub success: bool,
    pub context_id: Uuid,
}

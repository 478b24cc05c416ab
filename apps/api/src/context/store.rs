//! In-memory, per-user context store.
//!
//! Each user's record is created lazily on first write and lives until
//! `clear_context` or process exit. All mutations take the write lock, which
//! serializes appends for a given user. User ids are keyed with surrounding
//! whitespace trimmed.

use std::collections::HashMap;

use chrono::Utc;
use parking_lot::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::context::models::{ContextPayload, DocumentEntry, QaEntry, StoreAck, UserContext};
use crate::errors::AppError;

#[derive(Debug, Default)]
pub struct ContextStore {
    contexts: RwLock<HashMap<String, UserContext>>,
}

impl ContextStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a fact to the user's context, creating the record if needed.
    /// Returns the id of the new entry.
    pub fn store_context(
        &self,
        user_id: &str,
        payload: ContextPayload,
    ) -> Result<StoreAck, AppError> {
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Err(AppError::Validation("userId is required".to_string()));
        }
        payload.validate()?;

        let id = Uuid::new_v4();
        let now = Utc::now();
        let kind = payload.kind();

        let mut contexts = self.contexts.write();
        let context = contexts
            .entry(user_id.to_string())
            .or_insert_with(|| UserContext {
                created_at: Some(now),
                ..Default::default()
            });

        match payload {
            ContextPayload::Qa { question, answer } => context.qa.push(QaEntry {
                id,
                question,
                answer,
                timestamp: now,
            }),
            ContextPayload::Document { title, content } => {
                context.documents.push(DocumentEntry {
                    id,
                    title,
                    content,
                    timestamp: now,
                })
            }
        }

        debug!(
            "Stored {kind} entry {id} for user {user_id} ({} total)",
            context.len()
        );

        Ok(StoreAck {
            success: true,
            context_id: id,
        })
    }

    /// Snapshot of the user's context; unknown users get an empty one.
    pub fn get_context(&self, user_id: &str) -> UserContext {
        self.contexts
            .read()
            .get(user_id.trim())
            .cloned()
            .unwrap_or_default()
    }

    /// Drops the user's record. Returns whether anything was removed.
    pub fn clear_context(&self, user_id: &str) -> bool {
        let removed = self.contexts.write().remove(user_id.trim()).is_some();
        if removed {
            debug!("Cleared context for user {user_id}");
        }
        removed
    }

    /// Number of users with a live context record.
    pub fn len(&self) -> usize {
        self.contexts.read().len()
    }
}

//! Task orchestration: composes context formatting, task enhancement and the
//! provider call into a single `execute_task`, and keeps per-user usage.
//!
//! Flow: validate task type → format context (optional) → compose task text →
//!       enhance with role preface → provider call → record usage → result.
//!
//! Provider failures never escape as errors: they come back as a failed
//! `TaskResult`. Only invalid input is an `Err`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use tracing::{error, info, warn};

use crate::agent::task::{enhance_prompt, TaskOptions, TaskType};
use crate::agent::usage::{UsageRecord, UsageTracker};
use crate::context::formatter::ContextFormatter;
use crate::context::models::{ContextPayload, StoreAck, UserContext};
use crate::context::store::ContextStore;
use crate::errors::AppError;
use crate::llm_client::pricing::{CostBreakdown, TokenUsage};
use crate::llm_client::{ProviderResponse, TextProvider};

// ────────────────────────────────────────────────────────────────────────────
// Task results
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum TaskOutcome {
    Completed(ProviderResponse),
    Failed { error: String },
}

/// Result of one task execution. Built once and handed back to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskResult {
    pub outcome: TaskOutcome,
    pub task_type: TaskType,
    pub timestamp: DateTime<Utc>,
}

impl TaskResult {
    fn completed(task_type: TaskType, response: ProviderResponse) -> Self {
        Self {
            outcome: TaskOutcome::Completed(response),
            task_type,
            timestamp: Utc::now(),
        }
    }

    fn failed(task_type: TaskType, error: String) -> Self {
        Self {
            outcome: TaskOutcome::Failed { error },
            task_type,
            timestamp: Utc::now(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, TaskOutcome::Completed(_))
    }
}

/// Flat JSON shape: `{ success, response | error, usage?, cost?, taskType, timestamp }`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TaskResultBody<'a> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    response: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    usage: Option<&'a TokenUsage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cost: Option<&'a CostBreakdown>,
    task_type: &'static str,
    timestamp: DateTime<Utc>,
}

impl Serialize for TaskResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut body = TaskResultBody {
            success: self.is_success(),
            response: None,
            error: None,
            usage: None,
            cost: None,
            task_type: self.task_type.as_str(),
            timestamp: self.timestamp,
        };
        match &self.outcome {
            TaskOutcome::Completed(response) => {
                body.response = Some(response.content.as_str());
                body.usage = Some(&response.usage);
                body.cost = Some(&response.cost);
            }
            TaskOutcome::Failed { error } => body.error = Some(error.as_str()),
        }
        body.serialize(serializer)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Orchestrator
// ────────────────────────────────────────────────────────────────────────────

pub struct Orchestrator {
    provider: Arc<dyn TextProvider>,
    store: Arc<ContextStore>,
    formatter: ContextFormatter,
    usage: UsageTracker,
}

impl Orchestrator {
    pub fn new(
        provider: Arc<dyn TextProvider>,
        store: Arc<ContextStore>,
        formatter: ContextFormatter,
    ) -> Self {
        Self {
            provider,
            store,
            formatter,
            usage: UsageTracker::new(),
        }
    }

    /// Runs one task for `user_id`.
    ///
    /// Returns `Err` only for invalid input, in which case neither the provider
    /// nor the usage record is touched. Provider failures come back as
    /// `Ok(TaskResult)` with a `Failed` outcome.
    pub async fn execute_task(
        &self,
        user_id: &str,
        task_type: &str,
        prompt: &str,
        options: TaskOptions,
    ) -> Result<TaskResult, AppError> {
        let task_type = TaskType::parse_executable(task_type)?;
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Err(AppError::Validation("userId is required".to_string()));
        }

        let context = if options.include_context {
            self.formatter.format_context_for_prompt(&self.store, user_id)
        } else {
            String::new()
        };
        let full_prompt = enhance_prompt(task_type, &compose_task_prompt(&context, task_type, prompt));
        let max_tokens = options.effective_max_tokens();

        info!(
            "Executing {task_type} task for user {user_id} (context: {} chars, max_tokens: {max_tokens})",
            context.chars().count()
        );

        let response = match self.provider.generate_response(&full_prompt, max_tokens).await {
            Ok(response) => response,
            Err(e) => {
                warn!(
                    "{task_type} task failed for user {user_id} (transient: {}): {e}",
                    e.is_transient()
                );
                return Ok(TaskResult::failed(task_type, e.to_string()));
            }
        };

        if let Err(defect) = check_accounting(&response) {
            error!("Rejecting provider response for user {user_id}: {defect}");
            return Ok(TaskResult::failed(task_type, defect));
        }

        self.usage.record(user_id, &response.usage, &response.cost);
        info!(
            "{task_type} task completed for user {user_id}: tokens={}, cost=${:.6}",
            response.usage.total_tokens, response.cost.total_cost
        );

        Ok(TaskResult::completed(task_type, response))
    }

    pub fn get_user_stats(&self, user_id: &str) -> UsageRecord {
        self.usage.stats(user_id)
    }

    pub fn store_context(
        &self,
        user_id: &str,
        payload: ContextPayload,
    ) -> Result<StoreAck, AppError> {
        self.store.store_context(user_id, payload)
    }

    pub fn get_context(&self, user_id: &str) -> UserContext {
        self.store.get_context(user_id)
    }

    pub fn clear_context(&self, user_id: &str) -> bool {
        self.store.clear_context(user_id)
    }

    pub fn tracked_users(&self) -> usize {
        self.store.len()
    }
}

/// Builds the task text handed to the enhancer. A non-empty context block is
/// followed by a delimited task section; otherwise only the task is sent.
pub fn compose_task_prompt(context: &str, task_type: TaskType, prompt: &str) -> String {
    if context.is_empty() {
        format!("Task Type: {task_type}\nPrompt: {prompt}")
    } else {
        format!("{context}\n=== Task ===\nTask Type: {task_type}\nPrompt: {prompt}")
    }
}

/// Usage and cost from the provider must be internally consistent before they
/// are added to the running totals.
fn check_accounting(response: &ProviderResponse) -> Result<(), String> {
    let usage = &response.usage;
    let expected_total = u64::from(usage.input_tokens) + u64::from(usage.output_tokens);
    if usage.total_tokens != expected_total {
        return Err(format!(
            "Inconsistent token usage from provider: {} + {} != {}",
            usage.input_tokens, usage.output_tokens, usage.total_tokens
        ));
    }

    let cost = &response.cost;
    let valid = |c: f64| c.is_finite() && c >= 0.0;
    if !(valid(cost.input_cost) && valid(cost.output_cost) && valid(cost.total_cost)) {
        return Err(format!("Invalid cost from provider: {cost:?}"));
    }
    Ok(())
}

//! Task categories, their role-setting prefaces, and per-call options.

use std::fmt;

use serde::Deserialize;

use crate::errors::AppError;

pub const DEFAULT_TASK_MAX_TOKENS: u32 = 1000;
pub const MAX_TASK_MAX_TOKENS: u32 = 4000;

/// Kind of generation a task asks for. Unrecognised names map to `Other`,
/// which has a neutral preface but is never accepted for execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskType {
    Analysis,
    Writing,
    Research,
    Other,
}

impl TaskType {
    /// Task types the orchestrator will execute.
    pub const EXECUTABLE: [TaskType; 3] = [TaskType::Analysis, TaskType::Writing, TaskType::Research];

    pub fn from_name(name: &str) -> Self {
        match name {
            "analysis" => TaskType::Analysis,
            "writing" => TaskType::Writing,
            "research" => TaskType::Research,
            _ => TaskType::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Analysis => "analysis",
            TaskType::Writing => "writing",
            TaskType::Research => "research",
            TaskType::Other => "other",
        }
    }

    pub fn preface(&self) -> &'static str {
        match self {
            TaskType::Analysis => "You are an expert analyst. Analyze the following information thoroughly and provide detailed insights:",
            TaskType::Writing => "You are a skilled writer. Create well-structured, engaging content based on the following:",
            TaskType::Research => "You are a research assistant. Provide comprehensive research findings and recommendations based on:",
            TaskType::Other => "Please respond to the following:",
        }
    }

    /// Parses a task type name, rejecting anything outside [`Self::EXECUTABLE`].
    pub fn parse_executable(name: &str) -> Result<Self, AppError> {
        match TaskType::from_name(name) {
            TaskType::Other => {
                let valid: Vec<&str> = TaskType::EXECUTABLE.iter().map(|t| t.as_str()).collect();
                Err(AppError::Validation(format!(
                    "Invalid task type: {name}. Valid types are: {}",
                    valid.join(", ")
                )))
            }
            task_type => Ok(task_type),
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Prepends the role-setting sentence for `task_type`.
pub fn enhance_prompt(task_type: TaskType, prompt: &str) -> String {
    format!("{}\n\n{}", task_type.preface(), prompt)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskOptions {
    pub include_context: bool,
    pub max_tokens: u32,
}

impl Default for TaskOptions {
    fn default() -> Self {
        Self {
            include_context: true,
            max_tokens: DEFAULT_TASK_MAX_TOKENS,
        }
    }
}

impl TaskOptions {
    /// Token ceiling actually sent to the provider.
    pub fn effective_max_tokens(&self) -> u32 {
        self.max_tokens.clamp(1, MAX_TASK_MAX_TOKENS)
    }
}

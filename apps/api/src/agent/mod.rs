// Task orchestration: task types, the orchestrator pipeline and usage accounting.
// All provider calls go through llm_client::TextProvider.

pub mod handlers;
pub mod orchestrator;
pub mod task;
pub mod usage;

#[cfg(test)]
pub mod test_support;

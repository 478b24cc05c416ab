// Context engine: per-user fact storage, prompt formatting and résumé ingestion.

pub mod formatter;
pub mod handlers;
pub mod models;
pub mod resume;
pub mod store;

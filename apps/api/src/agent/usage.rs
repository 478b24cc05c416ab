//! Per-user usage accounting.
//!
//! Totals are cumulative for the life of the process. The request history is a
//! sliding window of the most recent [`HISTORY_LIMIT`] calls.

use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;

use crate::llm_client::pricing::{round_cost, CostBreakdown, TokenUsage};

pub const HISTORY_LIMIT: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageSample {
    pub timestamp: DateTime<Utc>,
    pub tokens: u64,
    pub cost: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageRecord {
    pub total_requests: u64,
    pub total_tokens: u64,
    pub total_cost: f64,
    pub request_history: VecDeque<UsageSample>,
}

impl UsageRecord {
    fn record(&mut self, usage: &TokenUsage, cost: &CostBreakdown, at: DateTime<Utc>) {
        self.total_requests += 1;
        self.total_tokens += usage.total_tokens;
        self.total_cost = round_cost(self.total_cost + cost.total_cost);

        self.request_history.push_back(UsageSample {
            timestamp: at,
            tokens: usage.total_tokens,
            cost: cost.total_cost,
        });
        while self.request_history.len() > HISTORY_LIMIT {
            self.request_history.pop_front();
        }
    }
}

#[derive(Debug, Default)]
pub struct UsageTracker {
    records: RwLock<HashMap<String, UsageRecord>>,
}

impl UsageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, user_id: &str, usage: &TokenUsage, cost: &CostBreakdown) {
        self.records
            .write()
            .entry(user_id.trim().to_string())
            .or_default()
            .record(usage, cost, Utc::now());
    }

    /// Usage for `user_id`, zeroed if the user has made no requests.
    pub fn stats(&self, user_id: &str) -> UsageRecord {
        self.records
            .read()
            .get(user_id.trim())
            .cloned()
            .unwrap_or_default()
    }
}

//! Token pricing for provider calls.
//!
//! Rates are USD per 1,000 tokens. Every figure is rounded to
//! [`COST_DECIMALS`] fractional digits so repeated accumulation does not drift.

use serde::{Deserialize, Serialize};

pub const COST_DECIMALS: i32 = 6;

/// Input/output token counts for a single provider call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub total_tokens: u64,
}

impl TokenUsage {
    pub fn new(input_tokens: u32, output_tokens: u32) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens: u64::from(input_tokens) + u64::from(output_tokens),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostBreakdown {
    pub input_cost: f64,
    pub output_cost: f64,
    pub total_cost: f64,
}

/// Per-thousand-token rates for one model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelPricing {
    pub input_per_1k: f64,
    pub output_per_1k: f64,
}

impl ModelPricing {
    /// Sonnet-class pricing: $3 / $15 per million tokens.
    pub const SONNET: ModelPricing = ModelPricing {
        input_per_1k: 0.003,
        output_per_1k: 0.015,
    };

    pub fn cost(&self, usage: &TokenUsage) -> CostBreakdown {
        let input_cost = f64::from(usage.input_tokens) / 1000.0 * self.input_per_1k;
        let output_cost = f64::from(usage.output_tokens) / 1000.0 * self.output_per_1k;
        CostBreakdown {
            input_cost: round_cost(input_cost),
            output_cost: round_cost(output_cost),
            total_cost: round_cost(input_cost + output_cost),
        }
    }
}

impl Default for ModelPricing {
    fn default() -> Self {
        Self::SONNET
    }
}

pub fn round_cost(value: f64) -> f64 {
    let scale = 10f64.powi(COST_DECIMALS);
    (value * scale).round() / scale
}

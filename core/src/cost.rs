//! Token usage and cost accounting
//!
//! Pure arithmetic over a usage record and a static rate table. Cached
//! prompt tokens are billed at the discounted cached rate; the regular
//! input count is `prompt_tokens - cached_tokens`.

use serde::{Deserialize, Serialize};

/// Per-million-token rates (USD), three independent rates
const INPUT_RATE_PER_MTOK: f64 = 2.50;
const CACHED_INPUT_RATE_PER_MTOK: f64 = 1.25;
const OUTPUT_RATE_PER_MTOK: f64 = 10.00;

/// Token counts reported by the chat-completion API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    /// Prompt tokens served from the provider cache; absent means zero
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cached_tokens: Option<u64>,
}

/// Itemized cost for one completion
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CostBreakdown {
    pub input_cost: f64,
    pub cached_cost: f64,
    pub output_cost: f64,
    pub total_cost: f64,
}

impl CostBreakdown {
    /// Human-readable one-liner for logs and response metadata
    pub fn format(&self) -> String {
        format!(
            "${:.6} total (${:.6} input, ${:.6} cached, ${:.6} output)",
            self.total_cost, self.input_cost, self.cached_cost, self.output_cost
        )
    }
}

/// Compute the cost of one completion from its usage record
pub fn calculate_cost(usage: &TokenUsage) -> CostBreakdown {
    let cached = usage.cached_tokens.unwrap_or(0);
    let regular_input = usage.prompt_tokens.saturating_sub(cached);

    let input_cost = regular_input as f64 * INPUT_RATE_PER_MTOK / 1_000_000.0;
    let cached_cost = cached as f64 * CACHED_INPUT_RATE_PER_MTOK / 1_000_000.0;
    let output_cost = usage.completion_tokens as f64 * OUTPUT_RATE_PER_MTOK / 1_000_000.0;

    CostBreakdown {
        input_cost,
        cached_cost,
        output_cost,
        total_cost: input_cost + cached_cost + output_cost,
    }
}

//! Translation provider catalog.
//!
//! Providers form a closed set selected once at the settings boundary; the
//! rest of the pipeline never branches on provider identifier strings.

use serde::{Deserialize, Serialize};

use crate::backend::Usage;

/// Supported translation providers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    OpenAi,
    Claude,
    Gemini,
    DeepSeek,
}

impl Provider {
    pub const ALL: [Provider; 4] = [
        Provider::OpenAi,
        Provider::Claude,
        Provider::Gemini,
        Provider::DeepSeek,
    ];

    /// Stable identifier used in settings storage.
    pub fn id(&self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Claude => "claude",
            Provider::Gemini => "gemini",
            Provider::DeepSeek => "deepseek",
        }
    }

    pub fn from_id(id: &str) -> Option<Provider> {
        Provider::ALL.into_iter().find(|p| p.id() == id)
    }

    /// Settings key under which this provider's credential is stored.
    pub fn credential_key(&self) -> String {
        format!("{}_key", self.id())
    }

    /// Chat endpoint the HTTP backend posts translation requests to.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Provider::OpenAi => "https://api.openai.com/v1/chat/completions",
            Provider::Claude => "https://api.anthropic.com/v1/messages",
            Provider::Gemini => "https://generativelanguage.googleapis.com/v1beta/models",
            Provider::DeepSeek => "https://api.deepseek.com/chat/completions",
        }
    }

    /// Known models for this provider, with published pricing.
    pub fn models(&self) -> &'static [ModelOption] {
        match self {
            Provider::OpenAi => &OPENAI_MODELS,
            Provider::Claude => &CLAUDE_MODELS,
            Provider::Gemini => &GEMINI_MODELS,
            Provider::DeepSeek => &DEEPSEEK_MODELS,
        }
    }

    /// Look up a model of this provider by its identifier.
    pub fn find_model(&self, model_id: &str) -> Option<&'static ModelOption> {
        self.models().iter().find(|m| m.value == model_id)
    }
}

static OPENAI_MODELS: [ModelOption; 4] = [
    ModelOption::new("GPT-4o", "gpt-4o", 5.0, 15.0),
    ModelOption::new("o3-mini", "o3-mini", 2.5, 10.0),
    ModelOption::new("o1-mini", "o1-mini", 2.5, 10.0),
    ModelOption::new("o1", "o1", 30.0, 60.0),
];

static CLAUDE_MODELS: [ModelOption; 2] = [
    ModelOption::new("Claude 3.5 Sonnet", "claude-3-5-sonnet-latest", 3.0, 15.0),
    ModelOption::new("Claude 3.5 Haiku", "claude-3-5-haiku-latest", 0.8, 4.0),
];

static GEMINI_MODELS: [ModelOption; 2] = [
    ModelOption::new("Gemini 1.5 Pro", "gemini-1.5-pro", 1.25, 5.0),
    ModelOption::new("Gemini 1.5 Flash", "gemini-1.5-flash", 0.075, 0.3),
];

static DEEPSEEK_MODELS: [ModelOption; 2] = [
    ModelOption::new("DeepSeek Reasoner", "deepseek-reasoner", 0.55, 2.19),
    ModelOption::new("DeepSeek Chat", "deepseek-chat", 0.14, 0.28),
];

/// One selectable model with its per-million-token pricing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ModelOption {
    pub label: &'static str,
    pub value: &'static str,
    pub pricing: Pricing,
}

impl ModelOption {
    pub const fn new(label: &'static str, value: &'static str, input: f64, output: f64) -> Self {
        Self {
            label,
            value,
            pricing: Pricing { input, output },
        }
    }
}

/// USD price per million tokens.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pricing {
    pub input: f64,
    pub output: f64,
}

/// Fixed USD -> JPY conversion rate used for the secondary cost figure.
pub const JPY_RATE: f64 = 150.0;

/// Monetary breakdown of one usage report against one model's pricing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CostBreakdown {
    pub input_cost: f64,
    pub output_cost: f64,
    pub total_cost: f64,
    pub input_cost_jpy: f64,
    pub output_cost_jpy: f64,
    pub total_cost_jpy: f64,
}

/// Price a usage report: `tokens * price_per_million / 1e6`, summed over
/// input and output, converted to yen at the fixed rate.
pub fn calculate_cost(usage: &Usage, model: &ModelOption) -> CostBreakdown {
    let input_cost = usage.input as f64 * model.pricing.input / 1_000_000.0;
    let output_cost = usage.output as f64 * model.pricing.output / 1_000_000.0;
    let total_cost = input_cost + output_cost;

    CostBreakdown {
        input_cost,
        output_cost,
        total_cost,
        input_cost_jpy: input_cost * JPY_RATE,
        output_cost_jpy: output_cost * JPY_RATE,
        total_cost_jpy: total_cost * JPY_RATE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_ids_round_trip() {
        for provider in Provider::ALL {
            assert_eq!(Provider::from_id(provider.id()), Some(provider));
        }
        assert_eq!(Provider::from_id("copilot"), None);
    }

    #[test]
    fn every_provider_lists_priced_models() {
        for provider in Provider::ALL {
            let models = provider.models();
            assert!(!models.is_empty());
            for model in models {
                assert_eq!(provider.find_model(model.value), Some(model));
                assert!(model.pricing.input > 0.0);
                assert!(model.pricing.output > 0.0);
            }
        }
    }

    #[test]
    fn cost_sums_input_and_output_sides() {
        let usage = Usage {
            total: 150,
            input: 100,
            output: 50,
        };
        let model = ModelOption::new("test", "test-model", 2.0, 8.0);

        let costs = calculate_cost(&usage, &model);
        assert!((costs.total_cost - 0.0006).abs() < 1e-12);
        assert!((costs.total_cost_jpy - 0.09).abs() < 1e-12);
    }
}

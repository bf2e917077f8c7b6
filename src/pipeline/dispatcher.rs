//! Translation dispatcher: concurrent fan-out with a full join barrier.

use std::time::Duration;

use futures::stream::{FuturesUnordered, StreamExt};

use crate::backend::{TranslationBackend, Usage};
use crate::error::TranslateError;
use crate::pipeline::grouper::TranslationUnit;

/// Default per-request deadline. A hung provider call becomes a failed
/// outcome instead of stalling the batch barrier.
pub const DEFAULT_REQUEST_DEADLINE: Duration = Duration::from_secs(30);

/// The result of one unit's translation request.
#[derive(Clone, Debug)]
pub struct TranslationOutcome {
    pub unit_index: usize,
    pub success: bool,
    pub translated_text: Option<String>,
    pub usage: Option<Usage>,
    pub failure_reason: Option<String>,
}

/// The batch-level result: overall success and summed usage.
#[derive(Clone, Copy, Debug, Default)]
pub struct AggregateResult {
    /// True only if every outcome succeeded.
    pub success: bool,
    /// Element-wise sum over successful outcomes that carried usage; absent
    /// (not zero) when none did.
    pub usage: Option<Usage>,
}

/// Issues one concurrent request per unit and aggregates the outcomes.
pub struct Dispatcher {
    request_deadline: Duration,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self {
            request_deadline: DEFAULT_REQUEST_DEADLINE,
        }
    }
}

impl Dispatcher {
    pub fn new(request_deadline: Duration) -> Self {
        Self { request_deadline }
    }

    /// Translate every unit concurrently.
    ///
    /// `on_outcome` observes each outcome as it resolves, in completion
    /// order, paired with its originating unit; this is where the splicer
    /// hooks in. The aggregate is only computed after all outcomes are
    /// known; a per-unit failure never prevents sibling requests from
    /// completing.
    pub async fn dispatch<B, F>(
        &self,
        units: &[TranslationUnit],
        backend: &B,
        mut on_outcome: F,
    ) -> AggregateResult
    where
        B: TranslationBackend,
        F: FnMut(&TranslationUnit, &TranslationOutcome),
    {
        if units.is_empty() {
            return AggregateResult {
                success: true,
                usage: None,
            };
        }

        let mut in_flight: FuturesUnordered<_> = units
            .iter()
            .enumerate()
            .map(|(unit_index, unit)| {
                let text = unit.source_text.clone();
                let deadline = self.request_deadline;
                async move {
                    let result = match tokio::time::timeout(deadline, backend.translate(&text))
                        .await
                    {
                        Ok(result) => result,
                        Err(_) => Err(TranslateError::RequestTimeout(deadline)),
                    };
                    (unit_index, result)
                }
            })
            .collect();

        let mut outcomes: Vec<TranslationOutcome> = Vec::with_capacity(units.len());

        while let Some((unit_index, result)) = in_flight.next().await {
            let outcome = match result {
                Ok(translation) => TranslationOutcome {
                    unit_index,
                    success: true,
                    translated_text: Some(translation.text),
                    usage: translation.usage,
                    failure_reason: None,
                },
                Err(error) => {
                    tracing::warn!(unit = unit_index, %error, "translation request failed");
                    TranslationOutcome {
                        unit_index,
                        success: false,
                        translated_text: None,
                        usage: None,
                        failure_reason: Some(error.to_string()),
                    }
                }
            };

            on_outcome(&units[unit_index], &outcome);
            outcomes.push(outcome);
        }

        aggregate(&outcomes)
    }
}

fn aggregate(outcomes: &[TranslationOutcome]) -> AggregateResult {
    let success = outcomes.iter().all(|outcome| outcome.success);

    let mut usage: Option<Usage> = None;
    for outcome in outcomes.iter().filter(|o| o.success) {
        if let Some(reported) = &outcome.usage {
            usage.get_or_insert_with(Usage::default).add(reported);
        }
    }

    AggregateResult { success, usage }
}

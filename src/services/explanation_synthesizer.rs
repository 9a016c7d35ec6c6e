//! Explanation synthesis: prompt, call, normalize, retry once, backfill.
//!
//! ```text
//! BUILD_PROMPT -> CALL_API -> NORMALIZE -> SUCCESS
//!                    |            |
//!                    +-- failure -+-> SIMPLE_PROMPT -> CALL_API -> NORMALIZE -> SUCCESS | FAIL
//! ```
//!
//! The retry happens exactly once and its error is the one surfaced. There is
//! no synthetic fallback for explanations.

use futures::stream::{self, StreamExt};
use serde_json::{Map, Value};
use tracing::{info, instrument, warn};

use crate::domain::models::{
    AlternativeValue, Complexity, Direction, ExplanationOutcome, ExplanationRecord,
};
use crate::domain::models::parameter::is_integer_literal;
use crate::domain::HyperResult;
use crate::services::fallback_generator::round_significant;
use crate::services::model_gateway::ModelGateway;
use crate::services::prompts;
use crate::services::response_normalizer::ResponseNormalizer;

/// Temperature used for the simplified retry.
const RETRY_TEMPERATURE: f32 = 0.0;

pub struct ExplanationSynthesizer {
    gateway: ModelGateway,
    normalizer: ResponseNormalizer,
    max_concurrent_calls: usize,
}

impl ExplanationSynthesizer {
    pub fn new(gateway: ModelGateway, max_concurrent_calls: usize) -> Self {
        Self {
            gateway,
            normalizer: ResponseNormalizer::default(),
            max_concurrent_calls: max_concurrent_calls.max(1),
        }
    }

    /// Explain one parameter.
    #[instrument(skip(self), fields(model = self.gateway.model_name()))]
    pub async fn explain(&self, name: &str, value: &str) -> HyperResult<ExplanationRecord> {
        let prompt = prompts::explanation_prompt(name, value);
        let object = match self.attempt(&prompt, false).await {
            Ok(object) => object,
            Err(first) => {
                warn!(error = %first, "explanation attempt failed, retrying with simpler prompt");
                let simple = prompts::simple_explanation_prompt(name, value);
                self.attempt(&simple, true).await?
            }
        };
        Ok(backfill(name, value, &object))
    }

    async fn attempt(&self, prompt: &str, simplified: bool) -> HyperResult<Map<String, Value>> {
        let raw = if simplified {
            let sampling = self.gateway.sampling().clone().with_temperature(RETRY_TEMPERATURE);
            self.gateway.call_with(prompt, &sampling).await?
        } else {
            self.gateway.call(prompt).await?
        };
        self.normalizer
            .normalize(&raw)
            .map_err(|e| e.into_parse_failure(&raw))
    }

    /// Explain every pair with a bounded number of calls in flight.
    ///
    /// Output order matches input order; failures are reported per item.
    pub async fn explain_all(&self, parameters: &[(String, String)]) -> Vec<ExplanationOutcome> {
        info!(
            count = parameters.len(),
            width = self.max_concurrent_calls,
            "explaining batch"
        );
        stream::iter(parameters.iter().cloned())
            .map(|(name, value)| async move {
                match self.explain(&name, &value).await {
                    Ok(explanation) => ExplanationOutcome {
                        name,
                        value,
                        explanation: Some(explanation),
                        error: None,
                        code: None,
                    },
                    Err(err) => ExplanationOutcome {
                        name,
                        value,
                        explanation: None,
                        code: Some(err.code().to_string()),
                        error: Some(err.to_string()),
                    },
                }
            })
            .buffered(self.max_concurrent_calls)
            .collect()
            .await
    }
}

/// First non-empty text under any of `keys`, flattened.
fn text_field(object: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| object.get(*key))
        .find_map(flatten_text)
}

/// Strings as-is, arrays joined by newlines, objects serialized.
fn flatten_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::Null => return None,
        Value::String(s) => s.trim().to_string(),
        Value::Array(items) => items
            .iter()
            .filter_map(flatten_text)
            .collect::<Vec<_>>()
            .join("\n"),
        Value::Object(_) => value.to_string(),
        other => other.to_string(),
    };
    (!text.is_empty()).then_some(text)
}

/// Fill every required field, preferring the model's content.
pub fn backfill(name: &str, value: &str, object: &Map<String, Value>) -> ExplanationRecord {
    let field = |keys: &[&str], default: String| text_field(object, keys).unwrap_or(default);

    ExplanationRecord {
        importance: field(
            &["importance"],
            format!("{name} shapes how the model trains, and the current setting of {value} affects both convergence and final quality."),
        ),
        definition: field(
            &["definition", "description"],
            format!("{name} is a hyperparameter fixed before training that controls part of the learning process."),
        ),
        current_value_analysis: field(
            &["currentValueAnalysis", "current_value_analysis"],
            format!("The current value {value} is a starting point; compare it with the alternatives to judge whether it suits this model and dataset."),
        ),
        alternative_values: alternatives(
            name,
            value,
            object
                .get("alternativeValues")
                .or_else(|| object.get("alternative_values")),
        ),
        best_practices: field(
            &["bestPractices", "best_practices"],
            format!("Tune {name} with a small search around {value}, changing one setting at a time and tracking validation metrics."),
        ),
        trade_offs: field(
            &["tradeOffs", "trade_offs"],
            format!("Moving {name} away from {value} trades training speed against stability and generalization."),
        ),
        impact_visualization: field(
            &["impactVisualization", "impact_visualization"],
            format!("Plot validation performance against several values of {name}; expect a peak near a well-tuned value and degradation on either side."),
        ),
    }
}

#[derive(Debug)]
struct PartialAlternative {
    value: String,
    direction: Option<Direction>,
    effect: Option<String>,
    complexity: Option<Complexity>,
}

fn parse_alternative(item: &Value) -> Option<PartialAlternative> {
    match item {
        Value::Object(entry) => {
            let value = text_field(entry, &["value", "alternative"])?;
            Some(PartialAlternative {
                value,
                direction: entry
                    .get("direction")
                    .and_then(Value::as_str)
                    .and_then(Direction::parse),
                effect: text_field(entry, &["effect", "description", "impact"]),
                complexity: entry
                    .get("complexity")
                    .and_then(Value::as_str)
                    .and_then(Complexity::parse),
            })
        }
        Value::String(_) | Value::Number(_) | Value::Bool(_) => {
            flatten_text(item).map(|value| PartialAlternative {
                value,
                direction: None,
                effect: None,
                complexity: None,
            })
        }
        Value::Null | Value::Array(_) => None,
    }
}

/// Normalized alternatives; two defaults when the model gave none usable.
pub fn alternatives(name: &str, value: &str, raw: Option<&Value>) -> Vec<AlternativeValue> {
    let parsed: Vec<PartialAlternative> = match raw {
        Some(Value::Array(items)) => items.iter().filter_map(parse_alternative).collect(),
        Some(single @ Value::Object(_)) => parse_alternative(single).into_iter().collect(),
        _ => Vec::new(),
    };
    if parsed.is_empty() {
        return default_alternatives(name, value);
    }

    let total = parsed.len();
    let current = value.trim().parse::<f64>().ok();
    parsed
        .into_iter()
        .enumerate()
        .map(|(i, alt)| {
            let direction = alt
                .direction
                .or_else(|| numeric_direction(&alt.value, current))
                .unwrap_or(if 2 * i < total {
                    Direction::Lower
                } else {
                    Direction::Higher
                });
            let effect = alt
                .effect
                .unwrap_or_else(|| effect_text(name, &alt.value, direction));
            AlternativeValue {
                value: alt.value,
                direction,
                effect,
                complexity: alt
                    .complexity
                    .unwrap_or_else(|| Complexity::for_position(i, total)),
            }
        })
        .collect()
}

fn numeric_direction(candidate: &str, current: Option<f64>) -> Option<Direction> {
    let current = current?;
    let candidate = candidate.trim().parse::<f64>().ok()?;
    if candidate < current {
        Some(Direction::Lower)
    } else if candidate > current {
        Some(Direction::Higher)
    } else {
        None
    }
}

fn effect_text(name: &str, alternative: &str, direction: Direction) -> String {
    match direction {
        Direction::Lower => format!(
            "Lowering {name} to {alternative} usually makes training more conservative and may need longer to converge."
        ),
        Direction::Higher => format!(
            "Raising {name} to {alternative} usually makes training more aggressive and may reduce stability."
        ),
    }
}

/// One lower and one higher variant of `value`.
pub fn default_alternatives(name: &str, value: &str) -> Vec<AlternativeValue> {
    let (lower, higher) = variant_pair(value);
    vec![
        AlternativeValue {
            effect: effect_text(name, &lower, Direction::Lower),
            value: lower,
            direction: Direction::Lower,
            complexity: Complexity::for_position(0, 2),
        },
        AlternativeValue {
            effect: effect_text(name, &higher, Direction::Higher),
            value: higher,
            direction: Direction::Higher,
            complexity: Complexity::for_position(1, 2),
        },
    ]
}

/// Integers halve and double, decimals in (0, 1) divide and multiply by ten,
/// other numbers halve and double, anything else gets a textual variant.
///
/// Numeric variants are ordered by value, which matters for negative inputs.
fn variant_pair(value: &str) -> (String, String) {
    let trimmed = value.trim();
    if is_integer_literal(trimmed) {
        if let Ok(n) = trimmed.parse::<i64>() {
            let (a, b) = (n / 2, n.saturating_mul(2));
            return (a.min(b).to_string(), a.max(b).to_string());
        }
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => {
            let (a, b) = if v > 0.0 && v < 1.0 {
                (v / 10.0, v * 10.0)
            } else {
                (v / 2.0, v * 2.0)
            };
            let (a, b) = (round_significant(a), round_significant(b));
            (a.min(b).to_string(), a.max(b).to_string())
        }
        _ => (
            format!("smaller than {trimmed}"),
            format!("larger than {trimmed}"),
        ),
    }
}

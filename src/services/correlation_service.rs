//! Parameter correlation matrices with a synthetic fallback.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::{instrument, warn};

use crate::domain::models::CorrelationMatrix;
use crate::domain::{HyperError, HyperResult};
use crate::services::fallback_generator::{generate_fallback_correlation_data, pair_explanation};
use crate::services::model_gateway::ModelGateway;
use crate::services::prompts;
use crate::services::response_normalizer::ResponseNormalizer;

pub struct CorrelationService {
    gateway: ModelGateway,
    normalizer: ResponseNormalizer,
}

impl CorrelationService {
    pub fn new(gateway: ModelGateway) -> Self {
        Self {
            gateway,
            normalizer: ResponseNormalizer::default(),
        }
    }

    /// Correlation matrix for `parameters` (name, current value). Never fails.
    ///
    /// Fewer than two parameters need no model call.
    #[instrument(skip(self, parameters), fields(count = parameters.len()))]
    pub async fn correlate(&self, parameters: &[(String, String)]) -> CorrelationMatrix {
        let names: Vec<String> = parameters.iter().map(|(name, _)| name.clone()).collect();
        if names.len() < 2 {
            return fallback(&names);
        }

        match self.try_correlate(parameters, &names).await {
            Ok(matrix) => matrix,
            Err(err) => {
                warn!(error = %err, code = err.code(), "correlation failed, using fallback");
                fallback(&names)
            }
        }
    }

    async fn try_correlate(
        &self,
        parameters: &[(String, String)],
        names: &[String],
    ) -> HyperResult<CorrelationMatrix> {
        let raw = self.gateway.call(&prompts::correlation_prompt(parameters)).await?;
        let object = self
            .normalizer
            .normalize(&raw)
            .map_err(|e| e.into_parse_failure(&raw))?;
        parse_correlation(names, &object)
    }
}

fn fallback(names: &[String]) -> CorrelationMatrix {
    let mut rng = StdRng::from_entropy();
    generate_fallback_correlation_data(names, &mut rng)
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
    .filter(|v: &f64| v.is_finite())
}

fn pair_key(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

/// Position of each requested name in the model's axis order.
///
/// The model's order is used only when it is a permutation of the request.
fn axis_order(names: &[String], object: &Map<String, Value>) -> Vec<usize> {
    let identity: Vec<usize> = (0..names.len()).collect();
    let Some(model_names) = object.get("parameterNames").and_then(Value::as_array) else {
        return identity;
    };
    if model_names.len() != names.len() {
        return identity;
    }
    let positions: HashMap<&str, usize> = model_names
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.as_str().map(|s| (s, i)))
        .collect();
    let order: Option<Vec<usize>> = names
        .iter()
        .map(|name| positions.get(name.as_str()).copied())
        .collect();
    order.unwrap_or(identity)
}

/// Validate, sanitize and explain a model-supplied matrix.
///
/// The matrix must be n x n numbers for the n requested names. Entries are
/// clamped to [-1, 1], mirrored pairs averaged and the diagonal forced to 1.
pub fn parse_correlation(
    names: &[String],
    object: &Map<String, Value>,
) -> HyperResult<CorrelationMatrix> {
    let n = names.len();
    let invalid = |reason: &str| {
        HyperError::parse_failure(reason, &Value::Object(object.clone()).to_string())
    };

    let rows = object
        .get("matrix")
        .and_then(Value::as_array)
        .filter(|rows| rows.len() == n)
        .ok_or_else(|| invalid("matrix missing or wrong size"))?;

    let mut raw = Vec::with_capacity(n);
    for row in rows {
        let cells = row
            .as_array()
            .filter(|cells| cells.len() == n)
            .ok_or_else(|| invalid("matrix row has wrong size"))?;
        let values: Option<Vec<f64>> = cells.iter().map(number).collect();
        raw.push(values.ok_or_else(|| invalid("matrix entry is not a number"))?);
    }

    let order = axis_order(names, object);
    let mut matrix = vec![vec![1.0; n]; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let (a, b) = (order[i], order[j]);
            let averaged = (raw[a][b].clamp(-1.0, 1.0) + raw[b][a].clamp(-1.0, 1.0)) / 2.0;
            matrix[i][j] = averaged;
            matrix[j][i] = averaged;
        }
    }

    let provided: HashMap<(String, String), String> = object
        .get("explanations")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    let a = item.get("param1")?.as_str()?;
                    let b = item.get("param2")?.as_str()?;
                    let text = item.get("explanation")?.as_str()?.trim();
                    (!text.is_empty()).then(|| (pair_key(a, b), text.to_string()))
                })
                .collect()
        })
        .unwrap_or_default();

    let mut result = CorrelationMatrix {
        parameter_names: names.to_vec(),
        matrix,
        explanations: Vec::new(),
    };
    result.explain_pairs(|a, b, c| {
        provided
            .get(&pair_key(a, b))
            .cloned()
            .unwrap_or_else(|| pair_explanation(a, b, c))
    });
    Ok(result)
}

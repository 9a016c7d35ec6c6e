//! Performance prediction with a deterministic fallback.

use serde_json::{Map, Value};
use tracing::{instrument, warn};

use crate::domain::models::{
    AxisValue, ParameterKind, PerformancePrediction, Series, SeriesPoint, SuggestedValue,
};
use crate::domain::{HyperError, HyperResult};
use crate::services::fallback_generator::generate_fallback_prediction;
use crate::services::model_gateway::ModelGateway;
use crate::services::prompts;
use crate::services::response_normalizer::ResponseNormalizer;

pub struct PredictionService {
    gateway: ModelGateway,
    normalizer: ResponseNormalizer,
}

impl PredictionService {
    pub fn new(gateway: ModelGateway) -> Self {
        Self {
            gateway,
            normalizer: ResponseNormalizer::default(),
        }
    }

    /// Predict how performance varies with `name`. Never fails.
    #[instrument(skip(self))]
    pub async fn predict(&self, name: &str, value: &str) -> PerformancePrediction {
        match self.try_predict(name, value).await {
            Ok(prediction) => prediction,
            Err(err) => {
                warn!(error = %err, code = err.code(), "prediction failed, using fallback");
                generate_fallback_prediction(name, value)
            }
        }
    }

    async fn try_predict(&self, name: &str, value: &str) -> HyperResult<PerformancePrediction> {
        let raw = self.gateway.call(&prompts::prediction_prompt(name, value)).await?;
        let object = self
            .normalizer
            .normalize(&raw)
            .map_err(|e| e.into_parse_failure(&raw))?;
        parse_prediction(name, value, &object)
    }
}

fn invalid(reason: &str, object: &Map<String, Value>) -> HyperError {
    HyperError::parse_failure(reason, &Value::Object(object.clone()).to_string())
}

fn get<'a>(object: &'a Map<String, Value>, camel: &str, snake: &str) -> Option<&'a Value> {
    object.get(camel).or_else(|| object.get(snake))
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
    .filter(|v: &f64| v.is_finite())
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(_) | Value::Bool(_) => Some(value.to_string()),
        _ => None,
    }
}

fn parse_point(point: &Value) -> Option<SeriesPoint> {
    let y = number(point.get("y")?)?;
    let x = match point.get("x")? {
        Value::Number(n) => AxisValue::Number(n.as_f64()?),
        Value::String(s) => AxisValue::Label(s.clone()),
        _ => return None,
    };
    Some(SeriesPoint { x, y })
}

/// Validate a model-supplied prediction.
///
/// Requires a recognised parameter type and a non-empty series list where
/// every series keeps at least one valid point. The parameter name and
/// current value always come from the request.
pub fn parse_prediction(
    name: &str,
    value: &str,
    object: &Map<String, Value>,
) -> HyperResult<PerformancePrediction> {
    let parameter_type = get(object, "parameterType", "parameter_type")
        .and_then(Value::as_str)
        .and_then(ParameterKind::parse)
        .ok_or_else(|| invalid("missing or unrecognised parameterType", object))?;

    let raw_series = object
        .get("series")
        .and_then(Value::as_array)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| invalid("missing series", object))?;

    let mut series = Vec::with_capacity(raw_series.len());
    for (i, entry) in raw_series.iter().enumerate() {
        let data: Vec<SeriesPoint> = entry
            .get("data")
            .and_then(Value::as_array)
            .map(|points| points.iter().filter_map(parse_point).collect())
            .unwrap_or_default();
        if data.is_empty() {
            return Err(invalid("series without valid points", object));
        }
        let series_name = entry
            .get("name")
            .and_then(text)
            .unwrap_or_else(|| format!("Series {}", i + 1));
        series.push(Series {
            name: series_name,
            data,
        });
    }

    let mut suggested_values: Vec<SuggestedValue> = get(object, "suggestedValues", "suggested_values")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| match item {
                    Value::Object(entry) => Some(SuggestedValue {
                        value: entry.get("value").and_then(text)?,
                        reason: entry.get("reason").and_then(text).unwrap_or_default(),
                    }),
                    other => text(other).map(|value| SuggestedValue {
                        value,
                        reason: String::new(),
                    }),
                })
                .collect()
        })
        .unwrap_or_default();
    if suggested_values.is_empty() {
        suggested_values = generate_fallback_prediction(name, value).suggested_values;
    }

    Ok(PerformancePrediction {
        parameter_name: name.to_string(),
        parameter_type,
        current_value: value.to_string(),
        x_axis_label: get(object, "xAxisLabel", "x_axis_label")
            .and_then(text)
            .unwrap_or_else(|| name.to_string()),
        y_axis_label: get(object, "yAxisLabel", "y_axis_label")
            .and_then(text)
            .unwrap_or_else(|| "Performance".to_string()),
        series,
        suggested_values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::SamplingConfig;
    use crate::infrastructure::gemini::MockGenerativeModel;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;

    fn service(mock: MockGenerativeModel) -> PredictionService {
        PredictionService::new(ModelGateway::new(
            Arc::new(mock),
            SamplingConfig::default(),
            Duration::from_secs(5),
        ))
    }

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_parse_valid_prediction() {
        let prediction = parse_prediction(
            "optimizer",
            "adam",
            &object(json!({
                "parameterName": "ignored",
                "parameterType": "categorical",
                "series": [{"name": "Validation Accuracy", "data": [
                    {"x": "adam", "y": 0.9}, {"x": "sgd", "y": "0.8"}, {"x": null, "y": 1}
                ]}],
                "suggestedValues": [{"value": "sgd", "reason": "generalizes"}]
            })),
        )
        .unwrap();
        assert_eq!(prediction.parameter_name, "optimizer");
        assert_eq!(prediction.parameter_type, ParameterKind::Categorical);
        assert_eq!(prediction.series[0].data.len(), 2);
        assert_eq!(prediction.series[0].data[1].y, 0.8);
        assert_eq!(prediction.x_axis_label, "optimizer");
        assert_eq!(prediction.suggested_values[0].reason, "generalizes");
    }

    #[test]
    fn test_parse_rejects_bad_shapes() {
        assert!(parse_prediction("lr", "0.1", &object(json!({"series": []}))).is_err());
        assert!(parse_prediction(
            "lr",
            "0.1",
            &object(json!({"parameterType": "continuous", "series": []}))
        )
        .is_err());
        assert!(parse_prediction(
            "lr",
            "0.1",
            &object(json!({"parameterType": "continuous", "series": [{"name": "a", "data": []}]}))
        )
        .is_err());
    }

    #[test]
    fn test_missing_suggestions_are_backfilled() {
        let prediction = parse_prediction(
            "learning_rate",
            "0.01",
            &object(json!({
                "parameterType": "continuous",
                "series": [{"data": [{"x": 0.01, "y": 0.9}]}]
            })),
        )
        .unwrap();
        assert_eq!(prediction.series[0].name, "Series 1");
        assert_eq!(prediction.suggested_values.len(), 2);
    }

    #[tokio::test]
    async fn test_model_failure_uses_fallback() {
        let prediction = service(MockGenerativeModel::failing("quota"))
            .predict("learning_rate", "0.01")
            .await;
        assert_eq!(prediction, generate_fallback_prediction("learning_rate", "0.01"));
    }

    #[tokio::test]
    async fn test_unparseable_reply_uses_fallback() {
        let prediction = service(MockGenerativeModel::always("{\"parameterType\": \"weird\"}"))
            .predict("optimizer", "adam")
            .await;
        assert_eq!(prediction.parameter_type, ParameterKind::Categorical);
        assert!(prediction.is_well_formed());
    }
}

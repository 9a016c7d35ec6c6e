//! Prompt templates sent to the generative model.

/// Name that switches the explanation prompt to metric-comparison framing.
pub const METRICS_PARAMETER: &str = "metrics";

/// Prompt asking the model to list hyperparameters found in `code`.
pub fn extraction_prompt(code: &str) -> String {
    format!(
        r#"You are a helpful assistant. Analyze the following machine learning code and identify all hyperparameters.
Return ONLY a valid JSON object where each key is a hyperparameter name and each value is its corresponding value.
Do NOT include any other text outside the JSON.

Code:
{code}
"#
    )
}

/// Full explanation prompt for one hyperparameter.
pub fn explanation_prompt(name: &str, value: &str) -> String {
    let framing = if name.eq_ignore_ascii_case(METRICS_PARAMETER) {
        format!(
            "Explain the evaluation metrics **{value}** used to judge this model. \
             Compare the listed metrics with each other, say what each one rewards or hides, \
             and suggest alternative or complementary metrics."
        )
    } else {
        format!(
            "Explain the hyperparameter **{name}** (current value: {value}). \
             Cover what it controls, how the current value affects training, \
             alternative values, best practices and trade-offs."
        )
    };

    format!(
        r#"{framing}

## Required Output Format (JSON)
Respond with a JSON object containing:
```json
{{
  "importance": "Why this setting matters for the model",
  "definition": "What {name} controls",
  "currentValueAnalysis": "What the value {value} means in practice",
  "alternativeValues": [
    {{
      "value": "an alternative value",
      "direction": "lower|higher",
      "effect": "What changes when using it",
      "complexity": "basic|intermediate|advanced"
    }}
  ],
  "bestPractices": "How practitioners usually choose it",
  "tradeOffs": "What is gained and lost when changing it",
  "impactVisualization": "A short description of how a plot of the metric against this value would look"
}}
```

Provide at least two alternative values, one lower and one higher than the current value.

IMPORTANT: Output ONLY the JSON object, no other text."#
    )
}

/// Reduced prompt used for the single retry after a failed attempt.
pub fn simple_explanation_prompt(name: &str, value: &str) -> String {
    format!(
        r#"Describe the machine learning setting "{name}" with value "{value}".
Answer with one JSON object using exactly these keys: importance, definition, currentValueAnalysis, alternativeValues, bestPractices, tradeOffs, impactVisualization.
alternativeValues is a list of objects with keys value, direction, effect.
Use double quotes. No markdown, no text outside the JSON."#
    )
}

/// Prompt asking for a performance curve over alternative values.
pub fn prediction_prompt(name: &str, value: &str) -> String {
    format!(
        r#"Predict how model performance changes as the hyperparameter **{name}** varies around its current value {value}.

## Required Output Format (JSON)
```json
{{
  "parameterName": "{name}",
  "parameterType": "continuous|categorical",
  "currentValue": "{value}",
  "xAxisLabel": "{name}",
  "yAxisLabel": "Performance",
  "series": [
    {{ "name": "Validation Accuracy", "data": [{{ "x": 0.1, "y": 0.8 }}] }}
  ],
  "suggestedValues": [
    {{ "value": "an alternative", "reason": "why it may help" }}
  ]
}}
```

Use numeric x values for continuous parameters and option names for categorical ones. Keep y between 0 and 1.

IMPORTANT: Output ONLY the JSON object, no other text."#
    )
}

/// Prompt asking for pairwise correlations between the given parameters.
pub fn correlation_prompt(parameters: &[(String, String)]) -> String {
    let listing = parameters
        .iter()
        .map(|(name, value)| {
            if value.is_empty() {
                format!("- {name}")
            } else {
                format!("- {name} = {value}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n");
    let names = parameters
        .iter()
        .map(|(name, _)| format!("\"{name}\""))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"Estimate how strongly each pair of these hyperparameters interacts when tuning a model:
{listing}

## Required Output Format (JSON)
```json
{{
  "parameterNames": [{names}],
  "matrix": [[1.0, -0.4], [-0.4, 1.0]],
  "explanations": [
    {{ "param1": "a", "param2": "b", "correlation": -0.4, "explanation": "why they interact" }}
  ]
}}
```

The matrix is square in the order of parameterNames, symmetric, with 1.0 on the diagonal and every value between -1 and 1.

IMPORTANT: Output ONLY the JSON object, no other text."#
    )
}

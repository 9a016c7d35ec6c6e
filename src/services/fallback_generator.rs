//! Synthetic predictions and correlation matrices.
//!
//! Used whenever the generative model fails or its output cannot be
//! normalized, so the prediction and correlation endpoints always have a
//! well-formed answer.

use rand::Rng;

use crate::domain::models::{
    AxisValue, CorrelationMatrix, ParameterKind, PerformancePrediction, Series, SeriesPoint,
    SuggestedValue,
};
use crate::domain::models::parameter::is_integer_literal;

const CONTINUOUS_KEYWORDS: [&str; 5] = ["rate", "size", "epochs", "factor", "threshold"];

/// Multipliers applied to the current value; `1.0` is the current value itself.
pub const CONTINUOUS_MULTIPLIERS: [f64; 5] = [0.1, 0.5, 1.0, 2.0, 10.0];

const OPTIMIZER_OPTIONS: [&str; 4] = ["adam", "sgd", "rmsprop", "adagrad"];
const ACTIVATION_OPTIONS: [&str; 4] = ["relu", "tanh", "sigmoid", "leaky_relu"];
const LOSS_OPTIONS: [&str; 4] = ["categorical_crossentropy", "binary_crossentropy", "mse", "mae"];
const GENERIC_OPTIONS: [&str; 2] = ["default", "alternative"];

const PEAK_ACCURACY: f64 = 0.9;
const ACCURACY_FALLOFF: f64 = 0.15;
const CURRENT_OPTION_ACCURACY: f64 = 0.85;

/// Classify a parameter by name.
pub fn classify(name: &str) -> ParameterKind {
    let lower = name.to_lowercase();
    if CONTINUOUS_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        ParameterKind::Continuous
    } else {
        ParameterKind::Categorical
    }
}

/// Deterministic prediction for `name` at `value`.
///
/// Continuous parameters whose value does not parse as a number are treated as
/// categorical.
pub fn generate_fallback_prediction(name: &str, value: &str) -> PerformancePrediction {
    let numeric = value.trim().parse::<f64>().ok().filter(|v| v.is_finite());
    match (classify(name), numeric) {
        (ParameterKind::Continuous, Some(current)) => continuous_prediction(name, value, current),
        _ => categorical_prediction(name, value),
    }
}

fn continuous_prediction(name: &str, value: &str, current: f64) -> PerformancePrediction {
    let integral = is_integer_literal(value.trim());

    let mut points: Vec<(f64, f64)> = Vec::with_capacity(CONTINUOUS_MULTIPLIERS.len());
    for &m in &CONTINUOUS_MULTIPLIERS {
        let x = if m == 1.0 {
            current
        } else if integral {
            (current * m).round().max(1.0)
        } else {
            round_significant(current * m)
        };
        if !x.is_finite() {
            continue;
        }
        let y = round3(PEAK_ACCURACY - ACCURACY_FALLOFF * m.log10().abs());
        // Small integers collapse onto the same x; keep the point nearest the current value.
        match points.iter_mut().find(|(px, _)| *px == x) {
            Some(existing) => existing.1 = existing.1.max(y),
            None => points.push((x, y)),
        }
    }
    points.sort_by(|a, b| a.0.total_cmp(&b.0));

    let accuracy: Vec<SeriesPoint> = points
        .into_iter()
        .map(|(x, y)| SeriesPoint {
            x: AxisValue::Number(x),
            y,
        })
        .collect();

    let loss: Vec<SeriesPoint> = accuracy
        .iter()
        .map(|p| SeriesPoint {
            x: p.x.clone(),
            y: round3(1.0 - p.y),
        })
        .collect();

    let (lower, higher) = if integral {
        ((current * 0.5).round().max(1.0), current * 2.0)
    } else {
        (round_significant(current * 0.5), round_significant(current * 2.0))
    };
    let (lower, higher) = (finite_or(lower, current), finite_or(higher, current));

    PerformancePrediction {
        parameter_name: name.to_string(),
        parameter_type: ParameterKind::Continuous,
        current_value: value.to_string(),
        x_axis_label: name.to_string(),
        y_axis_label: "Performance".to_string(),
        series: vec![
            Series {
                name: "Validation Accuracy".to_string(),
                data: accuracy,
            },
            Series {
                name: "Training Loss".to_string(),
                data: loss,
            },
        ],
        suggested_values: vec![
            SuggestedValue {
                value: format_number(lower, integral),
                reason: format!(
                    "A smaller {name} can make training more stable at the cost of slower progress"
                ),
            },
            SuggestedValue {
                value: format_number(higher, integral),
                reason: format!(
                    "A larger {name} can speed up training but may overshoot or overfit"
                ),
            },
        ],
    }
}

/// Option list for a categorical parameter, current value first.
pub fn categorical_options(name: &str, value: &str) -> Vec<String> {
    let lower = name.to_lowercase();
    let canned: &[&str] = if lower.contains("optimizer") {
        &OPTIMIZER_OPTIONS
    } else if lower.contains("activation") {
        &ACTIVATION_OPTIONS
    } else if lower.contains("loss") {
        &LOSS_OPTIONS
    } else {
        &GENERIC_OPTIONS
    };

    let current = value.trim().to_string();
    let mut options = vec![current.clone()];
    options.extend(
        canned
            .iter()
            .filter(|opt| !opt.eq_ignore_ascii_case(&current))
            .map(|opt| (*opt).to_string()),
    );
    options
}

fn categorical_prediction(name: &str, value: &str) -> PerformancePrediction {
    let options = categorical_options(name, value);

    let data = options
        .iter()
        .enumerate()
        .map(|(i, option)| {
            let y = if i == 0 {
                CURRENT_OPTION_ACCURACY
            } else {
                round3(0.78 - 0.04 * (i - 1) as f64)
            };
            SeriesPoint {
                x: AxisValue::Label(option.clone()),
                y,
            }
        })
        .collect();

    let suggested_values = options
        .iter()
        .skip(1)
        .take(2)
        .map(|option| SuggestedValue {
            value: option.clone(),
            reason: format!("{option} is a common alternative to {value} for {name}"),
        })
        .collect();

    PerformancePrediction {
        parameter_name: name.to_string(),
        parameter_type: ParameterKind::Categorical,
        current_value: value.to_string(),
        x_axis_label: name.to_string(),
        y_axis_label: "Performance".to_string(),
        series: vec![Series {
            name: "Validation Accuracy".to_string(),
            data,
        }],
        suggested_values,
    }
}

/// Known pairwise interactions keyed on canonical names.
const PAIR_TABLE: [(&str, &str, f64, &str); 10] = [
    (
        "learning_rate",
        "batch_size",
        -0.4,
        "Larger batches give smoother gradients and usually tolerate a different learning rate",
    ),
    (
        "learning_rate",
        "epochs",
        -0.5,
        "A lower learning rate typically needs more epochs to converge",
    ),
    (
        "learning_rate",
        "momentum",
        -0.6,
        "High momentum amplifies the effective step size, so the learning rate is usually lowered",
    ),
    (
        "learning_rate",
        "weight_decay",
        0.35,
        "Weight decay strength is often scaled together with the learning rate",
    ),
    (
        "learning_rate",
        "num_layers",
        -0.35,
        "Deeper networks are usually trained with smaller learning rates",
    ),
    (
        "batch_size",
        "epochs",
        0.45,
        "Larger batches perform fewer updates per epoch and often need more epochs",
    ),
    (
        "dropout",
        "hidden_units",
        0.6,
        "Wider layers have more capacity to overfit and benefit from more dropout",
    ),
    (
        "dropout",
        "epochs",
        0.4,
        "Stronger regularization slows fitting, so more epochs are needed",
    ),
    (
        "dropout",
        "weight_decay",
        -0.35,
        "Dropout and weight decay both regularize, so one is relaxed when the other is strong",
    ),
    (
        "dropout",
        "num_layers",
        0.5,
        "Deeper networks usually need more dropout to generalize",
    ),
];

/// Map common spellings to the names used in the pair table.
pub fn canonical_name(name: &str) -> String {
    let lower = name.to_lowercase();
    let canonical = if lower == "lr" || lower.contains("learning_rate") || lower.contains("learningrate")
    {
        "learning_rate"
    } else if lower.contains("batch") {
        "batch_size"
    } else if lower.contains("epoch") {
        "epochs"
    } else if lower.contains("dropout") {
        "dropout"
    } else if lower.contains("weight_decay") || lower == "l2" || lower.contains("l2_reg") {
        "weight_decay"
    } else if lower.contains("momentum") {
        "momentum"
    } else if lower.contains("hidden") || lower.contains("units") {
        "hidden_units"
    } else if lower.contains("layers") {
        "num_layers"
    } else {
        return lower;
    };
    canonical.to_string()
}

fn table_lookup(a: &str, b: &str) -> Option<(f64, &'static str)> {
    PAIR_TABLE.iter().find_map(|&(x, y, c, text)| {
        ((x == a && y == b) || (x == b && y == a)).then_some((c, text))
    })
}

/// Synthetic correlation matrix for `names`.
///
/// Known pairs come from the table; every other off-diagonal entry is uniform
/// noise in [-0.2, 0.2] rounded to two decimals.
pub fn generate_fallback_correlation_data<R: Rng>(
    names: &[String],
    rng: &mut R,
) -> CorrelationMatrix {
    let n = names.len();
    let canonical: Vec<String> = names.iter().map(|name| canonical_name(name)).collect();
    let mut matrix = vec![vec![0.0; n]; n];

    for i in 0..n {
        matrix[i][i] = 1.0;
        for j in (i + 1)..n {
            let value = match table_lookup(&canonical[i], &canonical[j]) {
                Some((c, _)) => c,
                None => (rng.gen_range(-0.2..=0.2_f64) * 100.0).round() / 100.0,
            };
            matrix[i][j] = value;
            matrix[j][i] = value;
        }
    }

    let mut result = CorrelationMatrix {
        parameter_names: names.to_vec(),
        matrix,
        explanations: Vec::new(),
    };
    result.explain_pairs(|a, b, c| pair_explanation(a, b, c));
    result
}

/// Table text for a known pair, otherwise a generic sentence.
pub fn pair_explanation(a: &str, b: &str, correlation: f64) -> String {
    match table_lookup(&canonical_name(a), &canonical_name(b)) {
        Some((_, text)) => text.to_string(),
        None => {
            let relation = if correlation < 0.0 {
                "tends to move opposite to"
            } else {
                "tends to move with"
            };
            format!("When tuning, {a} {relation} {b}")
        }
    }
}

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

/// Round to six significant digits to hide multiplication noise.
pub(crate) fn round_significant(v: f64) -> f64 {
    if v == 0.0 || !v.is_finite() {
        return v;
    }
    let digits = 6 - v.abs().log10().ceil() as i32;
    let factor = 10f64.powi(digits);
    (v * factor).round() / factor
}

fn finite_or(v: f64, fallback: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        fallback
    }
}

fn format_number(v: f64, integral: bool) -> String {
    if integral {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::Strength;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn xs(prediction: &PerformancePrediction) -> Vec<AxisValue> {
        prediction.series[0].data.iter().map(|p| p.x.clone()).collect()
    }

    #[test]
    fn test_learning_rate_keeps_current_value_verbatim() {
        let prediction = generate_fallback_prediction("learning_rate", "0.01");
        assert_eq!(prediction.parameter_type, ParameterKind::Continuous);
        assert!(xs(&prediction).contains(&AxisValue::Number(0.01)));
        assert_eq!(prediction.series.len(), 2);
        assert_eq!(prediction.suggested_values.len(), 2);
        assert!(prediction.is_well_formed());
    }

    #[test]
    fn test_continuous_points_are_clean_multiples() {
        let prediction = generate_fallback_prediction("learning_rate", "0.01");
        let values: Vec<f64> = xs(&prediction).iter().filter_map(AxisValue::as_f64).collect();
        assert_eq!(values, vec![0.001, 0.005, 0.01, 0.02, 0.1]);
    }

    #[test]
    fn test_accuracy_peaks_and_loss_mirrors() {
        let prediction = generate_fallback_prediction("batch_size", "32");
        let accuracy = &prediction.series[0].data;
        let loss = &prediction.series[1].data;
        let best = accuracy
            .iter()
            .max_by(|a, b| a.y.total_cmp(&b.y))
            .unwrap();
        assert_eq!(best.x, AxisValue::Number(32.0));
        for (a, l) in accuracy.iter().zip(loss) {
            assert_eq!(a.x, l.x);
            assert!((a.y + l.y - 1.0).abs() < 1e-9);
        }
        assert_eq!(prediction.suggested_values[0].value, "16");
        assert_eq!(prediction.suggested_values[1].value, "64");
    }

    #[test]
    fn test_small_integers_do_not_repeat_x_values() {
        let prediction = generate_fallback_prediction("batch_size", "1");
        let values: Vec<f64> = xs(&prediction).iter().filter_map(AxisValue::as_f64).collect();
        assert_eq!(values, vec![1.0, 2.0, 10.0]);
        let at_current = &prediction.series[0].data[0];
        assert!((at_current.y - PEAK_ACCURACY).abs() < 1e-9);
        assert_eq!(prediction.series[1].data.len(), 3);
    }

    #[test]
    fn test_huge_values_keep_finite_points() {
        let prediction = generate_fallback_prediction("clip_threshold", "1e308");
        assert!(prediction.is_well_formed());
        let values: Vec<f64> = xs(&prediction).iter().filter_map(AxisValue::as_f64).collect();
        assert_eq!(values.len(), 3);
        assert!(values.iter().all(|v| v.is_finite()));
        let json = serde_json::to_value(&prediction).unwrap();
        assert!(!json.to_string().contains("null"));
        assert!(prediction
            .suggested_values
            .iter()
            .all(|s| s.value.parse::<f64>().is_ok_and(f64::is_finite)));
    }

    #[test]
    fn test_categorical_optimizer() {
        let prediction = generate_fallback_prediction("optimizer", "adam");
        assert_eq!(prediction.parameter_type, ParameterKind::Categorical);
        let labels: Vec<AxisValue> = xs(&prediction);
        assert_eq!(
            labels,
            ["adam", "sgd", "rmsprop", "adagrad"]
                .iter()
                .map(|s| AxisValue::Label((*s).to_string()))
                .collect::<Vec<_>>()
        );
        let data = &prediction.series[0].data;
        assert!(data[1..].iter().all(|p| p.y < data[0].y));
        assert_eq!(prediction.suggested_values.len(), 2);
    }

    #[test]
    fn test_categorical_unknown_value_is_included() {
        let options = categorical_options("activation", "gelu");
        assert_eq!(options[0], "gelu");
        assert_eq!(options.len(), 5);
        let options = categorical_options("kernel_initializer", "he_normal");
        assert_eq!(options, vec!["he_normal", "default", "alternative"]);
    }

    #[test]
    fn test_non_numeric_continuous_falls_back_to_categorical() {
        let prediction = generate_fallback_prediction("learning_rate", "auto");
        assert_eq!(prediction.parameter_type, ParameterKind::Categorical);
        assert_eq!(prediction.suggested_values.len(), 2);
    }

    #[test]
    fn test_correlation_table_pair() {
        let names = vec!["lr".to_string(), "batch_size".to_string()];
        let mut rng = StdRng::seed_from_u64(7);
        let result = generate_fallback_correlation_data(&names, &mut rng);
        assert_eq!(result.matrix[0][1], -0.4);
        assert_eq!(result.matrix[1][0], -0.4);
        assert!(result.is_valid());
        assert_eq!(result.explanations.len(), 1);
        assert_eq!(result.explanations[0].strength, Strength::Low);
    }

    #[test]
    fn test_correlation_noise_is_bounded_and_unexplained() {
        let names: Vec<String> = ["alpha", "beta", "gamma", "delta"]
            .iter()
            .map(|s| (*s).to_string())
            .collect();
        let mut rng = StdRng::seed_from_u64(42);
        let result = generate_fallback_correlation_data(&names, &mut rng);
        assert!(result.is_valid());
        for (i, row) in result.matrix.iter().enumerate() {
            for (j, v) in row.iter().enumerate() {
                if i != j {
                    assert!((-0.2..=0.2).contains(v), "{v}");
                    assert_eq!((v * 100.0).round() / 100.0, *v);
                }
            }
        }
        assert!(result.explanations.is_empty());
    }

    #[test]
    fn test_correlation_empty_and_single() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            generate_fallback_correlation_data(&[], &mut rng),
            CorrelationMatrix::empty()
        );
        let single = generate_fallback_correlation_data(&["epochs".to_string()], &mut rng);
        assert_eq!(single.matrix, vec![vec![1.0]]);
    }

    #[test]
    fn test_canonical_names() {
        assert_eq!(canonical_name("LR"), "learning_rate");
        assert_eq!(canonical_name("train_batch_size"), "batch_size");
        assert_eq!(canonical_name("num_epochs"), "epochs");
        assert_eq!(canonical_name("Custom"), "custom");
    }
}

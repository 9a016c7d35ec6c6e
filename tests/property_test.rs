//! Property tests for extraction and matrix invariants.

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::{json, Map, Value};

use hyperexplainer::services::correlation_service::parse_correlation;
use hyperexplainer::services::fallback_generator::{
    generate_fallback_correlation_data, generate_fallback_prediction,
};
use hyperexplainer::services::{heuristic_scorer, pattern_extractor};

fn identifier() -> impl Strategy<Value = String> {
    "[a-z][a-z_]{0,11}"
}

fn distinct_names(max: usize) -> impl Strategy<Value = Vec<String>> {
    prop::collection::btree_set(identifier(), 0..max).prop_map(|set| set.into_iter().collect())
}

proptest! {
    #[test]
    fn fallback_matrix_is_valid(names in distinct_names(8), seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let result = generate_fallback_correlation_data(&names, &mut rng);
        let n = names.len();

        prop_assert!(result.is_valid());
        prop_assert_eq!(result.matrix.len(), n);
        for i in 0..n {
            prop_assert_eq!(result.matrix[i][i], 1.0);
            for j in 0..n {
                prop_assert_eq!(result.matrix[i][j], result.matrix[j][i]);
                prop_assert!((-1.0..=1.0).contains(&result.matrix[i][j]));
            }
        }
        for e in &result.explanations {
            prop_assert!(e.correlation.abs() > 0.3);
        }
    }

    #[test]
    fn model_matrix_is_sanitized(
        names in distinct_names(6).prop_filter("at least two", |n| n.len() >= 2),
        raw in prop::collection::vec(-3.0f64..3.0, 36),
    ) {
        let n = names.len();
        let rows: Vec<Value> = (0..n)
            .map(|i| json!(raw[i * n..(i + 1) * n].to_vec()))
            .collect();
        let mut object = Map::new();
        object.insert("matrix".to_string(), Value::Array(rows));

        let result = parse_correlation(&names, &object).unwrap();
        prop_assert!(result.is_valid());
        for i in 0..n {
            prop_assert_eq!(result.matrix[i][i], 1.0);
            for j in 0..n {
                prop_assert_eq!(result.matrix[i][j], result.matrix[j][i]);
                prop_assert!(result.matrix[i][j].abs() <= 1.0);
            }
        }
    }

    #[test]
    fn pattern_extraction_finds_every_numeric_assignment(
        assignments in prop::collection::btree_map(identifier(), 0u32..100_000, 0..10)
    ) {
        let code: String = assignments
            .iter()
            .map(|(name, value)| format!("{name} = {value}\n"))
            .collect();
        let params = pattern_extractor::extract(&code);

        prop_assert_eq!(params.len(), assignments.len());
        for (name, value) in &assignments {
            prop_assert_eq!(params[name].raw_value(), value.to_string());
        }
    }

    #[test]
    fn extractors_never_panic(code in "\\PC{0,400}") {
        let _ = pattern_extractor::extract(&code);
        let _ = heuristic_scorer::extract(&code);
    }

    #[test]
    fn fallback_prediction_is_well_formed(name in identifier(), value in "[0-9a-z.]{1,8}") {
        let prediction = generate_fallback_prediction(&name, &value);
        prop_assert!(prediction.is_well_formed());
        prop_assert_eq!(&prediction.parameter_name, &name);
        prop_assert_eq!(&prediction.current_value, &value);
    }
}

//! Pairwise parameter correlation matrix.

use serde::{Deserialize, Serialize};

/// Only pairs stronger than this get an explanation entry.
pub const EXPLANATION_THRESHOLD: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strength {
    High,
    Medium,
    Low,
}

impl Strength {
    /// Tier by magnitude: > 0.7 high, > 0.5 medium, else low.
    pub fn from_correlation(correlation: f64) -> Self {
        let magnitude = correlation.abs();
        if magnitude > 0.7 {
            Self::High
        } else if magnitude > 0.5 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrelationDirection {
    Positive,
    Negative,
}

impl CorrelationDirection {
    pub fn from_correlation(correlation: f64) -> Self {
        if correlation < 0.0 {
            Self::Negative
        } else {
            Self::Positive
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationExplanation {
    pub param1: String,
    pub param2: String,
    pub correlation: f64,
    pub strength: Strength,
    pub direction: CorrelationDirection,
    pub explanation: String,
}

impl CorrelationExplanation {
    /// Entry for one pair; strength and direction follow from the value.
    pub fn new(
        param1: impl Into<String>,
        param2: impl Into<String>,
        correlation: f64,
        explanation: impl Into<String>,
    ) -> Self {
        Self {
            param1: param1.into(),
            param2: param2.into(),
            correlation,
            strength: Strength::from_correlation(correlation),
            direction: CorrelationDirection::from_correlation(correlation),
            explanation: explanation.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationMatrix {
    pub parameter_names: Vec<String>,
    pub matrix: Vec<Vec<f64>>,
    pub explanations: Vec<CorrelationExplanation>,
}

impl CorrelationMatrix {
    pub fn empty() -> Self {
        Self {
            parameter_names: Vec::new(),
            matrix: Vec::new(),
            explanations: Vec::new(),
        }
    }

    /// Rebuild `explanations`: one entry per unordered pair above the threshold.
    pub fn explain_pairs<F>(&mut self, mut text_for: F)
    where
        F: FnMut(&str, &str, f64) -> String,
    {
        let mut explanations = Vec::new();
        for (i, row) in self.matrix.iter().enumerate() {
            for (j, &correlation) in row.iter().enumerate().skip(i + 1) {
                if correlation.abs() <= EXPLANATION_THRESHOLD {
                    continue;
                }
                let (Some(a), Some(b)) = (self.parameter_names.get(i), self.parameter_names.get(j))
                else {
                    continue;
                };
                let text = text_for(a, b, correlation);
                explanations.push(CorrelationExplanation::new(a.clone(), b.clone(), correlation, text));
            }
        }
        self.explanations = explanations;
    }

    /// Square, symmetric, unit diagonal, entries in [-1, 1], axes match names.
    pub fn is_valid(&self) -> bool {
        let n = self.parameter_names.len();
        if self.matrix.len() != n || self.matrix.iter().any(|row| row.len() != n) {
            return false;
        }
        for i in 0..n {
            if (self.matrix[i][i] - 1.0).abs() > f64::EPSILON {
                return false;
            }
            for j in 0..n {
                let v = self.matrix[i][j];
                if !v.is_finite() || !(-1.0..=1.0).contains(&v) {
                    return false;
                }
                if (v - self.matrix[j][i]).abs() > f64::EPSILON {
                    return false;
                }
            }
        }
        true
    }
}

//! Structured explanation of a single hyperparameter.

use serde::{Deserialize, Serialize};

/// Which way an alternative value moves relative to the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Lower,
    Higher,
}

impl Direction {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "lower" | "decrease" | "smaller" | "down" => Some(Self::Lower),
            "higher" | "increase" | "larger" | "up" => Some(Self::Higher),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lower => "lower",
            Self::Higher => "higher",
        }
    }
}

/// How advanced a suggested change is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Basic,
    Intermediate,
    Advanced,
}

impl Complexity {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "basic" | "beginner" | "simple" => Some(Self::Basic),
            "intermediate" | "medium" => Some(Self::Intermediate),
            "advanced" | "expert" => Some(Self::Advanced),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }

    /// Positional default: first third basic, next third intermediate, rest advanced.
    pub const fn for_position(index: usize, total: usize) -> Self {
        if index * 3 < total {
            Self::Basic
        } else if index * 3 < total * 2 {
            Self::Intermediate
        } else {
            Self::Advanced
        }
    }
}

/// A suggested alternative value. All four fields are always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlternativeValue {
    pub value: String,
    pub direction: Direction,
    pub effect: String,
    pub complexity: Complexity,
}

/// Canonical explanation record returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplanationRecord {
    pub importance: String,
    pub definition: String,
    pub current_value_analysis: String,
    pub alternative_values: Vec<AlternativeValue>,
    pub best_practices: String,
    pub trade_offs: String,
    pub impact_visualization: String,
}

/// The seven fields every explanation must carry, as they appear on the wire.
pub const REQUIRED_FIELDS: [&str; 7] = [
    "importance",
    "definition",
    "currentValueAnalysis",
    "alternativeValues",
    "bestPractices",
    "tradeOffs",
    "impactVisualization",
];

impl ExplanationRecord {
    /// True when every text field is non-empty and every alternative is complete.
    pub fn is_complete(&self) -> bool {
        let texts = [
            &self.importance,
            &self.definition,
            &self.current_value_analysis,
            &self.best_practices,
            &self.trade_offs,
            &self.impact_visualization,
        ];
        texts.iter().all(|t| !t.trim().is_empty())
            && !self.alternative_values.is_empty()
            && self
                .alternative_values
                .iter()
                .all(|alt| !alt.value.trim().is_empty() && !alt.effect.trim().is_empty())
    }
}

/// Result of explaining one parameter in a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplanationOutcome {
    pub name: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<ExplanationRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

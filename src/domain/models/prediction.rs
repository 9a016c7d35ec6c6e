//! Performance-impact prediction for a single parameter value.

use serde::{Deserialize, Serialize};

/// Whether a parameter is swept over numbers or chosen from options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterKind {
    Continuous,
    Categorical,
}

impl ParameterKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "continuous" | "numeric" | "numerical" => Some(Self::Continuous),
            "categorical" | "discrete" => Some(Self::Categorical),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Continuous => "continuous",
            Self::Categorical => "categorical",
        }
    }
}

/// X coordinate of a series point: a number for sweeps, a label for options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AxisValue {
    Number(f64),
    Label(String),
}

impl AxisValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Label(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub x: AxisValue,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    pub data: Vec<SeriesPoint>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedValue {
    pub value: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformancePrediction {
    pub parameter_name: String,
    pub parameter_type: ParameterKind,
    pub current_value: String,
    pub x_axis_label: String,
    pub y_axis_label: String,
    pub series: Vec<Series>,
    pub suggested_values: Vec<SuggestedValue>,
}

impl PerformancePrediction {
    /// Structural validity: at least one series and no empty series.
    pub fn is_well_formed(&self) -> bool {
        !self.series.is_empty()
            && self
                .series
                .iter()
                .all(|s| !s.data.is_empty() && s.data.iter().all(SeriesPoint::is_finite))
    }
}

impl SeriesPoint {
    /// Both coordinates are plottable; labels always are.
    pub fn is_finite(&self) -> bool {
        self.y.is_finite() && !matches!(self.x, AxisValue::Number(n) if !n.is_finite())
    }
}

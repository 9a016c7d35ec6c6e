//! Table output formatting for CLI commands
//!
//! Renders extraction results, explanations, predictions and correlation
//! matrices with comfy-table. Colours follow `NO_COLOR` and `TERM=dumb`.

use comfy_table::{presets, Attribute, Cell, Color, ContentArrangement, Table};
use std::env;

use super::truncate;
use crate::domain::models::{
    AxisValue, CorrelationMatrix, ExplanationRecord, ExtractedParameters, PerformancePrediction,
};
use crate::infrastructure::credentials::EnvReport;

/// Table formatter for CLI output
pub struct TableFormatter {
    use_colors: bool,
    max_width: Option<u16>,
}

impl TableFormatter {
    pub fn new() -> Self {
        Self {
            use_colors: supports_color(),
            max_width: None,
        }
    }

    pub const fn with_config(use_colors: bool, max_width: Option<u16>) -> Self {
        Self {
            use_colors,
            max_width,
        }
    }

    fn header(names: &[&str]) -> Vec<Cell> {
        names
            .iter()
            .map(|n| Cell::new(n).add_attribute(Attribute::Bold))
            .collect()
    }

    pub fn format_parameters(&self, params: &ExtractedParameters) -> String {
        if params.is_empty() {
            return "No hyperparameters found.".to_string();
        }
        let mut table = self.create_base_table();
        table.set_header(Self::header(&["Name", "Value", "Type"]));
        for (name, record) in params {
            table.add_row(vec![
                Cell::new(name),
                Cell::new(truncate(record.raw_value(), 60)),
                Cell::new(record.inferred_type().as_str()),
            ]);
        }
        table.to_string()
    }

    pub fn format_explanation(&self, name: &str, value: &str, record: &ExplanationRecord) -> String {
        let mut table = self.create_base_table();
        table.set_header(Self::header(&["Aspect", "Detail"]));
        let rows = [
            ("Importance", &record.importance),
            ("Definition", &record.definition),
            ("Current value", &record.current_value_analysis),
            ("Best practices", &record.best_practices),
            ("Trade-offs", &record.trade_offs),
            ("Impact", &record.impact_visualization),
        ];
        for (label, text) in rows {
            table.add_row(vec![Cell::new(label).add_attribute(Attribute::Bold), Cell::new(text)]);
        }

        let mut alternatives = self.create_base_table();
        alternatives.set_header(Self::header(&["Alternative", "Direction", "Complexity", "Effect"]));
        for alt in &record.alternative_values {
            alternatives.add_row(vec![
                Cell::new(&alt.value),
                Cell::new(alt.direction.as_str()),
                Cell::new(alt.complexity.as_str()),
                Cell::new(&alt.effect),
            ]);
        }

        format!("{name} = {value}\n{table}\n{alternatives}")
    }

    pub fn format_prediction(&self, prediction: &PerformancePrediction) -> String {
        let mut table = self.create_base_table();
        let mut header = vec![prediction.x_axis_label.as_str()];
        header.extend(prediction.series.iter().map(|s| s.name.as_str()));
        table.set_header(Self::header(&header));

        let points = prediction.series.first().map_or(0, |s| s.data.len());
        for i in 0..points {
            let x = match &prediction.series[0].data[i].x {
                AxisValue::Number(n) => n.to_string(),
                AxisValue::Label(l) => l.clone(),
            };
            let is_current = x == prediction.current_value;
            let mut row = vec![self.highlight(Cell::new(&x), is_current)];
            for series in &prediction.series {
                let y = series
                    .data
                    .get(i)
                    .map_or_else(|| "-".to_string(), |p| format!("{:.3}", p.y));
                row.push(Cell::new(y));
            }
            table.add_row(row);
        }

        let suggestions: Vec<String> = prediction
            .suggested_values
            .iter()
            .map(|s| {
                if s.reason.is_empty() {
                    format!("  - {}", s.value)
                } else {
                    format!("  - {}: {}", s.value, s.reason)
                }
            })
            .collect();

        format!(
            "{} = {} ({}), {}\n{table}\nSuggested values:\n{}",
            prediction.parameter_name,
            prediction.current_value,
            prediction.parameter_type.as_str(),
            prediction.y_axis_label,
            suggestions.join("\n")
        )
    }

    pub fn format_correlation(&self, matrix: &CorrelationMatrix) -> String {
        if matrix.parameter_names.is_empty() {
            return "No parameters to correlate.".to_string();
        }
        let mut table = self.create_base_table();
        let mut header = vec![""];
        header.extend(matrix.parameter_names.iter().map(String::as_str));
        table.set_header(Self::header(&header));

        for (name, row) in matrix.parameter_names.iter().zip(&matrix.matrix) {
            let mut cells = vec![Cell::new(name).add_attribute(Attribute::Bold)];
            cells.extend(row.iter().map(|c| self.correlation_cell(*c)));
            table.add_row(cells);
        }

        let notes: Vec<String> = matrix
            .explanations
            .iter()
            .map(|e| {
                format!(
                    "  {} / {} ({:+.2}, {} {}): {}",
                    e.param1,
                    e.param2,
                    e.correlation,
                    e.strength.as_str(),
                    e.direction.as_str(),
                    e.explanation
                )
            })
            .collect();
        if notes.is_empty() {
            table.to_string()
        } else {
            format!("{table}\nNotable pairs:\n{}", notes.join("\n"))
        }
    }

    pub fn format_env_report(&self, report: &EnvReport) -> String {
        let mut table = self.create_base_table();
        table.set_header(Self::header(&["Variable", "Status"]));
        let describe = |len: Option<usize>, required: bool| match len {
            Some(len) => format!("set ({len} characters)"),
            None if required => "missing (required)".to_string(),
            None => "not set (optional)".to_string(),
        };
        table.add_row(vec![
            Cell::new("GEMINI_API_KEY"),
            self.status_cell(
                describe(report.gemini_api_key_len, true),
                report.gemini_api_key_len.is_some(),
            ),
        ]);
        table.add_row(vec![
            Cell::new("GOOGLE_SERVICE_ACCOUNT_KEY"),
            Cell::new(describe(report.service_account_key_len, false)),
        ]);
        table.add_row(vec![
            Cell::new("GOOGLE_PROJECT_ID"),
            Cell::new(if report.project_id_set {
                "set"
            } else {
                "not set (optional)"
            }),
        ]);
        table.to_string()
    }

    fn highlight(&self, cell: Cell, on: bool) -> Cell {
        match (on, self.use_colors) {
            (true, true) => cell.fg(Color::Cyan).add_attribute(Attribute::Bold),
            (true, false) => cell.add_attribute(Attribute::Bold),
            _ => cell,
        }
    }

    fn status_cell(&self, text: String, ok: bool) -> Cell {
        if !self.use_colors {
            return Cell::new(text);
        }
        Cell::new(text).fg(if ok { Color::Green } else { Color::Red })
    }

    fn correlation_cell(&self, c: f64) -> Cell {
        let cell = Cell::new(format!("{c:+.2}"));
        if !self.use_colors || c.abs() <= 0.3 {
            return cell;
        }
        cell.fg(if c > 0.0 { Color::Green } else { Color::Red })
    }

    fn create_base_table(&self) -> Table {
        let mut table = Table::new();
        table
            .load_preset(presets::UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);
        if let Some(width) = self.max_width {
            table.set_width(width);
        }
        table
    }
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new()
    }
}

fn supports_color() -> bool {
    if env::var("NO_COLOR").is_ok() {
        return false;
    }
    !matches!(env::var("TERM").as_deref(), Ok("dumb"))
}

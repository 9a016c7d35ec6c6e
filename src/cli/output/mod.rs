//! Output formatting for CLI commands: comfy-table tables, indicatif spinners
//! and the shared human/JSON switch.

pub mod progress;
pub mod table;

use anyhow::Result;
use serde::Serialize;

/// Print `value` as pretty JSON, or the `human` rendering otherwise.
pub fn emit<T: Serialize>(value: &T, json: bool, human: impl FnOnce(&T) -> String) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", human(value));
    }
    Ok(())
}

/// Truncate a string to a maximum number of characters, appending "..." if truncated.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

//! Console lines for rolls and history listings.

use chrono::NaiveDateTime;

use crate::history::HistoryEntry;
use crate::notation::VALID_FORMATS;
use crate::roller::RollOutcome;

pub const HISTORY_HEADER: &str = "📜 Roll History:";
pub const HISTORY_RULE_WIDTH: usize = 50;
pub const NO_HISTORY: &str = "📜 No roll history found.";
pub const HISTORY_CLEARED: &str = "🗑️  Roll history cleared.";
pub const CLEAR_PROMPT: &str = "Are you sure you want to clear all history?";

pub fn roll_line(command: &str, total: i64) -> String {
    format!("🎲 {} → {}", command, total)
}

/// Per-die breakdown; only shown when more than one die was rolled.
pub fn breakdown_line(rolls: &[u32], modifier: i64, total: i64) -> Option<String> {
    if rolls.len() <= 1 {
        return None;
    }
    let joined = rolls
        .iter()
        .map(|r| r.to_string())
        .collect::<Vec<_>>()
        .join(" + ");
    if modifier == 0 {
        Some(format!("   Rolls: [{}] = {}", joined, total))
    } else {
        let sum: i64 = rolls.iter().map(|&r| i64::from(r)).sum();
        Some(format!(
            "   Rolls: [{}] = {} {} = {}",
            joined,
            sum,
            format_modifier(modifier),
            total
        ))
    }
}

pub fn outcome_lines(outcome: &RollOutcome) -> Vec<String> {
    let mut lines = vec![roll_line(&outcome.command, outcome.total)];
    lines.extend(breakdown_line(
        &outcome.rolls,
        outcome.spec.modifier(),
        outcome.total,
    ));
    lines
}

/// Timestamp, roll line and breakdown for one history entry.
pub fn entry_lines(entry: &HistoryEntry) -> Vec<String> {
    let mut lines = vec![
        format!("🕐 {}", history_timestamp(entry.timestamp)),
        roll_line(&entry.command, entry.total),
    ];
    lines.extend(breakdown_line(
        &entry.individual_rolls,
        entry.modifier,
        entry.total,
    ));
    lines
}

pub fn history_timestamp(ts: NaiveDateTime) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}

pub fn history_rule() -> String {
    "=".repeat(HISTORY_RULE_WIDTH)
}

pub fn invalid_notation_lines(text: &str) -> [String; 2] {
    [
        format!("❌ Invalid dice notation: {}", text),
        format!("Valid formats: {}", VALID_FORMATS),
    ]
}

fn format_modifier(modifier: i64) -> String {
    if modifier >= 0 {
        format!("+{}", modifier)
    } else {
        format!("-{}", modifier.unsigned_abs())
    }
}

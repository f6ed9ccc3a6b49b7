//! Evaluation metric parsing
//!
//! The evaluate stage produces a free-text narrative. This module pulls
//! the typed fields out of it deterministically: a resolution percentage
//! from the first percentage on a resolution line, an overall score from
//! the first score line, and resolved/new issue lists from bulleted
//! sections. When a field cannot be found it stays `None`/empty and the
//! narrative remains the authoritative record.

use crate::types::EvaluationMetrics;
use once_cell::sync::Lazy;
use regex::Regex;

static PERCENTAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,3}(?:\.\d+)?)\s*%").expect("percentage pattern compiles"));

static SCORE_FRACTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,3})\s*/\s*100").expect("score fraction pattern compiles"));

static FIRST_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,3})\b").expect("number pattern compiles"));

/// Parse the typed fields out of an evaluation narrative
#[must_use]
pub fn parse_metrics(artifact_name: &str, evaluation_text: String) -> EvaluationMetrics {
    let resolution_percentage = resolution_percentage(&evaluation_text);
    let overall_score = overall_score(&evaluation_text);
    let resolved_issues = bullet_section(&evaluation_text, "resolv");
    let new_issues = bullet_section(&evaluation_text, "new");

    if resolution_percentage.is_none() && overall_score.is_none() {
        tracing::debug!(
            artifact = artifact_name,
            "evaluation narrative yielded no structured fields"
        );
    }

    EvaluationMetrics {
        artifact_name: artifact_name.to_string(),
        evaluation_text,
        resolved_issues,
        resolution_percentage,
        new_issues,
        overall_score,
    }
}

/// First percentage on a line that talks about resolution
fn resolution_percentage(text: &str) -> Option<f64> {
    for line in text.lines() {
        if !line.to_lowercase().contains("resol") {
            continue;
        }
        if let Some(caps) = PERCENTAGE.captures(line) {
            if let Ok(value) = caps[1].parse::<f64>() {
                if (0.0..=100.0).contains(&value) {
                    return Some(value);
                }
            }
        }
    }
    None
}

/// Score from the first line mentioning "score": `N/100` wins over a bare
/// leading number
fn overall_score(text: &str) -> Option<u8> {
    for line in text.lines() {
        if !line.to_lowercase().contains("score") {
            continue;
        }
        if let Some(caps) = SCORE_FRACTION.captures(line) {
            if let Some(value) = parse_score(&caps[1]) {
                return Some(value);
            }
        }
        if let Some(caps) = FIRST_NUMBER.captures(line) {
            if let Some(value) = parse_score(&caps[1]) {
                return Some(value);
            }
        }
    }
    None
}

fn parse_score(digits: &str) -> Option<u8> {
    digits.parse::<u8>().ok().filter(|value| *value <= 100)
}

/// Bulleted items under the first heading containing `marker`
///
/// A heading is a line starting with `#` or ending with `:`; the section
/// runs until the next heading.
fn bullet_section(text: &str, marker: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut in_section = false;

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if is_heading(trimmed) {
            in_section = trimmed.to_lowercase().contains(marker);
            continue;
        }
        if in_section {
            if let Some(item) = bullet_text(trimmed) {
                items.push(item.to_string());
            }
        }
    }

    items
}

fn is_heading(line: &str) -> bool {
    line.starts_with('#') || line.ends_with(':')
}

fn bullet_text(line: &str) -> Option<&str> {
    if let Some(rest) = line.strip_prefix("- ").or_else(|| line.strip_prefix("* ")) {
        return Some(rest.trim());
    }

    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        let rest = &line[digits..];
        if let Some(rest) = rest.strip_prefix(". ").or_else(|| rest.strip_prefix(") ")) {
            return Some(rest.trim());
        }
    }

    None
}

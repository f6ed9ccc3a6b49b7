//! Fenced-block extraction
//!
//! Recovers machine-usable bodies from free-form generated text. A fence
//! is matched to the nearest subsequent closing fence, so nested or
//! malformed fences truncate rather than merge. Tag matching is
//! case-insensitive, and `yaml`/`yml` label the same content type.

use once_cell::sync::Lazy;
use regex::Regex;

static SQL_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)```sql[ \t]*\r?\n(.*?)```").expect("sql fence pattern compiles")
});

static YAML_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)```ya?ml[ \t]*\r?\n(.*?)```").expect("yaml fence pattern compiles")
});

fn fence_regex(tag: &str) -> Regex {
    match tag.to_ascii_lowercase().as_str() {
        "sql" => SQL_FENCE.clone(),
        "yaml" | "yml" => YAML_FENCE.clone(),
        other => Regex::new(&format!(r"(?is)```{}[ \t]*\r?\n(.*?)```", regex::escape(other)))
            .expect("escaped tag pattern compiles"),
    }
}

/// Extract the bodies of all fenced blocks tagged `tag`, in order of
/// appearance, trimmed of surrounding whitespace
#[must_use]
pub fn extract_fenced(text: &str, tag: &str) -> Vec<String> {
    fence_regex(tag)
        .captures_iter(text)
        .map(|caps| caps[1].trim().to_string())
        .collect()
}

/// First fenced block tagged `tag`, if any
///
/// Later matches are discarded; a warning records how many, since multiple
/// same-tagged blocks usually mean the generator split one body.
#[must_use]
pub fn first_fenced(text: &str, tag: &str) -> Option<String> {
    let mut matches = extract_fenced(text, tag);
    if matches.len() > 1 {
        tracing::warn!(
            tag,
            discarded = matches.len() - 1,
            "multiple fenced blocks found; keeping the first"
        );
    }
    if matches.is_empty() {
        None
    } else {
        Some(matches.swap_remove(0))
    }
}

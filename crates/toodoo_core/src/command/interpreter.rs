//! Utterance-to-intent interpreter.
//!
//! # Responsibility
//! - Turn one utterance into at most one create-intent plus an optional
//!   category hint for the caller's ambient selection.
//!
//! # Invariants
//! - Pure: output depends only on (utterance, ambient category, bound).
//! - Matching is case-insensitive; titles come out lowercased and trimmed.
//! - A blank or filler-only utterance yields no intent. That is not an error.
//! - Category hints are checked as substrings in the fixed order
//!   work, personal, urgent, and are reported even when the explicit-add
//!   pattern matched.

use crate::model::task::{normalize_title, TaskCategory};
use once_cell::sync::Lazy;
use regex::Regex;

static EXPLICIT_ADD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"add\s+["']?([^"']+)["']?\s+to\s+my\s+list"#).expect("valid explicit-add regex")
});
static LEADING_FILLER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:ok|okay|hey|hi|umm|uh|add|create|new|todo|task)\s+")
        .expect("valid leading filler regex")
});
static LEADING_CATEGORY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:work|personal|urgent)\s+").expect("valid category regex"));
static TRAILING_FILLER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+(?:todo|task)$").expect("valid trailing filler regex"));

/// Category keywords in detection priority order.
const CATEGORY_HINTS: &[(&str, TaskCategory)] = &[
    ("work", TaskCategory::Work),
    ("personal", TaskCategory::Personal),
    ("urgent", TaskCategory::Urgent),
];

/// Request to create one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateIntent {
    pub title: String,
    pub category: TaskCategory,
}

/// Result of interpreting one utterance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Interpretation {
    pub intent: Option<CreateIntent>,
    /// New ambient category the caller should select.
    pub category_update: Option<TaskCategory>,
}

impl Interpretation {
    /// True when the utterance produced nothing actionable.
    pub fn is_empty(&self) -> bool {
        self.intent.is_none() && self.category_update.is_none()
    }
}

/// Interprets `utterance` against the caller's ambient category.
///
/// Intents carry `ambient` as their category; a hint found in the same
/// utterance is reported in `category_update` and applies to later calls.
pub fn interpret(utterance: &str, ambient: TaskCategory, max_title_chars: usize) -> Interpretation {
    let normalized = utterance.trim().to_lowercase();
    let category_update = detect_category(&normalized);

    let intent = match EXPLICIT_ADD_RE.captures(&normalized) {
        Some(caps) => caps
            .get(1)
            .and_then(|text| normalize_title(text.as_str(), max_title_chars)),
        None => fallback_title(&normalized, max_title_chars),
    }
    .map(|title| CreateIntent {
        title,
        category: ambient,
    });

    Interpretation {
        intent,
        category_update,
    }
}

/// First category keyword contained in `normalized`, if any.
pub fn detect_category(normalized: &str) -> Option<TaskCategory> {
    CATEGORY_HINTS
        .iter()
        .find(|(keyword, _)| normalized.contains(keyword))
        .map(|(_, category)| *category)
}

fn fallback_title(normalized: &str, max_title_chars: usize) -> Option<String> {
    if normalized.is_empty() {
        return None;
    }
    let stripped = LEADING_FILLER_RE.replace(normalized, "");
    let stripped = LEADING_CATEGORY_RE.replace(&stripped, "");
    let stripped = TRAILING_FILLER_RE.replace(&stripped, "");
    normalize_title(&stripped, max_title_chars)
}

//! Check scorers.
//!
//! Each check produces a 0-100 sub-score for one dimension. Static-analysis
//! and format checks inspect lexical/structural properties of the deliverable
//! text; content checks apply textual completeness/clarity heuristics.
//! Semantic checks delegate to the pluggable `ArtifactValidator`; when no
//! validator is configured they degrade to a neutral score instead of failing
//! the assessment.

use crate::config::CheckConfig;
use assay_core::{AssayResult, CheckKind, DeliverableRecord};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

/// Score used when an external check provider is unavailable.
pub const NEUTRAL_SCORE: f64 = 50.0;

/// Optional pluggable rules/compliance engine consumed by semantic checks
/// (and by unrecognized check names, when present).
#[async_trait]
pub trait ArtifactValidator: Send + Sync {
    /// Score one check against one deliverable, 0-100.
    async fn validate_artifact(
        &self,
        deliverable: &DeliverableRecord,
        check: &CheckConfig,
    ) -> AssayResult<f64>;
}

/// Outcome of one executed check.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckOutcome {
    pub score: f64,
    /// True when the scorer fell back to `NEUTRAL_SCORE` because an external
    /// provider was unavailable or failed.
    pub degraded: bool,
    pub detail: Option<String>,
}

impl CheckOutcome {
    fn scored(score: f64) -> Self {
        Self {
            score: score.clamp(0.0, 100.0),
            degraded: false,
            detail: None,
        }
    }

    fn degraded(detail: impl Into<String>) -> Self {
        Self {
            score: NEUTRAL_SCORE,
            degraded: true,
            detail: Some(detail.into()),
        }
    }
}

/// Execute one check. `None` means the check is not executable with the
/// current configuration (unknown scorer, no validator to delegate to);
/// the engine reports that as a configuration gap rather than an error.
pub async fn run_check(
    deliverable: &DeliverableRecord,
    check: &CheckConfig,
    validator: Option<&dyn ArtifactValidator>,
) -> Option<CheckOutcome> {
    if check.kind == CheckKind::SemanticValidation {
        return Some(delegate(deliverable, check, validator).await);
    }

    let content = deliverable.content.as_str();
    let outcome = match check.name.as_str() {
        "line_length" => {
            let max = param_u64(check, "max_line_length", 120) as usize;
            CheckOutcome::scored(line_length_score(content, max))
        }
        "trailing_whitespace" => CheckOutcome::scored(trailing_whitespace_score(content)),
        "todo_density" => {
            let max_per_kloc = param_u64(check, "max_per_kloc", 5);
            CheckOutcome::scored(todo_density_score(content, max_per_kloc))
        }
        "identifier_length" => {
            let min_len = param_u64(check, "min_len", 3) as usize;
            CheckOutcome::scored(identifier_length_score(content, min_len))
        }
        "indentation" => CheckOutcome::scored(indentation_score(content)),
        "heading_case" => CheckOutcome::scored(heading_case_score(content)),
        "markdown_structure" => CheckOutcome::scored(markdown_structure_score(content)),
        "balanced_delimiters" => CheckOutcome::scored(balanced_delimiters_score(content)),
        "key_value_balance" => CheckOutcome::scored(key_value_balance_score(content)),
        "test_case_density" => {
            let min_cases = param_u64(check, "min_cases", 3);
            CheckOutcome::scored(test_case_density_score(content, min_cases))
        }
        "assertion_density" => {
            let min_per_case = param_u64(check, "min_per_case", 1);
            CheckOutcome::scored(assertion_density_score(content, min_per_case))
        }
        "min_length" => {
            let min_chars = param_u64(check, "min_chars", 50) as usize;
            CheckOutcome::scored(min_length_score(content, min_chars))
        }
        "section_coverage" => {
            let required = param_str_list(check, "required_sections");
            CheckOutcome::scored(section_coverage_score(content, &required))
        }
        "sentence_structure" => {
            let max_avg = param_u64(check, "max_avg_sentence_words", 30) as f64;
            CheckOutcome::scored(sentence_structure_score(content, max_avg))
        }
        "filler_density" => CheckOutcome::scored(filler_density_score(content)),
        _ => {
            // Unknown scorer: delegate when a validator is present, otherwise
            // the check is not executable.
            return match validator {
                Some(_) => Some(delegate(deliverable, check, validator).await),
                None => None,
            };
        }
    };
    Some(outcome)
}

async fn delegate(
    deliverable: &DeliverableRecord,
    check: &CheckConfig,
    validator: Option<&dyn ArtifactValidator>,
) -> CheckOutcome {
    match validator {
        Some(v) => match v.validate_artifact(deliverable, check).await {
            Ok(score) => CheckOutcome::scored(score),
            Err(err) => CheckOutcome::degraded(format!(
                "external validator failed for '{}': {err}",
                check.name
            )),
        },
        None => CheckOutcome::degraded(format!(
            "no external validator configured for '{}'",
            check.name
        )),
    }
}

// ============================================================================
// PARAMETER HELPERS
// ============================================================================

fn param_u64(check: &CheckConfig, key: &str, default: u64) -> u64 {
    check.config.get(key).and_then(|v| v.as_u64()).unwrap_or(default)
}

fn param_str_list(check: &CheckConfig, key: &str) -> Vec<String> {
    check
        .config
        .get(key)
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|i| i.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

// ============================================================================
// STATIC ANALYSIS SCORERS
// ============================================================================

fn non_empty_lines(content: &str) -> impl Iterator<Item = &str> {
    content.lines().filter(|l| !l.trim().is_empty())
}

fn ratio_score(conforming: usize, total: usize) -> f64 {
    if total == 0 {
        return 100.0;
    }
    conforming as f64 / total as f64 * 100.0
}

fn line_length_score(content: &str, max: usize) -> f64 {
    let total = content.lines().count();
    let conforming = content.lines().filter(|l| l.chars().count() <= max).count();
    ratio_score(conforming, total)
}

fn trailing_whitespace_score(content: &str) -> f64 {
    let total = content.lines().count();
    let clean = content
        .lines()
        .filter(|l| !l.ends_with(' ') && !l.ends_with('\t'))
        .count();
    ratio_score(clean, total)
}

static TODO_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(TODO|FIXME|XXX|HACK)\b").unwrap());

fn todo_density_score(content: &str, max_per_kloc: u64) -> f64 {
    let lines = content.lines().count().max(1);
    let markers = TODO_MARKER.find_iter(content).count() as f64;
    let allowed = (max_per_kloc as f64 * lines as f64 / 1000.0).max(1.0);
    if markers <= allowed {
        100.0
    } else {
        (100.0 - (markers - allowed) * 15.0).max(0.0)
    }
}

static IDENTIFIER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[A-Za-z_][A-Za-z0-9_]*\b").unwrap());

fn identifier_length_score(content: &str, min_len: usize) -> f64 {
    let mut total = 0usize;
    let mut long_enough = 0usize;
    for m in IDENTIFIER.find_iter(content) {
        total += 1;
        if m.as_str().len() >= min_len {
            long_enough += 1;
        }
    }
    ratio_score(long_enough, total)
}

fn indentation_score(content: &str) -> f64 {
    let mut spaces = 0usize;
    let mut tabs = 0usize;
    for line in content.lines() {
        if line.starts_with(' ') {
            spaces += 1;
        } else if line.starts_with('\t') {
            tabs += 1;
        }
    }
    let indented = spaces + tabs;
    ratio_score(spaces.max(tabs), indented)
}

static HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^#{1,6}\s+(.*)$").unwrap());

fn heading_case_score(content: &str) -> f64 {
    let mut total = 0usize;
    let mut capitalized = 0usize;
    for cap in HEADING.captures_iter(content) {
        total += 1;
        if cap[1].chars().next().is_some_and(|c| c.is_uppercase() || c.is_numeric()) {
            capitalized += 1;
        }
    }
    ratio_score(capitalized, total)
}

static TEST_ATTRIBUTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"#\[test\]|#\[tokio::test\]").unwrap());
static TEST_DEFINITION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bfn test_|\bit\(|\btest\(|\bdef test_").unwrap());

/// Count test cases without double-counting attribute + definition pairs.
fn count_test_cases(content: &str) -> usize {
    let attributes = TEST_ATTRIBUTE.find_iter(content).count();
    let definitions = TEST_DEFINITION.find_iter(content).count();
    attributes.max(definitions)
}

fn test_case_density_score(content: &str, min_cases: u64) -> f64 {
    let cases = count_test_cases(content) as f64;
    let required = min_cases.max(1) as f64;
    (cases / required * 100.0).min(100.0)
}

static ASSERTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bassert\w*!?\(|\bexpect\(|\bshould\b").unwrap());

fn assertion_density_score(content: &str, min_per_case: u64) -> f64 {
    let cases = count_test_cases(content);
    if cases == 0 {
        return 0.0;
    }
    let assertions = ASSERTION.find_iter(content).count() as f64;
    let required = (cases as u64 * min_per_case.max(1)) as f64;
    (assertions / required * 100.0).min(100.0)
}

// ============================================================================
// FORMAT COMPLIANCE SCORERS
// ============================================================================

fn markdown_structure_score(content: &str) -> f64 {
    match HEADING.find_iter(content).count() {
        0 => 40.0,
        1 => 70.0,
        _ => 100.0,
    }
}

fn balanced_delimiters_score(content: &str) -> f64 {
    let mut mismatched_kinds = 0;
    for (open, close) in [('(', ')'), ('{', '}'), ('[', ']')] {
        let opens = content.matches(open).count();
        let closes = content.matches(close).count();
        if opens != closes {
            mismatched_kinds += 1;
        }
    }
    (100.0 - mismatched_kinds as f64 * 30.0).max(0.0)
}

fn key_value_balance_score(content: &str) -> f64 {
    let mut total = 0usize;
    let mut keyed = 0usize;
    for line in non_empty_lines(content) {
        let trimmed = line.trim_start();
        if trimmed.starts_with('#') || trimmed.starts_with("//") || trimmed.starts_with(';') {
            continue;
        }
        total += 1;
        if trimmed.contains(':') || trimmed.contains('=')
            || trimmed.starts_with('[') || trimmed.starts_with('-')
            || trimmed.starts_with('{') || trimmed.starts_with('}')
        {
            keyed += 1;
        }
    }
    ratio_score(keyed, total)
}

// ============================================================================
// CONTENT ANALYSIS SCORERS
// ============================================================================

fn min_length_score(content: &str, min_chars: usize) -> f64 {
    let len = content.trim().chars().count();
    if min_chars == 0 || len >= min_chars {
        100.0
    } else {
        len as f64 / min_chars as f64 * 100.0
    }
}

fn section_coverage_score(content: &str, required: &[String]) -> f64 {
    if required.is_empty() {
        return 100.0;
    }
    let lower = content.to_ascii_lowercase();
    let present = required
        .iter()
        .filter(|section| lower.contains(&section.to_ascii_lowercase()))
        .count();
    ratio_score(present, required.len())
}

fn sentence_structure_score(content: &str, max_avg_words: f64) -> f64 {
    let sentences: Vec<&str> = content
        .split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    if sentences.is_empty() {
        return NEUTRAL_SCORE;
    }
    let total_words: usize = sentences.iter().map(|s| s.split_whitespace().count()).sum();
    let avg = total_words as f64 / sentences.len() as f64;
    if avg <= max_avg_words {
        100.0
    } else {
        (100.0 - (avg - max_avg_words) * 4.0).max(0.0)
    }
}

static FILLER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(very|really|just|basically|actually|simply|quite|somewhat|perhaps)\b")
        .unwrap()
});

fn filler_density_score(content: &str) -> f64 {
    let words = content.split_whitespace().count();
    if words == 0 {
        return 100.0;
    }
    let fillers = FILLER.find_iter(content).count() as f64;
    let per_hundred = fillers / words as f64 * 100.0;
    if per_hundred <= 2.0 {
        100.0
    } else {
        (100.0 - (per_hundred - 2.0) * 15.0).max(0.0)
    }
}

// ============================================================================
// TESTS
// ============================================================================

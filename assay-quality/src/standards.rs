//! Built-in quality standards per file-type category.
//!
//! One validated default standard exists for each `FileCategory`. Category
//! resolution is total: unrecognized file types resolve to the document
//! standard rather than being rejected.

use crate::config::{
    CheckConfig, DimensionConfig, ImprovementThresholds, QualityStandardConfig, ScoringWeights,
    DEFAULT_COMPLIANCE_THRESHOLD, WEIGHT_SUM_TOLERANCE,
};
use assay_core::{CheckKind, FileCategory, QualityDimension};
use once_cell::sync::Lazy;
use serde_json::json;

fn check(name: &str, kind: CheckKind, weight: f64, config: serde_json::Value) -> CheckConfig {
    CheckConfig {
        name: name.to_string(),
        kind,
        weight,
        config,
    }
}

fn dimension(
    dimension: QualityDimension,
    weight: f64,
    minimum_score: f64,
    checks: Vec<CheckConfig>,
) -> DimensionConfig {
    DimensionConfig {
        dimension,
        weight,
        minimum_score,
        checks,
    }
}

fn standard(
    name: &str,
    category: FileCategory,
    file_types: &[&str],
    dimensions: Vec<DimensionConfig>,
    compliance_rules: &[&str],
) -> QualityStandardConfig {
    QualityStandardConfig {
        name: name.to_string(),
        category,
        file_types: file_types.iter().map(|s| s.to_string()).collect(),
        dimensions,
        compliance_rules: compliance_rules.iter().map(|s| s.to_string()).collect(),
        scoring_weights: ScoringWeights::default(),
        improvement_thresholds: ImprovementThresholds::default(),
        compliance_threshold: DEFAULT_COMPLIANCE_THRESHOLD,
        weight_tolerance: WEIGHT_SUM_TOLERANCE,
    }
}

/// Default standard for source-code deliverables.
static CODE_STANDARD: Lazy<QualityStandardConfig> = Lazy::new(|| {
    standard(
        "code-baseline",
        FileCategory::Code,
        &["rs", "ts", "tsx", "js", "jsx", "py", "go", "java", "c", "cpp", "h"],
        vec![
            dimension(
                QualityDimension::Format,
                0.20,
                60.0,
                vec![
                    check("line_length", CheckKind::StaticAnalysis, 0.5, json!({"max_line_length": 120})),
                    check("trailing_whitespace", CheckKind::StaticAnalysis, 0.5, json!(null)),
                ],
            ),
            dimension(
                QualityDimension::Completeness,
                0.20,
                60.0,
                vec![
                    check("min_length", CheckKind::ContentAnalysis, 0.6, json!({"min_chars": 80})),
                    check("todo_density", CheckKind::StaticAnalysis, 0.4, json!({"max_per_kloc": 5})),
                ],
            ),
            dimension(
                QualityDimension::Accuracy,
                0.25,
                65.0,
                vec![
                    check("artifact_rules", CheckKind::SemanticValidation, 0.6, json!(null)),
                    check("balanced_delimiters", CheckKind::FormatCompliance, 0.4, json!(null)),
                ],
            ),
            dimension(
                QualityDimension::Clarity,
                0.20,
                55.0,
                vec![
                    check("identifier_length", CheckKind::StaticAnalysis, 0.5, json!({"min_len": 3})),
                    check("filler_density", CheckKind::ContentAnalysis, 0.5, json!(null)),
                ],
            ),
            dimension(
                QualityDimension::Consistency,
                0.15,
                55.0,
                vec![check("indentation", CheckKind::StaticAnalysis, 1.0, json!(null))],
            ),
        ],
        &["code-review-ruleset"],
    )
});

/// Default standard for documents; also the fallback for unknown file types.
static DOCUMENT_STANDARD: Lazy<QualityStandardConfig> = Lazy::new(|| {
    standard(
        "document-baseline",
        FileCategory::Document,
        &["md", "txt", "rst", "adoc"],
        vec![
            dimension(
                QualityDimension::Format,
                0.20,
                55.0,
                vec![check("markdown_structure", CheckKind::FormatCompliance, 1.0, json!(null))],
            ),
            dimension(
                QualityDimension::Completeness,
                0.25,
                60.0,
                vec![
                    check("min_length", CheckKind::ContentAnalysis, 0.5, json!({"min_chars": 200})),
                    check("section_coverage", CheckKind::ContentAnalysis, 0.5, json!({"required_sections": ["summary", "detail"]})),
                ],
            ),
            // Accuracy floor sits at the neutral score so a missing external
            // validator degrades the dimension without failing it outright.
            dimension(
                QualityDimension::Accuracy,
                0.20,
                50.0,
                vec![check("artifact_rules", CheckKind::SemanticValidation, 1.0, json!(null))],
            ),
            dimension(
                QualityDimension::Clarity,
                0.25,
                55.0,
                vec![
                    check("sentence_structure", CheckKind::ContentAnalysis, 0.5, json!({"max_avg_sentence_words": 30})),
                    check("filler_density", CheckKind::ContentAnalysis, 0.5, json!(null)),
                ],
            ),
            dimension(
                QualityDimension::Consistency,
                0.10,
                50.0,
                vec![check("heading_case", CheckKind::StaticAnalysis, 1.0, json!(null))],
            ),
        ],
        &["style-guide"],
    )
});

/// Default standard for test deliverables. Completeness and accuracy carry
/// the emphasis (combined weight above 0.55).
static TEST_STANDARD: Lazy<QualityStandardConfig> = Lazy::new(|| {
    standard(
        "test-baseline",
        FileCategory::Test,
        &["spec", "test"],
        vec![
            dimension(
                QualityDimension::Format,
                0.10,
                50.0,
                vec![check("line_length", CheckKind::StaticAnalysis, 1.0, json!({"max_line_length": 120}))],
            ),
            dimension(
                QualityDimension::Completeness,
                0.35,
                65.0,
                vec![
                    check("test_case_density", CheckKind::StaticAnalysis, 0.6, json!({"min_cases": 3})),
                    check("min_length", CheckKind::ContentAnalysis, 0.4, json!({"min_chars": 120})),
                ],
            ),
            dimension(
                QualityDimension::Accuracy,
                0.30,
                65.0,
                vec![
                    check("assertion_density", CheckKind::StaticAnalysis, 0.6, json!({"min_per_case": 1})),
                    check("artifact_rules", CheckKind::SemanticValidation, 0.4, json!(null)),
                ],
            ),
            dimension(
                QualityDimension::Clarity,
                0.15,
                55.0,
                vec![check("identifier_length", CheckKind::StaticAnalysis, 1.0, json!({"min_len": 3}))],
            ),
            dimension(
                QualityDimension::Consistency,
                0.10,
                50.0,
                vec![check("indentation", CheckKind::StaticAnalysis, 1.0, json!(null))],
            ),
        ],
        &["test-coverage-ruleset"],
    )
});

/// Default standard for configuration files. Format and accuracy carry the
/// emphasis (combined weight above 0.6).
static CONFIGURATION_STANDARD: Lazy<QualityStandardConfig> = Lazy::new(|| {
    standard(
        "configuration-baseline",
        FileCategory::Configuration,
        &["json", "yaml", "yml", "toml", "ini", "env", "cfg", "conf"],
        vec![
            dimension(
                QualityDimension::Format,
                0.35,
                70.0,
                vec![
                    check("key_value_balance", CheckKind::FormatCompliance, 0.6, json!(null)),
                    check("trailing_whitespace", CheckKind::StaticAnalysis, 0.4, json!(null)),
                ],
            ),
            dimension(
                QualityDimension::Completeness,
                0.15,
                60.0,
                vec![check("min_length", CheckKind::ContentAnalysis, 1.0, json!({"min_chars": 20}))],
            ),
            dimension(
                QualityDimension::Accuracy,
                0.30,
                70.0,
                vec![
                    check("balanced_delimiters", CheckKind::FormatCompliance, 0.5, json!(null)),
                    check("artifact_rules", CheckKind::SemanticValidation, 0.5, json!(null)),
                ],
            ),
            dimension(
                QualityDimension::Clarity,
                0.10,
                50.0,
                vec![check("filler_density", CheckKind::ContentAnalysis, 1.0, json!(null))],
            ),
            dimension(
                QualityDimension::Consistency,
                0.10,
                50.0,
                vec![check("indentation", CheckKind::StaticAnalysis, 1.0, json!(null))],
            ),
        ],
        &["schema-ruleset"],
    )
});

/// Built-in standard for a category.
pub fn builtin_standard(category: FileCategory) -> &'static QualityStandardConfig {
    match category {
        FileCategory::Code => &CODE_STANDARD,
        FileCategory::Document => &DOCUMENT_STANDARD,
        FileCategory::Test => &TEST_STANDARD,
        FileCategory::Configuration => &CONFIGURATION_STANDARD,
    }
}

/// Resolve a category from an optional file type. `None`, empty, and unknown
/// inputs all resolve to `Document` so this never fails.
pub fn resolve_category(file_type: Option<&str>) -> FileCategory {
    match file_type {
        Some(raw) if !raw.trim().is_empty() => {
            let trimmed = raw.trim();
            // Accept a category name ("test"), a bare extension ("ts"), or a
            // full file name ("api.test.ts").
            FileCategory::parse(trimmed).unwrap_or_else(|| {
                if trimmed.trim_start_matches('.').contains('.') {
                    FileCategory::from_file_name(trimmed)
                } else {
                    FileCategory::from_extension(trimmed)
                }
            })
        }
        _ => FileCategory::Document,
    }
}

/// Names of the standards applicable to a file type: the built-in standard
/// followed by its compliance rule-sets. Tolerant of `None`/unknown input;
/// always non-empty, never panics.
pub fn available_quality_standards(file_type: Option<&str>) -> Vec<String> {
    let config = builtin_standard(resolve_category(file_type));
    let mut names = vec![config.name.clone()];
    names.extend(config.compliance_rules.iter().cloned());
    names
}

/// The five dimension definitions (with category-specific weight emphasis)
/// applied to a file type.
pub fn quality_dimension_config(file_type: Option<&str>) -> Vec<DimensionConfig> {
    builtin_standard(resolve_category(file_type)).dimensions.clone()
}

// ============================================================================
// TESTS
// ============================================================================

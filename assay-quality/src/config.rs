//! Quality standard configuration and static validation.
//!
//! A `QualityStandardConfig` describes the scoring rules for one file-type
//! category: which dimensions apply, their weights and minimum scores, and
//! the weighted checks within each dimension. Configurations are validated
//! on load and on every update, and are immutable during an assessment run.

use assay_core::{CheckKind, ConfigError, FileCategory, QualityDimension};
use serde::{Deserialize, Serialize};

/// Tolerance applied to every weight-sum invariant.
pub const WEIGHT_SUM_TOLERANCE: f64 = 0.01;

/// Overall score a deliverable must reach to be considered compliant,
/// unless the configuration overrides it.
pub const DEFAULT_COMPLIANCE_THRESHOLD: f64 = 70.0;

/// One weighted check within a dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckConfig {
    /// Selects the scorer (e.g. "line_length", "section_coverage").
    pub name: String,
    pub kind: CheckKind,
    /// Weight within the owning dimension, 0-1.
    pub weight: f64,
    /// Opaque scorer parameters.
    #[serde(default)]
    pub config: serde_json::Value,
}

/// One dimension of quality evaluation and its checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionConfig {
    pub dimension: QualityDimension,
    /// Weight within the overall score, 0-1.
    pub weight: f64,
    /// Floor this dimension must reach for compliance, 0-100.
    pub minimum_score: f64,
    #[serde(default)]
    pub checks: Vec<CheckConfig>,
}

/// Category weights blended into check weighting (see the engine docs).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub static_analysis: f64,
    pub semantic_validation: f64,
    pub format_compliance: f64,
    pub content_quality: f64,
}

impl ScoringWeights {
    pub fn sum(&self) -> f64 {
        self.static_analysis + self.semantic_validation + self.format_compliance
            + self.content_quality
    }

    pub fn for_kind(&self, kind: CheckKind) -> f64 {
        match kind {
            CheckKind::StaticAnalysis => self.static_analysis,
            CheckKind::SemanticValidation => self.semantic_validation,
            CheckKind::FormatCompliance => self.format_compliance,
            CheckKind::ContentAnalysis => self.content_quality,
        }
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            static_analysis: 0.3,
            semantic_validation: 0.2,
            format_compliance: 0.25,
            content_quality: 0.25,
        }
    }
}

/// Score cut points labelling assessment outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImprovementThresholds {
    pub excellent: f64,
    pub good: f64,
    pub acceptable: f64,
    pub poor: f64,
}

impl Default for ImprovementThresholds {
    fn default() -> Self {
        Self {
            excellent: 90.0,
            good: 75.0,
            acceptable: 60.0,
            poor: 40.0,
        }
    }
}

/// Scoring rules for one file-type category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityStandardConfig {
    pub name: String,
    pub category: FileCategory,
    /// Extensions this standard matches, without leading dots.
    #[serde(default)]
    pub file_types: Vec<String>,
    #[serde(default)]
    pub dimensions: Vec<DimensionConfig>,
    /// Named external rule-set references.
    #[serde(default)]
    pub compliance_rules: Vec<String>,
    #[serde(default)]
    pub scoring_weights: ScoringWeights,
    #[serde(default)]
    pub improvement_thresholds: ImprovementThresholds,
    #[serde(default = "default_compliance_threshold")]
    pub compliance_threshold: f64,
    #[serde(default = "default_weight_tolerance")]
    pub weight_tolerance: f64,
}

fn default_compliance_threshold() -> f64 {
    DEFAULT_COMPLIANCE_THRESHOLD
}

fn default_weight_tolerance() -> f64 {
    WEIGHT_SUM_TOLERANCE
}

/// Outcome of static configuration validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl QualityStandardConfig {
    /// Validate every configuration invariant, accumulating ALL violations
    /// rather than failing fast. Missing collections are treated as empty
    /// and reported as violations; this never panics.
    ///
    /// Checked in order:
    /// 1. at least one dimension is present;
    /// 2. dimension weights sum to 1.0 (within tolerance);
    /// 3. every dimension has at least one check;
    /// 4. check weights within each dimension sum to 1.0 (within tolerance);
    /// 5. scoring weights sum to 1.0 (within tolerance).
    pub fn validate(&self) -> ConfigReport {
        let mut errors = Vec::new();
        let tolerance = if self.weight_tolerance > 0.0 {
            self.weight_tolerance
        } else {
            WEIGHT_SUM_TOLERANCE
        };

        if self.dimensions.is_empty() {
            errors.push("Configuration must define at least one dimension".to_string());
        }

        if !self.dimensions.is_empty() {
            let dimension_sum: f64 = self.dimensions.iter().map(|d| d.weight).sum();
            if (dimension_sum - 1.0).abs() > tolerance {
                errors.push(format!(
                    "Dimension weights must sum to 1.0 (got {dimension_sum:.3})"
                ));
            }
        }

        for dim in &self.dimensions {
            if dim.checks.is_empty() {
                errors.push(format!(
                    "Dimension '{}' must define at least one check",
                    dim.dimension
                ));
                continue;
            }
            let check_sum: f64 = dim.checks.iter().map(|c| c.weight).sum();
            if (check_sum - 1.0).abs() > tolerance {
                errors.push(format!(
                    "Check weights in dimension '{}' must sum to 1.0 (got {check_sum:.3})",
                    dim.dimension
                ));
            }
        }

        let scoring_sum = self.scoring_weights.sum();
        if (scoring_sum - 1.0).abs() > tolerance {
            errors.push(format!(
                "Scoring weights must sum to 1.0 (got {scoring_sum:.3})"
            ));
        }

        ConfigReport {
            valid: errors.is_empty(),
            errors,
        }
    }

    /// Validation as a hard gate: `Err(ConfigError::InvalidStandard)` listing
    /// every violated invariant. Used before any scoring work begins.
    pub fn ensure_valid(&self) -> Result<(), ConfigError> {
        let report = self.validate();
        if report.valid {
            Ok(())
        } else {
            Err(ConfigError::InvalidStandard {
                violations: report.errors,
            })
        }
    }

    /// Whether this standard matches a file extension (with or without dot).
    pub fn matches_extension(&self, extension: &str) -> bool {
        let ext = extension.trim_start_matches('.').to_ascii_lowercase();
        self.file_types.iter().any(|f| f.eq_ignore_ascii_case(&ext))
    }
}

// ============================================================================
// TESTS
// ============================================================================


// ============================================================================
// PROPERTY-BASED TESTS
// ============================================================================

#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    fn config_with_dimension_weights(weights: &[f64]) -> QualityStandardConfig {
        QualityStandardConfig {
            name: "generated".to_string(),
            category: FileCategory::Code,
            file_types: vec![],
            dimensions: weights
                .iter()
                .enumerate()
                .map(|(i, w)| DimensionConfig {
                    dimension: QualityDimension::ALL[i % QualityDimension::ALL.len()],
                    weight: *w,
                    minimum_score: 60.0,
                    checks: vec![CheckConfig {
                        name: "line_length".to_string(),
                        kind: CheckKind::StaticAnalysis,
                        weight: 1.0,
                        config: serde_json::Value::Null,
                    }],
                })
                .collect(),
            compliance_rules: vec![],
            scoring_weights: ScoringWeights::default(),
            improvement_thresholds: ImprovementThresholds::default(),
            compliance_threshold: DEFAULT_COMPLIANCE_THRESHOLD,
            weight_tolerance: WEIGHT_SUM_TOLERANCE,
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// Any dimension weight vector summing well outside tolerance is
        /// rejected with the canonical message.
        #[test]
        fn prop_bad_dimension_sums_rejected(
            weights in proptest::collection::vec(0.0f64..1.0, 1..5),
            excess in 0.05f64..2.0,
        ) {
            let total: f64 = weights.iter().sum();
            let scale = (total + excess) / total.max(f64::MIN_POSITIVE);
            let scaled: Vec<f64> = weights.iter().map(|w| w * scale).collect();
            let adjusted_total: f64 = scaled.iter().sum();
            prop_assume!((adjusted_total - 1.0).abs() > WEIGHT_SUM_TOLERANCE * 2.0);

            let report = config_with_dimension_weights(&scaled).validate();
            prop_assert!(!report.valid);
            prop_assert!(report.errors.iter().any(|e| e.contains("Dimension weights must sum to 1.0")));
        }

        /// Normalized dimension weights always validate.
        #[test]
        fn prop_normalized_dimension_sums_accepted(
            weights in proptest::collection::vec(0.01f64..1.0, 1..5),
        ) {
            let total: f64 = weights.iter().sum();
            let normalized: Vec<f64> = weights.iter().map(|w| w / total).collect();
            let report = config_with_dimension_weights(&normalized).validate();
            prop_assert!(report.valid, "errors: {:?}", report.errors);
        }
    }
}

//! ASSAY Quality - Standard Configuration and Assessment Engine
//!
//! Scores submitted deliverables against configurable weighted rubrics.
//! A `QualityStandardConfig` describes, per file-type category, which quality
//! dimensions apply, their weights, and the checks within each dimension;
//! the `QualityEngine` applies the effective configuration to a deliverable
//! snapshot and classifies compliance.
//!
//! Configuration invariants (weight sums, non-empty dimensions/checks) are
//! validated on load and on every update; an invalid configuration is
//! rejected before any scoring work begins.

mod checks;
mod config;
mod engine;
mod standards;

pub use checks::{ArtifactValidator, CheckOutcome, NEUTRAL_SCORE};
pub use config::{
    CheckConfig, ConfigReport, DimensionConfig, ImprovementThresholds, QualityStandardConfig,
    ScoringWeights, DEFAULT_COMPLIANCE_THRESHOLD, WEIGHT_SUM_TOLERANCE,
};
pub use engine::{AssessmentContext, QualityEngine};
pub use standards::{
    available_quality_standards, builtin_standard, quality_dimension_config, resolve_category,
};

/// Validate a quality standard configuration, accumulating every violated
/// invariant. Free-function form of [`QualityStandardConfig::validate`] for
/// callers that work with the report shape directly.
pub fn validate_quality_standard_config(config: &QualityStandardConfig) -> ConfigReport {
    config.validate()
}

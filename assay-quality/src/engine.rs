//! Quality assessment engine.
//!
//! Applies a validated `QualityStandardConfig` to a submitted deliverable:
//! runs the configured checks, combines per-check scores into dimension
//! scores, combines dimension scores into the overall score, and classifies
//! compliance. The engine itself has no storage side effects;
//! `assess_and_record` drives persistence for callers that want the full
//! submit-assess-update flow.

use crate::checks::{run_check, ArtifactValidator, CheckOutcome};
use crate::config::QualityStandardConfig;
use crate::standards::builtin_standard;
use assay_core::{
    new_entity_id, AssayError, AssayResult, AuditEntry, ComplianceStatus, DeliverableId,
    DeliverableRecord, DeliverableStatus, DimensionScore, ImprovementSuggestion,
    QualityAssessmentResult, StorageError, SuggestionCategory,
};
use assay_storage::{AuditLog, DeliverableStore, DeliverableUpdate};
use std::collections::HashMap;
use std::sync::Arc;

/// Caller-supplied context threaded through an assessment run.
#[derive(Debug, Clone, Default)]
pub struct AssessmentContext {
    pub team_id: Option<String>,
    pub project_context: Option<String>,
}

/// The assessment engine. Holds team-supplied standard overrides (validated
/// on registration) and the optional external validator. Configurations are
/// read-only during a run; the engine takes `&self` everywhere.
#[derive(Default)]
pub struct QualityEngine {
    overrides: HashMap<String, QualityStandardConfig>,
    validator: Option<Arc<dyn ArtifactValidator>>,
}

impl QualityEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_validator(validator: Arc<dyn ArtifactValidator>) -> Self {
        Self {
            overrides: HashMap::new(),
            validator: Some(validator),
        }
    }

    /// Register (or replace) a team-supplied standard. Validated on every
    /// update; an invalid standard is rejected and not stored.
    pub fn register_standard(&mut self, config: QualityStandardConfig) -> AssayResult<()> {
        config.ensure_valid()?;
        tracing::info!(standard = %config.name, category = %config.category, "quality standard registered");
        self.overrides.insert(config.name.clone(), config);
        Ok(())
    }

    /// Select the effective standard for a deliverable: the first requested
    /// standard with a registered override wins, otherwise the built-in
    /// standard for the deliverable's category (document category for
    /// unknown file types; unknown types are never rejected).
    pub fn effective_standard(
        &self,
        deliverable: &DeliverableRecord,
        requested: &[String],
    ) -> &QualityStandardConfig {
        requested
            .iter()
            .find_map(|name| self.overrides.get(name))
            .unwrap_or_else(|| builtin_standard(deliverable.category()))
    }

    /// Score one deliverable snapshot against the effective standard.
    ///
    /// # Errors
    /// `ConfigError::InvalidStandard` when the effective configuration fails
    /// static validation. A structurally valid configuration whose checks
    /// cannot be executed yields a non-compliant result instead.
    pub async fn perform_quality_assessment(
        &self,
        deliverable: &DeliverableRecord,
        quality_standards: &[String],
        context: &AssessmentContext,
    ) -> AssayResult<QualityAssessmentResult> {
        let config = self.effective_standard(deliverable, quality_standards);
        config.ensure_valid()?;

        let validator = self.validator.as_deref();
        let mut dimension_scores = Vec::with_capacity(config.dimensions.len());
        let mut suggestions = Vec::new();
        let mut degraded = false;

        for dim in &config.dimensions {
            let mut outcomes: Vec<(f64, CheckOutcome)> = Vec::with_capacity(dim.checks.len());
            for check in &dim.checks {
                match run_check(deliverable, check, validator).await {
                    Some(outcome) => {
                        degraded |= outcome.degraded;
                        // Blend the check weight with the configured category
                        // weight for its kind; renormalized below.
                        let effective =
                            check.weight * config.scoring_weights.for_kind(check.kind);
                        outcomes.push((effective, outcome));
                    }
                    None => {
                        suggestions.push(ImprovementSuggestion {
                            category: SuggestionCategory::Major,
                            dimension: Some(dim.dimension),
                            description: format!(
                                "Check '{}' in dimension '{}' has no scorer and no external validator is configured",
                                check.name, dim.dimension
                            ),
                            impact: "dimension scored without this check".to_string(),
                            effort: "configuration".to_string(),
                            priority: 8,
                        });
                    }
                }
            }

            let total_weight: f64 = outcomes.iter().map(|(w, _)| *w).sum();
            let score = if total_weight > 0.0 {
                outcomes
                    .iter()
                    .map(|(w, o)| w / total_weight * o.score)
                    .sum()
            } else {
                suggestions.push(ImprovementSuggestion {
                    category: SuggestionCategory::Critical,
                    dimension: Some(dim.dimension),
                    description: format!(
                        "No executable checks for dimension '{}'; the configuration cannot score it",
                        dim.dimension
                    ),
                    impact: "dimension fails its minimum by default".to_string(),
                    effort: "configuration".to_string(),
                    priority: 9,
                });
                0.0
            };

            dimension_scores.push(DimensionScore {
                dimension: dim.dimension,
                score,
                minimum_score: dim.minimum_score,
                passed: score >= dim.minimum_score,
            });
        }

        let overall_score: f64 = config
            .dimensions
            .iter()
            .zip(&dimension_scores)
            .map(|(dim, scored)| dim.weight * scored.score)
            .sum();

        let failed_dimensions: Vec<_> = dimension_scores
            .iter()
            .filter(|d| !d.passed)
            .map(|d| d.dimension)
            .collect();
        let is_compliant =
            overall_score >= config.compliance_threshold && failed_dimensions.is_empty();

        for scored in &dimension_scores {
            if let Some(suggestion) = improvement_for(config, scored) {
                suggestions.push(suggestion);
            }
        }
        if degraded {
            suggestions.push(ImprovementSuggestion {
                category: SuggestionCategory::Enhancement,
                dimension: None,
                description:
                    "External validation was unavailable; semantic checks scored neutrally"
                        .to_string(),
                impact: "lower-confidence accuracy scoring".to_string(),
                effort: "operational".to_string(),
                priority: 3,
            });
        }
        suggestions.sort_by(|a, b| b.priority.cmp(&a.priority));

        tracing::debug!(
            deliverable = %deliverable.deliverable_id,
            version = deliverable.version,
            team = context.team_id.as_deref().unwrap_or("-"),
            standard = %config.name,
            overall = overall_score,
            compliant = is_compliant,
            degraded,
            "quality assessment complete"
        );

        Ok(QualityAssessmentResult {
            overall_score,
            dimensions: dimension_scores,
            compliance: ComplianceStatus {
                is_compliant,
                threshold: config.compliance_threshold,
                failed_dimensions,
            },
            suggestions,
            degraded,
            category: config.category,
            deliverable_version: deliverable.version,
            assessed_at: chrono::Utc::now(),
        })
    }

    /// Full submit-assess-update flow: fetch one deliverable version, score
    /// it, persist the result, and transition the status to `Approved` when
    /// compliant, `NeedsRevision` otherwise.
    ///
    /// Audit failures are logged and swallowed; they never fail the
    /// assessment.
    pub async fn assess_and_record(
        &self,
        store: &dyn DeliverableStore,
        audit: Option<&dyn AuditLog>,
        deliverable_id: DeliverableId,
        version: u32,
        quality_standards: &[String],
        context: &AssessmentContext,
    ) -> AssayResult<QualityAssessmentResult> {
        let deliverable = store
            .deliverable_get_version(deliverable_id, version)
            .await?
            .ok_or(AssayError::Storage(StorageError::VersionNotFound {
                id: deliverable_id,
                version,
            }))?;

        store
            .deliverable_update(
                deliverable_id,
                version,
                DeliverableUpdate {
                    status: Some(DeliverableStatus::Validating),
                    quality_assessment: None,
                },
            )
            .await?;

        let result = self
            .perform_quality_assessment(&deliverable, quality_standards, context)
            .await?;

        let status = if result.compliance.is_compliant {
            DeliverableStatus::Approved
        } else {
            DeliverableStatus::NeedsRevision
        };
        store
            .deliverable_update(
                deliverable_id,
                version,
                DeliverableUpdate {
                    status: Some(status),
                    quality_assessment: Some(result.clone()),
                },
            )
            .await?;

        if let Some(audit) = audit {
            let entry = AuditEntry {
                entry_id: new_entity_id(),
                action: "quality_assessment".to_string(),
                subject: format!("{deliverable_id}/v{version}"),
                detail: serde_json::to_value(&result.compliance).ok(),
                created_at: chrono::Utc::now(),
            };
            if let Err(err) = audit.audit_append(entry).await {
                tracing::warn!(%deliverable_id, %err, "audit append failed (ignored)");
            }
        }

        Ok(result)
    }
}

/// Suggestion for a dimension that needs work, banded by the configured
/// improvement thresholds. Dimensions at or above the "good" band and above
/// their minimum produce nothing.
fn improvement_for(
    config: &QualityStandardConfig,
    scored: &DimensionScore,
) -> Option<ImprovementSuggestion> {
    let bands = &config.improvement_thresholds;
    if scored.passed && scored.score >= bands.good {
        return None;
    }
    let (category, priority_base) = if scored.score < bands.poor {
        (SuggestionCategory::Critical, 9)
    } else if scored.score < bands.acceptable {
        (SuggestionCategory::Major, 7)
    } else if scored.score < bands.good {
        (SuggestionCategory::Minor, 4)
    } else {
        (SuggestionCategory::Enhancement, 2)
    };
    let weight_bump = config
        .dimensions
        .iter()
        .find(|d| d.dimension == scored.dimension)
        .map(|d| if d.weight > 0.25 { 1 } else { 0 })
        .unwrap_or(0);
    let gap = (scored.minimum_score - scored.score).max(0.0);
    Some(ImprovementSuggestion {
        category,
        dimension: Some(scored.dimension),
        description: format!(
            "Improve {} (scored {:.1}, minimum {:.1})",
            scored.dimension, scored.score, scored.minimum_score
        ),
        impact: match category {
            SuggestionCategory::Critical | SuggestionCategory::Major => "high".to_string(),
            SuggestionCategory::Minor => "medium".to_string(),
            SuggestionCategory::Enhancement => "low".to_string(),
        },
        effort: if gap > 25.0 {
            "significant rework".to_string()
        } else {
            "targeted edits".to_string()
        },
        priority: (priority_base + weight_bump).min(10) as u8,
    })
}

// ============================================================================
// TESTS
// ============================================================================

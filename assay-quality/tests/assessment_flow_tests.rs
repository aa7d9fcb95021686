//! End-to-end assessment flow tests: submit, assess, persist, transition.

use assay_core::{
    AssayResult, DeliverableRecord, DeliverableStatus, FileCategory, SuggestionCategory,
};
use assay_quality::{
    available_quality_standards, validate_quality_standard_config, ArtifactValidator,
    AssessmentContext, CheckConfig, QualityEngine,
};
use assay_storage::{DeliverableStore, MemoryStore};
use assay_test_utils::sample_deliverable;
use async_trait::async_trait;
use std::sync::Arc;

const SOLID_TS: &str = r#"export interface ScoreRecord {
    deliverableId: string;
    version: number;
    overallScore: number;
}

export function combineScores(records: ScoreRecord[]): number {
    if (records.length === 0) {
        return 0;
    }
    const total = records.reduce((sum, record) => sum + record.overallScore, 0);
    return total / records.length;
}
"#;

const SLOPPY_TS: &str = "// TODO fix\n// FIXME broken\nlet x=1;{{{\n";

struct FixedScoreValidator(f64);

#[async_trait]
impl ArtifactValidator for FixedScoreValidator {
    async fn validate_artifact(
        &self,
        _deliverable: &DeliverableRecord,
        _check: &CheckConfig,
    ) -> AssayResult<f64> {
        Ok(self.0)
    }
}

#[tokio::test]
async fn test_compliant_code_deliverable_is_approved() {
    let store = MemoryStore::new();
    let engine = QualityEngine::new();
    let deliverable = sample_deliverable("scores.ts", SOLID_TS);
    store.deliverable_insert(&deliverable).await.unwrap();

    let result = engine
        .assess_and_record(
            &store,
            None,
            deliverable.deliverable_id,
            1,
            &[],
            &AssessmentContext::default(),
        )
        .await
        .unwrap();

    assert_eq!(result.category, FileCategory::Code);
    assert!(result.compliance.is_compliant, "score {}", result.overall_score);
    assert!(result.overall_score >= result.compliance.threshold);
    assert!(result.dimensions.iter().all(|d| d.passed));

    let stored = store
        .deliverable_get_version(deliverable.deliverable_id, 1)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, DeliverableStatus::Approved);
    let attached = stored.quality_assessment.expect("assessment persisted");
    assert_eq!(attached.deliverable_version, 1);
}

#[tokio::test]
async fn test_failing_deliverable_needs_revision_with_sorted_suggestions() {
    let store = MemoryStore::new();
    let engine = QualityEngine::new();
    let deliverable = sample_deliverable("broken.ts", SLOPPY_TS);
    store.deliverable_insert(&deliverable).await.unwrap();

    let result = engine
        .assess_and_record(
            &store,
            None,
            deliverable.deliverable_id,
            1,
            &[],
            &AssessmentContext::default(),
        )
        .await
        .unwrap();

    assert!(!result.compliance.is_compliant);
    assert!(!result.compliance.failed_dimensions.is_empty());
    assert!(!result.suggestions.is_empty());
    for pair in result.suggestions.windows(2) {
        assert!(pair[0].priority >= pair[1].priority);
    }

    let stored = store
        .deliverable_get_version(deliverable.deliverable_id, 1)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, DeliverableStatus::NeedsRevision);
}

#[tokio::test]
async fn test_assessment_keyed_by_version_leaves_other_versions_alone() {
    let store = MemoryStore::new();
    let engine = QualityEngine::new();

    let v1 = sample_deliverable("scores.ts", SOLID_TS);
    store.deliverable_insert(&v1).await.unwrap();
    // A newer version is submitted while v1's assessment is conceptually
    // in flight.
    let mut v2 = sample_deliverable("scores.ts", SLOPPY_TS);
    v2.deliverable_id = v1.deliverable_id;
    v2.todo_id = v1.todo_id;
    v2.task_id = v1.task_id;
    v2.version = 2;
    store.deliverable_insert(&v2).await.unwrap();

    let result = engine
        .assess_and_record(
            &store,
            None,
            v1.deliverable_id,
            1,
            &[],
            &AssessmentContext::default(),
        )
        .await
        .unwrap();
    assert_eq!(result.deliverable_version, 1);

    let first = store
        .deliverable_get_version(v1.deliverable_id, 1)
        .await
        .unwrap()
        .unwrap();
    let second = store
        .deliverable_get_version(v1.deliverable_id, 2)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(first.status, DeliverableStatus::Approved);
    assert_eq!(second.status, DeliverableStatus::Submitted);
    assert!(second.quality_assessment.is_none());
}

#[tokio::test]
async fn test_external_validator_removes_degradation() {
    let engine = QualityEngine::with_validator(Arc::new(FixedScoreValidator(90.0)));
    let deliverable = sample_deliverable("scores.ts", SOLID_TS);

    let result = engine
        .perform_quality_assessment(&deliverable, &[], &AssessmentContext::default())
        .await
        .unwrap();

    assert!(!result.degraded);
    assert!(!result
        .suggestions
        .iter()
        .any(|s| s.category == SuggestionCategory::Enhancement
            && s.description.contains("External validation")));
}

#[tokio::test]
async fn test_audit_failures_do_not_fail_assessment() {
    use assay_core::{AssayError, AuditEntry, StorageError};
    use assay_storage::AuditLog;

    struct BrokenAudit;

    #[async_trait]
    impl AuditLog for BrokenAudit {
        async fn audit_append(&self, _entry: AuditEntry) -> AssayResult<()> {
            Err(AssayError::Storage(StorageError::LockPoisoned))
        }
    }

    let store = MemoryStore::new();
    let engine = QualityEngine::new();
    let deliverable = sample_deliverable("scores.ts", SOLID_TS);
    store.deliverable_insert(&deliverable).await.unwrap();

    let result = engine
        .assess_and_record(
            &store,
            Some(&BrokenAudit),
            deliverable.deliverable_id,
            1,
            &[],
            &AssessmentContext::default(),
        )
        .await;
    assert!(result.is_ok());
}

// ============================================================================
// PROPERTY-BASED TESTS
// ============================================================================

mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        /// Standard lookup is total: any input yields a non-empty list and
        /// never panics.
        #[test]
        fn prop_available_standards_total(input in "\\PC{0,24}") {
            let names = available_quality_standards(Some(&input));
            prop_assert!(!names.is_empty());
        }

        /// All built-in standards stay valid under the report-shape API.
        #[test]
        fn prop_builtin_standards_valid(category_input in prop_oneof![
            Just("code"), Just("document"), Just("test"), Just("configuration")
        ]) {
            let dims = assay_quality::quality_dimension_config(Some(category_input));
            prop_assert_eq!(dims.len(), 5);
            let standard = assay_quality::builtin_standard(
                assay_quality::resolve_category(Some(category_input)),
            );
            let report = validate_quality_standard_config(standard);
            prop_assert!(report.valid, "{:?}", report.errors);
        }
    }
}

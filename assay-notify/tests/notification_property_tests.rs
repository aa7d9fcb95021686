//! Property tests for preference filtering, channel selection, and dispatch.

use assay_core::{
    Channel, NotificationPreferences, QuietHours, Severity, StakeholderPriority,
};
use assay_notify::{
    determine_channels, is_in_quiet_hours, resolve_preferences, severity_policy,
    NotificationOrchestrator, NotificationRequest,
};
use assay_storage::MemoryStore;
use assay_test_utils::{
    arb_channel, arb_quiet_hours, arb_severity, arb_severity_thresholds, sample_stakeholder,
    MockChannelAdapter,
};
use chrono::{NaiveTime, TimeZone, Utc};
use proptest::prelude::*;
use std::sync::Arc;

fn request(severity: Severity, stakeholders: Vec<assay_core::Stakeholder>) -> NotificationRequest {
    NotificationRequest {
        title: "event".to_string(),
        message: "body".to_string(),
        severity,
        stakeholders,
        action_url: None,
        context: None,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Channel selection never emits SMS below critical severity and never
    /// returns channels outside the preference/fallback sets.
    #[test]
    fn prop_channel_selection_soundness(
        severity in arb_severity(),
        preferred in proptest::collection::vec(arb_channel(), 0..4),
    ) {
        let stakeholder = sample_stakeholder("team-a", StakeholderPriority::Medium);
        let prefs = NotificationPreferences {
            channels: preferred.clone(),
            ..Default::default()
        };
        let channels = determine_channels(&stakeholder, severity, &prefs);

        for channel in &channels {
            prop_assert!(*channel != Channel::Sms || severity == Severity::Critical);
            if preferred.is_empty() {
                prop_assert!(severity_policy(severity).default_channels.contains(channel));
            } else {
                prop_assert!(preferred.contains(channel));
            }
        }
        // Determinism.
        prop_assert_eq!(channels.clone(), determine_channels(&stakeholder, severity, &prefs));
    }

    /// Preference resolution: explicit wins, then carried, then defaults.
    #[test]
    fn prop_preference_resolution_precedence(
        explicit_channels in proptest::collection::vec(arb_channel(), 1..4),
        carried_channels in proptest::collection::vec(arb_channel(), 1..4),
    ) {
        let explicit = NotificationPreferences {
            channels: explicit_channels.clone(),
            ..Default::default()
        };
        let carried = NotificationPreferences {
            channels: carried_channels.clone(),
            ..Default::default()
        };

        let mut stakeholder = sample_stakeholder("team-a", StakeholderPriority::Low);
        stakeholder.notification_preferences = Some(carried);

        prop_assert_eq!(
            resolve_preferences(&stakeholder, Some(explicit)).channels,
            explicit_channels
        );
        prop_assert_eq!(
            resolve_preferences(&stakeholder, None).channels,
            carried_channels
        );
    }

    /// Quiet-hours membership agrees with a direct reconstruction of the
    /// half-open, possibly wrapping window.
    #[test]
    fn prop_quiet_hours_against_model(
        qh in arb_quiet_hours(),
        hour in 0u32..24,
        minute in 0u32..60,
    ) {
        let now = Utc.with_ymd_and_hms(2025, 3, 15, hour, minute, 0).unwrap();
        let t = now.time();
        let expected = if qh.start == qh.end {
            false
        } else if qh.start < qh.end {
            qh.start <= t && t < qh.end
        } else {
            t >= qh.start || t < qh.end
        };
        prop_assert_eq!(is_in_quiet_hours(Some(&qh), now), expected);
    }

    /// Severity thresholds filter exactly the disabled severities.
    #[test]
    fn prop_severity_threshold_filter(
        thresholds in arb_severity_thresholds(),
        severity in arb_severity(),
    ) {
        let enabled = thresholds.enabled(severity);
        let expected = match severity {
            Severity::Low => thresholds.low,
            Severity::Medium => thresholds.medium,
            Severity::High => thresholds.high,
            Severity::Critical => thresholds.critical,
        };
        prop_assert_eq!(enabled, expected);
    }
}

// ============================================================================
// PINNED CASES
// ============================================================================

#[test]
fn test_quiet_hours_2200_to_0800_utc_cases() {
    let qh = QuietHours {
        start: NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
        end: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
        timezone: "UTC".to_string(),
    };
    let at_2330 = Utc.with_ymd_and_hms(2025, 3, 15, 23, 30, 0).unwrap();
    let at_0900 = Utc.with_ymd_and_hms(2025, 3, 15, 9, 0, 0).unwrap();
    assert!(is_in_quiet_hours(Some(&qh), at_2330));
    assert!(!is_in_quiet_hours(Some(&qh), at_0900));
}

#[tokio::test]
async fn test_disabled_high_severity_invokes_no_adapter() {
    let store = Arc::new(MemoryStore::new());
    let slack = Arc::new(MockChannelAdapter::reliable(Channel::Slack));
    let email = Arc::new(MockChannelAdapter::reliable(Channel::Email));
    let orchestrator = NotificationOrchestrator::new(store.clone(), store.clone())
        .with_adapter(slack.clone())
        .with_adapter(email.clone());

    let mut stakeholder = sample_stakeholder("team-a", StakeholderPriority::Medium);
    stakeholder.notification_preferences = Some(NotificationPreferences {
        severity_thresholds: assay_core::SeverityThresholds {
            high: false,
            ..Default::default()
        },
        ..Default::default()
    });

    let result = orchestrator
        .send_notifications_with_retry(&request(Severity::High, vec![stakeholder.clone()]))
        .await;
    assert_eq!(result.summary.total_stakeholders, 0);
    assert_eq!(slack.sent_count() + email.sent_count(), 0);

    // Critical still passes for the same stakeholder.
    let critical = orchestrator
        .send_notifications_with_retry(&request(Severity::Critical, vec![stakeholder]))
        .await;
    assert_eq!(critical.summary.total_stakeholders, 1);
    assert_eq!(critical.summary.sent, 1);
}

#[tokio::test]
async fn test_two_stakeholders_yield_two_issues() {
    let store = Arc::new(MemoryStore::new());
    let orchestrator = NotificationOrchestrator::new(store.clone(), store.clone());

    let issues = orchestrator
        .create_issues_with_approval(
            &request(
                Severity::High,
                vec![
                    sample_stakeholder("team-a", StakeholderPriority::High),
                    sample_stakeholder("team-b", StakeholderPriority::Medium),
                ],
            ),
            false,
        )
        .await;

    // One primary coordination issue plus one team-specific issue for the
    // high-priority stakeholder; none for team-b.
    assert_eq!(issues.len(), 2);
    assert!(issues.iter().filter(|i| i.team_id.is_none()).count() == 1);
    assert!(issues
        .iter()
        .any(|i| i.team_id.as_deref() == Some("team-a")));
    assert!(!issues
        .iter()
        .any(|i| i.team_id.as_deref() == Some("team-b")));
}

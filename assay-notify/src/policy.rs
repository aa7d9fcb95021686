//! Severity policy and preference resolution.
//!
//! One table maps each severity to its dispatch policy (default channels,
//! quiet-hours bypass, escalation delay); every dispatch path consumes the
//! table instead of re-deriving policy per event type. Preference resolution
//! and quiet-hours evaluation are pure functions over snapshots, so they are
//! unit-testable without an orchestrator instance.

use assay_core::{
    Channel, NotificationPreferences, QuietHours, Severity, Stakeholder, Timestamp,
};
use chrono::{Duration, FixedOffset};
use rand::{distr::Alphanumeric, Rng};

/// Dispatch policy for one severity level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeverityPolicy {
    pub severity: Severity,
    /// Channels used when the recipient has no preferred channel list.
    pub default_channels: &'static [Channel],
    /// Critical notifications ignore quiet hours.
    pub bypass_quiet_hours: bool,
    pub escalation_delay_minutes: u32,
}

const LOW_POLICY: SeverityPolicy = SeverityPolicy {
    severity: Severity::Low,
    default_channels: &[Channel::Email],
    bypass_quiet_hours: false,
    escalation_delay_minutes: 240,
};

const MEDIUM_POLICY: SeverityPolicy = SeverityPolicy {
    severity: Severity::Medium,
    default_channels: &[Channel::Slack, Channel::Email],
    bypass_quiet_hours: false,
    escalation_delay_minutes: 120,
};

const HIGH_POLICY: SeverityPolicy = SeverityPolicy {
    severity: Severity::High,
    default_channels: &[Channel::Slack, Channel::Email],
    bypass_quiet_hours: false,
    escalation_delay_minutes: 60,
};

const CRITICAL_POLICY: SeverityPolicy = SeverityPolicy {
    severity: Severity::Critical,
    default_channels: &[Channel::Slack, Channel::Email, Channel::Sms],
    bypass_quiet_hours: true,
    escalation_delay_minutes: 15,
};

/// Policy for a severity. Total over the enum.
pub fn severity_policy(severity: Severity) -> &'static SeverityPolicy {
    match severity {
        Severity::Low => &LOW_POLICY,
        Severity::Medium => &MEDIUM_POLICY,
        Severity::High => &HIGH_POLICY,
        Severity::Critical => &CRITICAL_POLICY,
    }
}

/// Effective preferences for a stakeholder: explicit per-recipient
/// preferences win over the default set carried on the stakeholder record;
/// system defaults apply when neither exists.
pub fn resolve_preferences(
    stakeholder: &Stakeholder,
    explicit: Option<NotificationPreferences>,
) -> NotificationPreferences {
    explicit
        .or_else(|| stakeholder.notification_preferences.clone())
        .unwrap_or_default()
}

/// Delivery channels for one stakeholder and severity. Preferred channels
/// come from the preferences when present, otherwise from the severity
/// policy's default set. SMS is reserved for critical urgency and is dropped
/// from lower-severity dispatches.
pub fn determine_channels(
    _stakeholder: &Stakeholder,
    severity: Severity,
    preferences: &NotificationPreferences,
) -> Vec<Channel> {
    let source: Vec<Channel> = if preferences.channels.is_empty() {
        severity_policy(severity).default_channels.to_vec()
    } else {
        preferences.channels.clone()
    };
    source
        .into_iter()
        .filter(|c| *c != Channel::Sms || severity == Severity::Critical)
        .collect()
}

/// Whether `now` falls inside the recipient's quiet hours. `None` means no
/// window is configured.
pub fn is_in_quiet_hours(quiet_hours: Option<&QuietHours>, now: Timestamp) -> bool {
    quiet_hours.is_some_and(|qh| qh.contains(now))
}

/// The instant the current (or next) quiet-hours window ends, used to defer
/// suppressed notifications.
pub fn quiet_hours_end(quiet_hours: &QuietHours, now: Timestamp) -> Timestamp {
    let offset = quiet_hours
        .offset()
        .unwrap_or_else(|| FixedOffset::east_opt(0).unwrap());
    let local = now.with_timezone(&offset);
    let mut end = local
        .date_naive()
        .and_time(quiet_hours.end)
        .and_local_timezone(offset)
        .single()
        .unwrap_or(local);
    if end <= local {
        end += Duration::days(1);
    }
    end.with_timezone(&chrono::Utc)
}

/// Generate a notification ID: `notif-<timestamp-millis>-<random>`.
/// The random suffix keeps IDs unique within a single dispatch.
pub fn notification_id(now: Timestamp) -> String {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect();
    format!(
        "notif-{}-{}",
        now.timestamp_millis(),
        suffix.to_ascii_lowercase()
    )
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use assay_core::{SeverityThresholds, StakeholderPriority};
    use chrono::{NaiveTime, TimeZone, Utc};

    fn stakeholder(prefs: Option<NotificationPreferences>) -> Stakeholder {
        Stakeholder {
            team_id: "team-a".to_string(),
            contact_info: "team-a@example.com".to_string(),
            role: "owner".to_string(),
            priority: StakeholderPriority::Medium,
            notification_preferences: prefs,
        }
    }

    #[test]
    fn test_policy_table_is_total_and_ordered() {
        for severity in [
            Severity::Low,
            Severity::Medium,
            Severity::High,
            Severity::Critical,
        ] {
            let policy = severity_policy(severity);
            assert_eq!(policy.severity, severity);
            assert!(!policy.default_channels.is_empty());
        }
        // Escalation tightens as severity rises.
        assert!(
            severity_policy(Severity::Low).escalation_delay_minutes
                > severity_policy(Severity::Critical).escalation_delay_minutes
        );
        // Only critical bypasses quiet hours.
        assert!(severity_policy(Severity::Critical).bypass_quiet_hours);
        assert!(!severity_policy(Severity::High).bypass_quiet_hours);
    }

    #[test]
    fn test_explicit_preferences_override_stakeholder_defaults() {
        let carried = NotificationPreferences {
            channels: vec![Channel::Teams],
            ..Default::default()
        };
        let explicit = NotificationPreferences {
            channels: vec![Channel::Email],
            ..Default::default()
        };
        let s = stakeholder(Some(carried.clone()));

        assert_eq!(
            resolve_preferences(&s, Some(explicit.clone())).channels,
            vec![Channel::Email]
        );
        assert_eq!(resolve_preferences(&s, None).channels, vec![Channel::Teams]);
        assert_eq!(
            resolve_preferences(&stakeholder(None), None),
            NotificationPreferences::default()
        );
    }

    #[test]
    fn test_channel_fallback_is_deterministic() {
        let s = stakeholder(None);
        let prefs = NotificationPreferences::default();
        let channels = determine_channels(&s, Severity::High, &prefs);
        assert_eq!(channels, vec![Channel::Slack, Channel::Email]);
        // Same inputs, same output.
        assert_eq!(channels, determine_channels(&s, Severity::High, &prefs));
    }

    #[test]
    fn test_preferred_channels_win_over_fallback() {
        let s = stakeholder(None);
        let prefs = NotificationPreferences {
            channels: vec![Channel::Teams],
            severity_thresholds: SeverityThresholds::default(),
            quiet_hours: None,
            escalation_delay_minutes: 30,
        };
        assert_eq!(
            determine_channels(&s, Severity::Medium, &prefs),
            vec![Channel::Teams]
        );
    }

    #[test]
    fn test_sms_reserved_for_critical() {
        let s = stakeholder(None);
        let prefs = NotificationPreferences {
            channels: vec![Channel::Sms, Channel::Email],
            ..Default::default()
        };
        assert_eq!(
            determine_channels(&s, Severity::High, &prefs),
            vec![Channel::Email]
        );
        assert_eq!(
            determine_channels(&s, Severity::Critical, &prefs),
            vec![Channel::Sms, Channel::Email]
        );
        // Critical fallback includes SMS.
        assert!(determine_channels(&s, Severity::Critical, &NotificationPreferences::default())
            .contains(&Channel::Sms));
    }

    #[test]
    fn test_quiet_hours_evaluation() {
        let qh = QuietHours {
            start: NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
            end: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            timezone: "UTC".to_string(),
        };
        let inside = Utc.with_ymd_and_hms(2025, 6, 10, 23, 30, 0).unwrap();
        let outside = Utc.with_ymd_and_hms(2025, 6, 10, 9, 0, 0).unwrap();
        assert!(is_in_quiet_hours(Some(&qh), inside));
        assert!(!is_in_quiet_hours(Some(&qh), outside));
        assert!(!is_in_quiet_hours(None, inside));
    }

    #[test]
    fn test_quiet_hours_end_handles_midnight_wrap() {
        let qh = QuietHours {
            start: NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
            end: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            timezone: "UTC".to_string(),
        };
        // 23:30 -> ends 08:00 next day.
        let now = Utc.with_ymd_and_hms(2025, 6, 10, 23, 30, 0).unwrap();
        let end = quiet_hours_end(&qh, now);
        assert_eq!(end, Utc.with_ymd_and_hms(2025, 6, 11, 8, 0, 0).unwrap());
        // 03:00 -> ends 08:00 same day.
        let early = Utc.with_ymd_and_hms(2025, 6, 11, 3, 0, 0).unwrap();
        assert_eq!(
            quiet_hours_end(&qh, early),
            Utc.with_ymd_and_hms(2025, 6, 11, 8, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_notification_id_format_and_uniqueness() {
        let now = Utc.with_ymd_and_hms(2025, 6, 10, 12, 0, 0).unwrap();
        let id = notification_id(now);
        assert!(id.starts_with(&format!("notif-{}-", now.timestamp_millis())));
        let suffix = id.rsplit('-').next().unwrap();
        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|c| c.is_ascii_alphanumeric()));

        let ids: std::collections::HashSet<String> =
            (0..100).map(|_| notification_id(now)).collect();
        assert_eq!(ids.len(), 100);
    }
}

//! Event-trigger mapping.
//!
//! Triggers arrive from an external event bus (status changes, quality-check
//! results, milestone crossings, delay sweeps). Each trigger maps to exactly
//! one notification action, with urgency derived from the trigger itself;
//! the orchestrator then dispatches through the shared severity policy.

use crate::orchestrator::{NotificationOrchestrator, NotificationRequest, NotificationResult};
use assay_core::{DeliverableId, Severity, Stakeholder, TaskId, TodoId, TodoStatus};
use serde::{Deserialize, Serialize};

/// Hours overdue beyond which a delayed task escalates to critical.
const CRITICAL_DELAY_HOURS: f64 = 72.0;

/// Overall score below which a failed quality check escalates to critical.
const CRITICAL_QUALITY_SCORE: f64 = 40.0;

/// A consumed event-bus trigger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TriggerEvent {
    TaskStatusChanged {
        task_id: TaskId,
        todo_id: TodoId,
        from: TodoStatus,
        to: TodoStatus,
    },
    QualityCheckComplete {
        deliverable_id: DeliverableId,
        version: u32,
        is_compliant: bool,
        overall_score: f64,
    },
    /// Fires at 25/50/75/100% completion crossings.
    ProgressMilestone { task_id: TaskId, milestone: f64 },
    /// Scheduled sweep comparing due dates to now.
    DelayedTaskDetected {
        task_id: TaskId,
        todo_id: TodoId,
        hours_overdue: f64,
    },
}

/// The single notification action a trigger maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationAction {
    TaskReminder,
    QualityIssue,
    ProgressUpdate,
}

impl TriggerEvent {
    /// Exactly one action per trigger kind.
    pub fn action(&self) -> NotificationAction {
        match self {
            TriggerEvent::TaskStatusChanged { .. } => NotificationAction::ProgressUpdate,
            TriggerEvent::QualityCheckComplete { .. } => NotificationAction::QualityIssue,
            TriggerEvent::ProgressMilestone { .. } => NotificationAction::ProgressUpdate,
            TriggerEvent::DelayedTaskDetected { .. } => NotificationAction::TaskReminder,
        }
    }

    /// Urgency derived from the trigger: delays and failed quality checks
    /// run high (critical past their escalation bounds), milestones run low.
    pub fn severity(&self) -> Severity {
        match self {
            TriggerEvent::TaskStatusChanged { to, .. } => match to {
                TodoStatus::Blocked => Severity::High,
                _ => Severity::Medium,
            },
            TriggerEvent::QualityCheckComplete {
                is_compliant,
                overall_score,
                ..
            } => {
                if *is_compliant {
                    Severity::Low
                } else if *overall_score < CRITICAL_QUALITY_SCORE {
                    Severity::Critical
                } else {
                    Severity::High
                }
            }
            TriggerEvent::ProgressMilestone { .. } => Severity::Low,
            TriggerEvent::DelayedTaskDetected { hours_overdue, .. } => {
                if *hours_overdue > CRITICAL_DELAY_HOURS {
                    Severity::Critical
                } else {
                    Severity::High
                }
            }
        }
    }

    fn title(&self) -> String {
        match self {
            TriggerEvent::TaskStatusChanged { to, .. } => format!("Task status changed to {to:?}"),
            TriggerEvent::QualityCheckComplete { is_compliant, .. } => {
                if *is_compliant {
                    "Quality check passed".to_string()
                } else {
                    "Quality check failed".to_string()
                }
            }
            TriggerEvent::ProgressMilestone { milestone, .. } => {
                format!("Progress milestone: {milestone:.0}% complete")
            }
            TriggerEvent::DelayedTaskDetected { hours_overdue, .. } => {
                format!("Task overdue by {hours_overdue:.0}h")
            }
        }
    }

    fn body(&self) -> String {
        match self {
            TriggerEvent::TaskStatusChanged {
                task_id,
                todo_id,
                from,
                to,
            } => format!("Todo {todo_id} in task {task_id} moved {from:?} -> {to:?}"),
            TriggerEvent::QualityCheckComplete {
                deliverable_id,
                version,
                overall_score,
                ..
            } => format!(
                "Deliverable {deliverable_id} v{version} scored {overall_score:.1}"
            ),
            TriggerEvent::ProgressMilestone { task_id, milestone } => {
                format!("Task {task_id} crossed {milestone:.0}% completion")
            }
            TriggerEvent::DelayedTaskDetected {
                task_id,
                todo_id,
                hours_overdue,
            } => format!(
                "Todo {todo_id} in task {task_id} is {hours_overdue:.1}h past its due date"
            ),
        }
    }
}

impl NotificationOrchestrator {
    /// Route one trigger to its single notification action.
    pub async fn handle_trigger(
        &self,
        event: &TriggerEvent,
        stakeholders: Vec<Stakeholder>,
    ) -> NotificationResult {
        match event.action() {
            NotificationAction::TaskReminder => self.send_task_reminder(event, stakeholders).await,
            NotificationAction::QualityIssue => {
                self.send_quality_issue_notification(event, stakeholders).await
            }
            NotificationAction::ProgressUpdate => {
                self.send_progress_update(event, stakeholders).await
            }
        }
    }

    pub async fn send_task_reminder(
        &self,
        event: &TriggerEvent,
        stakeholders: Vec<Stakeholder>,
    ) -> NotificationResult {
        self.send_notifications_with_retry(&trigger_request(event, stakeholders))
            .await
    }

    pub async fn send_quality_issue_notification(
        &self,
        event: &TriggerEvent,
        stakeholders: Vec<Stakeholder>,
    ) -> NotificationResult {
        self.send_notifications_with_retry(&trigger_request(event, stakeholders))
            .await
    }

    pub async fn send_progress_update(
        &self,
        event: &TriggerEvent,
        stakeholders: Vec<Stakeholder>,
    ) -> NotificationResult {
        self.send_notifications_with_retry(&trigger_request(event, stakeholders))
            .await
    }
}

fn trigger_request(event: &TriggerEvent, stakeholders: Vec<Stakeholder>) -> NotificationRequest {
    NotificationRequest {
        title: event.title(),
        message: event.body(),
        severity: event.severity(),
        stakeholders,
        action_url: None,
        context: serde_json::to_value(event).ok(),
    }
}

// ============================================================================
// TESTS
// ============================================================================

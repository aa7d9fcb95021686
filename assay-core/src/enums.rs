//! Enum types for ASSAY entities

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// CORE ENUMS
// ============================================================================

/// File-type category a deliverable is assessed under.
///
/// Every extension maps to exactly one category; unrecognized extensions fall
/// back to `Document` so unknown types are never rejected outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileCategory {
    Code,
    Document,
    Test,
    Configuration,
}

impl FileCategory {
    /// Resolve a category from a file extension (with or without leading dot).
    ///
    /// Total mapping: anything not recognized resolves to `Document`.
    pub fn from_extension(extension: &str) -> Self {
        let ext = extension.trim_start_matches('.').to_ascii_lowercase();
        // Test files are matched before plain code extensions by the caller
        // passing compound extensions like "test.ts"; here only the last
        // extension segment is inspected.
        match ext.as_str() {
            "rs" | "ts" | "tsx" | "js" | "jsx" | "py" | "go" | "java" | "c" | "cpp" | "h" => {
                FileCategory::Code
            }
            "md" | "txt" | "rst" | "adoc" | "doc" | "docx" | "pdf" => FileCategory::Document,
            "spec" | "test" => FileCategory::Test,
            "json" | "yaml" | "yml" | "toml" | "ini" | "env" | "cfg" | "conf" => {
                FileCategory::Configuration
            }
            _ => FileCategory::Document,
        }
    }

    /// Resolve a category from a full file name, honoring test-file naming
    /// conventions (`*.test.ts`, `*.spec.js`, `*_test.go`, `test_*.py`).
    pub fn from_file_name(file_name: &str) -> Self {
        let lower = file_name.to_ascii_lowercase();
        let stem_is_test = lower.contains(".test.")
            || lower.contains(".spec.")
            || lower.ends_with("_test.go")
            || lower.ends_with("_test.rs")
            || lower
                .rsplit('/')
                .next()
                .is_some_and(|base| base.starts_with("test_"));
        if stem_is_test {
            return FileCategory::Test;
        }
        match lower.rsplit_once('.') {
            Some((_, ext)) => Self::from_extension(ext),
            None => FileCategory::Document,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FileCategory::Code => "code",
            FileCategory::Document => "document",
            FileCategory::Test => "test",
            FileCategory::Configuration => "configuration",
        }
    }

    /// Parse a category name; `None` for anything unrecognized.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "code" => Some(FileCategory::Code),
            "document" => Some(FileCategory::Document),
            "test" => Some(FileCategory::Test),
            "configuration" | "config" => Some(FileCategory::Configuration),
            _ => None,
        }
    }
}

impl fmt::Display for FileCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entity type discriminator for polymorphic references and errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    Deliverable,
    Todo,
    Task,
    Notification,
    Preference,
}

/// Status of a submitted deliverable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliverableStatus {
    Submitted,
    Validating,
    Approved,
    Rejected,
    NeedsRevision,
}

impl DeliverableStatus {
    /// Whether the transition `self -> to` is permitted.
    ///
    /// Submitted -> Validating -> Approved | Rejected | NeedsRevision;
    /// NeedsRevision -> Submitted (resubmission). Approved and Rejected are
    /// terminal.
    pub fn can_transition(self, to: DeliverableStatus) -> bool {
        use DeliverableStatus::*;
        matches!(
            (self, to),
            (Submitted, Validating)
                | (Validating, Approved)
                | (Validating, Rejected)
                | (Validating, NeedsRevision)
                | (NeedsRevision, Submitted)
        )
    }
}

/// Status of a todo item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TodoStatus {
    Pending,
    InProgress,
    Blocked,
    Completed,
}

impl TodoStatus {
    /// Whether the transition `self -> to` is permitted by the state machine.
    ///
    /// Happy path: Pending -> InProgress -> Completed. Blocking:
    /// Pending | InProgress -> Blocked -> InProgress. Completed is terminal.
    ///
    /// Dependency gating (a todo with unresolved dependencies may not enter
    /// InProgress) is enforced by the transition guard in `assay-progress`,
    /// not here; this is pure shape.
    pub fn can_transition(self, to: TodoStatus) -> bool {
        use TodoStatus::*;
        matches!(
            (self, to),
            (Pending, InProgress)
                | (Pending, Blocked)
                | (InProgress, Completed)
                | (InProgress, Blocked)
                | (Blocked, InProgress)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, TodoStatus::Completed)
    }
}

/// Axis of quality evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityDimension {
    Format,
    Completeness,
    Accuracy,
    Clarity,
    Consistency,
}

impl QualityDimension {
    pub const ALL: [QualityDimension; 5] = [
        QualityDimension::Format,
        QualityDimension::Completeness,
        QualityDimension::Accuracy,
        QualityDimension::Clarity,
        QualityDimension::Consistency,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QualityDimension::Format => "format",
            QualityDimension::Completeness => "completeness",
            QualityDimension::Accuracy => "accuracy",
            QualityDimension::Clarity => "clarity",
            QualityDimension::Consistency => "consistency",
        }
    }
}

impl fmt::Display for QualityDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of how a check is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    /// Lexical/structural inspection of the artifact text.
    StaticAnalysis,
    /// Delegated to the pluggable rules engine when one is configured.
    SemanticValidation,
    /// Category-specific format conformance.
    FormatCompliance,
    /// Textual completeness/clarity heuristics.
    ContentAnalysis,
}

/// Severity/urgency classification driving channel selection and
/// quiet-hours bypass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Delivery channel for notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Slack,
    Teams,
    Email,
    Sms,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Channel::Slack => "slack",
            Channel::Teams => "teams",
            Channel::Email => "email",
            Channel::Sms => "sms",
        };
        f.write_str(s)
    }
}

/// Condition preventing a todo item from progressing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockerKind {
    Dependency,
    Resource,
    Approval,
    Technical,
    External,
}

/// Category of an improvement suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionCategory {
    Critical,
    Major,
    Minor,
    Enhancement,
}

/// Stakeholder priority within an affected team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StakeholderPriority {
    Low,
    Medium,
    High,
}

// ============================================================================
// TESTS
// ============================================================================

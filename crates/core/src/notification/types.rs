//! Notification domain types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Notification kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// A new expense is awaiting approval (sent to approvers).
    ExpensePending,
    /// An expense was approved (sent to the submitter).
    ExpenseApproved,
    /// An expense was rejected (sent to the submitter).
    ExpenseRejected,
}

impl NotificationKind {
    /// Returns the string representation of the kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ExpensePending => "expense_pending",
            Self::ExpenseApproved => "expense_approved",
            Self::ExpenseRejected => "expense_rejected",
        }
    }

    /// Parses a kind from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "expense_pending" => Some(Self::ExpensePending),
            "expense_approved" => Some(Self::ExpenseApproved),
            "expense_rejected" => Some(Self::ExpenseRejected),
            _ => None,
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Notification priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Routine information.
    Normal,
    /// Needs attention (rejections).
    High,
}

impl Priority {
    /// Returns the string representation of the priority.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::High => "high",
        }
    }

    /// Parses a priority from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "normal" => Some(Self::Normal),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

/// A rendered notification, ready to be stored against a recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationMessage {
    /// What happened.
    pub kind: NotificationKind,
    /// Short headline.
    pub title: String,
    /// Full human-readable message.
    pub message: String,
    /// Display priority.
    pub priority: Priority,
}

impl NotificationMessage {
    /// Message for an approved expense, addressed to its submitter.
    #[must_use]
    pub fn expense_approved(amount: Decimal, description: &str, comment: Option<&str>) -> Self {
        let mut message =
            format!("Your expense of ${amount} for \"{description}\" has been approved.");
        if let Some(comment) = comment.filter(|c| !c.trim().is_empty()) {
            message.push_str(&format!(" Comment: {comment}"));
        }

        Self {
            kind: NotificationKind::ExpenseApproved,
            title: "Expense approved".to_string(),
            message,
            priority: Priority::Normal,
        }
    }

    /// Message for a rejected expense, addressed to its submitter.
    #[must_use]
    pub fn expense_rejected(amount: Decimal, description: &str, reason: &str) -> Self {
        Self {
            kind: NotificationKind::ExpenseRejected,
            title: "Expense rejected".to_string(),
            message: format!(
                "Your expense of ${amount} for \"{description}\" has been rejected. Reason: {reason}"
            ),
            priority: Priority::High,
        }
    }

    /// Message for a newly submitted expense, addressed to each approver.
    #[must_use]
    pub fn expense_pending(submitter: &str, amount: Decimal, description: &str) -> Self {
        Self {
            kind: NotificationKind::ExpensePending,
            title: "New pending expense".to_string(),
            message: format!(
                "{submitter} submitted an expense of ${amount} for \"{description}\""
            ),
            priority: Priority::Normal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_kind_roundtrip() {
        for kind in [
            NotificationKind::ExpensePending,
            NotificationKind::ExpenseApproved,
            NotificationKind::ExpenseRejected,
        ] {
            assert_eq!(NotificationKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(NotificationKind::parse("system"), None);
    }

    #[test]
    fn test_approved_message_with_comment() {
        let msg = NotificationMessage::expense_approved(
            dec!(30_000),
            "Taxi to the depot",
            Some("receipt checked"),
        );
        assert_eq!(msg.kind, NotificationKind::ExpenseApproved);
        assert_eq!(msg.priority, Priority::Normal);
        assert!(msg.message.contains("30000"));
        assert!(msg.message.contains("Taxi to the depot"));
        assert!(msg.message.contains("receipt checked"));
    }

    #[test]
    fn test_approved_message_without_comment() {
        let msg = NotificationMessage::expense_approved(dec!(500), "Stationery", None);
        assert!(!msg.message.contains("Comment:"));

        let blank = NotificationMessage::expense_approved(dec!(500), "Stationery", Some("  "));
        assert!(!blank.message.contains("Comment:"));
    }

    #[test]
    fn test_rejected_message_is_high_priority() {
        let msg = NotificationMessage::expense_rejected(dec!(30_000), "Lunch", "no receipt");
        assert_eq!(msg.kind, NotificationKind::ExpenseRejected);
        assert_eq!(msg.priority, Priority::High);
        assert!(msg.message.contains("no receipt"));
    }

    #[test]
    fn test_pending_message_names_submitter() {
        let msg = NotificationMessage::expense_pending("Carla", dec!(1_200), "Cleaning supplies");
        assert_eq!(msg.kind, NotificationKind::ExpensePending);
        assert!(msg.message.starts_with("Carla"));
        assert!(msg.message.contains("1200"));
    }
}

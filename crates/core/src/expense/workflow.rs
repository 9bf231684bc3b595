//! The expense approval state machine.
//!
//! Stateless transition logic: every method validates the current status and
//! returns an `ExpenseAction` carrying the audit trail, or an error. The
//! persistence layer is responsible for applying the action atomically.

use chrono::Utc;
use uuid::Uuid;

use crate::expense::error::ExpenseError;
use crate::expense::types::{ExpenseAction, ExpenseStatus};

/// Stateless service for expense status transitions.
pub struct ExpenseWorkflow;

impl ExpenseWorkflow {
    /// Approve a pending expense.
    ///
    /// # Arguments
    /// * `current_status` - The current status of the expense
    /// * `approved_by` - The user approving the expense
    /// * `comment` - Optional comment from the approver
    ///
    /// # Returns
    /// * `Ok(ExpenseAction::Approve)` if the transition is valid
    /// * `Err(ExpenseError::InvalidTransition)` if not in Pending status
    pub fn approve(
        current_status: ExpenseStatus,
        approved_by: Uuid,
        comment: Option<String>,
    ) -> Result<ExpenseAction, ExpenseError> {
        match current_status {
            ExpenseStatus::Pending => Ok(ExpenseAction::Approve {
                new_status: ExpenseStatus::Approved,
                approved_by,
                approved_at: Utc::now(),
                comment,
            }),
            _ => Err(ExpenseError::InvalidTransition {
                from: current_status,
                to: ExpenseStatus::Approved,
            }),
        }
    }

    /// Reject a pending expense.
    ///
    /// # Arguments
    /// * `current_status` - The current status of the expense
    /// * `rejected_by` - The user rejecting the expense
    /// * `reason` - The reason for rejection (required)
    ///
    /// # Returns
    /// * `Ok(ExpenseAction::Reject)` if the transition is valid
    /// * `Err(ExpenseError::InvalidTransition)` if not in Pending status
    /// * `Err(ExpenseError::RejectionReasonRequired)` if reason is empty
    pub fn reject(
        current_status: ExpenseStatus,
        rejected_by: Uuid,
        reason: String,
    ) -> Result<ExpenseAction, ExpenseError> {
        if reason.trim().is_empty() {
            return Err(ExpenseError::RejectionReasonRequired);
        }

        match current_status {
            ExpenseStatus::Pending => Ok(ExpenseAction::Reject {
                new_status: ExpenseStatus::Rejected,
                rejected_by,
                rejected_at: Utc::now(),
                reason,
            }),
            _ => Err(ExpenseError::InvalidTransition {
                from: current_status,
                to: ExpenseStatus::Rejected,
            }),
        }
    }

    /// Check if a status transition is valid.
    ///
    /// Valid transitions:
    /// - Pending → Approved (approve)
    /// - Pending → Rejected (reject)
    #[must_use]
    pub fn is_valid_transition(from: ExpenseStatus, to: ExpenseStatus) -> bool {
        matches!(
            (from, to),
            (
                ExpenseStatus::Pending,
                ExpenseStatus::Approved | ExpenseStatus::Rejected
            )
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approve_from_pending() {
        let user_id = Uuid::new_v4();
        let result = ExpenseWorkflow::approve(ExpenseStatus::Pending, user_id, None);
        assert!(result.is_ok());
        assert_eq!(result.unwrap().new_status(), ExpenseStatus::Approved);
    }

    #[test]
    fn test_approve_carries_comment() {
        let user_id = Uuid::new_v4();
        let action = ExpenseWorkflow::approve(
            ExpenseStatus::Pending,
            user_id,
            Some("receipt checked".to_string()),
        )
        .unwrap();

        match action {
            ExpenseAction::Approve {
                approved_by,
                comment,
                ..
            } => {
                assert_eq!(approved_by, user_id);
                assert_eq!(comment.as_deref(), Some("receipt checked"));
            }
            ExpenseAction::Reject { .. } => panic!("expected approve action"),
        }
    }

    #[test]
    fn test_approve_from_approved_fails() {
        let result = ExpenseWorkflow::approve(ExpenseStatus::Approved, Uuid::new_v4(), None);
        assert!(matches!(
            result,
            Err(ExpenseError::InvalidTransition {
                from: ExpenseStatus::Approved,
                ..
            })
        ));
    }

    #[test]
    fn test_approve_from_rejected_fails() {
        let result = ExpenseWorkflow::approve(ExpenseStatus::Rejected, Uuid::new_v4(), None);
        assert!(matches!(result, Err(ExpenseError::InvalidTransition { .. })));
    }

    #[test]
    fn test_reject_from_pending() {
        let result = ExpenseWorkflow::reject(
            ExpenseStatus::Pending,
            Uuid::new_v4(),
            "no receipt".to_string(),
        );
        assert!(result.is_ok());
        assert_eq!(result.unwrap().new_status(), ExpenseStatus::Rejected);
    }

    #[test]
    fn test_reject_empty_reason_fails() {
        let result = ExpenseWorkflow::reject(ExpenseStatus::Pending, Uuid::new_v4(), String::new());
        assert!(matches!(result, Err(ExpenseError::RejectionReasonRequired)));
    }

    #[test]
    fn test_reject_whitespace_reason_fails() {
        let result =
            ExpenseWorkflow::reject(ExpenseStatus::Pending, Uuid::new_v4(), "   ".to_string());
        assert!(matches!(result, Err(ExpenseError::RejectionReasonRequired)));
    }

    #[test]
    fn test_reject_from_approved_fails() {
        // A previously-approved expense cannot be re-opened by a late
        // rejection; the debit against the fund stands.
        let result = ExpenseWorkflow::reject(
            ExpenseStatus::Approved,
            Uuid::new_v4(),
            "changed my mind".to_string(),
        );
        assert!(matches!(result, Err(ExpenseError::InvalidTransition { .. })));
    }

    #[test]
    fn test_reject_from_rejected_fails() {
        let result = ExpenseWorkflow::reject(
            ExpenseStatus::Rejected,
            Uuid::new_v4(),
            "again".to_string(),
        );
        assert!(matches!(result, Err(ExpenseError::InvalidTransition { .. })));
    }

    #[test]
    fn test_is_valid_transition() {
        // Valid transitions
        assert!(ExpenseWorkflow::is_valid_transition(
            ExpenseStatus::Pending,
            ExpenseStatus::Approved
        ));
        assert!(ExpenseWorkflow::is_valid_transition(
            ExpenseStatus::Pending,
            ExpenseStatus::Rejected
        ));

        // Terminal states never transition again
        assert!(!ExpenseWorkflow::is_valid_transition(
            ExpenseStatus::Approved,
            ExpenseStatus::Rejected
        ));
        assert!(!ExpenseWorkflow::is_valid_transition(
            ExpenseStatus::Approved,
            ExpenseStatus::Pending
        ));
        assert!(!ExpenseWorkflow::is_valid_transition(
            ExpenseStatus::Rejected,
            ExpenseStatus::Approved
        ));
        assert!(!ExpenseWorkflow::is_valid_transition(
            ExpenseStatus::Rejected,
            ExpenseStatus::Pending
        ));
    }
}

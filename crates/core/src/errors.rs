use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::approver::{ApproverId, ApproverValidationError};
use crate::domain::company::CompanyId;
use crate::domain::rule::{Channel, RuleValidationError};

/// Backend failure raised by a directory or catalog collaborator. Lookup
/// misses are not errors at this level; they surface as `Ok(None)` and the
/// pipeline turns them into the typed not-found variants below.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("directory backend failure: {0}")]
pub struct DirectoryError(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("notification transport failure on {channel}: {reason}")]
pub struct NotificationError {
    pub channel: Channel,
    pub reason: String,
}

/// Pipeline failure taxonomy. Each variant propagates unchanged to the
/// caller as soon as it occurs; no stage retries and no later stage runs.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error("company `{name}` was not found")]
    CompanyNotFound { name: String },
    #[error(
        "no workflow rule matches amount {amount} department `{department}` for company {company_id}"
    )]
    RuleNotFound { company_id: CompanyId, amount: Decimal, department: String },
    #[error("approver {approver_id} was not found")]
    ApproverNotFound { approver_id: ApproverId },
    #[error("invalid workflow rule: {0}")]
    InvalidRule(#[from] RuleValidationError),
    #[error("invalid approver: {0}")]
    InvalidApprover(#[from] ApproverValidationError),
    #[error("no transport registered for channel `{channel}`")]
    UnsupportedChannel { channel: Channel },
    #[error("approver `{approver}` has no {channel} contact")]
    MissingContact { approver: String, channel: Channel },
    #[error(transparent)]
    Notification(#[from] NotificationError),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{DirectoryError, WorkflowError};
    use crate::domain::company::CompanyId;
    use crate::domain::rule::Channel;

    #[test]
    fn rule_not_found_names_the_query() {
        let error = WorkflowError::RuleNotFound {
            company_id: CompanyId(1),
            amount: Decimal::new(250_000, 2),
            department: "Finance".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "no workflow rule matches amount 2500.00 department `Finance` for company 1"
        );
    }

    #[test]
    fn missing_contact_names_the_channel() {
        let error = WorkflowError::MissingContact {
            approver: "Amanda Svensson".to_string(),
            channel: Channel::Slack,
        };
        assert_eq!(error.to_string(), "approver `Amanda Svensson` has no slack contact");
    }

    #[test]
    fn directory_error_is_transparent() {
        let error = WorkflowError::from(DirectoryError("connection reset".to_string()));
        assert_eq!(error.to_string(), "directory backend failure: connection reset");
    }
}

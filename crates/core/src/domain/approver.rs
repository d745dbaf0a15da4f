use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::company::CompanyId;
use crate::domain::rule::Channel;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApproverId(pub i64);

impl std::fmt::Display for ApproverId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ApproverValidationError {
    #[error("company id must be positive")]
    CompanyRequired,
    #[error("at least one of email or slack id is required")]
    MissingContact,
}

/// A contactable decision-maker. Contact fields are optional individually;
/// an approver must carry at least one, and the one a channel needs is
/// re-checked at dispatch time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Approver {
    pub id: ApproverId,
    pub company_id: CompanyId,
    pub name: String,
    pub role: String,
    pub email: Option<String>,
    pub slack_id: Option<String>,
}

impl Approver {
    /// Write-boundary check: the approver must be reachable somehow.
    pub fn validate(&self) -> Result<(), ApproverValidationError> {
        if self.company_id.0 <= 0 {
            return Err(ApproverValidationError::CompanyRequired);
        }
        if self.contact_for(Channel::Email).is_none() && self.contact_for(Channel::Slack).is_none()
        {
            return Err(ApproverValidationError::MissingContact);
        }
        Ok(())
    }

    /// Contact id for the given channel, if present. Blank strings count
    /// as absent so a stored `""` never reaches a transport.
    pub fn contact_for(&self, channel: Channel) -> Option<&str> {
        let contact = match channel {
            Channel::Email => self.email.as_deref(),
            Channel::Slack => self.slack_id.as_deref(),
        };
        contact.filter(|value| !value.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::{Approver, ApproverId, ApproverValidationError};
    use crate::domain::company::CompanyId;
    use crate::domain::rule::Channel;

    fn approver() -> Approver {
        Approver {
            id: ApproverId(1),
            company_id: CompanyId(1),
            name: "Vera Sander".to_string(),
            role: "Finance Manager".to_string(),
            email: Some("vera_sander@light.com".to_string()),
            slack_id: Some("U789012".to_string()),
        }
    }

    #[test]
    fn approver_with_both_contacts_is_valid() {
        assert_eq!(approver().validate(), Ok(()));
    }

    #[test]
    fn single_contact_satisfies_validation() {
        let mut email_only = approver();
        email_only.slack_id = None;
        assert_eq!(email_only.validate(), Ok(()));

        let mut slack_only = approver();
        slack_only.email = None;
        assert_eq!(slack_only.validate(), Ok(()));
    }

    #[test]
    fn missing_both_contacts_is_rejected() {
        let mut unreachable = approver();
        unreachable.email = None;
        unreachable.slack_id = Some("  ".to_string());
        assert_eq!(unreachable.validate(), Err(ApproverValidationError::MissingContact));
    }

    #[test]
    fn non_positive_company_is_rejected() {
        let mut orphaned = approver();
        orphaned.company_id = CompanyId(0);
        assert_eq!(orphaned.validate(), Err(ApproverValidationError::CompanyRequired));
    }

    #[test]
    fn contact_for_selects_the_channel_field() {
        let approver = approver();
        assert_eq!(approver.contact_for(Channel::Email), Some("vera_sander@light.com"));
        assert_eq!(approver.contact_for(Channel::Slack), Some("U789012"));
    }

    #[test]
    fn blank_contact_counts_as_absent() {
        let mut approver = approver();
        approver.email = Some(String::new());
        assert_eq!(approver.contact_for(Channel::Email), None);
        assert_eq!(approver.contact_for(Channel::Slack), Some("U789012"));
    }
}

use async_trait::async_trait;
use secrecy::SecretString;
use tracing::info;

use routey_core::domain::invoice::{ApprovalRequest, ApprovalResponse};
use routey_core::domain::rule::Channel;
use routey_core::errors::NotificationError;
use routey_core::workflow::NotificationChannel;

use crate::MissingConnectionString;

/// Slack transport stub. Holds the workspace connection string it would
/// deliver through and acknowledges every request it accepts.
pub struct SlackNotifier {
    connection_string: SecretString,
}

impl SlackNotifier {
    pub fn new(connection_string: impl Into<String>) -> Result<Self, MissingConnectionString> {
        let connection_string = connection_string.into();
        if connection_string.trim().is_empty() {
            return Err(MissingConnectionString { transport: "slack" });
        }
        Ok(Self { connection_string: connection_string.into() })
    }

    pub fn from_secret(
        connection_string: SecretString,
    ) -> Result<Self, MissingConnectionString> {
        use secrecy::ExposeSecret;
        Self::new(connection_string.expose_secret())
    }
}

#[async_trait]
impl NotificationChannel for SlackNotifier {
    fn channel(&self) -> Channel {
        Channel::Slack
    }

    async fn send(
        &self,
        request: &ApprovalRequest,
    ) -> Result<ApprovalResponse, NotificationError> {
        let slack_id = request.approver.contact_for(Channel::Slack).ok_or_else(|| {
            NotificationError {
                channel: Channel::Slack,
                reason: "approval request carried no slack id".to_string(),
            }
        })?;

        info!(
            approver_name = %request.approver.name,
            approver_role = %request.approver.role,
            approver_slack_id = %slack_id,
            invoice_amount = %request.invoice.amount,
            "sending approval request via slack"
        );

        let _ = &self.connection_string;
        Ok(ApprovalResponse {
            approver_name: request.approver.name.clone(),
            approver_role: request.approver.role.clone(),
            channel: Channel::Slack.as_str().to_string(),
            contact_id: slack_id.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::SlackNotifier;
    use routey_core::domain::approver::{Approver, ApproverId};
    use routey_core::domain::company::CompanyId;
    use routey_core::domain::invoice::{ApprovalRequest, InvoiceDetails};
    use routey_core::workflow::NotificationChannel;

    fn request(slack_id: Option<&str>) -> ApprovalRequest {
        ApprovalRequest {
            approver: Approver {
                id: ApproverId(1),
                company_id: CompanyId(1),
                name: "Finance Team".to_string(),
                role: "Finance Team Member".to_string(),
                email: Some("finance_team@light.com".to_string()),
                slack_id: slack_id.map(str::to_string),
            },
            invoice: InvoiceDetails { amount: Decimal::new(3_000, 0) },
        }
    }

    #[test]
    fn empty_connection_string_is_rejected() {
        assert!(SlackNotifier::new("  ").is_err());
        assert!(SlackNotifier::new("slack").is_ok());
    }

    #[tokio::test]
    async fn acknowledgment_echoes_the_slack_contact() {
        let notifier = SlackNotifier::new("slack").expect("notifier");

        let response = notifier.send(&request(Some("U123456"))).await.expect("send");
        assert_eq!(response.approver_name, "Finance Team");
        assert_eq!(response.channel, "slack");
        assert_eq!(response.contact_id, "U123456");
    }

    #[tokio::test]
    async fn request_without_slack_id_fails() {
        let notifier = SlackNotifier::new("slack").expect("notifier");
        assert!(notifier.send(&request(None)).await.is_err());
    }
}

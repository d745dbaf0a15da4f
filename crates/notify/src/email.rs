use async_trait::async_trait;
use secrecy::SecretString;
use tracing::info;

use routey_core::domain::invoice::{ApprovalRequest, ApprovalResponse};
use routey_core::domain::rule::Channel;
use routey_core::errors::NotificationError;
use routey_core::workflow::NotificationChannel;

use crate::MissingConnectionString;

/// Email transport stub; mirrors the slack one but addresses the
/// approver's mailbox.
pub struct EmailNotifier {
    connection_string: SecretString,
}

impl EmailNotifier {
    pub fn new(connection_string: impl Into<String>) -> Result<Self, MissingConnectionString> {
        let connection_string = connection_string.into();
        if connection_string.trim().is_empty() {
            return Err(MissingConnectionString { transport: "email" });
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
impl NotificationChannel for EmailNotifier {
    fn channel(&self) -> Channel {
        Channel::Email
    }

    async fn send(
        &self,
        request: &ApprovalRequest,
    ) -> Result<ApprovalResponse, NotificationError> {
        let email = request.approver.contact_for(Channel::Email).ok_or_else(|| {
            NotificationError {
                channel: Channel::Email,
                reason: "approval request carried no email address".to_string(),
            }
        })?;

        info!(
            approver_name = %request.approver.name,
            approver_role = %request.approver.role,
            approver_email = %email,
            invoice_amount = %request.invoice.amount,
            "sending approval request via email"
        );

        let _ = &self.connection_string;
        Ok(ApprovalResponse {
            approver_name: request.approver.name.clone(),
            approver_role: request.approver.role.clone(),
            channel: Channel::Email.as_str().to_string(),
            contact_id: email.to_string(),
        })
    }
}

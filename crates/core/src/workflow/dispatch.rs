use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;

use crate::domain::approver::Approver;
use crate::domain::invoice::{ApprovalRequest, ApprovalResponse, InvoiceDetails};
use crate::domain::rule::Channel;
use crate::errors::WorkflowError;
use crate::workflow::NotificationChannel;

/// Routes an approval request to the transport registered for a rule's
/// channel. Contact data is re-checked against the selected channel before
/// any transport call, and a missing contact never falls back to the other
/// channel. At most one send happens per dispatch.
#[derive(Clone, Default)]
pub struct ChannelDispatcher {
    transports: HashMap<Channel, Arc<dyn NotificationChannel>>,
}

impl ChannelDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a transport under the channel it reports. Registering a
    /// second transport for the same channel replaces the first.
    pub fn register(mut self, transport: Arc<dyn NotificationChannel>) -> Self {
        self.transports.insert(transport.channel(), transport);
        self
    }

    pub async fn dispatch(
        &self,
        approver: &Approver,
        channel: Channel,
        amount: Decimal,
    ) -> Result<ApprovalResponse, WorkflowError> {
        let transport = self
            .transports
            .get(&channel)
            .ok_or(WorkflowError::UnsupportedChannel { channel })?;

        if approver.contact_for(channel).is_none() {
            return Err(WorkflowError::MissingContact {
                approver: approver.name.clone(),
                channel,
            });
        }

        let request = ApprovalRequest {
            approver: approver.clone(),
            invoice: InvoiceDetails { amount },
        };
        Ok(transport.send(&request).await?)
    }
}

impl std::fmt::Debug for ChannelDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut channels: Vec<&'static str> =
            self.transports.keys().map(Channel::as_str).collect();
        channels.sort_unstable();
        f.debug_struct("ChannelDispatcher").field("channels", &channels).finish()
    }
}

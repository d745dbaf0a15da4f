use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::approver::Approver;
use crate::domain::company::CompanyId;

/// Invoice attributes submitted for processing. An empty department means
/// the invoice is not tied to one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceRequest {
    pub company_name: String,
    pub amount: Decimal,
    pub department: String,
    pub manager_approval_required: bool,
}

/// The ephemeral tuple the resolver matches rules against. Built per call
/// after the company is resolved; never persisted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceQuery {
    pub company_id: CompanyId,
    pub amount: Decimal,
    pub department: String,
    pub manager_approval_required: bool,
}

impl InvoiceQuery {
    pub fn from_request(company_id: CompanyId, request: &InvoiceRequest) -> Self {
        Self {
            company_id,
            amount: request.amount,
            department: request.department.clone(),
            manager_approval_required: request.manager_approval_required,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceDetails {
    pub amount: Decimal,
}

/// Payload handed to a notification transport.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalRequest {
    pub approver: Approver,
    pub invoice: InvoiceDetails,
}

/// Acknowledgment returned by a transport after a dispatch. `contact_id`
/// is the email address or slack id actually used.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalResponse {
    pub approver_name: String,
    pub approver_role: String,
    pub channel: String,
    pub contact_id: String,
}

//! The invoice-processing pipeline and its collaborator seams.
//!
//! Company lookup, rule resolution, approver lookup, and dispatch run in a
//! strict sequence; the first failure aborts the call and nothing after it
//! executes, so a failed pipeline never sends a notification.

pub mod dispatch;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::error;

use crate::domain::approver::{Approver, ApproverId};
use crate::domain::company::{Company, CompanyId};
use crate::domain::invoice::{ApprovalRequest, ApprovalResponse, InvoiceQuery, InvoiceRequest};
use crate::domain::rule::{Channel, WorkflowRule};
use crate::errors::{DirectoryError, NotificationError, WorkflowError};
use crate::resolver;

pub use dispatch::ChannelDispatcher;

#[async_trait]
pub trait CompanyDirectory: Send + Sync {
    async fn find_by_name(&self, name: &str) -> Result<Option<Company>, DirectoryError>;
}

#[async_trait]
pub trait ApproverDirectory: Send + Sync {
    async fn find_by_id(&self, id: ApproverId) -> Result<Option<Approver>, DirectoryError>;
}

#[async_trait]
pub trait RuleCatalog: Send + Sync {
    /// All rules configured for the company; scoring happens in memory on
    /// this side of the seam.
    async fn rules_for_company(
        &self,
        company_id: CompanyId,
    ) -> Result<Vec<WorkflowRule>, DirectoryError>;
}

/// A notification transport for one channel. Implementations accept the
/// request and return an acknowledgment; delivery semantics live behind
/// this seam.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    fn channel(&self) -> Channel;
    async fn send(&self, request: &ApprovalRequest)
        -> Result<ApprovalResponse, NotificationError>;
}

/// Construction-time configuration for the pipeline. The department list is
/// input-validation data for the front end; the resolver itself never
/// consults it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkflowConfig {
    pub company_name: String,
    pub departments: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum WorkflowSetupError {
    #[error("company name is required")]
    CompanyNameRequired,
    #[error("at least one allowed department is required")]
    DepartmentsRequired,
}

/// Orchestrates one invoice end to end. Stateless between calls: nothing is
/// persisted per invoice and no stage is retried.
pub struct WorkflowService {
    config: WorkflowConfig,
    companies: Arc<dyn CompanyDirectory>,
    approvers: Arc<dyn ApproverDirectory>,
    rules: Arc<dyn RuleCatalog>,
    dispatcher: ChannelDispatcher,
}

impl std::fmt::Debug for WorkflowService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl WorkflowService {
    pub fn new(
        config: WorkflowConfig,
        companies: Arc<dyn CompanyDirectory>,
        approvers: Arc<dyn ApproverDirectory>,
        rules: Arc<dyn RuleCatalog>,
        dispatcher: ChannelDispatcher,
    ) -> Result<Self, WorkflowSetupError> {
        if config.company_name.trim().is_empty() {
            return Err(WorkflowSetupError::CompanyNameRequired);
        }
        if config.departments.is_empty() {
            return Err(WorkflowSetupError::DepartmentsRequired);
        }
        Ok(Self { config, companies, approvers, rules, dispatcher })
    }

    pub fn company_name(&self) -> &str {
        &self.config.company_name
    }

    pub fn departments(&self) -> &[String] {
        &self.config.departments
    }

    /// Startup check that the configured company exists in the directory.
    pub async fn validate_company(&self) -> Result<Company, WorkflowError> {
        self.resolve_company(&self.config.company_name).await
    }

    /// Run the pipeline for one invoice: company, rule, approver, dispatch.
    pub async fn process_invoice(
        &self,
        request: &InvoiceRequest,
    ) -> Result<ApprovalResponse, WorkflowError> {
        let company = self.resolve_company(&request.company_name).await?;
        let query = InvoiceQuery::from_request(company.id, request);
        let rule = self.resolve_rule(&query).await?;
        let approver = self.resolve_approver(rule.approver_id).await?;
        self.dispatcher.dispatch(&approver, rule.channel, query.amount).await
    }

    async fn resolve_company(&self, name: &str) -> Result<Company, WorkflowError> {
        match self.companies.find_by_name(name).await? {
            Some(company) => Ok(company),
            None => {
                error!(company_name = name, "company lookup failed");
                Err(WorkflowError::CompanyNotFound { name: name.to_string() })
            }
        }
    }

    async fn resolve_rule(&self, query: &InvoiceQuery) -> Result<WorkflowRule, WorkflowError> {
        let candidates = self.rules.rules_for_company(query.company_id).await?;
        match resolver::resolve(&candidates, query) {
            Some(rule) => Ok(rule.clone()),
            None => {
                error!(
                    company_id = query.company_id.0,
                    amount = %query.amount,
                    department = %query.department,
                    "no workflow rule matched the invoice"
                );
                Err(WorkflowError::RuleNotFound {
                    company_id: query.company_id,
                    amount: query.amount,
                    department: query.department.clone(),
                })
            }
        }
    }

    async fn resolve_approver(&self, id: ApproverId) -> Result<Approver, WorkflowError> {
        match self.approvers.find_by_id(id).await? {
            Some(approver) => Ok(approver),
            None => {
                error!(approver_id = id.0, "approver lookup failed");
                Err(WorkflowError::ApproverNotFound { approver_id: id })
            }
        }
    }
}

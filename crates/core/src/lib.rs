pub mod config;
pub mod domain;
pub mod errors;
pub mod resolver;
pub mod workflow;

pub use domain::approver::{Approver, ApproverId, ApproverValidationError};
pub use domain::company::{Company, CompanyId};
pub use domain::invoice::{
    ApprovalRequest, ApprovalResponse, InvoiceDetails, InvoiceQuery, InvoiceRequest,
};
pub use domain::rule::{
    Channel, ManagerApproval, RuleId, RuleValidationError, UnknownChannelCode, WorkflowRule,
};
pub use errors::{DirectoryError, NotificationError, WorkflowError};
pub use workflow::{
    ApproverDirectory, ChannelDispatcher, CompanyDirectory, NotificationChannel, RuleCatalog,
    WorkflowConfig, WorkflowService, WorkflowSetupError,
};

pub mod approvers;
pub mod process;
pub mod rules;

use anyhow::anyhow;
use clap::ValueEnum;

use routey_core::domain::company::Company;
use routey_core::domain::rule::{Channel, ManagerApproval};
use routey_db::SqlCompanyRepository;

use crate::bootstrap::Application;

/// Management commands are scoped to the configured company, mirroring the
/// workflow itself.
pub(crate) async fn scoped_company(app: &Application) -> anyhow::Result<Company> {
    let name = app.workflow.company_name();
    let companies = SqlCompanyRepository::new(app.db_pool.clone());
    companies
        .find_by_name(name)
        .await?
        .ok_or_else(|| anyhow!("company `{name}` was not found; run `routey seed` or create it"))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ChannelArg {
    Slack,
    Email,
}

impl From<ChannelArg> for Channel {
    fn from(value: ChannelArg) -> Self {
        match value {
            ChannelArg::Slack => Channel::Slack,
            ChannelArg::Email => Channel::Email,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum ManagerApprovalArg {
    #[default]
    Any,
    Required,
    NotRequired,
}

impl From<ManagerApprovalArg> for ManagerApproval {
    fn from(value: ManagerApprovalArg) -> Self {
        match value {
            ManagerApprovalArg::Any => ManagerApproval::Any,
            ManagerApprovalArg::Required => ManagerApproval::Required,
            ManagerApprovalArg::NotRequired => ManagerApproval::NotRequired,
        }
    }
}

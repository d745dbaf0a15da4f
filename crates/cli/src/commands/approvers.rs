use anyhow::anyhow;
use clap::{Args, Subcommand};

use routey_core::domain::approver::{Approver, ApproverId};
use routey_core::domain::company::CompanyId;
use routey_core::errors::WorkflowError;
use routey_db::SqlApproverRepository;

use super::scoped_company;
use crate::bootstrap::Application;

#[derive(Debug, Subcommand)]
pub enum ApproverCommand {
    #[command(about = "Create an approver")]
    Create(ApproverSpec),
    #[command(about = "Show an approver")]
    Get {
        id: i64,
        #[arg(long, help = "Emit JSON")]
        json: bool,
    },
    #[command(about = "Replace an approver")]
    Update {
        id: i64,
        #[command(flatten)]
        spec: ApproverSpec,
    },
    #[command(about = "Delete an approver")]
    Delete { id: i64 },
    #[command(about = "List the company's approvers")]
    List {
        #[arg(long, help = "Emit JSON")]
        json: bool,
    },
}

#[derive(Debug, Args)]
pub struct ApproverSpec {
    #[arg(long, help = "Approver's display name")]
    name: String,
    #[arg(long, help = "Approver's role (e.g. 'Finance Manager')")]
    role: String,
    #[arg(long, help = "Email address (optional, but one contact is required)")]
    email: Option<String>,
    #[arg(long, help = "Slack id (optional, but one contact is required)")]
    slack_id: Option<String>,
    #[arg(long, help = "Emit JSON")]
    json: bool,
}

impl ApproverSpec {
    fn into_approver(self, id: ApproverId, company_id: CompanyId) -> Approver {
        Approver {
            id,
            company_id,
            name: self.name,
            role: self.role,
            email: self.email,
            slack_id: self.slack_id,
        }
    }
}

pub async fn run(app: &Application, command: ApproverCommand) -> anyhow::Result<()> {
    let company = scoped_company(app).await?;
    let approvers = SqlApproverRepository::new(app.db_pool.clone());

    match command {
        ApproverCommand::Create(spec) => {
            let json = spec.json;
            let approver = spec.into_approver(ApproverId(0), company.id);
            approver.validate().map_err(WorkflowError::InvalidApprover)?;
            let created = approvers.create(&approver).await?;
            emit(&created, json)
        }
        ApproverCommand::Get { id, json } => {
            let approver = approvers
                .find_by_id(ApproverId(id))
                .await?
                .ok_or_else(|| anyhow!("approver {id} was not found"))?;
            emit(&approver, json)
        }
        ApproverCommand::Update { id, spec } => {
            let json = spec.json;
            let approver = spec.into_approver(ApproverId(id), company.id);
            approver.validate().map_err(WorkflowError::InvalidApprover)?;
            approvers.update(&approver).await?;
            emit(&approver, json)
        }
        ApproverCommand::Delete { id } => {
            approvers.delete(ApproverId(id)).await?;
            println!("deleted approver {id}");
            Ok(())
        }
        ApproverCommand::List { json } => {
            let listed = approvers.list_for_company(company.id).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&listed)?);
            } else if listed.is_empty() {
                println!("no approvers configured for `{}`", company.name);
            } else {
                for approver in &listed {
                    println!("{}", format_approver(approver));
                }
            }
            Ok(())
        }
    }
}

fn emit(approver: &Approver, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(approver)?);
    } else {
        println!("{}", format_approver(approver));
    }
    Ok(())
}

fn format_approver(approver: &Approver) -> String {
    format!(
        "approver {}: {} ({}), email {}, slack {}",
        approver.id,
        approver.name,
        approver.role,
        approver.email.as_deref().unwrap_or("-"),
        approver.slack_id.as_deref().unwrap_or("-"),
    )
}

#[cfg(test)]
mod tests {
    use super::format_approver;
    use routey_core::domain::approver::{Approver, ApproverId};
    use routey_core::domain::company::CompanyId;

    #[test]
    fn format_marks_absent_contacts() {
        let approver = Approver {
            id: ApproverId(4),
            company_id: CompanyId(1),
            name: "Sarah Johnson".to_string(),
            role: "CMO".to_string(),
            email: Some("sarah_johnson@light.com".to_string()),
            slack_id: None,
        };

        assert_eq!(
            format_approver(&approver),
            "approver 4: Sarah Johnson (CMO), email sarah_johnson@light.com, slack -"
        );
    }
}

use anyhow::anyhow;
use clap::{Args, Subcommand};
use rust_decimal::Decimal;

use routey_core::domain::approver::ApproverId;
use routey_core::domain::company::CompanyId;
use routey_core::domain::rule::{ManagerApproval, RuleId, WorkflowRule};
use routey_core::errors::WorkflowError;
use routey_db::SqlRuleRepository;

use super::{scoped_company, ChannelArg, ManagerApprovalArg};
use crate::bootstrap::Application;

#[derive(Debug, Subcommand)]
pub enum RuleCommand {
    #[command(about = "Create a workflow rule")]
    Create(RuleSpec),
    #[command(about = "Show a workflow rule")]
    Get {
        id: i64,
        #[arg(long, help = "Emit JSON")]
        json: bool,
    },
    #[command(about = "Replace a workflow rule")]
    Update {
        id: i64,
        #[command(flatten)]
        spec: RuleSpec,
    },
    #[command(about = "Delete a workflow rule")]
    Delete { id: i64 },
    #[command(about = "List the company's workflow rules")]
    List {
        #[arg(long, help = "Emit JSON")]
        json: bool,
    },
}

#[derive(Debug, Args)]
pub struct RuleSpec {
    #[arg(long, help = "Inclusive minimum invoice amount (optional)")]
    min_amount: Option<Decimal>,
    #[arg(long, help = "Exclusive maximum invoice amount (optional)")]
    max_amount: Option<Decimal>,
    #[arg(long, help = "Department the rule is limited to (optional)")]
    department: Option<String>,
    #[arg(long, value_enum, default_value = "any", help = "Manager approval constraint")]
    manager_approval: ManagerApprovalArg,
    #[arg(long, help = "Approver the rule routes to")]
    approver_id: i64,
    #[arg(long, value_enum, help = "Notification channel")]
    channel: ChannelArg,
    #[arg(long, help = "Emit JSON")]
    json: bool,
}

impl RuleSpec {
    fn into_rule(self, id: RuleId, company_id: CompanyId) -> WorkflowRule {
        WorkflowRule {
            id,
            company_id,
            min_amount: self.min_amount,
            max_amount: self.max_amount,
            department: self.department,
            manager_approval: self.manager_approval.into(),
            approver_id: ApproverId(self.approver_id),
            channel: self.channel.into(),
        }
    }
}

pub async fn run(app: &Application, command: RuleCommand) -> anyhow::Result<()> {
    let company = scoped_company(app).await?;
    let rules = SqlRuleRepository::new(app.db_pool.clone());

    match command {
        RuleCommand::Create(spec) => {
            let json = spec.json;
            let rule = spec.into_rule(RuleId(0), company.id);
            rule.validate().map_err(WorkflowError::InvalidRule)?;
            let created = rules.create(&rule).await?;
            emit(&created, json)
        }
        RuleCommand::Get { id, json } => {
            let rule = rules
                .find_by_id(RuleId(id))
                .await?
                .ok_or_else(|| anyhow!("workflow rule {id} was not found"))?;
            emit(&rule, json)
        }
        RuleCommand::Update { id, spec } => {
            let json = spec.json;
            let rule = spec.into_rule(RuleId(id), company.id);
            rule.validate().map_err(WorkflowError::InvalidRule)?;
            rules.update(&rule).await?;
            emit(&rule, json)
        }
        RuleCommand::Delete { id } => {
            rules.delete(RuleId(id)).await?;
            println!("deleted workflow rule {id}");
            Ok(())
        }
        RuleCommand::List { json } => {
            let listed = rules.list_for_company(company.id).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&listed)?);
            } else if listed.is_empty() {
                println!("no workflow rules configured for `{}`", company.name);
            } else {
                for rule in &listed {
                    println!("{}", format_rule(rule));
                }
            }
            Ok(())
        }
    }
}

fn emit(rule: &WorkflowRule, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(rule)?);
    } else {
        println!("{}", format_rule(rule));
    }
    Ok(())
}

fn format_rule(rule: &WorkflowRule) -> String {
    let bound = |amount: Option<Decimal>| match amount {
        Some(value) => value.to_string(),
        None => "any".to_string(),
    };
    let manager = match rule.manager_approval {
        ManagerApproval::Any => "any",
        ManagerApproval::Required => "required",
        ManagerApproval::NotRequired => "not required",
    };

    format!(
        "rule {}: amount {}..{}, department {}, manager approval {} -> approver {} via {}",
        rule.id,
        bound(rule.min_amount),
        bound(rule.max_amount),
        rule.department.as_deref().unwrap_or("any"),
        manager,
        rule.approver_id,
        rule.channel,
    )
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::format_rule;
    use routey_core::domain::approver::ApproverId;
    use routey_core::domain::company::CompanyId;
    use routey_core::domain::rule::{Channel, ManagerApproval, RuleId, WorkflowRule};

    #[test]
    fn format_spells_out_wildcards() {
        let rule = WorkflowRule {
            id: RuleId(3),
            company_id: CompanyId(1),
            min_amount: Some(Decimal::new(5_000, 0)),
            max_amount: None,
            department: None,
            manager_approval: ManagerApproval::Required,
            approver_id: ApproverId(2),
            channel: Channel::Email,
        };

        assert_eq!(
            format_rule(&rule),
            "rule 3: amount 5000..any, department any, manager approval required \
             -> approver 2 via email"
        );
    }
}

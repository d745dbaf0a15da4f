//! Deterministic demo dataset: one company, four approvers, and the five
//! reference routing rules. Seeding is idempotent so repeated `seed` runs
//! leave an already-populated database untouched.

use rust_decimal::Decimal;
use tracing::info;

use routey_core::domain::approver::{Approver, ApproverId};
use routey_core::domain::company::{Company, CompanyId};
use routey_core::domain::rule::{Channel, ManagerApproval, RuleId, WorkflowRule};

use crate::repositories::{
    RepositoryError, SqlApproverRepository, SqlCompanyRepository, SqlRuleRepository,
};
use crate::DbPool;

pub const DEMO_COMPANY: &str = "Light";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeedSummary {
    pub company: Company,
    pub approvers: usize,
    pub rules: usize,
    pub freshly_seeded: bool,
}

/// Seed the reference dataset. An existing demo company with any rules is
/// taken as already seeded.
pub async fn seed_reference_data(pool: &DbPool) -> Result<SeedSummary, RepositoryError> {
    let companies = SqlCompanyRepository::new(pool.clone());
    let approvers = SqlApproverRepository::new(pool.clone());
    let rules = SqlRuleRepository::new(pool.clone());

    if let Some(company) = companies.find_by_name(DEMO_COMPANY).await? {
        let existing_approvers = approvers.list_for_company(company.id).await?;
        let existing_rules = rules.list_for_company(company.id).await?;
        if !existing_rules.is_empty() {
            info!(company = DEMO_COMPANY, "demo dataset already present, leaving it untouched");
            return Ok(SeedSummary {
                company,
                approvers: existing_approvers.len(),
                rules: existing_rules.len(),
                freshly_seeded: false,
            });
        }
    }

    info!(company = DEMO_COMPANY, "seeding demo dataset");

    let company = match companies.find_by_name(DEMO_COMPANY).await? {
        Some(existing) => existing,
        None => companies.create(DEMO_COMPANY).await?,
    };

    let mut approver_ids = Vec::new();
    for approver in demo_approvers(company.id) {
        let created = approvers.create(&approver).await?;
        approver_ids.push(created.id);
    }

    let rule_set = demo_rules(company.id, &approver_ids);
    for rule in &rule_set {
        rules.create(rule).await?;
    }

    Ok(SeedSummary {
        company,
        approvers: approver_ids.len(),
        rules: rule_set.len(),
        freshly_seeded: true,
    })
}

fn demo_approvers(company_id: CompanyId) -> Vec<Approver> {
    let approver = |name: &str, role: &str, email: &str, slack_id: &str| Approver {
        id: ApproverId(0),
        company_id,
        name: name.to_string(),
        role: role.to_string(),
        email: Some(email.to_string()),
        slack_id: Some(slack_id.to_string()),
    };

    vec![
        approver("Finance Team", "Finance Team Member", "finance_team@light.com", "U123456"),
        approver("Vera Sander", "Finance Manager", "vera_sander@light.com", "U789012"),
        approver("Amanda Svensson", "CFO", "amanda_svensson@light.com", "U345678"),
        approver("Sarah Johnson", "CMO", "sarah_johnson@light.com", "U456789"),
    ]
}

/// The reference rule set:
/// below 5k any finance team member is pinged on slack; 5k..10k goes to the
/// team over email, or to the manager when manager approval is required;
/// 10k and up goes to the CFO on slack, except marketing invoices, which go
/// to the CMO over email.
fn demo_rules(company_id: CompanyId, approver_ids: &[ApproverId]) -> Vec<WorkflowRule> {
    let amount = |value: i64| Decimal::new(value, 0);
    let rule = |approver: ApproverId, channel: Channel| WorkflowRule {
        id: RuleId(0),
        company_id,
        min_amount: None,
        max_amount: None,
        department: None,
        manager_approval: ManagerApproval::Any,
        approver_id: approver,
        channel,
    };

    let (team, manager, cfo, cmo) =
        (approver_ids[0], approver_ids[1], approver_ids[2], approver_ids[3]);

    let mut below_5k = rule(team, Channel::Slack);
    below_5k.max_amount = Some(amount(5_000));

    let mut mid_range = rule(team, Channel::Email);
    mid_range.min_amount = Some(amount(5_000));
    mid_range.max_amount = Some(amount(10_000));

    let mut mid_range_manager = rule(manager, Channel::Email);
    mid_range_manager.min_amount = Some(amount(5_000));
    mid_range_manager.max_amount = Some(amount(10_000));
    mid_range_manager.manager_approval = ManagerApproval::Required;

    let mut large = rule(cfo, Channel::Slack);
    large.min_amount = Some(amount(10_000));

    let mut large_marketing = rule(cmo, Channel::Email);
    large_marketing.min_amount = Some(amount(10_000));
    large_marketing.department = Some("Marketing".to_string());

    vec![below_5k, mid_range, mid_range_manager, large, large_marketing]
}

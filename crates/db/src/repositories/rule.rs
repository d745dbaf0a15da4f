use std::str::FromStr;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::Row;

use routey_core::domain::approver::ApproverId;
use routey_core::domain::company::CompanyId;
use routey_core::domain::rule::{Channel, ManagerApproval, RuleId, WorkflowRule};
use routey_core::errors::DirectoryError;
use routey_core::workflow::RuleCatalog;

use super::RepositoryError;
use crate::DbPool;

pub struct SqlRuleRepository {
    pool: DbPool,
}

impl SqlRuleRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, rule: &WorkflowRule) -> Result<WorkflowRule, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO workflow_rules
                 (company_id, min_amount, max_amount, department, manager_approval,
                  approver_id, channel)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(rule.company_id.0)
        .bind(rule.min_amount.map(|amount| amount.to_string()))
        .bind(rule.max_amount.map(|amount| amount.to_string()))
        .bind(&rule.department)
        .bind(rule.manager_approval.to_column())
        .bind(rule.approver_id.0)
        .bind(rule.channel.code())
        .execute(&self.pool)
        .await?;

        Ok(WorkflowRule { id: RuleId(result.last_insert_rowid()), ..rule.clone() })
    }

    pub async fn find_by_id(&self, id: RuleId) -> Result<Option<WorkflowRule>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, company_id, min_amount, max_amount, department, manager_approval,
                    approver_id, channel
             FROM workflow_rules WHERE id = ?",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_rule).transpose()
    }

    pub async fn update(&self, rule: &WorkflowRule) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE workflow_rules
             SET company_id = ?, min_amount = ?, max_amount = ?, department = ?,
                 manager_approval = ?, approver_id = ?, channel = ?
             WHERE id = ?",
        )
        .bind(rule.company_id.0)
        .bind(rule.min_amount.map(|amount| amount.to_string()))
        .bind(rule.max_amount.map(|amount| amount.to_string()))
        .bind(&rule.department)
        .bind(rule.manager_approval.to_column())
        .bind(rule.approver_id.0)
        .bind(rule.channel.code())
        .bind(rule.id.0)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound { entity: "workflow rule", id: rule.id.0 });
        }
        Ok(())
    }

    pub async fn delete(&self, id: RuleId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM workflow_rules WHERE id = ?")
            .bind(id.0)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound { entity: "workflow rule", id: id.0 });
        }
        Ok(())
    }

    /// Rules for a company in id order; the resolver does its own scoring
    /// over this set.
    pub async fn list_for_company(
        &self,
        company_id: CompanyId,
    ) -> Result<Vec<WorkflowRule>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, company_id, min_amount, max_amount, department, manager_approval,
                    approver_id, channel
             FROM workflow_rules WHERE company_id = ? ORDER BY id ASC",
        )
        .bind(company_id.0)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_rule).collect()
    }
}

fn row_to_rule(row: &sqlx::sqlite::SqliteRow) -> Result<WorkflowRule, RepositoryError> {
    let id: i64 = row.try_get("id").map_err(RepositoryError::decode)?;
    let company_id: i64 = row.try_get("company_id").map_err(RepositoryError::decode)?;
    let min_amount: Option<String> =
        row.try_get("min_amount").map_err(RepositoryError::decode)?;
    let max_amount: Option<String> =
        row.try_get("max_amount").map_err(RepositoryError::decode)?;
    let department: Option<String> =
        row.try_get("department").map_err(RepositoryError::decode)?;
    let manager_approval: Option<i64> =
        row.try_get("manager_approval").map_err(RepositoryError::decode)?;
    let approver_id: i64 = row.try_get("approver_id").map_err(RepositoryError::decode)?;
    let channel: i64 = row.try_get("channel").map_err(RepositoryError::decode)?;

    Ok(WorkflowRule {
        id: RuleId(id),
        company_id: CompanyId(company_id),
        min_amount: min_amount.as_deref().map(parse_amount).transpose()?,
        max_amount: max_amount.as_deref().map(parse_amount).transpose()?,
        department,
        manager_approval: ManagerApproval::from_column(manager_approval)
            .map_err(RepositoryError::decode)?,
        approver_id: ApproverId(approver_id),
        channel: Channel::from_code(channel).map_err(RepositoryError::decode)?,
    })
}

fn parse_amount(value: &str) -> Result<Decimal, RepositoryError> {
    Decimal::from_str(value)
        .map_err(|error| RepositoryError::Decode(format!("invalid amount `{value}`: {error}")))
}

#[async_trait]
impl RuleCatalog for SqlRuleRepository {
    async fn rules_for_company(
        &self,
        company_id: CompanyId,
    ) -> Result<Vec<WorkflowRule>, DirectoryError> {
        Ok(self.list_for_company(company_id).await?)
    }
}

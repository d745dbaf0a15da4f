use async_trait::async_trait;
use sqlx::Row;

use routey_core::domain::approver::{Approver, ApproverId};
use routey_core::domain::company::CompanyId;
use routey_core::errors::DirectoryError;
use routey_core::workflow::ApproverDirectory;

use super::RepositoryError;
use crate::DbPool;

pub struct SqlApproverRepository {
    pool: DbPool,
}

impl SqlApproverRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, approver: &Approver) -> Result<Approver, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO approvers (company_id, name, role, email, slack_id)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(approver.company_id.0)
        .bind(&approver.name)
        .bind(&approver.role)
        .bind(&approver.email)
        .bind(&approver.slack_id)
        .execute(&self.pool)
        .await?;

        Ok(Approver { id: ApproverId(result.last_insert_rowid()), ..approver.clone() })
    }

    pub async fn find_by_id(&self, id: ApproverId) -> Result<Option<Approver>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, company_id, name, role, email, slack_id FROM approvers WHERE id = ?",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_approver).transpose()
    }

    pub async fn update(&self, approver: &Approver) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE approvers SET company_id = ?, name = ?, role = ?, email = ?, slack_id = ?
             WHERE id = ?",
        )
        .bind(approver.company_id.0)
        .bind(&approver.name)
        .bind(&approver.role)
        .bind(&approver.email)
        .bind(&approver.slack_id)
        .bind(approver.id.0)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound { entity: "approver", id: approver.id.0 });
        }
        Ok(())
    }

    pub async fn delete(&self, id: ApproverId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM approvers WHERE id = ?")
            .bind(id.0)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound { entity: "approver", id: id.0 });
        }
        Ok(())
    }

    pub async fn list_for_company(
        &self,
        company_id: CompanyId,
    ) -> Result<Vec<Approver>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, company_id, name, role, email, slack_id
             FROM approvers WHERE company_id = ? ORDER BY id ASC",
        )
        .bind(company_id.0)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_approver).collect()
    }
}

fn row_to_approver(row: &sqlx::sqlite::SqliteRow) -> Result<Approver, RepositoryError> {
    let id: i64 = row.try_get("id").map_err(RepositoryError::decode)?;
    let company_id: i64 = row.try_get("company_id").map_err(RepositoryError::decode)?;
    let name: String = row.try_get("name").map_err(RepositoryError::decode)?;
    let role: String = row.try_get("role").map_err(RepositoryError::decode)?;
    let email: Option<String> = row.try_get("email").map_err(RepositoryError::decode)?;
    let slack_id: Option<String> = row.try_get("slack_id").map_err(RepositoryError::decode)?;

    Ok(Approver {
        id: ApproverId(id),
        company_id: CompanyId(company_id),
        name,
        role,
        email,
        slack_id,
    })
}

#[async_trait]
impl ApproverDirectory for SqlApproverRepository {
    async fn find_by_id(&self, id: ApproverId) -> Result<Option<Approver>, DirectoryError> {
        Ok(SqlApproverRepository::find_by_id(self, id).await?)
    }
}

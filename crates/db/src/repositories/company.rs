use async_trait::async_trait;
use sqlx::Row;

use routey_core::domain::company::{Company, CompanyId};
use routey_core::errors::DirectoryError;
use routey_core::workflow::CompanyDirectory;

use super::{is_unique_violation, RepositoryError};
use crate::DbPool;

pub struct SqlCompanyRepository {
    pool: DbPool,
}

impl SqlCompanyRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, name: &str) -> Result<Company, RepositoryError> {
        let result = sqlx::query("INSERT INTO companies (name) VALUES (?)")
            .bind(name)
            .execute(&self.pool)
            .await;

        match result {
            Ok(outcome) => Ok(Company {
                id: CompanyId(outcome.last_insert_rowid()),
                name: name.to_string(),
            }),
            Err(error) if is_unique_violation(&error) => {
                Err(RepositoryError::DuplicateCompany(name.to_string()))
            }
            Err(error) => Err(error.into()),
        }
    }

    pub async fn find_by_id(&self, id: CompanyId) -> Result<Option<Company>, RepositoryError> {
        let row = sqlx::query("SELECT id, name FROM companies WHERE id = ?")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_company).transpose()
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<Company>, RepositoryError> {
        let row = sqlx::query("SELECT id, name FROM companies WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_company).transpose()
    }
}

fn row_to_company(row: &sqlx::sqlite::SqliteRow) -> Result<Company, RepositoryError> {
    let id: i64 = row.try_get("id").map_err(RepositoryError::decode)?;
    let name: String = row.try_get("name").map_err(RepositoryError::decode)?;
    Ok(Company { id: CompanyId(id), name })
}

#[async_trait]
impl CompanyDirectory for SqlCompanyRepository {
    async fn find_by_name(&self, name: &str) -> Result<Option<Company>, DirectoryError> {
        Ok(SqlCompanyRepository::find_by_name(self, name).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::SqlCompanyRepository;
    use crate::{connect_with_settings, migrations};
    use routey_core::domain::company::CompanyId;

    async fn setup() -> sqlx::SqlitePool {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        pool
    }

    #[tokio::test]
    async fn create_assigns_an_id_and_find_round_trips() {
        let repo = SqlCompanyRepository::new(setup().await);

        let created = repo.create("Light").await.expect("create");
        assert!(created.id.0 > 0);

        let by_name = repo.find_by_name("Light").await.expect("find by name");
        assert_eq!(by_name.as_ref(), Some(&created));

        let by_id = repo.find_by_id(created.id).await.expect("find by id");
        assert_eq!(by_id, Some(created));
    }

    #[tokio::test]
    async fn duplicate_name_is_a_typed_error() {
        let repo = SqlCompanyRepository::new(setup().await);
        repo.create("Light").await.expect("first create");

        let error = repo.create("Light").await.expect_err("duplicate name");
        assert!(matches!(
            error,
            super::RepositoryError::DuplicateCompany(ref name) if name == "Light"
        ));
    }

    #[tokio::test]
    async fn lookup_misses_are_none_not_errors() {
        let repo = SqlCompanyRepository::new(setup().await);

        assert_eq!(repo.find_by_name("Shadow").await.expect("find"), None);
        assert_eq!(repo.find_by_id(CompanyId(42)).await.expect("find"), None);
    }

    #[tokio::test]
    async fn company_name_lookup_is_exact() {
        let repo = SqlCompanyRepository::new(setup().await);
        repo.create("Light").await.expect("create");

        assert_eq!(repo.find_by_name("light").await.expect("find"), None);
    }
}

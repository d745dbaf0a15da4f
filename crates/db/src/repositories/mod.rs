use thiserror::Error;

use routey_core::errors::DirectoryError;

pub mod approver;
pub mod company;
pub mod rule;

pub use approver::SqlApproverRepository;
pub use company::SqlCompanyRepository;
pub use rule::SqlRuleRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("company `{0}` already exists")]
    DuplicateCompany(String),
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },
}

impl RepositoryError {
    pub(crate) fn decode(error: impl std::fmt::Display) -> Self {
        Self::Decode(error.to_string())
    }
}

/// Directory-trait impls flatten repository failures into the backend error
/// the workflow layer understands.
impl From<RepositoryError> for DirectoryError {
    fn from(error: RepositoryError) -> Self {
        DirectoryError(error.to_string())
    }
}

pub(crate) fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(
        error,
        sqlx::Error::Database(db_error) if db_error.is_unique_violation()
    )
}

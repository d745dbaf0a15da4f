use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use routey_core::config::{AppConfig, ConfigError};
use routey_core::workflow::{
    ChannelDispatcher, WorkflowConfig, WorkflowService, WorkflowSetupError,
};
use routey_db::{
    connect, migrations, DbPool, SqlApproverRepository, SqlCompanyRepository, SqlRuleRepository,
};
use routey_notify::{EmailNotifier, MissingConnectionString, SlackNotifier};

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub workflow: WorkflowService,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error(transparent)]
    Transport(#[from] MissingConnectionString),
    #[error(transparent)]
    Workflow(#[from] WorkflowSetupError),
}

/// Wire the application from an already-loaded config: pool, migrations,
/// transports, and the workflow service over the sqlite-backed directories.
pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    let db_pool = connect(&config.database).await.map_err(BootstrapError::DatabaseConnect)?;

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(database_url = %config.database.url, "database ready");

    let slack = SlackNotifier::from_secret(config.slack.connection_string.clone())?;
    let email = EmailNotifier::from_secret(config.email.connection_string.clone())?;
    let dispatcher =
        ChannelDispatcher::new().register(Arc::new(slack)).register(Arc::new(email));

    let workflow = WorkflowService::new(
        WorkflowConfig {
            company_name: config.workflow.company_name.clone(),
            departments: config.workflow.departments.clone(),
        },
        Arc::new(SqlCompanyRepository::new(db_pool.clone())),
        Arc::new(SqlApproverRepository::new(db_pool.clone())),
        Arc::new(SqlRuleRepository::new(db_pool.clone())),
        dispatcher,
    )?;

    Ok(Application { config, db_pool, workflow })
}

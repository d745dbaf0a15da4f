pub mod bootstrap;
pub mod commands;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use routey_core::config::{split_departments, AppConfig, ConfigOverrides, LoadOptions, LogFormat};

#[derive(Debug, Parser)]
#[command(
    name = "routey",
    about = "Invoice approval routing CLI",
    long_about = "Route invoices to the right approver and notification channel, and manage \
                  the workflow rules and approvers that drive the routing.",
    after_help = "Examples:\n  routey seed\n  routey process\n  routey rule list --json\n  \
                  routey rule create --min-amount 5000 --approver-id 2 --channel email"
)]
pub struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct GlobalArgs {
    #[arg(long, global = true, help = "Path to a routey.toml config file")]
    config: Option<PathBuf>,
    #[arg(long, global = true, help = "Sqlite database URL")]
    database_url: Option<String>,
    #[arg(long, global = true, help = "Company the workflow operates for")]
    company: Option<String>,
    #[arg(long, global = true, help = "Comma-separated allowed departments (e.g. 'Finance,Marketing')")]
    departments: Option<String>,
    #[arg(long, global = true, help = "Log level (trace|debug|info|warn|error)")]
    log_level: Option<String>,
}

impl GlobalArgs {
    fn load_options(&self) -> LoadOptions {
        LoadOptions {
            config_path: self.config.clone(),
            require_file: self.config.is_some(),
            overrides: ConfigOverrides {
                database_url: self.database_url.clone(),
                company_name: self.company.clone(),
                departments: self.departments.as_deref().map(split_departments),
                log_level: self.log_level.clone(),
                ..ConfigOverrides::default()
            },
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Process invoices interactively through the approval workflow")]
    Process,
    #[command(about = "Manage workflow rules for the configured company", subcommand)]
    Rule(commands::rules::RuleCommand),
    #[command(about = "Manage approvers for the configured company", subcommand)]
    Approver(commands::approvers::ApproverCommand),
    #[command(about = "Apply pending database migrations")]
    Migrate,
    #[command(about = "Apply migrations and load the demo dataset")]
    Seed,
}

fn init_logging(config: &AppConfig) {
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        LogFormat::Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        LogFormat::Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(cli.global.load_options())?;
    init_logging(&config);

    match cli.command {
        Command::Process => {
            let app = bootstrap::bootstrap_with_config(config).await?;
            commands::process::run(&app).await
        }
        Command::Rule(command) => {
            let app = bootstrap::bootstrap_with_config(config).await?;
            commands::rules::run(&app, command).await
        }
        Command::Approver(command) => {
            let app = bootstrap::bootstrap_with_config(config).await?;
            commands::approvers::run(&app, command).await
        }
        Command::Migrate => {
            // Bootstrap already applies pending migrations; the command
            // exists so operators can run them without touching anything else.
            let app = bootstrap::bootstrap_with_config(config).await?;
            println!("migrations applied to {}", app.config.database.url);
            Ok(())
        }
        Command::Seed => {
            let app = bootstrap::bootstrap_with_config(config).await?;
            let summary = routey_db::seed_reference_data(&app.db_pool).await?;
            if summary.freshly_seeded {
                println!(
                    "seeded company `{}` with {} approvers and {} rules",
                    summary.company.name, summary.approvers, summary.rules
                );
            } else {
                println!(
                    "company `{}` already seeded ({} approvers, {} rules)",
                    summary.company.name, summary.approvers, summary.rules
                );
            }
            Ok(())
        }
    }
}

//! End-to-end coverage of the approval pipeline over a seeded sqlite
//! database with the real transports, mirroring the reference rule set.

use std::io::Cursor;
use std::sync::Arc;

use rust_decimal::Decimal;

use routey_cli::bootstrap::bootstrap_with_config;
use routey_cli::commands::process::ProcessSession;
use routey_core::config::{AppConfig, ConfigOverrides, LoadOptions};
use routey_core::domain::invoice::InvoiceRequest;
use routey_core::errors::WorkflowError;
use routey_core::workflow::{ChannelDispatcher, WorkflowConfig, WorkflowService};
use routey_db::{
    connect_with_settings, migrations, seed_reference_data, DbPool, SqlApproverRepository,
    SqlCompanyRepository, SqlRuleRepository,
};
use routey_notify::{EmailNotifier, SlackNotifier};

async fn seeded_app() -> (DbPool, WorkflowService) {
    let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
    migrations::run_pending(&pool).await.expect("migrations");
    seed_reference_data(&pool).await.expect("seed");

    let dispatcher = ChannelDispatcher::new()
        .register(Arc::new(SlackNotifier::new("slack").expect("slack notifier")))
        .register(Arc::new(EmailNotifier::new("email").expect("email notifier")));

    let workflow = WorkflowService::new(
        WorkflowConfig {
            company_name: "Light".to_string(),
            departments: vec!["Marketing".to_string(), "Finance".to_string()],
        },
        Arc::new(SqlCompanyRepository::new(pool.clone())),
        Arc::new(SqlApproverRepository::new(pool.clone())),
        Arc::new(SqlRuleRepository::new(pool.clone())),
        dispatcher,
    )
    .expect("workflow service");

    (pool, workflow)
}

fn request(amount: i64, department: &str, manager: bool) -> InvoiceRequest {
    InvoiceRequest {
        company_name: "Light".to_string(),
        amount: Decimal::new(amount, 0),
        department: department.to_string(),
        manager_approval_required: manager,
    }
}

#[tokio::test]
async fn reference_scenarios_route_to_the_expected_approver_and_channel() {
    let (_pool, workflow) = seeded_app().await;

    let scenarios: &[(i64, &str, bool, &str, &str, &str)] = &[
        (3_000, "Finance", false, "Finance Team", "slack", "U123456"),
        (7_500, "Finance", false, "Finance Team", "email", "finance_team@light.com"),
        (7_500, "Finance", true, "Vera Sander", "email", "vera_sander@light.com"),
        (15_000, "Finance", false, "Amanda Svensson", "slack", "U345678"),
        (15_000, "Marketing", false, "Sarah Johnson", "email", "sarah_johnson@light.com"),
        (15_000, "Marketing", true, "Sarah Johnson", "email", "sarah_johnson@light.com"),
    ];

    for (amount, department, manager, approver, channel, contact) in scenarios {
        let response = workflow
            .process_invoice(&request(*amount, department, *manager))
            .await
            .unwrap_or_else(|error| {
                panic!("scenario {amount}/{department}/{manager} failed: {error}")
            });

        assert_eq!(&response.approver_name, approver, "approver for {amount}/{department}");
        assert_eq!(&response.channel, channel, "channel for {amount}/{department}");
        assert_eq!(&response.contact_id, contact, "contact for {amount}/{department}");
    }
}

#[tokio::test]
async fn identical_requests_against_identical_state_yield_identical_responses() {
    let (_pool, workflow) = seeded_app().await;
    let request = request(7_500, "Marketing", true);

    let first = workflow.process_invoice(&request).await.expect("first run");
    let second = workflow.process_invoice(&request).await.expect("second run");
    assert_eq!(first, second);
}

#[tokio::test]
async fn slack_rule_with_missing_slack_id_fails_hard() {
    let (pool, workflow) = seeded_app().await;

    // Strip the CFO's slack id; the 10k+ rule routes to them via slack.
    let approvers = SqlApproverRepository::new(pool.clone());
    let company = SqlCompanyRepository::new(pool.clone())
        .find_by_name("Light")
        .await
        .expect("find company")
        .expect("company exists");
    let mut cfo = approvers
        .list_for_company(company.id)
        .await
        .expect("list approvers")
        .into_iter()
        .find(|approver| approver.role == "CFO")
        .expect("CFO exists");
    cfo.slack_id = None;
    approvers.update(&cfo).await.expect("update CFO");

    let error = workflow
        .process_invoice(&request(15_000, "Finance", false))
        .await
        .expect_err("missing slack id must fail");

    assert!(matches!(error, WorkflowError::MissingContact { ref approver, .. }
        if approver == "Amanda Svensson"));
}

#[tokio::test]
async fn unknown_company_fails_before_touching_the_rules() {
    let (_pool, workflow) = seeded_app().await;

    let error = workflow
        .process_invoice(&InvoiceRequest {
            company_name: "Shadow".to_string(),
            amount: Decimal::new(100, 0),
            department: String::new(),
            manager_approval_required: false,
        })
        .await
        .expect_err("company is not seeded");

    assert_eq!(error, WorkflowError::CompanyNotFound { name: "Shadow".to_string() });
}

#[tokio::test]
async fn interactive_session_canonicalizes_the_department_and_reports_the_route() {
    let (_pool, workflow) = seeded_app().await;

    // Amount, lower-cased department, manager skip, then decline to continue.
    let input = Cursor::new(b"3000\nfinance\n\nn\n".to_vec());
    let mut output = Vec::new();

    ProcessSession::new(&workflow, input, &mut output)
        .run()
        .await
        .expect("session should finish");

    let transcript = String::from_utf8(output).expect("utf8 output");
    assert!(transcript.contains("department: Finance"), "transcript: {transcript}");
    assert!(transcript.contains("approver: Finance Team"), "transcript: {transcript}");
    assert!(transcript.contains("channel: slack"), "transcript: {transcript}");
    assert!(transcript.contains("contact: U123456"), "transcript: {transcript}");
}

#[tokio::test]
async fn interactive_session_reprompts_on_invalid_input() {
    let (_pool, workflow) = seeded_app().await;

    // Bad amount, then a valid one; bad department, then skip; manager skip;
    // then stop.
    let input = Cursor::new(b"lots\n750\nLegal\n\n\nn\n".to_vec());
    let mut output = Vec::new();

    ProcessSession::new(&workflow, input, &mut output)
        .run()
        .await
        .expect("session should finish");

    let transcript = String::from_utf8(output).expect("utf8 output");
    assert!(transcript.contains("invalid amount format"), "transcript: {transcript}");
    assert!(transcript.contains("department must be one of"), "transcript: {transcript}");
    assert!(transcript.contains("approver: Finance Team"), "transcript: {transcript}");
}

#[tokio::test]
async fn bootstrap_wires_the_full_application_from_config() {
    let dir = tempfile::TempDir::new().expect("tempdir");
    let db_path = dir.path().join("routey-e2e.db");

    let config = AppConfig::load(LoadOptions {
        overrides: ConfigOverrides {
            database_url: Some(format!("sqlite://{}?mode=rwc", db_path.display())),
            ..ConfigOverrides::default()
        },
        ..LoadOptions::default()
    })
    .expect("config should load");

    let app = bootstrap_with_config(config).await.expect("bootstrap");
    seed_reference_data(&app.db_pool).await.expect("seed");

    app.workflow.validate_company().await.expect("configured company exists");
    let response = app
        .workflow
        .process_invoice(&request(7_500, "", true))
        .await
        .expect("pipeline should succeed");

    assert_eq!(response.approver_name, "Vera Sander");
    assert_eq!(response.channel, "email");
}

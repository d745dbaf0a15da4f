//! Interactive invoice processing. The session reads invoice details from
//! the operator, validates them against the configured department list,
//! and hands each invoice to the workflow pipeline. Department input is
//! canonicalized case-insensitively here, upstream of the resolver's exact
//! matching.

use std::io::{BufRead, Write};
use std::str::FromStr;

use rust_decimal::Decimal;

use routey_core::domain::invoice::{ApprovalResponse, InvoiceRequest};
use routey_core::workflow::WorkflowService;

use crate::bootstrap::Application;

pub async fn run(app: &Application) -> anyhow::Result<()> {
    app.workflow.validate_company().await?;

    let stdin = std::io::stdin();
    let mut session = ProcessSession::new(&app.workflow, stdin.lock(), std::io::stdout());
    session.run().await
}

pub struct ProcessSession<'a, R, W> {
    workflow: &'a WorkflowService,
    input: R,
    output: W,
}

impl<'a, R: BufRead, W: Write> ProcessSession<'a, R, W> {
    pub fn new(workflow: &'a WorkflowService, input: R, output: W) -> Self {
        Self { workflow, input, output }
    }

    pub async fn run(&mut self) -> anyhow::Result<()> {
        writeln!(self.output, "Invoice Approval Workflow")?;
        writeln!(self.output, "=========================")?;

        loop {
            let Some(request) = self.read_invoice()? else {
                break;
            };

            self.show_summary(&request)?;
            writeln!(self.output, "processing invoice...")?;
            match self.workflow.process_invoice(&request).await {
                Ok(response) => self.show_response(&response)?,
                Err(error) => writeln!(self.output, "failed to process invoice: {error}")?,
            }

            if !self.ask_continue()? {
                break;
            }
            writeln!(self.output)?;
        }

        writeln!(self.output, "invoice approval workflow finished")?;
        Ok(())
    }

    /// Collect one invoice from the operator. `None` means the input ended.
    fn read_invoice(&mut self) -> anyhow::Result<Option<InvoiceRequest>> {
        let Some(amount) = self.read_amount()? else {
            return Ok(None);
        };
        let Some(department) = self.read_department()? else {
            return Ok(None);
        };
        let Some(manager_approval_required) = self.read_manager_approval()? else {
            return Ok(None);
        };

        Ok(Some(InvoiceRequest {
            company_name: self.workflow.company_name().to_string(),
            amount,
            department,
            manager_approval_required,
        }))
    }

    fn read_amount(&mut self) -> anyhow::Result<Option<Decimal>> {
        loop {
            write!(self.output, "Enter invoice amount (USD) or press Enter to skip: $")?;
            self.output.flush()?;
            let Some(line) = self.read_line()? else {
                return Ok(None);
            };
            match parse_amount_input(&line) {
                Ok(amount) => return Ok(Some(amount)),
                Err(message) => writeln!(self.output, "error: {message}")?,
            }
        }
    }

    fn read_department(&mut self) -> anyhow::Result<Option<String>> {
        let allowed = self.workflow.departments().to_vec();
        loop {
            write!(
                self.output,
                "Enter department ({}) or press Enter to skip: ",
                allowed.join("/")
            )?;
            self.output.flush()?;
            let Some(line) = self.read_line()? else {
                return Ok(None);
            };
            match canonical_department(&line, &allowed) {
                Ok(department) => return Ok(Some(department)),
                Err(message) => writeln!(self.output, "error: {message}")?,
            }
        }
    }

    fn read_manager_approval(&mut self) -> anyhow::Result<Option<bool>> {
        loop {
            write!(
                self.output,
                "Does this invoice require manager approval? (y/n) or press Enter to skip: "
            )?;
            self.output.flush()?;
            let Some(line) = self.read_line()? else {
                return Ok(None);
            };
            match parse_yes_no(&line, Some(false)) {
                Ok(value) => return Ok(Some(value)),
                Err(message) => writeln!(self.output, "error: {message}")?,
            }
        }
    }

    fn ask_continue(&mut self) -> anyhow::Result<bool> {
        loop {
            write!(self.output, "Process another invoice? (y/n): ")?;
            self.output.flush()?;
            let Some(line) = self.read_line()? else {
                return Ok(false);
            };
            match parse_yes_no(&line, None) {
                Ok(value) => return Ok(value),
                Err(message) => writeln!(self.output, "error: {message}")?,
            }
        }
    }

    fn show_summary(&mut self, request: &InvoiceRequest) -> anyhow::Result<()> {
        writeln!(self.output)?;
        writeln!(self.output, "Invoice details")?;
        writeln!(self.output, "---------------")?;
        if request.amount > Decimal::ZERO {
            writeln!(self.output, "amount: ${}", request.amount)?;
        } else {
            writeln!(self.output, "amount: not specified")?;
        }
        if request.department.is_empty() {
            writeln!(self.output, "department: not specified")?;
        } else {
            writeln!(self.output, "department: {}", request.department)?;
        }
        writeln!(
            self.output,
            "manager approval required: {}",
            if request.manager_approval_required { "yes" } else { "no" }
        )?;
        Ok(())
    }

    fn show_response(&mut self, response: &ApprovalResponse) -> anyhow::Result<()> {
        writeln!(self.output, "invoice sent for approval")?;
        writeln!(self.output, "approver: {}", response.approver_name)?;
        writeln!(self.output, "role: {}", response.approver_role)?;
        writeln!(self.output, "channel: {}", response.channel)?;
        writeln!(self.output, "contact: {}", response.contact_id)?;
        Ok(())
    }

    fn read_line(&mut self) -> std::io::Result<Option<String>> {
        let mut line = String::new();
        let bytes = self.input.read_line(&mut line)?;
        if bytes == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }
}

/// Empty input skips the amount (treated as zero); anything else must parse
/// as a positive decimal.
fn parse_amount_input(raw: &str) -> Result<Decimal, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(Decimal::ZERO);
    }
    match Decimal::from_str(trimmed) {
        Ok(amount) if amount > Decimal::ZERO => Ok(amount),
        Ok(_) => Err("amount must be greater than 0; enter a new value or press Enter to skip"
            .to_string()),
        Err(_) => {
            Err("invalid amount format; enter a number or press Enter to skip".to_string())
        }
    }
}

/// Case-insensitive match against the allowed list, returning the canonical
/// casing. Empty input skips the department.
fn canonical_department(raw: &str, allowed: &[String]) -> Result<String, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(String::new());
    }
    allowed
        .iter()
        .find(|department| department.eq_ignore_ascii_case(trimmed))
        .cloned()
        .ok_or_else(|| format!("department must be one of: {}", allowed.join("/")))
}

fn parse_yes_no(raw: &str, default: Option<bool>) -> Result<bool, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Ok(true),
        "n" | "no" => Ok(false),
        "" => default.ok_or_else(|| "please answer y or n".to_string()),
        _ => Err("please answer y for yes or n for no".to_string()),
    }
}

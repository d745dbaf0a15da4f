use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::approver::ApproverId;
use crate::domain::company::CompanyId;
use crate::domain::invoice::InvoiceQuery;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RuleId(pub i64);

impl std::fmt::Display for RuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Notification transport a rule routes its approval request through.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Slack,
    Email,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("unknown approval channel code `{0}` (expected 0=slack or 1=email)")]
pub struct UnknownChannelCode(pub i64);

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Slack => "slack",
            Self::Email => "email",
        }
    }

    /// Integer encoding used at the persistence boundary.
    pub fn code(&self) -> i64 {
        match self {
            Self::Slack => 0,
            Self::Email => 1,
        }
    }

    pub fn from_code(code: i64) -> Result<Self, UnknownChannelCode> {
        match code {
            0 => Ok(Self::Slack),
            1 => Ok(Self::Email),
            other => Err(UnknownChannelCode(other)),
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("invalid manager approval flag `{0}` (expected NULL, 0, or 1)")]
pub struct InvalidManagerFlag(pub i64);

/// Manager-approval constraint on a rule. `Any` is the wildcard; the other
/// two require the invoice's flag to agree. Kept three-valued internally so
/// "not required" never aliases "unspecified"; the nullable-integer form
/// exists only at the persistence boundary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManagerApproval {
    #[default]
    Any,
    Required,
    NotRequired,
}

impl ManagerApproval {
    pub fn matches(&self, manager_approval_required: bool) -> bool {
        match self {
            Self::Any => true,
            Self::Required => manager_approval_required,
            Self::NotRequired => !manager_approval_required,
        }
    }

    pub fn is_constrained(&self) -> bool {
        !matches!(self, Self::Any)
    }

    /// Nullable-integer column form (NULL = any, 1 = required, 0 = not required).
    pub fn to_column(&self) -> Option<i64> {
        match self {
            Self::Any => None,
            Self::Required => Some(1),
            Self::NotRequired => Some(0),
        }
    }

    pub fn from_column(value: Option<i64>) -> Result<Self, InvalidManagerFlag> {
        match value {
            None => Ok(Self::Any),
            Some(1) => Ok(Self::Required),
            Some(0) => Ok(Self::NotRequired),
            Some(other) => Err(InvalidManagerFlag(other)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RuleValidationError {
    #[error("amount range is inverted: min {min} exceeds max {max}")]
    AmountRangeInverted { min: Decimal, max: Decimal },
    #[error("amount bound {0} is negative")]
    NegativeAmountBound(Decimal),
    #[error("company id must be positive")]
    CompanyRequired,
    #[error("approver id must be positive")]
    ApproverRequired,
}

/// A conditional routing record: when its constraints hold for an invoice,
/// the named approver is notified through the designated channel. Absent
/// optional fields are wildcards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowRule {
    pub id: RuleId,
    pub company_id: CompanyId,
    /// Inclusive lower bound on the invoice amount.
    pub min_amount: Option<Decimal>,
    /// Exclusive upper bound on the invoice amount.
    pub max_amount: Option<Decimal>,
    /// Exact, case-sensitive department match.
    pub department: Option<String>,
    pub manager_approval: ManagerApproval,
    pub approver_id: ApproverId,
    pub channel: Channel,
}

impl WorkflowRule {
    /// Write-boundary checks. The resolver assumes every candidate it sees
    /// already passed them.
    pub fn validate(&self) -> Result<(), RuleValidationError> {
        for bound in [self.min_amount, self.max_amount].into_iter().flatten() {
            if bound < Decimal::ZERO {
                return Err(RuleValidationError::NegativeAmountBound(bound));
            }
        }
        if let (Some(min), Some(max)) = (self.min_amount, self.max_amount) {
            if min > max {
                return Err(RuleValidationError::AmountRangeInverted { min, max });
            }
        }
        if self.company_id.0 <= 0 {
            return Err(RuleValidationError::CompanyRequired);
        }
        if self.approver_id.0 <= 0 {
            return Err(RuleValidationError::ApproverRequired);
        }
        Ok(())
    }

    /// Whether every constraint on this rule holds for the query. Amount
    /// ranges are half-open: lower bound inclusive, upper bound exclusive,
    /// so adjacent ranges partition without overlap.
    pub fn matches(&self, query: &InvoiceQuery) -> bool {
        if let Some(min) = self.min_amount {
            if query.amount < min {
                return false;
            }
        }
        if let Some(max) = self.max_amount {
            if query.amount >= max {
                return false;
            }
        }
        if let Some(department) = &self.department {
            if department != &query.department {
                return false;
            }
        }
        self.manager_approval.matches(query.manager_approval_required)
    }

    /// Count of present optional constraints (0-4). A higher score marks a
    /// more targeted rule, the same way a longer prefix marks a more
    /// targeted route.
    pub fn specificity(&self) -> usize {
        usize::from(self.min_amount.is_some())
            + usize::from(self.max_amount.is_some())
            + usize::from(self.department.is_some())
            + usize::from(self.manager_approval.is_constrained())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{
        Channel, InvalidManagerFlag, ManagerApproval, RuleId, RuleValidationError,
        UnknownChannelCode, WorkflowRule,
    };
    use crate::domain::approver::ApproverId;
    use crate::domain::company::CompanyId;

    fn rule() -> WorkflowRule {
        WorkflowRule {
            id: RuleId(1),
            company_id: CompanyId(1),
            min_amount: Some(Decimal::new(5_000, 0)),
            max_amount: Some(Decimal::new(10_000, 0)),
            department: None,
            manager_approval: ManagerApproval::Any,
            approver_id: ApproverId(1),
            channel: Channel::Email,
        }
    }

    #[test]
    fn valid_rule_passes_validation() {
        assert_eq!(rule().validate(), Ok(()));
    }

    #[test]
    fn inverted_amount_range_is_rejected() {
        let mut rule = rule();
        rule.min_amount = Some(Decimal::new(10_000, 0));
        rule.max_amount = Some(Decimal::new(5_000, 0));

        assert_eq!(
            rule.validate(),
            Err(RuleValidationError::AmountRangeInverted {
                min: Decimal::new(10_000, 0),
                max: Decimal::new(5_000, 0),
            })
        );
    }

    #[test]
    fn negative_bound_is_rejected() {
        let mut rule = rule();
        rule.min_amount = Some(Decimal::new(-1, 0));

        assert_eq!(
            rule.validate(),
            Err(RuleValidationError::NegativeAmountBound(Decimal::new(-1, 0)))
        );
    }

    #[test]
    fn non_positive_ids_are_rejected() {
        let mut orphaned = rule();
        orphaned.company_id = CompanyId(0);
        assert_eq!(orphaned.validate(), Err(RuleValidationError::CompanyRequired));

        let mut unassigned = rule();
        unassigned.approver_id = ApproverId(-3);
        assert_eq!(unassigned.validate(), Err(RuleValidationError::ApproverRequired));
    }

    #[test]
    fn equal_bounds_are_valid() {
        let mut rule = rule();
        rule.min_amount = Some(Decimal::new(5_000, 0));
        rule.max_amount = Some(Decimal::new(5_000, 0));
        assert_eq!(rule.validate(), Ok(()));
    }

    #[test]
    fn channel_codes_round_trip() {
        assert_eq!(Channel::from_code(0), Ok(Channel::Slack));
        assert_eq!(Channel::from_code(1), Ok(Channel::Email));
        assert_eq!(Channel::Slack.code(), 0);
        assert_eq!(Channel::Email.code(), 1);
        assert_eq!(Channel::from_code(7), Err(UnknownChannelCode(7)));
    }

    #[test]
    fn manager_flag_round_trips_without_aliasing() {
        assert_eq!(ManagerApproval::from_column(None), Ok(ManagerApproval::Any));
        assert_eq!(ManagerApproval::from_column(Some(1)), Ok(ManagerApproval::Required));
        assert_eq!(ManagerApproval::from_column(Some(0)), Ok(ManagerApproval::NotRequired));
        assert_eq!(ManagerApproval::from_column(Some(2)), Err(InvalidManagerFlag(2)));

        assert_eq!(ManagerApproval::Any.to_column(), None);
        assert_eq!(ManagerApproval::Required.to_column(), Some(1));
        assert_eq!(ManagerApproval::NotRequired.to_column(), Some(0));
    }

    #[test]
    fn wildcard_manager_flag_matches_both_values() {
        assert!(ManagerApproval::Any.matches(true));
        assert!(ManagerApproval::Any.matches(false));
        assert!(ManagerApproval::Required.matches(true));
        assert!(!ManagerApproval::Required.matches(false));
        assert!(ManagerApproval::NotRequired.matches(false));
        assert!(!ManagerApproval::NotRequired.matches(true));
    }

    #[test]
    fn specificity_counts_present_constraints() {
        let mut rule = rule();
        assert_eq!(rule.specificity(), 2);

        rule.department = Some("Finance".to_string());
        rule.manager_approval = ManagerApproval::Required;
        assert_eq!(rule.specificity(), 4);

        rule.min_amount = None;
        rule.max_amount = None;
        rule.department = None;
        rule.manager_approval = ManagerApproval::Any;
        assert_eq!(rule.specificity(), 0);
    }
}

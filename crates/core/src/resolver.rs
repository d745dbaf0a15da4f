//! Most-specific-match selection over a company's workflow rules.
//!
//! Scoring runs in memory over a candidate set fetched by company id, so it
//! is unit-testable without storage and identical across backends.

use crate::domain::invoice::InvoiceQuery;
use crate::domain::rule::WorkflowRule;

/// Pick the single best rule for the query, or `None` when no predicate
/// holds.
///
/// Candidates from other companies are ignored, so a caller may hand over
/// an unfiltered set. Among matching rules the highest specificity score
/// wins; ties go to the lowest rule id, so the earliest-defined rule is
/// selected deterministically regardless of candidate order.
pub fn resolve<'a>(rules: &'a [WorkflowRule], query: &InvoiceQuery) -> Option<&'a WorkflowRule> {
    rules
        .iter()
        .filter(|rule| rule.company_id == query.company_id && rule.matches(query))
        .max_by(|left, right| {
            left.specificity()
                .cmp(&right.specificity())
                .then_with(|| right.id.cmp(&left.id))
        })
}

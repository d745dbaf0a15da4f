pub mod approver;
pub mod company;
pub mod invoice;
pub mod rule;

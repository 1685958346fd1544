pub mod approvals;
pub mod listings;
pub mod pricing;
pub mod runner;

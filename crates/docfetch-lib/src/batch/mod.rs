mod controller;
mod report;

pub use controller::{BatchController, BatchOptions};
pub use report::{BatchReport, ItemOutcome};

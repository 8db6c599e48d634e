mod args;
mod check;
mod params;
mod resolved_command;
mod run;

pub use args::{Args, Command, ConfigOverrides, parse_args};
pub use check::{CheckReport, run_check};
pub use params::{CheckParams, RunParams};
pub use resolved_command::{MAX_WAIT_SECS, ResolvedCommand, resolve_command, validate_config};
pub use run::run_batch;

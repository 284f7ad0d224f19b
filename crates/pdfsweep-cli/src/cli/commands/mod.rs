//! CLI command handlers. Each command is in its own file.

mod completions;
mod config;
mod run;
mod status;

pub use completions::{run_completions, run_man};
pub use config::run_config;
pub use run::run_sweep;
pub use status::run_status;

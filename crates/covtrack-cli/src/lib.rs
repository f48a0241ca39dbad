pub mod cli;
pub mod config;
pub mod session;

pub use cli::{build_cli_command, Cli, Commands, ExportView, FilterArgs};
pub use config::{load_config, CovtrackConfig};
pub use session::Session;

use std::process::ExitCode;

use wasteflow_core::config::{AppConfig, LoadOptions};

fn main() -> ExitCode {
    let config = AppConfig::load(LoadOptions::default()).ok();
    wasteflow_cli::init_logging(config.as_ref());
    wasteflow_cli::run()
}

use std::process::ExitCode;

use anyhow::Result;
use human_panic::setup_panic;
use log::{debug, error};

use cnh_validator::cli::{get_config_path, get_log_file, get_matches, get_verbosity, parse_command};
use cnh_validator::config::load_or_default;
use cnh_validator::logging::{init_logger, run_label_from_env};
use cnh_validator::runner::run;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    setup_panic!();

    let matches = get_matches()?;
    let command = parse_command(&matches)?;
    init_logger(
        get_verbosity(&matches),
        &get_log_file(&matches)?,
        &run_label_from_env(command.name()),
    )?;

    let config = load_or_default(get_config_path(&matches))?;
    debug!("Running {command:?}");

    let output = match run(&command, &config).await {
        Ok(output) => output,
        Err(e) => {
            error!("{e:#}");
            return Err(e);
        }
    };

    println!("{}", serde_json::to_string_pretty(&output.payload)?);

    if output.succeeded {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

use std::path::PathBuf;

use clap::{
    Arg, ArgAction, ArgMatches, Command, command, crate_authors, crate_description, crate_name,
    crate_version,
};

use crate::constants::{
    APPROVER_HELP, CANCEL_HELP, CLIENT_KEY_HELP, CONFIG_HELP, DEFAULT_CONFIG_PATH, FACE_A_HELP,
    FACE_B_HELP, IMAGE_HELP, LOCAL_LOGGING_HELP, LOG_FILE_DEFAULT, LOG_FILE_HELP, PROCESS_ID_HELP,
    RESUME_HELP, SESSION_URL_HELP, VALIDATION_INPUT_HELP, VERBOSE_HELP,
};
use crate::errors::{Result, generic_error, invalid_input_error};
use crate::host::ResumeUrls;
use crate::logging::LogLevel;
use crate::steps::InstructionStep;
use crate::utils::find_project_folder;

/// A step requested on the command line
#[derive(Debug, Clone, PartialEq)]
pub enum StepCommand {
    /// One of the instruction steps; `urls` bypasses the host engine
    Instruction {
        step: InstructionStep,
        urls: Option<ResumeUrls>,
        approver: Option<String>,
    },
    ExtractFront {
        client_key: Option<String>,
        image: String,
    },
    ExtractQrCode {
        client_key: Option<String>,
        image: String,
    },
    LivenessStart {
        client_key: Option<String>,
    },
    LivenessInstructions {
        session_url: String,
    },
    LivenessStatus {
        client_key: Option<String>,
        process_id: String,
    },
    FaceMatch {
        client_key: Option<String>,
        face_a: String,
        face_b: String,
    },
    Validate {
        input: PathBuf,
    },
}

impl StepCommand {
    /// Subcommand name of the step
    pub fn name(&self) -> &'static str {
        match self {
            StepCommand::Instruction { step, .. } => step.name(),
            StepCommand::ExtractFront { .. } => "extract-front",
            StepCommand::ExtractQrCode { .. } => "extract-qrcode",
            StepCommand::LivenessStart { .. } => "liveness-start",
            StepCommand::LivenessInstructions { .. } => "liveness-instructions",
            StepCommand::LivenessStatus { .. } => "liveness-status",
            StepCommand::FaceMatch { .. } => "face-match",
            StepCommand::Validate { .. } => "validate",
        }
    }
}

fn client_key_arg() -> Arg {
    Arg::new("client_key")
        .short('k')
        .long("client-key")
        .help(CLIENT_KEY_HELP)
}

fn instruction_command(step: InstructionStep, about: &'static str) -> Command {
    Command::new(step.name())
        .about(about)
        .arg(
            Arg::new("resume")
                .long("resume")
                .help(RESUME_HELP)
                .requires("cancel"),
        )
        .arg(
            Arg::new("cancel")
                .long("cancel")
                .help(CANCEL_HELP)
                .requires("resume"),
        )
        .arg(Arg::new("approver").long("approver").help(APPROVER_HELP))
}

fn image_command(name: &'static str, about: &'static str) -> Command {
    Command::new(name).about(about).arg(client_key_arg()).arg(
        Arg::new("image")
            .short('i')
            .long("image")
            .help(IMAGE_HELP)
            .required(true),
    )
}

/// Builds the command-line interface
///
/// Global arguments:
/// - `config`: Path to the configuration file
/// - `verbose`: Increase verbosity level
/// - `log_file` / `log_locally`: Where the log file goes
///
/// Every step is a subcommand.
pub fn build_command() -> Command {
    // define arg for reading from a specific config file
    let arg_config = Arg::new("config")
        .short('c')
        .long("config")
        .help(CONFIG_HELP)
        .default_value(DEFAULT_CONFIG_PATH)
        .global(true);

    // define arg for verbosity level
    let arg_verbose = Arg::new("verbose")
        .short('v')
        .long("verbose")
        .help(VERBOSE_HELP)
        .action(ArgAction::Count)
        .global(true);

    // define arg for log file
    let log_file = Arg::new("log_file")
        .short('l')
        .long("log-file")
        .help(LOG_FILE_HELP)
        .default_value(LOG_FILE_DEFAULT)
        .global(true);

    // define arg for local logging
    let log_locally = Arg::new("log_locally")
        .short('L')
        .long("log-locally")
        .help(LOCAL_LOGGING_HELP)
        .action(ArgAction::SetTrue)
        .global(true);

    command!()
        .author(crate_authors!())
        .about(crate_description!())
        .name(crate_name!())
        .version(crate_version!())
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(arg_config)
        .arg(log_file)
        .arg(log_locally)
        .arg(arg_verbose)
        .subcommand(instruction_command(
            InstructionStep::Welcome,
            "Introduce the validation flow",
        ))
        .subcommand(instruction_command(
            InstructionStep::FrontImage,
            "Explain how to photograph the front of the CNH",
        ))
        .subcommand(instruction_command(
            InstructionStep::BackQrCode,
            "Explain how to photograph the QR code on the back of the CNH",
        ))
        .subcommand(image_command(
            "extract-front",
            "Extract the printed data from the front of the CNH",
        ))
        .subcommand(image_command(
            "extract-qrcode",
            "Extract the data encoded in the QR code",
        ))
        .subcommand(
            Command::new("liveness-start")
                .about("Create a liveness session")
                .arg(client_key_arg()),
        )
        .subcommand(
            Command::new("liveness-instructions")
                .about("Show the operator how to complete the liveness session")
                .arg(
                    Arg::new("session_url")
                        .short('s')
                        .long("session-url")
                        .help(SESSION_URL_HELP)
                        .required(true),
                ),
        )
        .subcommand(
            Command::new("liveness-status")
                .about("Report the result of a liveness session")
                .arg(client_key_arg())
                .arg(
                    Arg::new("process_id")
                        .short('p')
                        .long("process-id")
                        .help(PROCESS_ID_HELP)
                        .required(true),
                ),
        )
        .subcommand(
            Command::new("face-match")
                .about("Compare the CNH portrait with the liveness frontal image")
                .arg(client_key_arg())
                .arg(
                    Arg::new("face_a")
                        .long("face-a")
                        .help(FACE_A_HELP)
                        .required(true),
                )
                .arg(
                    Arg::new("face_b")
                        .long("face-b")
                        .help(FACE_B_HELP)
                        .required(true),
                ),
        )
        .subcommand(
            Command::new("validate")
                .about("Cross-check the collected data and summarise the flow")
                .arg(
                    Arg::new("input")
                        .short('i')
                        .long("input")
                        .help(VALIDATION_INPUT_HELP)
                        .required(true),
                ),
        )
}

/// Sets up and returns command-line argument matches
///
/// # Errors
/// Returns an error if the command-line arguments cannot be parsed
pub fn get_matches() -> Result<ArgMatches> {
    Ok(build_command().get_matches())
}

/// Gets the verbosity level from the command-line arguments
///
/// Counts the occurrences of the "verbose" flag.
///
/// # Examples
/// ```
/// # use clap::ArgMatches;
/// # use cnh_validator::cli::get_verbosity;
/// # use cnh_validator::logging::LogLevel;
/// # fn example(matches: &ArgMatches) {
/// match get_verbosity(matches) {
///     LogLevel::Info => println!("Running with normal output"),
///     LogLevel::Debug => println!("Running with debug output"),
///     _ => {}
/// }
/// # }
/// ```
pub fn get_verbosity(matches: &ArgMatches) -> LogLevel {
    let verbose_count = matches.get_count("verbose");
    LogLevel::from_occurrences(verbose_count)
}

pub fn get_log_file(matches: &ArgMatches) -> Result<String> {
    let filename = matches
        .get_one::<String>("log_file")
        .cloned()
        .unwrap_or_else(|| LOG_FILE_DEFAULT.to_string());
    if matches.get_flag("log_locally") {
        Ok(filename)
    } else {
        let folder = find_project_folder()?;
        let path = folder.config_dir().join(filename);
        let path_str = path
            .as_path()
            .to_str()
            .ok_or_else(|| generic_error(&format!("Failed to convert path to string: {path:?}")))?;
        Ok(path_str.to_string())
    }
}

pub fn get_config_path(matches: &ArgMatches) -> PathBuf {
    matches
        .get_one::<String>("config")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

fn optional(matches: &ArgMatches, name: &str) -> Option<String> {
    matches.get_one::<String>(name).cloned()
}

fn required(matches: &ArgMatches, name: &str) -> Result<String> {
    optional(matches, name).ok_or_else(|| invalid_input_error(name, "argument is required"))
}

/// Turns the selected subcommand into a [`StepCommand`]
///
/// # Errors
/// Returns an error if no known subcommand was given
pub fn parse_command(matches: &ArgMatches) -> Result<StepCommand> {
    let (name, sub) = matches
        .subcommand()
        .ok_or_else(|| generic_error("No step given, see --help"))?;

    if let Ok(step) = name.parse::<InstructionStep>() {
        let urls = match (optional(sub, "resume"), optional(sub, "cancel")) {
            (Some(resume), Some(cancel)) => Some(ResumeUrls::new(&resume, &cancel)),
            _ => None,
        };
        return Ok(StepCommand::Instruction {
            step,
            urls,
            approver: optional(sub, "approver"),
        });
    }

    let command = match name {
        "extract-front" => StepCommand::ExtractFront {
            client_key: optional(sub, "client_key"),
            image: required(sub, "image")?,
        },
        "extract-qrcode" => StepCommand::ExtractQrCode {
            client_key: optional(sub, "client_key"),
            image: required(sub, "image")?,
        },
        "liveness-start" => StepCommand::LivenessStart {
            client_key: optional(sub, "client_key"),
        },
        "liveness-instructions" => StepCommand::LivenessInstructions {
            session_url: required(sub, "session_url")?,
        },
        "liveness-status" => StepCommand::LivenessStatus {
            client_key: optional(sub, "client_key"),
            process_id: required(sub, "process_id")?,
        },
        "face-match" => StepCommand::FaceMatch {
            client_key: optional(sub, "client_key"),
            face_a: required(sub, "face_a")?,
            face_b: required(sub, "face_b")?,
        },
        "validate" => StepCommand::Validate {
            input: PathBuf::from(required(sub, "input")?),
        },
        other => return Err(generic_error(&format!("Unknown step: {other}"))),
    };
    Ok(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> StepCommand {
        let matches = build_command().try_get_matches_from(args).unwrap();
        parse_command(&matches).unwrap()
    }

    #[test]
    fn test_instruction_with_urls() {
        let command = parse(&["cnhv", "welcome", "--resume", "R", "--cancel", "C"]);
        assert_eq!(
            command,
            StepCommand::Instruction {
                step: InstructionStep::Welcome,
                urls: Some(ResumeUrls::new("R", "C")),
                approver: None,
            }
        );
    }

    #[test]
    fn test_resume_requires_cancel() {
        let result = build_command().try_get_matches_from(["cnhv", "welcome", "--resume", "R"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_processing_commands() {
        assert_eq!(
            parse(&["cnhv", "extract-front", "-k", "key", "--image", "front.jpg"]),
            StepCommand::ExtractFront {
                client_key: Some("key".to_string()),
                image: "front.jpg".to_string(),
            }
        );
        assert_eq!(
            parse(&["cnhv", "liveness-status", "--process-id", "p-1"]),
            StepCommand::LivenessStatus {
                client_key: None,
                process_id: "p-1".to_string(),
            }
        );
    }

    #[test]
    fn test_liveness_instructions_command() {
        let command = parse(&["cnhv", "liveness-instructions", "-s", "https://live/s/1"]);
        assert_eq!(
            command,
            StepCommand::LivenessInstructions {
                session_url: "https://live/s/1".to_string(),
            }
        );
        assert_eq!(command.name(), "liveness-instructions");

        let result = build_command().try_get_matches_from(["cnhv", "liveness-instructions"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_command_names_match_subcommands() {
        let command = build_command();
        for step in [
            parse(&["cnhv", "qrcode-instructions"]),
            parse(&["cnhv", "face-match", "--face-a", "a", "--face-b", "b"]),
            parse(&["cnhv", "validate", "-i", "in.json"]),
        ] {
            assert!(command.find_subcommand(step.name()).is_some());
        }
    }

    #[test]
    fn test_global_arguments_after_subcommand() {
        let matches = build_command()
            .try_get_matches_from(["cnhv", "welcome", "-vv", "-c", "other.yaml"])
            .unwrap();
        assert_eq!(get_verbosity(&matches), LogLevel::Trace);
        assert_eq!(get_config_path(&matches), PathBuf::from("other.yaml"));
    }

    #[test]
    fn test_local_log_file() {
        let matches = build_command()
            .try_get_matches_from(["cnhv", "-L", "-l", "run.log", "welcome"])
            .unwrap();
        assert_eq!(get_log_file(&matches).unwrap(), "run.log");
    }

    #[test]
    fn test_missing_image_is_rejected() {
        let result = build_command().try_get_matches_from(["cnhv", "extract-qrcode"]);
        assert!(result.is_err());
    }
}

mod commands;
mod helpers;

use atmospec_core::domain::AtmospecError;
use clap::Parser;
use tracing_subscriber::EnvFilter;

pub fn run_from_env() -> i32 {
    init_tracing();
    let args: Vec<String> = std::env::args().skip(1).collect();

    match run(args) {
        Ok(code) => code,
        Err(error) => {
            let compute_error = error.as_atmospec_error();
            eprintln!("{}", compute_error.diagnostic_line());
            eprintln!("{}", compute_error.fatal_exit_line());
            compute_error.exit_code()
        }
    }
}

pub fn run<I, S>(args: I) -> Result<i32, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let full_args = std::iter::once("atmospec".to_string())
        .chain(args.into_iter().map(Into::into))
        .collect::<Vec<_>>();
    parse_and_dispatch(full_args)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn parse_and_dispatch(args: Vec<String>) -> Result<i32, CliError> {
    match Cli::try_parse_from(&args) {
        Ok(cli) => dispatch_parsed(cli.command),
        Err(err) => match err.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                print!("{}", err);
                Ok(0)
            }
            _ => Err(CliError::Usage(err.to_string())),
        },
    }
}

#[derive(Parser)]
#[command(
    name = "atmospec",
    version,
    about = "UV/vis absorption spectra and photolysis rate constants from conformer ensembles"
)]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(clap::Subcommand)]
enum CliCommand {
    /// Broaden the ensemble spectrum and export it as TSV
    Spectrum(commands::SpectrumArgs),
    /// Compute the photolysis rate constant against tabulated actinic flux
    Photolysis(commands::PhotolysisArgs),
    /// Print every excitation as an (energy, oscillator strength) table
    Transitions(commands::TransitionsArgs),
    /// Align a reference spectrum to the display energy unit
    Experimental(commands::ExperimentalArgs),
    /// Summarize conformer geometries (single structure or trajectory)
    Structures(commands::StructuresArgs),
}

fn dispatch_parsed(command: CliCommand) -> Result<i32, CliError> {
    match command {
        CliCommand::Spectrum(args) => commands::run_spectrum_command(args),
        CliCommand::Photolysis(args) => commands::run_photolysis_command(args),
        CliCommand::Transitions(args) => commands::run_transitions_command(args),
        CliCommand::Experimental(args) => commands::run_experimental_command(args),
        CliCommand::Structures(args) => commands::run_structures_command(args),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("{0}")]
    Compute(AtmospecError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CliError {
    fn as_atmospec_error(&self) -> AtmospecError {
        match self {
            Self::Usage(message) => {
                AtmospecError::input_validation("INPUT.CLI_USAGE", message.clone())
            }
            Self::Compute(error) => error.clone(),
            Self::Internal(error) => AtmospecError::io_system("IO.CLI", format!("{error:#}")),
        }
    }
}

impl From<AtmospecError> for CliError {
    fn from(error: AtmospecError) -> Self {
        Self::Compute(error)
    }
}

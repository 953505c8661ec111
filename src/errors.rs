//! Process exit codes.

use tracing::error;

/// Exit codes of the `dragen-qc` binary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExitCode {
    /// Indicates that invalid data was supplied to the given subcommand.
    InvalidInputData = 1,

    /// Indicates that metric files were found but none contributed a usable
    /// record.
    NoSamplesFound = 2,

    /// Indicates that no DRAGEN metric file was found at all.
    NoFilesFound = 3,
}

/// Logs the message as an error and exits the process with the given code.
pub fn exit<I>(message: I, code: ExitCode) -> !
where
    I: tracing::Value,
{
    error!(message);
    std::process::exit(code as i32);
}

use crate::environment::ChildEnvironment;
use anyhow::{bail, Context, Result};
use std::process::{Command, ExitStatus};
use tracing::debug;

/// Runs the command with inherited stdio and returns the exit code to leave with
pub fn run(command: &[String], environment: &ChildEnvironment) -> Result<i32> {
    let (program, args) = match command.split_first() {
        Some(split) => split,
        None => bail!("No command to run"),
    };

    let mut child = Command::new(program);
    child.args(args);
    environment.apply(&mut child);

    debug!("Running {} with {:?}", program, environment.names());

    let status = child
        .status()
        .with_context(|| format!("Unable to run {}", program))?;

    Ok(exit_code(status))
}

#[cfg(unix)]
fn exit_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;

    match (status.code(), status.signal()) {
        (Some(code), _) => code,
        (None, Some(signal)) => 128 + signal,
        (None, None) => 1,
    }
}

#[cfg(not(unix))]
fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(1)
}

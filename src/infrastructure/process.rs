//! One-shot external tool invocation

use std::process::Stdio;

use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

use crate::application::ports::CommandOutput;

/// Failure to run a tool at all (as opposed to the tool reporting failure)
#[derive(Debug, Clone, Error)]
pub enum ToolError {
    #[error("{program} not found")]
    NotFound { program: String },

    #[error("Failed to run {program}: {message}")]
    Io { program: String, message: String },
}

/// Build a command with a fixed locale, no stdin, and the child killed
/// when the handle is dropped
pub fn tool_command(program: &str, args: &[&str]) -> Command {
    let mut command = Command::new(program);
    command
        .args(args)
        .env("LC_ALL", "C")
        .stdin(Stdio::null())
        .kill_on_drop(true);
    command
}

/// Map a spawn error for `program`
pub fn spawn_error(program: &str, e: std::io::Error) -> ToolError {
    if e.kind() == std::io::ErrorKind::NotFound {
        ToolError::NotFound {
            program: program.to_string(),
        }
    } else {
        ToolError::Io {
            program: program.to_string(),
            message: e.to_string(),
        }
    }
}

/// Run `program` to completion and capture its output.
///
/// A nonzero exit is not an error here; callers inspect the exit code.
pub async fn run_tool(program: &str, args: &[&str]) -> Result<CommandOutput, ToolError> {
    debug!(program, ?args, "running tool");
    let output = tool_command(program, args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| spawn_error(program, e))?;

    Ok(CommandOutput {
        exit_code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

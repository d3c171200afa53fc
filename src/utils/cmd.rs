//! Captured subprocess execution.

use crate::error::{Result, VimpackError};
use std::path::Path;
use std::process::Command;

#[derive(Debug)]
pub struct CmdOutput {
    pub status_ok: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Run a command with captured output. Spawn failures (missing binary,
/// permission) map to `CommandFailed`; a non-zero exit is reported through
/// `status_ok` so callers decide whether it is fatal.
pub fn run(program: &str, args: &[&str], cwd: Option<&Path>) -> Result<CmdOutput> {
    let mut cmd = Command::new(program);
    cmd.args(args);
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }

    let output = cmd.output().map_err(|e| VimpackError::CommandFailed {
        command: format!("{} {}", program, args.join(" ")),
        reason: e.to_string(),
    })?;

    Ok(CmdOutput {
        status_ok: output.status.success(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// Run a command and fail on non-zero exit, returning stdout.
pub fn run_checked(program: &str, args: &[&str], cwd: Option<&Path>) -> Result<String> {
    let out = run(program, args, cwd)?;
    if !out.status_ok {
        return Err(VimpackError::CommandFailed {
            command: format!("{} {}", program, args.join(" ")),
            reason: first_line(&out.stderr).to_string(),
        });
    }
    Ok(out.stdout)
}

fn first_line(text: &str) -> &str {
    let trimmed = text.trim();
    trimmed.lines().next().unwrap_or(trimmed)
}

//! Runs the linter process and interprets how it exited.

use std::process::{Command, Stdio};

use crate::command::Invocation;
use crate::error::LintError;
use crate::output::{self, ToolResult};

/// Everything captured from one finished linter process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawOutput {
    pub success: bool,
    /// Exit code, `None` when the process was killed by a signal.
    pub code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

/// Executes an [`Invocation`] to completion.
///
/// The lint worker is generic over this so tests can substitute a
/// scripted linter.
pub trait LintRunner {
    fn run(&self, invocation: &Invocation) -> Result<RawOutput, LintError>;
}

/// Spawns the real linter executable and waits for it. No timeout.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl LintRunner for ProcessRunner {
    fn run(&self, invocation: &Invocation) -> Result<RawOutput, LintError> {
        let output = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.cwd)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| LintError::Spawn {
                program: invocation.program.clone(),
                source,
            })?;
        Ok(RawOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

/// Decide what a finished run produced.
///
/// Linters exit non-zero whenever they find issues, so the exit status only
/// matters when stdout is empty: then a failure status means the tool died
/// before producing a result (fatal config errors go to stderr only).
pub fn interpret(program: &str, raw: &RawOutput) -> Result<ToolResult, LintError> {
    if raw.stdout.is_empty() {
        if raw.success {
            return Ok(ToolResult::default());
        }
        return Err(LintError::exit(program, raw.code, &raw.stderr));
    }
    output::parse_output(&raw.stdout)
}

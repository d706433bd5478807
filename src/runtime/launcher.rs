//! External process launching
//!
//! Everything that has to run inside or alongside a container (the `lxc`
//! CLI, editors, interactive shells) goes through a [`ProcessLauncher`]. The
//! child inherits this session's stdin, stdout and stderr and is always
//! waited for.

use std::fmt;
use std::path::Path;
use std::process::{Command, Stdio};

use tracing::debug;

use crate::error::{NookError, Result};

/// A program and its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Whether `needle` appears as a whole argument
    pub fn has_arg(&self, needle: &str) -> bool {
        self.args.iter().any(|a| a == needle)
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(|c: char| c.is_whitespace() || c == '\'' || c == '"') {
                write!(f, " '{}'", arg.replace('\'', r"'\''"))?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// How a child process ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitOutcome {
    /// Exit code, `None` when killed by a signal
    pub code: Option<i32>,
}

impl ExitOutcome {
    pub fn success() -> Self {
        Self { code: Some(0) }
    }

    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }
}

impl fmt::Display for ExitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "exit code {}", code),
            None => write!(f, "a signal"),
        }
    }
}

pub trait ProcessLauncher {
    /// Spawn `command` and wait for it to exit
    fn run(&self, command: &CommandSpec) -> Result<ExitOutcome>;

    /// Like [`run`](Self::run), but a non-zero exit is an error
    fn run_checked(&self, command: &CommandSpec) -> Result<()> {
        let outcome = self.run(command)?;
        if outcome.is_success() {
            Ok(())
        } else {
            Err(NookError::ProcessFailed {
                command: command.to_string(),
                status: outcome.to_string(),
            })
        }
    }
}

/// Launches real processes with inherited stdio
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLauncher;

impl ProcessLauncher for SystemLauncher {
    fn run(&self, command: &CommandSpec) -> Result<ExitOutcome> {
        debug!(command = %command, "spawning");
        let status = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|source| NookError::Launch {
                program: command.program.clone(),
                source,
            })?;

        Ok(ExitOutcome {
            code: status.code(),
        })
    }
}

/// Build the command that opens `file` in `editor`.
///
/// `editor` may carry its own arguments, e.g. `code --wait`.
pub fn editor_command(editor: &str, file: &Path) -> CommandSpec {
    let mut words = editor.split_whitespace();
    let program = words.next().unwrap_or("vi");
    CommandSpec::new(program)
        .args(words)
        .arg(file.to_string_lossy().into_owned())
}

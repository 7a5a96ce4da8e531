use log::debug;
use std::borrow::Cow;
use std::io;
use std::process::{Command, Output, Stdio};

/// Join command tokens into one shell-escaped command line
pub fn escape_command<S: AsRef<str>>(tokens: &[S]) -> String {
    tokens
        .iter()
        .map(|t| shell_escape::escape(Cow::Borrowed(t.as_ref())))
        .collect::<Vec<_>>()
        .join(" ")
}

fn shell(command_line: &str) -> Command {
    let (program, flag) = if cfg!(windows) { ("cmd", "/C") } else { ("sh", "-c") };
    let mut cmd = Command::new(program);
    cmd.args([flag, command_line]);
    cmd
}

/// Run a command line through the platform shell, capturing its output
pub fn run_captured(command_line: &str) -> io::Result<Output> {
    debug!("shell: running (captured) `{}`", command_line);
    shell(command_line)
        .stdin(Stdio::null())
        .output()
}

/// Run a command line through the platform shell with inherited stdio.
/// Returns an error when the command cannot be spawned or exits non-zero.
pub fn run_inherited(command_line: &str) -> io::Result<()> {
    debug!("shell: running (inherited) `{}`", command_line);
    let status = shell(command_line).status()?;
    if status.success() {
        Ok(())
    } else {
        Err(io::Error::other(format!("Command failed: {} ({})", command_line, status)))
    }
}

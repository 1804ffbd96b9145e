//! Result types for console operations.

use std::fmt;
use std::time::Duration;

/// Output captured for one command.
///
/// Success here only means the command was delivered and output was
/// captured; nothing is validated against device-side semantics.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// The command that was sent.
    pub command: String,

    /// Output with the echo and trailing prompt removed.
    pub output: String,

    /// Everything captured, after terminal-escape stripping.
    pub raw: String,

    /// Wait used to capture the output.
    pub wait: Duration,

    /// Time from send to end of capture.
    pub elapsed: Duration,
}

impl CommandResult {
    pub fn new(
        command: impl Into<String>,
        output: impl Into<String>,
        raw: impl Into<String>,
        wait: Duration,
        elapsed: Duration,
    ) -> Self {
        Self {
            command: command.into(),
            output: output.into(),
            raw: raw.into(),
            wait,
            elapsed,
        }
    }

    /// Get the output lines as an iterator.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.output.lines()
    }

    /// Check if the output contains a substring.
    pub fn contains(&self, pattern: &str) -> bool {
        self.output.contains(pattern)
    }
}

impl fmt::Display for CommandResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.output)
    }
}

/// Ordered record of a configuration run.
///
/// For IOS this includes the mode entry and exit commands around the
/// supplied lines.
#[derive(Debug, Clone, Default)]
pub struct ConfigTranscript {
    pub results: Vec<CommandResult>,
}

impl ConfigTranscript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, result: CommandResult) {
        self.results.push(result);
    }

    /// Commands in the order they were sent.
    pub fn commands(&self) -> impl Iterator<Item = &str> {
        self.results.iter().map(|r| r.command.as_str())
    }

    /// Captured output of every command, concatenated in order.
    pub fn output(&self) -> String {
        self.results
            .iter()
            .map(|r| r.output.as_str())
            .filter(|o| !o.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

impl fmt::Display for ConfigTranscript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.output())
    }
}

//! Prompt patterns and output normalization.

use regex::Regex;

/// A prompt pattern with substrings that veto a match.
///
/// `#` ends both the privileged and the configuration prompt on IOS, so the
/// privileged pattern carries `(config` as a negative.
#[derive(Debug, Clone)]
pub struct PromptPattern {
    pattern: Regex,
    not_contains: Vec<&'static str>,
}

impl PromptPattern {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            not_contains: Vec::new(),
        })
    }

    pub fn with_not_contains(mut self, needle: &'static str) -> Self {
        self.not_contains.push(needle);
        self
    }

    /// Check a single prompt line.
    pub fn matches(&self, line: &str) -> bool {
        if self.not_contains.iter().any(|nc| line.contains(nc)) {
            return false;
        }
        self.pattern.is_match(line)
    }
}

/// Last non-empty line of a capture, trimmed of trailing whitespace.
///
/// On a console this is where the prompt sits once a command finished.
pub fn last_line(text: &str) -> &str {
    text.lines()
        .rev()
        .map(str::trim_end)
        .find(|line| !line.is_empty())
        .unwrap_or("")
}

/// Strip the command echo and the trailing prompt from captured text.
///
/// The echo is the first line containing the command (consoles may prefix it
/// with the prompt); the prompt is the last line if `is_prompt` accepts it.
pub fn normalize_output(raw: &str, command: &str, is_prompt: impl Fn(&str) -> bool) -> String {
    let mut lines: Vec<&str> = raw.lines().collect();

    // Leading blank lines from the echoed terminator
    while lines.first().is_some_and(|line| line.trim().is_empty()) {
        lines.remove(0);
    }

    let command = command.trim();
    if !command.is_empty() && lines.first().is_some_and(|line| line.trim_end().ends_with(command)) {
        lines.remove(0);
    }

    while lines.last().is_some_and(|line| line.trim().is_empty()) {
        lines.pop();
    }
    if lines.last().is_some_and(|line| is_prompt(line.trim_end())) {
        lines.pop();
    }

    lines.join("\n").trim_end().to_string()
}

//! IOS CLI modes and prompt detection.
//!
//! Prompt patterns are adapted from scrapli's IOS-XE driver.
//!
//! # Prompt Examples
//!
//! ```text
//! router>                    # user exec
//! router#                    # privileged exec
//! router(config)#            # global configuration
//! router(config-if)#         # configuration sub-mode (interface)
//! ```
//!
//! # Mode Graph
//!
//! ```text
//! ┌───────────┐  enable   ┌────────────────┐  configure terminal  ┌────────┐
//! │ user exec ├───────────► privileged exec├──────────────────────► config │
//! │     >     │           │       #        │        end           │(conf*)#│
//! └───────────┘           └────────────────┘◄─────────────────────┴────────┘
//! ```

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::channel::PromptPattern;

/// Navigation context of the IOS modal CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CliMode {
    UserExec,
    PrivilegedExec,
    Config,
}

impl CliMode {
    pub fn name(self) -> &'static str {
        match self {
            CliMode::UserExec => "user_exec",
            CliMode::PrivilegedExec => "privileged_exec",
            CliMode::Config => "configuration",
        }
    }

    /// Command that moves one step from `self` towards privileged exec.
    ///
    /// Returns `None` when already there.
    pub fn step_to_privileged(self) -> Option<&'static str> {
        match self {
            CliMode::UserExec => Some("enable"),
            CliMode::PrivilegedExec => None,
            CliMode::Config => Some("end"),
        }
    }
}

impl fmt::Display for CliMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

struct IosPrompts {
    user_exec: PromptPattern,
    privileged_exec: PromptPattern,
    config: PromptPattern,
    password: Regex,
}

static IOS_PROMPTS: LazyLock<IosPrompts> = LazyLock::new(|| IosPrompts {
    user_exec: PromptPattern::new(r"^[\w.\-@()/: ]{1,63}>\s?$").expect("user exec prompt"),
    privileged_exec: PromptPattern::new(r"^[\w.\-@/: ]{1,63}#\s?$")
        .expect("privileged exec prompt")
        .with_not_contains("(config"),
    config: PromptPattern::new(r"^[\w.\-@/: ]{1,63}\(config[\w.\-@/:+]{0,63}\)#\s?$")
        .expect("config prompt"),
    password: Regex::new(r"(?i)^password:\s?$").expect("password prompt"),
});

/// Determine the mode from a prompt line.
pub fn detect_mode(line: &str) -> Option<CliMode> {
    let prompts = &*IOS_PROMPTS;
    if prompts.config.matches(line) {
        Some(CliMode::Config)
    } else if prompts.privileged_exec.matches(line) {
        Some(CliMode::PrivilegedExec)
    } else if prompts.user_exec.matches(line) {
        Some(CliMode::UserExec)
    } else {
        None
    }
}

/// Whether a line is an IOS prompt in any mode.
pub fn is_ios_prompt(line: &str) -> bool {
    detect_mode(line).is_some()
}

/// Whether a line is the `Password:` prompt `enable` shows.
pub fn is_password_prompt(line: &str) -> bool {
    IOS_PROMPTS.password.is_match(line)
}

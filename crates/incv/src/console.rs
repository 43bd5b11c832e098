//! User-facing output.
//!
//! Logs go through `tracing`; this is what the user is meant to read.
//! `info:` lines and the version change go to stdout, `fatal:` to stderr.

use std::fmt::Display;

use owo_colors::{OwoColorize, Stream};

/// Terminal output honoring `--quiet`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Console {
    quiet: bool,
}

impl Console {
    /// Create a console. A quiet console drops `info:` lines.
    pub const fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    /// Print an `info:` line to stdout unless quiet.
    pub fn info(&self, message: impl Display) {
        if self.quiet {
            return;
        }
        println!(
            "{} {message}",
            "info:".if_supports_color(Stream::Stdout, |text| text.blue())
        );
    }

    /// Print `previous -> next` to stdout. Never suppressed.
    pub fn version_change(&self, previous: impl Display, next: impl Display) {
        println!("{previous} -> {next}");
    }

    /// Print a `fatal:` line with the full error chain to stderr.
    pub fn fatal(&self, err: &anyhow::Error) {
        eprintln!(
            "{} {err:#}",
            "fatal:".if_supports_color(Stream::Stderr, |text| text.red())
        );
    }
}

//! Library interface for the `incv` CLI.
//!
//! This crate exposes the CLI's argument parser and the bump flow as a
//! library, primarily for testing. The actual entry point is in `main.rs`.
//!
//! # Structure
//!
//! - [`Cli`] - The root argument parser (clap derive)
//! - [`bump`] - The bump flow: manifest in, decision, manifest out
//! - [`console`] - `info:` / `fatal:` output

pub mod bump;

pub mod console;

use camino::Utf8PathBuf;
use clap::{CommandFactory, Parser};
use incv_core::{BumpConfig, Config, EmptyToken};
use std::path::PathBuf;

/// Color output preference.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Detect terminal capabilities automatically.
    #[default]
    Auto,
    /// Always emit colors.
    Always,
    /// Never emit colors.
    Never,
}

impl ColorChoice {
    /// Configure global color output based on this choice.
    ///
    /// Call this once at startup to set the color mode.
    pub fn apply(self) {
        match self {
            Self::Auto => {} // owo-colors auto-detects by default
            Self::Always => owo_colors::set_override(true),
            Self::Never => owo_colors::set_override(false),
        }
    }
}

/// Handling of an empty prerelease/build token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum EmptyTokenChoice {
    /// Leave the token out and start the counter at 0.
    Omit,
    /// Fail the bump.
    Reject,
}

impl From<EmptyTokenChoice> for EmptyToken {
    fn from(choice: EmptyTokenChoice) -> Self {
        match choice {
            EmptyTokenChoice::Omit => Self::Omit,
            EmptyTokenChoice::Reject => Self::Reject,
        }
    }
}

const AFTER_HELP: &str = "\
Boolean options can be inverted with --no-, e.g. --no-patch.";

const ENV_HELP: &str = "\
Boolean options can be inverted with --no-, e.g. --no-patch.

ENVIRONMENT VARIABLES:
    RUST_LOG           Log filter (e.g., debug, incv=trace)
    INCV_LOG_PATH      Explicit log file path
    INCV_LOG_DIR       Log directory
";

/// Command-line interface definition for incv.
#[derive(Parser, Debug)]
#[command(name = "incv")]
#[command(
    about = "Increment the semantic version in package.json",
    long_about = "Increment the semantic version in package.json.\n\n\
        The bump is chosen from flags and from tags found in the commit message. \
        At most one of major, minor, and patch is applied (highest wins); \
        prerelease and build are applied on top."
)]
#[command(version)]
#[command(after_help = AFTER_HELP, after_long_help = ENV_HELP)]
pub struct Cli {
    /// Commit message to search for bump tags
    #[arg(short = 'c', long, value_name = "MESSAGE", default_value_t, hide_default_value = true)]
    pub commit_message: String,

    /// Tag that triggers a major bump [default: [major]]
    #[arg(long, value_name = "TAG")]
    pub major_tag: Option<String>,

    /// Tag that triggers a minor bump [default: [minor]]
    #[arg(long, value_name = "TAG")]
    pub minor_tag: Option<String>,

    /// Tag that triggers a patch bump [default: [patch]]
    #[arg(long, value_name = "TAG")]
    pub patch_tag: Option<String>,

    /// Tag that triggers a prerelease bump [default: [prerelease]]
    #[arg(long, value_name = "TAG")]
    pub prerelease_tag: Option<String>,

    /// Tag that triggers a build bump [default: [build]]
    #[arg(long, value_name = "TAG")]
    pub build_tag: Option<String>,

    /// Leading prerelease identifier [default: prerelease]
    #[arg(long, value_name = "TOKEN")]
    pub prerelease_token: Option<String>,

    /// Leading build identifier [default: empty]
    #[arg(long, value_name = "TOKEN")]
    pub build_token: Option<String>,

    /// Bump the major version
    #[arg(long, overrides_with = "no_major")]
    pub major: bool,

    #[arg(long, hide = true, overrides_with = "major")]
    #[doc(hidden)]
    pub no_major: bool,

    /// Bump the minor version
    #[arg(long, overrides_with = "no_minor")]
    pub minor: bool,

    #[arg(long, hide = true, overrides_with = "minor")]
    #[doc(hidden)]
    pub no_minor: bool,

    /// Bump the patch version (on unless --no-patch)
    #[arg(long, overrides_with = "no_patch")]
    pub patch: bool,

    #[arg(long, hide = true, overrides_with = "patch")]
    #[doc(hidden)]
    pub no_patch: bool,

    /// Bump the prerelease identifiers
    #[arg(long, overrides_with = "no_prerelease")]
    pub prerelease: bool,

    #[arg(long, hide = true, overrides_with = "prerelease")]
    #[doc(hidden)]
    pub no_prerelease: bool,

    /// Bump the build identifiers
    #[arg(long, overrides_with = "no_build")]
    pub build: bool,

    #[arg(long, hide = true, overrides_with = "build")]
    #[doc(hidden)]
    pub no_build: bool,

    /// Do not write the new version to disk
    #[arg(long, visible_alias = "dry-run", overrides_with = "no_dry")]
    pub dry: bool,

    #[arg(long, hide = true, overrides_with = "dry")]
    #[doc(hidden)]
    pub no_dry: bool,

    /// Only print the version change and errors
    #[arg(short, long)]
    pub quiet: bool,

    /// More log detail (repeatable; e.g. -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to configuration file (overrides discovery)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Run as if started in DIR
    #[arg(short = 'C', long, value_name = "DIR")]
    pub chdir: Option<PathBuf>,

    /// Manifest holding the version [default: package.json]
    #[arg(long, value_name = "FILE")]
    pub manifest: Option<Utf8PathBuf>,

    /// How to treat an empty prerelease/build token [default: omit]
    #[arg(long, value_enum, value_name = "POLICY")]
    pub empty_token: Option<EmptyTokenChoice>,

    /// Colorize output
    #[arg(long, value_enum, default_value_t)]
    pub color: ColorChoice,
}

/// Resolve a `--flag` / `--no-flag` pair. Clap keeps only the last of the
/// two, so at most one is set.
const fn flag(on: bool, off: bool, default: bool) -> bool {
    if on {
        true
    } else if off {
        false
    } else {
        default
    }
}

impl Cli {
    /// Build the bump inputs. Flags win over `config`, which wins over
    /// built-in defaults.
    pub fn bump_config(&self, config: &Config) -> BumpConfig {
        let defaults = BumpConfig::default();

        let mut tags = config.tags.clone();
        let overrides = [
            (&self.major_tag, &mut tags.major),
            (&self.minor_tag, &mut tags.minor),
            (&self.patch_tag, &mut tags.patch),
            (&self.prerelease_tag, &mut tags.prerelease),
            (&self.build_tag, &mut tags.build),
        ];
        for (value, slot) in overrides {
            if let Some(value) = value {
                slot.clone_from(value);
            }
        }

        let mut tokens = config.tokens.clone();
        if let Some(ref token) = self.prerelease_token {
            tokens.prerelease.clone_from(token);
        }
        if let Some(ref token) = self.build_token {
            tokens.build.clone_from(token);
        }

        BumpConfig {
            major: flag(self.major, self.no_major, defaults.major),
            minor: flag(self.minor, self.no_minor, defaults.minor),
            patch: flag(self.patch, self.no_patch, defaults.patch),
            prerelease: flag(self.prerelease, self.no_prerelease, defaults.prerelease),
            build: flag(self.build, self.no_build, defaults.build),
            tags,
            tokens,
            commit_message: self.commit_message.clone(),
            empty_token: self
                .empty_token
                .map_or(config.empty_token, EmptyToken::from),
        }
    }

    /// Manifest path: `--manifest`, else the configured one.
    pub fn manifest_path(&self, config: &Config) -> Utf8PathBuf {
        self.manifest
            .clone()
            .unwrap_or_else(|| config.manifest.clone())
    }

    /// Whether to skip writing the manifest.
    pub const fn dry_run(&self) -> bool {
        flag(self.dry, self.no_dry, false)
    }
}

/// Returns the clap command, e.g. for help rendering checks.
pub fn command() -> clap::Command {
    Cli::command()
}

//! Bump flow: thin CLI layer over `incv_core::bump`.

use anyhow::Context;
use tracing::{debug, instrument};

use incv_core::{BumpOutcome, Config, Manifest, decide_bump};

use crate::Cli;
use crate::console::Console;

/// Read the manifest, decide the bump, report it, and write it back unless
/// this is a dry run.
///
/// # Errors
///
/// Fails when the manifest cannot be read, parsed, or written, when its
/// `version` is not a semantic version, or when an increment fails.
#[instrument(name = "cmd_bump", skip_all, fields(manifest = tracing::field::Empty, dry_run = cli.dry_run()))]
pub fn cmd_bump(cli: &Cli, config: &Config, console: &Console) -> anyhow::Result<BumpOutcome> {
    let path = cli.manifest_path(config);
    tracing::Span::current().record("manifest", path.as_str());

    let mut manifest = Manifest::load(&path)?;
    let current = manifest.current_version()?;

    let bump_config = cli.bump_config(config);
    debug!(?bump_config, "resolved bump configuration");

    let outcome = decide_bump(&bump_config, &current)
        .with_context(|| format!("Could not bump version {current}."))?;

    for decision in &outcome.decisions {
        console.info(format_args!("Performing a {decision} version bump."));
    }
    console.version_change(&outcome.previous, &outcome.next);

    if cli.dry_run() {
        console.info("Version change was not written to disk because the --dry flag was passed.");
        return Ok(outcome);
    }

    manifest.set_version(&outcome.next)?;
    manifest.save()?;
    console.info("Version change was written to disk.");

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::fs;
    use tempfile::TempDir;

    fn run(tmp: &TempDir, contents: &str, args: &[&str]) -> anyhow::Result<BumpOutcome> {
        let path = tmp.path().join("package.json");
        fs::write(&path, contents).unwrap();
        let manifest = path.to_str().unwrap();

        let argv = ["incv", "-q", "--manifest", manifest]
            .into_iter()
            .chain(args.iter().copied());
        let cli = Cli::try_parse_from(argv).unwrap();
        cmd_bump(&cli, &Config::default(), &Console::new(true))
    }

    #[test]
    fn writes_bumped_version() {
        let tmp = TempDir::new().unwrap();
        let outcome = run(&tmp, r#"{"version":"2.4.1"}"#, &[]).unwrap();
        assert_eq!(outcome.next.to_string(), "2.4.2");

        let written = fs::read_to_string(tmp.path().join("package.json")).unwrap();
        assert_eq!(written, "{\n  \"version\": \"2.4.2\"\n}");
    }

    #[test]
    fn dry_run_leaves_manifest_alone() {
        let tmp = TempDir::new().unwrap();
        let original = r#"{"version":"2.4.1"}"#;
        let outcome = run(&tmp, original, &["--dry", "-c", "[major]"]).unwrap();
        assert_eq!(outcome.next.to_string(), "3.0.0");

        let written = fs::read_to_string(tmp.path().join("package.json")).unwrap();
        assert_eq!(written, original);
    }

    #[test]
    fn bad_version_is_error() {
        let tmp = TempDir::new().unwrap();
        let err = run(&tmp, r#"{"version":"1.2"}"#, &[]).unwrap_err();
        assert!(err.to_string().starts_with("Could not parse version in"));
    }

    #[test]
    fn rejected_empty_token_is_error() {
        let tmp = TempDir::new().unwrap();
        let err = run(
            &tmp,
            r#"{"version":"1.2.3"}"#,
            &["--build", "--empty-token", "reject"],
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Could not bump version 1.2.3.");
    }
}

//! Core library for incv.
//!
//! Decides how to advance a semantic version from explicit flags and
//! commit-message tags, and reads/writes the version in a JSON manifest.
//! The `incv` CLI is a thin layer over this crate.
//!
//! # Modules
//!
//! - [`version`] - Semantic version parsing, rendering, and increments
//! - [`bump`] - The bump decision engine
//! - [`manifest`] - `package.json` version access
//! - [`config`] - Configuration loading and management
//! - [`error`] - Configuration error types
//!
//! # Quick Start
//!
//! ```
//! use incv_core::{BumpConfig, decide_bump, version};
//!
//! let current = version::parse("1.2.3").unwrap();
//! let config = BumpConfig {
//!     commit_message: "feat: new thing [minor]".into(),
//!     ..BumpConfig::default()
//! };
//! let outcome = decide_bump(&config, &current).unwrap();
//! assert_eq!(outcome.next.to_string(), "1.3.0");
//! ```
#![deny(unsafe_code)]

pub mod bump;

pub mod config;

pub mod error;

pub mod manifest;

pub mod version;

pub use bump::{BumpConfig, BumpOutcome, BumpTags, BumpTokens, decide_bump};

pub use config::{Config, ConfigLoader, LogLevel};

pub use error::{ConfigError, ConfigResult};

pub use manifest::{Manifest, ManifestError, ManifestResult};

pub use version::{Component, EmptyToken, SemanticVersion, VersionError, VersionResult};

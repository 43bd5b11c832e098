//! Semantic version model.
//!
//! Parsing is strict and delegates grammar validation to the [`semver`]
//! crate; the result is lifted into [`SemanticVersion`], which keeps the
//! prerelease and build identifiers as plain sequences so they can be
//! incremented in place.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Errors from version operations.
#[derive(Error, Debug)]
pub enum VersionError {
    /// The input does not follow the semantic-versioning grammar.
    #[error("invalid semver `{input}`: {source}")]
    Parse {
        /// The rejected input.
        input: String,
        /// Grammar violation reported by the parser.
        #[source]
        source: semver::Error,
    },

    /// A numeric identifier cannot be incremented any further.
    #[error("{component} version cannot be incremented past {}", u64::MAX)]
    Overflow {
        /// The component whose increment overflowed.
        component: Component,
    },

    /// A prerelease or build token is not a valid identifier sequence.
    #[error("invalid {component} token `{token}`: {reason}")]
    InvalidToken {
        /// The component the token was meant for.
        component: Component,
        /// The rejected token.
        token: String,
        /// Why the token was rejected.
        reason: String,
    },
}

/// Result alias for version operations.
pub type VersionResult<T> = Result<T, VersionError>;

/// A version component that can be incremented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Component {
    /// Major release (X.0.0).
    Major,
    /// Minor release (x.Y.0).
    Minor,
    /// Patch release (x.y.Z).
    Patch,
    /// Prerelease identifiers (x.y.z-PRE).
    Prerelease,
    /// Build metadata (x.y.z+BUILD).
    Build,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Major => write!(f, "major"),
            Self::Minor => write!(f, "minor"),
            Self::Patch => write!(f, "patch"),
            Self::Prerelease => write!(f, "prerelease"),
            Self::Build => write!(f, "build"),
        }
    }
}

/// What to do when a prerelease or build token is the empty string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptyToken {
    /// Drop the token segment: `1.2.3` becomes `1.2.3-0`.
    #[default]
    Omit,
    /// Refuse the increment with [`VersionError::InvalidToken`].
    Reject,
}

/// A single dot-separated prerelease or build identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identifier {
    /// Digits only, no leading zero, fits in a `u64`.
    Numeric(u64),
    /// Anything else from the `[0-9A-Za-z-]` alphabet.
    AlphaNumeric(String),
}

impl Identifier {
    /// Classify a raw identifier.
    ///
    /// Digit strings with a leading zero (legal in build metadata) stay
    /// alphanumeric so they render back unchanged.
    pub fn new(raw: &str) -> Self {
        let canonical_digits = !raw.is_empty()
            && raw.bytes().all(|b| b.is_ascii_digit())
            && (raw == "0" || !raw.starts_with('0'));
        if canonical_digits && let Ok(n) = raw.parse() {
            return Self::Numeric(n);
        }
        Self::AlphaNumeric(raw.to_owned())
    }
}

impl Identifier {
    /// Whether a prerelease or build bump may treat this as its counter.
    ///
    /// In prerelease, a digit run too large for `u64` still counts: it is
    /// numeric by the grammar and can only fail to increment.
    fn is_counter(&self, component: Component) -> bool {
        match self {
            Self::Numeric(_) => true,
            Self::AlphaNumeric(raw) => {
                component == Component::Prerelease
                    && !raw.is_empty()
                    && raw.bytes().all(|b| b.is_ascii_digit())
                    && !raw.starts_with('0')
            }
        }
    }
}

impl From<u64> for Identifier {
    fn from(n: u64) -> Self {
        Self::Numeric(n)
    }
}

impl From<&str> for Identifier {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(n) => write!(f, "{n}"),
            Self::AlphaNumeric(s) => f.write_str(s),
        }
    }
}

/// A parsed semantic version: `MAJOR.MINOR.PATCH[-PRERELEASE][+BUILD]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SemanticVersion {
    /// Major version number.
    pub major: u64,
    /// Minor version number.
    pub minor: u64,
    /// Patch version number.
    pub patch: u64,
    /// Prerelease identifiers, empty for a release version.
    pub prerelease: Vec<Identifier>,
    /// Build metadata identifiers.
    pub build: Vec<Identifier>,
}

/// Parse a version string. No `v` prefix or missing components are accepted.
pub fn parse(text: &str) -> VersionResult<SemanticVersion> {
    let parsed = semver::Version::parse(text).map_err(|source| VersionError::Parse {
        input: text.to_owned(),
        source,
    })?;

    Ok(SemanticVersion {
        major: parsed.major,
        minor: parsed.minor,
        patch: parsed.patch,
        prerelease: identifiers(parsed.pre.as_str()),
        build: identifiers(parsed.build.as_str()),
    })
}

fn identifiers(dotted: &str) -> Vec<Identifier> {
    if dotted.is_empty() {
        return Vec::new();
    }
    dotted.split('.').map(Identifier::new).collect()
}

impl SemanticVersion {
    /// Create a release version with no prerelease or build identifiers.
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            prerelease: Vec::new(),
            build: Vec::new(),
        }
    }

    /// Increment one component in place.
    ///
    /// `token` names the leading identifier(s) for prerelease and build
    /// increments and is ignored for the numeric core components.
    ///
    /// - **major / minor / patch**: bump the number, zero the lower core
    ///   numbers, clear prerelease and build.
    /// - **prerelease**: start `[token, 0]` unless the current prerelease
    ///   already begins with `token`, in which case the last numeric
    ///   identifier after it is bumped (or `0` is appended). Clears build.
    /// - **build**: same rule applied to the build identifiers; prerelease
    ///   is left alone.
    pub fn increment(
        &mut self,
        component: Component,
        token: &str,
        empty_token: EmptyToken,
    ) -> VersionResult<()> {
        match component {
            Component::Major => {
                self.major = checked_bump(self.major, component)?;
                self.minor = 0;
                self.patch = 0;
                self.clear_labels();
            }
            Component::Minor => {
                self.minor = checked_bump(self.minor, component)?;
                self.patch = 0;
                self.clear_labels();
            }
            Component::Patch => {
                self.patch = checked_bump(self.patch, component)?;
                self.clear_labels();
            }
            Component::Prerelease => {
                let prefix = token_identifiers(component, token, empty_token)?;
                self.prerelease = advance(&self.prerelease, prefix, component)?;
                self.build.clear();
            }
            Component::Build => {
                let prefix = token_identifiers(component, token, empty_token)?;
                self.build = advance(&self.build, prefix, component)?;
            }
        }
        Ok(())
    }

    /// Consuming form of [`increment`](Self::increment).
    pub fn incremented(
        mut self,
        component: Component,
        token: &str,
        empty_token: EmptyToken,
    ) -> VersionResult<Self> {
        self.increment(component, token, empty_token)?;
        Ok(self)
    }

    fn clear_labels(&mut self) {
        self.prerelease.clear();
        self.build.clear();
    }
}

fn checked_bump(value: u64, component: Component) -> VersionResult<u64> {
    value
        .checked_add(1)
        .ok_or(VersionError::Overflow { component })
}

/// Split and validate a token. Validation reuses the `semver` grammar so a
/// bumped version always renders to something that parses again.
fn token_identifiers(
    component: Component,
    token: &str,
    empty_token: EmptyToken,
) -> VersionResult<Vec<Identifier>> {
    let invalid = |reason: String| VersionError::InvalidToken {
        component,
        token: token.to_owned(),
        reason,
    };

    if token.is_empty() {
        return match empty_token {
            EmptyToken::Omit => Ok(Vec::new()),
            EmptyToken::Reject => Err(invalid("token is empty".into())),
        };
    }

    let checked = match component {
        Component::Prerelease => semver::Prerelease::new(token).map(drop),
        _ => semver::BuildMetadata::new(token).map(drop),
    };
    checked.map_err(|e| invalid(e.to_string()))?;

    Ok(identifiers(token))
}

/// Compute the next identifier sequence for a prerelease or build bump.
fn advance(
    current: &[Identifier],
    prefix: Vec<Identifier>,
    component: Component,
) -> VersionResult<Vec<Identifier>> {
    if current.is_empty() || !current.starts_with(&prefix) {
        let mut next = prefix;
        next.push(Identifier::Numeric(0));
        return Ok(next);
    }

    let mut next = current.to_vec();
    let counter = next[prefix.len()..]
        .iter()
        .rposition(|id| id.is_counter(component))
        .map(|i| i + prefix.len());

    let Some(i) = counter else {
        next.push(Identifier::Numeric(0));
        return Ok(next);
    };
    match &mut next[i] {
        Identifier::Numeric(n) => *n = checked_bump(*n, component)?,
        Identifier::AlphaNumeric(_) => return Err(VersionError::Overflow { component }),
    }
    Ok(next)
}

impl FromStr for SemanticVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> VersionResult<Self> {
        parse(s)
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if !self.prerelease.is_empty() {
            f.write_str("-")?;
            write_dotted(f, &self.prerelease)?;
        }
        if !self.build.is_empty() {
            f.write_str("+")?;
            write_dotted(f, &self.build)?;
        }
        Ok(())
    }
}

impl Serialize for SemanticVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SemanticVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        parse(&text).map_err(serde::de::Error::custom)
    }
}

fn write_dotted(f: &mut fmt::Formatter<'_>, ids: &[Identifier]) -> fmt::Result {
    for (i, id) in ids.iter().enumerate() {
        if i > 0 {
            f.write_str(".")?;
        }
        write!(f, "{id}")?;
    }
    Ok(())
}

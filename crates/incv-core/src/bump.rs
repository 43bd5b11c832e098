//! Version bump decision engine.
//!
//! [`decide_bump`] makes a single pass over a [`BumpConfig`]:
//!
//! 1. **Core**: at most one of major, minor, patch. The first one that
//!    fires wins; lower-priority intents are ignored.
//! 2. **Prerelease**: independent of the core decision.
//! 3. **Build**: applied last so it sees the prerelease result.
//!
//! A step fires when its flag is set or when the commit message contains
//! the step's tag. Tag matching is a plain, case-sensitive substring search.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::version::{Component, EmptyToken, SemanticVersion, VersionResult};

/// Core components in priority order.
const CORE_PRIORITY: [Component; 3] = [Component::Major, Component::Minor, Component::Patch];

// ──────────────────────────────────────────────
// Configuration
// ──────────────────────────────────────────────

/// Commit-message tags that trigger each kind of bump.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct BumpTags {
    /// Tag for a major bump (default `[major]`).
    pub major: String,
    /// Tag for a minor bump (default `[minor]`).
    pub minor: String,
    /// Tag for a patch bump (default `[patch]`).
    pub patch: String,
    /// Tag for a prerelease bump (default `[prerelease]`).
    pub prerelease: String,
    /// Tag for a build bump (default `[build]`).
    pub build: String,
}

impl Default for BumpTags {
    fn default() -> Self {
        Self {
            major: "[major]".into(),
            minor: "[minor]".into(),
            patch: "[patch]".into(),
            prerelease: "[prerelease]".into(),
            build: "[build]".into(),
        }
    }
}

impl BumpTags {
    /// The tag associated with a component.
    pub fn get(&self, component: Component) -> &str {
        match component {
            Component::Major => &self.major,
            Component::Minor => &self.minor,
            Component::Patch => &self.patch,
            Component::Prerelease => &self.prerelease,
            Component::Build => &self.build,
        }
    }
}

/// Leading identifiers used for prerelease and build bumps.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct BumpTokens {
    /// Prerelease token (default `prerelease`).
    pub prerelease: String,
    /// Build token (default empty).
    pub build: String,
}

impl Default for BumpTokens {
    fn default() -> Self {
        Self {
            prerelease: "prerelease".into(),
            build: String::new(),
        }
    }
}

/// Resolved inputs for one bump decision.
///
/// Built once by the caller and only read by [`decide_bump`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BumpConfig {
    /// Explicit major bump.
    pub major: bool,
    /// Explicit minor bump.
    pub minor: bool,
    /// Explicit patch bump (default `true`).
    pub patch: bool,
    /// Explicit prerelease bump.
    pub prerelease: bool,
    /// Explicit build bump.
    pub build: bool,
    /// Tags searched for in the commit message.
    pub tags: BumpTags,
    /// Tokens used for prerelease and build identifiers.
    pub tokens: BumpTokens,
    /// Free-text commit message (default empty).
    pub commit_message: String,
    /// Handling of empty tokens.
    pub empty_token: EmptyToken,
}

impl Default for BumpConfig {
    fn default() -> Self {
        Self {
            major: false,
            minor: false,
            patch: true,
            prerelease: false,
            build: false,
            tags: BumpTags::default(),
            tokens: BumpTokens::default(),
            commit_message: String::new(),
            empty_token: EmptyToken::default(),
        }
    }
}

impl BumpConfig {
    /// The explicit flag for a component.
    pub const fn flag(&self, component: Component) -> bool {
        match component {
            Component::Major => self.major,
            Component::Minor => self.minor,
            Component::Patch => self.patch,
            Component::Prerelease => self.prerelease,
            Component::Build => self.build,
        }
    }

    /// Whether a component is requested, by flag or by commit-message tag.
    pub fn wants(&self, component: Component) -> bool {
        self.flag(component) || self.commit_message.contains(self.tags.get(component))
    }

    /// The identifier token for a component (empty for core components).
    pub fn token(&self, component: Component) -> &str {
        match component {
            Component::Prerelease => &self.tokens.prerelease,
            Component::Build => &self.tokens.build,
            Component::Major | Component::Minor | Component::Patch => "",
        }
    }
}

// ──────────────────────────────────────────────
// Decision
// ──────────────────────────────────────────────

/// Result of a bump decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BumpOutcome {
    /// The version before any increment.
    pub previous: SemanticVersion,
    /// The version after all increments.
    pub next: SemanticVersion,
    /// Applied increments, in application order.
    pub decisions: Vec<Component>,
}

impl BumpOutcome {
    /// Whether any increment was applied.
    pub fn changed(&self) -> bool {
        !self.decisions.is_empty()
    }
}

/// Decide which increments to apply to `current` and apply them.
///
/// # Errors
///
/// Returns the first [`VersionError`](crate::version::VersionError) raised
/// by an increment (overflow or an invalid token). Nothing is retried.
#[instrument(skip(config), fields(%current))]
pub fn decide_bump(config: &BumpConfig, current: &SemanticVersion) -> VersionResult<BumpOutcome> {
    let mut next = current.clone();
    let mut decisions = Vec::with_capacity(3);

    let core = CORE_PRIORITY
        .into_iter()
        .find(|&component| config.wants(component));
    let labels = [Component::Prerelease, Component::Build]
        .into_iter()
        .filter(|&component| config.wants(component));

    for component in core.into_iter().chain(labels) {
        next.increment(component, config.token(component), config.empty_token)?;
        debug!(decision = %component, version = %next, "applied increment");
        decisions.push(component);
    }

    debug!(previous = %current, %next, ?decisions, "bump decided");

    Ok(BumpOutcome {
        previous: current.clone(),
        next,
        decisions,
    })
}

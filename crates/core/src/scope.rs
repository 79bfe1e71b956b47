//! OAuth scopes and scope filtering.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Named capabilities a token can carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// Read access (browse and download sounds).
    Read,
    /// Write access (upload sounds, edit descriptions).
    Write,
}

impl Scope {
    /// Parse from string.
    pub fn parse(s: &str) -> crate::Result<Self> {
        match s {
            "read" => Ok(Self::Read),
            "write" => Ok(Self::Write),
            _ => Err(crate::Error::InvalidScope(format!("unknown scope: {s}"))),
        }
    }

    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An ordered set of scopes, serialized as a space-delimited string.
///
/// Unknown scope names are dropped during parsing so that a client row
/// configured with a stale scope name degrades to fewer capabilities
/// rather than a hard failure.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScopeSet(BTreeSet<Scope>);

impl ScopeSet {
    /// Empty scope set.
    pub fn empty() -> Self {
        Self(BTreeSet::new())
    }

    /// Parse a space-delimited scope string, dropping unknown names.
    pub fn parse(s: &str) -> Self {
        Self(
            s.split_whitespace()
                .filter_map(|name| Scope::parse(name).ok())
                .collect(),
        )
    }

    /// Build from scopes.
    pub fn from_scopes(scopes: impl IntoIterator<Item = Scope>) -> Self {
        Self(scopes.into_iter().collect())
    }

    /// Check membership.
    pub fn contains(&self, scope: Scope) -> bool {
        self.0.contains(&scope)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Intersect with the scopes a client is permitted.
    ///
    /// Tokens are issued only for the intersection: requesting a
    /// disallowed scope silently narrows rather than errors.
    pub fn filter(&self, allowed: &ScopeSet) -> ScopeSet {
        Self(self.0.intersection(&allowed.0).copied().collect())
    }

    /// Space-delimited string form (stable order).
    pub fn as_string(&self) -> String {
        self.0
            .iter()
            .map(Scope::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Iterate the contained scopes.
    pub fn iter(&self) -> impl Iterator<Item = Scope> + '_ {
        self.0.iter().copied()
    }
}

impl fmt::Display for ScopeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_string())
    }
}

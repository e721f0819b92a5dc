//! Skip resolution.
//!
//! Tokens are normalized once when the set is built; per-phase checks are
//! plain set membership against the phase id and its alias. Tokens that
//! match nothing are tolerated, so a skip list written for another
//! version of the phase list still works.

use std::collections::BTreeSet;

use crate::registry::{PhaseDescriptor, PhaseRegistry};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkipSet {
    tokens: BTreeSet<String>,
}

impl SkipSet {
    /// Build from operator tokens. Whitespace is trimmed, empty tokens are
    /// dropped and duplicates collapse.
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            tokens: tokens
                .into_iter()
                .map(|t| t.as_ref().trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }

    #[must_use]
    pub fn should_skip(&self, phase: &PhaseDescriptor) -> bool {
        self.tokens.contains(phase.id()) || self.tokens.contains(phase.alias())
    }

    /// Tokens that name no phase in `registry`.
    #[must_use]
    pub fn unmatched<'a>(&'a self, registry: &PhaseRegistry) -> Vec<&'a str> {
        self.tokens
            .iter()
            .filter(|t| {
                !registry
                    .iter()
                    .any(|p| p.id() == t.as_str() || p.alias() == t.as_str())
            })
            .map(String::as_str)
            .collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }
}

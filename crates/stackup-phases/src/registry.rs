use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use stackup_utils::error::RegistryError;

/// Input to [`PhaseRegistry::new`]: what a phase is, before it has a position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseSpec {
    pub id: String,
    pub description: String,
    /// Executable path relative to the installation root.
    pub executable_ref: PathBuf,
}

impl PhaseSpec {
    /// A phase whose executable is `scripts/<id>.sh`.
    pub fn new(id: impl Into<String>, description: impl Into<String>) -> Self {
        let id = id.into();
        let executable_ref = PathBuf::from("scripts").join(format!("{id}.sh"));
        Self {
            id,
            description: description.into(),
            executable_ref,
        }
    }

    #[must_use]
    pub fn with_executable(mut self, executable_ref: impl Into<PathBuf>) -> Self {
        self.executable_ref = executable_ref.into();
        self
    }
}

/// One registered unit of deployment work. Immutable once registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseDescriptor {
    id: String,
    alias: String,
    position: usize,
    description: String,
    executable_ref: PathBuf,
}

impl PhaseDescriptor {
    /// Stable identifier, e.g. `02-docker`.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Human name: the part of the id after its ordinal, e.g. `docker`.
    #[must_use]
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// 1-based execution position.
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn executable_ref(&self) -> &Path {
        &self.executable_ref
    }

    /// Absolute location of the executable under `root`.
    #[must_use]
    pub fn resolve(&self, root: &Path) -> PathBuf {
        root.join(&self.executable_ref)
    }
}

/// Split `id` at its first `-` and return the alias.
fn derive_alias(id: &str) -> Result<&str, RegistryError> {
    let invalid = |reason: &str| RegistryError::InvalidId {
        id: id.to_string(),
        reason: reason.to_string(),
    };

    if id.trim() != id || id.is_empty() {
        return Err(invalid("must be non-empty without surrounding whitespace"));
    }
    match id.split_once('-') {
        Some((ordinal, alias)) if !ordinal.is_empty() && !alias.is_empty() => Ok(alias),
        _ => Err(invalid("expected '<ordinal>-<name>'")),
    }
}

/// Ordered, duplicate-free list of phases with contiguous positions.
#[derive(Debug, Clone)]
pub struct PhaseRegistry {
    phases: Vec<PhaseDescriptor>,
    by_id: HashMap<String, usize>,
}

impl PhaseRegistry {
    /// Build a registry, assigning positions 1..=N in the given order.
    ///
    /// Fails on the first duplicate id, duplicate alias or malformed id.
    pub fn new(specs: impl IntoIterator<Item = PhaseSpec>) -> Result<Self, RegistryError> {
        let mut phases: Vec<PhaseDescriptor> = Vec::new();
        let mut by_id = HashMap::new();
        let mut by_alias: HashMap<String, String> = HashMap::new();

        for spec in specs {
            let alias = derive_alias(&spec.id)?.to_string();

            if by_id.contains_key(&spec.id) {
                return Err(RegistryError::DuplicateId { id: spec.id });
            }
            if let Some(first) = by_alias.get(&alias) {
                return Err(RegistryError::DuplicateAlias {
                    alias,
                    first: first.clone(),
                    second: spec.id,
                });
            }

            by_id.insert(spec.id.clone(), phases.len());
            by_alias.insert(alias.clone(), spec.id.clone());
            phases.push(PhaseDescriptor {
                position: phases.len() + 1,
                id: spec.id,
                alias,
                description: spec.description,
                executable_ref: spec.executable_ref,
            });
        }

        if phases.is_empty() {
            return Err(RegistryError::Empty);
        }

        Ok(Self { phases, by_id })
    }

    /// The built-in platform phase list.
    pub fn standard() -> Result<Self, RegistryError> {
        Self::new(crate::standard::standard_phases())
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&PhaseDescriptor> {
        self.by_id.get(id).map(|&idx| &self.phases[idx])
    }

    #[must_use]
    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.get(id).map(PhaseDescriptor::position)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PhaseDescriptor> {
        self.phases.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.phases.len()
    }

    /// Always false: construction rejects an empty list.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    /// `id  description` lines for `--help`.
    #[must_use]
    pub fn help_listing(&self) -> String {
        let width = self.phases.iter().map(|p| p.id.len()).max().unwrap_or(0);
        self.phases
            .iter()
            .map(|p| format!("  {:<width$}  {}", p.id, p.description))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl<'a> IntoIterator for &'a PhaseRegistry {
    type Item = &'a PhaseDescriptor;
    type IntoIter = std::slice::Iter<'a, PhaseDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.phases.iter()
    }
}

//! In-memory store for requirement declarations
//!
//! Backs the uniqueness invariant of a manifest: one declaration per
//! normalized package name. Lookup accepts any spelling of a name;
//! iteration preserves file order.

use super::requirement::{normalize_name, Requirement};
use std::collections::HashMap;
use thiserror::Error;

/// Error returned when a name is declared more than once
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("package '{name}' is already declared on line {first_line} (again on line {line})")]
pub struct DuplicateRequirement {
    /// Normalized package name
    pub name: String,
    /// Line of the declaration that is kept
    pub first_line: usize,
    /// Line of the rejected declaration
    pub line: usize,
}

/// An insertion-ordered set of requirements keyed by normalized name
#[derive(Debug, Clone, Default)]
pub struct RequirementSet {
    items: Vec<Requirement>,
    index: HashMap<String, usize>,
}

impl RequirementSet {
    /// Creates an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from declarations in file order
    ///
    /// The first declaration of a name wins; later ones are returned as
    /// duplicates instead of replacing it.
    pub fn from_requirements(
        requirements: impl IntoIterator<Item = Requirement>,
    ) -> (Self, Vec<DuplicateRequirement>) {
        let mut set = Self::new();
        let mut duplicates = Vec::new();
        for requirement in requirements {
            if let Err(duplicate) = set.insert(requirement) {
                duplicates.push(duplicate);
            }
        }
        (set, duplicates)
    }

    /// Adds a requirement, rejecting duplicate names
    pub fn insert(&mut self, requirement: Requirement) -> Result<(), DuplicateRequirement> {
        let key = requirement.normalized_name();
        if let Some(&existing) = self.index.get(&key) {
            return Err(DuplicateRequirement {
                name: key,
                first_line: self.items[existing].line,
                line: requirement.line,
            });
        }
        self.index.insert(key, self.items.len());
        self.items.push(requirement);
        Ok(())
    }

    /// Looks up a requirement by any spelling of its name
    pub fn get(&self, name: &str) -> Option<&Requirement> {
        self.index
            .get(&normalize_name(name))
            .map(|&i| &self.items[i])
    }

    /// Returns true if the set declares the given name
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(&normalize_name(name))
    }

    /// Number of declarations
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if no declarations are present
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates over declarations in file order
    pub fn iter(&self) -> impl Iterator<Item = &Requirement> {
        self.items.iter()
    }
}

impl<'a> IntoIterator for &'a RequirementSet {
    type Item = &'a Requirement;
    type IntoIter = std::slice::Iter<'a, Requirement>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

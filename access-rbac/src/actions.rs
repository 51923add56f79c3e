//! # Actions
//!
//! Fine-grained action tokens and ordered action sets.
//!
//! An action is a string of the form `<domain>:<verb>`, for example
//! `teams:read` or `teams.permissions:write`. Apart from the shape check
//! performed when an action is parsed, actions are compared by equality only.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::CatalogError;

/// Verb used by read-level actions.
pub const READ_VERB: &str = "read";

/// Verb used by write-level actions.
pub const WRITE_VERB: &str = "write";

/// A single authorization token, `<domain>:<verb>`.
///
/// # Example
///
/// ```
/// use access_rbac::Action;
///
/// let action = Action::parse("teams.permissions:read").unwrap();
/// assert_eq!(action.domain(), "teams.permissions");
/// assert_eq!(action.verb(), "read");
/// assert!(Action::parse("teams").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Action(String);

impl Action {
    /// Build an action from its domain and verb.
    pub fn new(domain: &str, verb: &str) -> Self {
        Self(format!("{}:{}", domain, verb))
    }

    /// Parse an action token.
    ///
    /// # Returns
    ///
    /// `Some(Action)` when the token has exactly one `:` separating a
    /// non-empty domain from a non-empty verb and contains no whitespace.
    pub fn parse(s: &str) -> Option<Self> {
        if s.chars().any(char::is_whitespace) {
            return None;
        }
        let (domain, verb) = s.split_once(':')?;
        if domain.is_empty() || verb.is_empty() || verb.contains(':') {
            return None;
        }
        Some(Self(s.to_string()))
    }

    /// The action needed to read permissions on a resource type,
    /// e.g. `teams.permissions:read`.
    pub fn permissions_read(resource: &str) -> Self {
        Self::new(&format!("{}.permissions", resource), READ_VERB)
    }

    /// The action needed to change permissions on a resource type,
    /// e.g. `teams.permissions:write`.
    pub fn permissions_write(resource: &str) -> Self {
        Self::new(&format!("{}.permissions", resource), WRITE_VERB)
    }

    /// Get the string representation of the action.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The part before the `:`.
    pub fn domain(&self) -> &str {
        self.0.split_once(':').map(|(d, _)| d).unwrap_or(&self.0)
    }

    /// The part after the `:`.
    pub fn verb(&self) -> &str {
        self.0.split_once(':').map(|(_, v)| v).unwrap_or_default()
    }

    /// Check if this is a read action on exactly the given domain.
    pub fn is_read_on(&self, domain: &str) -> bool {
        self.domain() == domain && self.verb() == READ_VERB
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Action {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| CatalogError::InvalidAction(s.to_string()))
    }
}

impl TryFrom<String> for Action {
    type Error = CatalogError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Action> for String {
    fn from(action: Action) -> Self {
        action.0
    }
}

/// An ordered, deduplicated set of actions.
///
/// Iteration order is lexicographic, so two sets holding the same actions
/// always serialize identically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionSet {
    actions: BTreeSet<Action>,
}

impl ActionSet {
    /// Create a new empty action set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a list of action tokens.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidAction`] for the first malformed token.
    pub fn parse<I, S>(actions: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        actions
            .into_iter()
            .map(|a| a.as_ref().parse::<Action>())
            .collect()
    }

    /// Add an action, returning `false` if it was already present.
    pub fn insert(&mut self, action: Action) -> bool {
        self.actions.insert(action)
    }

    /// Check if the set contains an action.
    pub fn contains(&self, action: &Action) -> bool {
        self.actions.contains(action)
    }

    /// Check if every action of `other` is also in this set.
    pub fn is_superset(&self, other: &ActionSet) -> bool {
        self.actions.is_superset(&other.actions)
    }

    /// Actions present in both sets.
    pub fn intersection(&self, other: &ActionSet) -> ActionSet {
        self.actions.intersection(&other.actions).cloned().collect()
    }

    /// Merge another set into this one.
    pub fn extend(&mut self, other: &ActionSet) {
        self.actions.extend(other.actions.iter().cloned());
    }

    /// Iterate over the actions in order.
    pub fn iter(&self) -> impl Iterator<Item = &Action> {
        self.actions.iter()
    }

    /// The actions as plain strings, in order.
    pub fn to_strings(&self) -> Vec<String> {
        self.actions.iter().map(|a| a.to_string()).collect()
    }

    /// Get the count of actions.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl FromIterator<Action> for ActionSet {
    fn from_iter<T: IntoIterator<Item = Action>>(iter: T) -> Self {
        Self {
            actions: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ActionSet {
    type Item = &'a Action;
    type IntoIter = std::collections::btree_set::Iter<'a, Action>;

    fn into_iter(self) -> Self::IntoIter {
        self.actions.iter()
    }
}

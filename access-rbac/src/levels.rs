//! # Permission Levels
//!
//! Coarse-grained permission levels and the catalog that maps each level to
//! the fine-grained actions it grants.
//!
//! Each resource type declares its levels as a closed enum implementing
//! [`PermissionLevel`]. The enum's `Ord` is the level hierarchy: levels that
//! compare greater are expected (but not required) to grant a superset of the
//! actions of lower levels.

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::hash::Hash;

use crate::actions::{Action, ActionSet};
use crate::error::{CatalogError, CatalogResult};

/// A named permission tier for one resource type.
///
/// # Example
///
/// ```
/// use access_rbac::PermissionLevel;
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// enum FolderPermission {
///     View,
///     Edit,
/// }
///
/// impl PermissionLevel for FolderPermission {
///     fn name(&self) -> &'static str {
///         match self {
///             FolderPermission::View => "View",
///             FolderPermission::Edit => "Edit",
///         }
///     }
/// }
///
/// assert_eq!(FolderPermission::Edit.name(), "Edit");
/// ```
pub trait PermissionLevel: Debug + Copy + Eq + Ord + Hash + Send + Sync + 'static {
    /// The user-facing level name, e.g. `"Admin"`.
    fn name(&self) -> &'static str;
}

/// Static mapping from permission level to the actions it grants.
///
/// Construction rejects malformed actions, empty levels and levels that share
/// actions without being layered (one level's set containing the other's).
///
/// # Example
///
/// ```
/// use access_rbac::{ActionCatalog, PermissionLevel};
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// enum Level {
///     Member,
///     Admin,
/// }
///
/// impl PermissionLevel for Level {
///     fn name(&self) -> &'static str {
///         match self {
///             Level::Member => "Member",
///             Level::Admin => "Admin",
///         }
///     }
/// }
///
/// let catalog = ActionCatalog::new([
///     (Level::Member, vec!["teams:read"]),
///     (Level::Admin, vec!["teams:read", "teams:write"]),
/// ])
/// .unwrap();
///
/// let (level, actions) = catalog.resolve("Admin").unwrap();
/// assert_eq!(level, Level::Admin);
/// assert_eq!(actions.len(), 2);
/// assert!(catalog.resolve("Owner").is_none());
/// ```
#[derive(Debug, Clone)]
pub struct ActionCatalog<L: PermissionLevel> {
    levels: BTreeMap<L, ActionSet>,
}

impl<L: PermissionLevel> ActionCatalog<L> {
    /// Build a catalog from `(level, actions)` pairs.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::InvalidAction`] for a malformed action token
    /// - [`CatalogError::EmptyLevel`] for a level without actions
    /// - [`CatalogError::DuplicateLevel`] for a level listed twice
    /// - [`CatalogError::OverlappingLevels`] when two levels share an action
    ///   and neither is a superset of the other
    pub fn new<I, A, S>(entries: I) -> CatalogResult<Self>
    where
        I: IntoIterator<Item = (L, A)>,
        A: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut levels = BTreeMap::new();
        for (level, actions) in entries {
            let actions = ActionSet::parse(actions)?;
            if actions.is_empty() {
                return Err(CatalogError::EmptyLevel(level.name().to_string()));
            }
            if levels.insert(level, actions).is_some() {
                return Err(CatalogError::DuplicateLevel(level.name().to_string()));
            }
        }

        let catalog = Self { levels };
        catalog.check_overlaps()?;
        Ok(catalog)
    }

    fn check_overlaps(&self) -> CatalogResult<()> {
        let entries: Vec<(&L, &ActionSet)> = self.levels.iter().collect();
        for (i, (lower, lower_actions)) in entries.iter().enumerate() {
            for (higher, higher_actions) in &entries[i + 1..] {
                let shared = lower_actions.intersection(higher_actions);
                let Some(action) = shared.iter().next() else {
                    continue;
                };
                if higher_actions.is_superset(lower_actions) || lower_actions.is_superset(higher_actions) {
                    continue;
                }
                return Err(CatalogError::OverlappingLevels {
                    first: lower.name().to_string(),
                    second: higher.name().to_string(),
                    action: action.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Actions granted by a level, if the level is registered.
    pub fn get(&self, level: L) -> Option<&ActionSet> {
        self.levels.get(&level)
    }

    /// Resolve a level by its user-facing name.
    ///
    /// Names are matched exactly.
    pub fn resolve(&self, name: &str) -> Option<(L, &ActionSet)> {
        self.levels
            .iter()
            .find(|(level, _)| level.name() == name)
            .map(|(level, actions)| (*level, actions))
    }

    /// Map an action set back to the level granting exactly those actions.
    pub fn level_for_actions(&self, actions: &ActionSet) -> Option<L> {
        self.levels
            .iter()
            .find(|(_, granted)| *granted == actions)
            .map(|(level, _)| *level)
    }

    /// Registered level names, lowest first.
    pub fn names(&self) -> Vec<&'static str> {
        self.levels.keys().map(PermissionLevel::name).collect()
    }

    /// Union of the actions of every level.
    pub fn all_actions(&self) -> ActionSet {
        let mut all = ActionSet::new();
        for actions in self.levels.values() {
            all.extend(actions);
        }
        all
    }

    /// Read-level actions on the given domain granted by any level.
    pub fn read_actions(&self, domain: &str) -> ActionSet {
        self.all_actions()
            .iter()
            .filter(|a| a.is_read_on(domain))
            .cloned()
            .collect::<ActionSet>()
    }

    /// Check that every level grants a superset of the level below it.
    pub fn is_layered(&self) -> bool {
        let sets: Vec<&ActionSet> = self.levels.values().collect();
        sets.windows(2).all(|pair| pair[1].is_superset(pair[0]))
    }

    /// Check whether any level grants the given action.
    pub fn grants(&self, action: &Action) -> bool {
        self.levels.values().any(|actions| actions.contains(action))
    }

    /// Get the count of levels.
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    enum Level {
        Viewer,
        Editor,
        Owner,
    }

    impl PermissionLevel for Level {
        fn name(&self) -> &'static str {
            match self {
                Level::Viewer => "Viewer",
                Level::Editor => "Editor",
                Level::Owner => "Owner",
            }
        }
    }

    fn layered() -> ActionCatalog<Level> {
        ActionCatalog::new([
            (Level::Viewer, vec!["docs:read"]),
            (Level::Editor, vec!["docs:read", "docs:write"]),
            (Level::Owner, vec!["docs:read", "docs:write", "docs:delete"]),
        ])
        .unwrap()
    }

    #[test]
    fn test_resolve_by_name() {
        let catalog = layered();

        let (level, actions) = catalog.resolve("Editor").unwrap();
        assert_eq!(level, Level::Editor);
        assert_eq!(actions.to_strings(), vec!["docs:read", "docs:write"]);

        assert!(catalog.resolve("editor").is_none());
        assert!(catalog.resolve("").is_none());
    }

    #[test]
    fn test_layered_catalog() {
        let catalog = layered();
        assert!(catalog.is_layered());
        assert_eq!(catalog.names(), vec!["Viewer", "Editor", "Owner"]);
        assert_eq!(catalog.len(), 3);
    }

    #[test]
    fn test_disjoint_levels_are_allowed_but_not_layered() {
        let catalog = ActionCatalog::new([
            (Level::Viewer, vec!["docs:read"]),
            (Level::Editor, vec!["docs:write"]),
        ])
        .unwrap();
        assert!(!catalog.is_layered());
    }

    #[test]
    fn test_overlapping_levels_rejected() {
        let err = ActionCatalog::new([
            (Level::Viewer, vec!["docs:read", "docs:export"]),
            (Level::Editor, vec!["docs:read", "docs:write"]),
        ])
        .unwrap_err();

        assert_eq!(
            err,
            CatalogError::OverlappingLevels {
                first: "Viewer".to_string(),
                second: "Editor".to_string(),
                action: "docs:read".to_string(),
            }
        );
    }

    #[test]
    fn test_empty_and_duplicate_levels_rejected() {
        let empty: Vec<&str> = Vec::new();
        let err = ActionCatalog::new([(Level::Viewer, empty)]).unwrap_err();
        assert_eq!(err, CatalogError::EmptyLevel("Viewer".to_string()));

        let err = ActionCatalog::new([
            (Level::Viewer, vec!["docs:read"]),
            (Level::Viewer, vec!["docs:read"]),
        ])
        .unwrap_err();
        assert_eq!(err, CatalogError::DuplicateLevel("Viewer".to_string()));
    }

    #[test]
    fn test_invalid_action_rejected() {
        let err = ActionCatalog::new([(Level::Viewer, vec!["read"])]).unwrap_err();
        assert_eq!(err, CatalogError::InvalidAction("read".to_string()));
    }

    #[test]
    fn test_level_for_actions() {
        let catalog = layered();
        let editor = ActionSet::parse(["docs:write", "docs:read"]).unwrap();
        assert_eq!(catalog.level_for_actions(&editor), Some(Level::Editor));

        let custom = ActionSet::parse(["docs:delete"]).unwrap();
        assert_eq!(catalog.level_for_actions(&custom), None);
    }

    #[test]
    fn test_read_actions() {
        let catalog = ActionCatalog::new([
            (Level::Viewer, vec!["docs:read", "docs.comments:read"]),
            (Level::Editor, vec!["docs:read", "docs.comments:read", "docs:write"]),
        ])
        .unwrap();

        assert_eq!(catalog.read_actions("docs").to_strings(), vec!["docs:read"]);
        assert!(catalog.grants(&Action::new("docs", "write")));
        assert_eq!(catalog.all_actions().len(), 3);
    }
}

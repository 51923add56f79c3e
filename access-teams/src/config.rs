//! Team permission configuration.
//!
//! Configuration is loaded from environment variables with defaults matching
//! the standard team setup: managed assignments only, users only, and the
//! "Team permission reader" / "Team permission writer" meta roles in the
//! "Teams" group.

use access_control::{ResourceIdKind, ResourceOptions};
use access_rbac::AssignmentTargets;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::permissions::TEAMS_RESOURCE;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid configuration value.
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue {
        /// Configuration key.
        key: String,
        /// Error message.
        message: String,
    },
}

/// Configuration of the team permission service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TeamPermissionsConfig {
    /// Only list and change assignments created through the service.
    pub only_managed: bool,

    /// Principal kinds that may be granted team permissions.
    pub assignments: AssignmentTargets,

    /// Display name of the permission reader meta role.
    pub reader_role_name: String,

    /// Display name of the permission writer meta role.
    pub writer_role_name: String,

    /// Group of both meta roles.
    pub role_group: String,
}

impl Default for TeamPermissionsConfig {
    fn default() -> Self {
        Self {
            only_managed: true,
            assignments: AssignmentTargets::users_only(),
            reader_role_name: "Team permission reader".to_string(),
            writer_role_name: "Team permission writer".to_string(),
            role_group: "Teams".to_string(),
        }
    }
}

impl TeamPermissionsConfig {
    /// Load configuration from environment variables.
    ///
    /// Unset or malformed values fall back to the defaults.
    ///
    /// Environment variables:
    /// - `TEAM_PERMISSIONS_ONLY_MANAGED` (default: true)
    /// - `TEAM_PERMISSIONS_ALLOW_USERS` (default: true)
    /// - `TEAM_PERMISSIONS_ALLOW_TEAMS` (default: false)
    /// - `TEAM_PERMISSIONS_ALLOW_BUILT_IN_ROLES` (default: false)
    /// - `TEAM_PERMISSIONS_READER_ROLE_NAME` (default: Team permission reader)
    /// - `TEAM_PERMISSIONS_WRITER_ROLE_NAME` (default: Team permission writer)
    /// - `TEAM_PERMISSIONS_ROLE_GROUP` (default: Teams)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok(), false).unwrap_or_default()
    }

    /// Load configuration from environment variables, rejecting malformed
    /// boolean flags.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidValue`] naming the first malformed variable.
    pub fn try_from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok(), true)
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// With `strict` unset, malformed flags keep their default.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidValue`] for a malformed flag when `strict` is set.
    pub fn from_lookup<F>(lookup: F, strict: bool) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let default = Self::default();
        let flag = |key: &str, fallback: bool| -> Result<bool, ConfigError> {
            match lookup(key) {
                None => Ok(fallback),
                Some(raw) => match parse_flag(&raw) {
                    Some(value) => Ok(value),
                    None if strict => Err(ConfigError::InvalidValue {
                        key: key.to_string(),
                        message: format!("expected a boolean, got {:?}", raw),
                    }),
                    None => Ok(fallback),
                },
            }
        };

        Ok(Self {
            only_managed: flag("TEAM_PERMISSIONS_ONLY_MANAGED", default.only_managed)?,
            assignments: AssignmentTargets {
                users: flag("TEAM_PERMISSIONS_ALLOW_USERS", default.assignments.users)?,
                teams: flag("TEAM_PERMISSIONS_ALLOW_TEAMS", default.assignments.teams)?,
                built_in_roles: flag(
                    "TEAM_PERMISSIONS_ALLOW_BUILT_IN_ROLES",
                    default.assignments.built_in_roles,
                )?,
            },
            reader_role_name: lookup("TEAM_PERMISSIONS_READER_ROLE_NAME")
                .unwrap_or(default.reader_role_name),
            writer_role_name: lookup("TEAM_PERMISSIONS_WRITER_ROLE_NAME")
                .unwrap_or(default.writer_role_name),
            role_group: lookup("TEAM_PERMISSIONS_ROLE_GROUP").unwrap_or(default.role_group),
        })
    }

    /// Options of the team resource permission service.
    pub fn resource_options(&self) -> ResourceOptions {
        ResourceOptions::new(TEAMS_RESOURCE)
            .with_only_managed(self.only_managed)
            .with_assignments(self.assignments)
            .with_id_kind(ResourceIdKind::Numeric)
            .with_meta_roles(&self.reader_role_name, &self.writer_role_name, &self.role_group)
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

//! Resource identifiers and the resource validator port.

use access_rbac::OrgId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::context::RequestContext;
use crate::error::ValidationError;

/// How a resource type spells its instance ids.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResourceIdKind {
    /// Signed 64-bit integer ids (teams, users)
    #[default]
    Numeric,
    /// Any non-empty string without whitespace (uids)
    Opaque,
}

/// A resource instance id that has passed the syntactic check for its kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceId {
    raw: String,
    numeric: Option<i64>,
}

impl ResourceId {
    /// Parse a raw id for the given kind.
    ///
    /// Numeric ids are stored in canonical form, so `"042"` and `"+42"` both
    /// become `"42"`.
    ///
    /// ```
    /// use access_control::{ResourceId, ResourceIdKind};
    ///
    /// assert_eq!(ResourceId::parse(ResourceIdKind::Numeric, "42").unwrap().as_i64(), Some(42));
    /// assert!(ResourceId::parse(ResourceIdKind::Numeric, "abc").is_none());
    /// assert!(ResourceId::parse(ResourceIdKind::Opaque, "abc").is_some());
    /// ```
    pub fn parse(kind: ResourceIdKind, raw: &str) -> Option<Self> {
        match kind {
            ResourceIdKind::Numeric => raw.parse::<i64>().ok().map(|id| Self {
                raw: id.to_string(),
                numeric: Some(id),
            }),
            ResourceIdKind::Opaque => {
                if raw.is_empty() || raw.chars().any(char::is_whitespace) {
                    None
                } else {
                    Some(Self {
                        raw: raw.to_string(),
                        numeric: None,
                    })
                }
            }
        }
    }

    /// The id in canonical form.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The numeric value for numeric ids.
    pub fn as_i64(&self) -> Option<i64> {
        self.numeric
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Checks that a resource instance exists and is addressable.
///
/// Supplied per resource type. Called before every mutating operation; an
/// error aborts the operation before anything is written.
#[async_trait]
pub trait ResourceValidator: Send + Sync {
    /// Validate that `resource_id` exists in `org_id`.
    async fn validate(
        &self,
        ctx: &RequestContext,
        org_id: OrgId,
        resource_id: &ResourceId,
    ) -> Result<(), ValidationError>;
}

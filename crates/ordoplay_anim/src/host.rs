// SPDX-License-Identifier: MIT OR Apache-2.0
//! Render hosts an animation can be attached to.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier of a render host (a player)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HostId(pub Uuid);

impl HostId {
    /// Create a new random host ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for HostId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for HostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What an animation remembers about a host displaying it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostInfo {
    /// Host ID
    pub id: HostId,
    /// Human-readable host name
    pub name: String,
}

impl HostInfo {
    /// Describe a new host
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: HostId::new(),
            name: name.into(),
        }
    }
}

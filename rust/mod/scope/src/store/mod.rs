//! Read-only collaborator interface the engine loads its inputs from.
//!
//! The engine never writes through a [`Directory`]. All I/O happens here,
//! before resolution starts; the engine then works on the loaded snapshot.

mod file_loader;
mod memory;
mod kv;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ScopeError;
use crate::model::{ActorProfile, HierarchySnapshot, PermissionRow, RoleSet};

pub use file_loader::load_data_dir;
pub use memory::MemoryDirectory;
pub use kv::KvDirectory;

pub trait Directory: Send + Sync {
    /// Full hierarchy snapshot.
    fn load_hierarchy(&self) -> Result<HierarchySnapshot, ScopeError>;

    /// Roles held by an actor. Returns `NotFound` for an unknown actor.
    fn load_roles(&self, actor_id: &str) -> Result<RoleSet, ScopeError>;

    /// Organizational home of an actor. Empty when not recorded.
    fn load_profile(&self, actor_id: &str) -> Result<ActorProfile, ScopeError>;

    /// Explicit group assignments, in assignment order.
    fn load_group_assignments(&self, actor_id: &str) -> Result<Vec<String>, ScopeError>;

    /// Permission rows for the given roles.
    fn load_permission_rows(&self, roles: &RoleSet) -> Result<Vec<PermissionRow>, ScopeError>;
}

impl<D: Directory + ?Sized> Directory for Box<D> {
    fn load_hierarchy(&self) -> Result<HierarchySnapshot, ScopeError> {
        (**self).load_hierarchy()
    }

    fn load_roles(&self, actor_id: &str) -> Result<RoleSet, ScopeError> {
        (**self).load_roles(actor_id)
    }

    fn load_profile(&self, actor_id: &str) -> Result<ActorProfile, ScopeError> {
        (**self).load_profile(actor_id)
    }

    fn load_group_assignments(&self, actor_id: &str) -> Result<Vec<String>, ScopeError> {
        (**self).load_group_assignments(actor_id)
    }

    fn load_permission_rows(&self, roles: &RoleSet) -> Result<Vec<PermissionRow>, ScopeError> {
        (**self).load_permission_rows(roles)
    }
}

/// Everything the directory knows about one actor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorRecord {
    #[serde(default)]
    pub roles: RoleSet,

    #[serde(flatten)]
    pub profile: ActorProfile,

    /// Assigned group ids.
    #[serde(default)]
    pub groups: Vec<String>,
}

/// A complete directory in one value: hierarchy, actors, permission table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectorySnapshot {
    #[serde(default)]
    pub hierarchy: HierarchySnapshot,

    #[serde(default)]
    pub actors: BTreeMap<String, ActorRecord>,

    #[serde(default)]
    pub permissions: Vec<PermissionRow>,
}

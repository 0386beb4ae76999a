use crate::error::ScopeError;
use crate::model::{
    ActorProfile, Area, Church, Group, HierarchySnapshot, PermissionRow, Region, RoleSet,
};
use crate::store::{ActorRecord, Directory, DirectorySnapshot};

/// In-memory directory over a [`DirectorySnapshot`].
#[derive(Debug, Clone, Default)]
pub struct MemoryDirectory {
    snapshot: DirectorySnapshot,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_region(mut self, region: Region) -> Self {
        self.snapshot.hierarchy.regions.push(region);
        self
    }

    pub fn with_area(mut self, area: Area) -> Self {
        self.snapshot.hierarchy.areas.push(area);
        self
    }

    pub fn with_church(mut self, church: Church) -> Self {
        self.snapshot.hierarchy.churches.push(church);
        self
    }

    pub fn with_group(mut self, group: Group) -> Self {
        self.snapshot.hierarchy.groups.push(group);
        self
    }

    pub fn with_actor(mut self, actor_id: &str, record: ActorRecord) -> Self {
        self.snapshot.actors.insert(actor_id.to_string(), record);
        self
    }

    pub fn with_permission(mut self, row: PermissionRow) -> Self {
        self.snapshot.permissions.push(row);
        self
    }

    fn actor(&self, actor_id: &str) -> Option<&ActorRecord> {
        self.snapshot.actors.get(actor_id)
    }
}

impl From<DirectorySnapshot> for MemoryDirectory {
    fn from(snapshot: DirectorySnapshot) -> Self {
        Self { snapshot }
    }
}

impl Directory for MemoryDirectory {
    fn load_hierarchy(&self) -> Result<HierarchySnapshot, ScopeError> {
        Ok(self.snapshot.hierarchy.clone())
    }

    fn load_roles(&self, actor_id: &str) -> Result<RoleSet, ScopeError> {
        self.actor(actor_id)
            .map(|a| a.roles.clone())
            .ok_or_else(|| ScopeError::NotFound(format!("actor '{}'", actor_id)))
    }

    fn load_profile(&self, actor_id: &str) -> Result<ActorProfile, ScopeError> {
        Ok(self.actor(actor_id).map(|a| a.profile.clone()).unwrap_or_default())
    }

    fn load_group_assignments(&self, actor_id: &str) -> Result<Vec<String>, ScopeError> {
        Ok(self.actor(actor_id).map(|a| a.groups.clone()).unwrap_or_default())
    }

    fn load_permission_rows(&self, roles: &RoleSet) -> Result<Vec<PermissionRow>, ScopeError> {
        Ok(self
            .snapshot
            .permissions
            .iter()
            .filter(|row| roles.contains(&row.role))
            .cloned()
            .collect())
    }
}

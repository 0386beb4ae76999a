use std::fmt::Display;
use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableTable, TableDefinition};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::info;

use crate::error::ScopeError;
use crate::model::{ActorProfile, HierarchySnapshot, PermissionRow, RoleSet};
use crate::store::{ActorRecord, Directory, DirectorySnapshot};

const TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("scope");

const REGION_PREFIX: &str = "scope:region:";
const AREA_PREFIX: &str = "scope:area:";
const CHURCH_PREFIX: &str = "scope:church:";
const GROUP_PREFIX: &str = "scope:group:";
const ACTOR_PREFIX: &str = "scope:actor:";
const PERMISSION_PREFIX: &str = "scope:permission:";

fn storage<E: Display>(e: E) -> ScopeError {
    ScopeError::Storage(e.to_string())
}

/// Directory backed by a redb file. Records are JSON values under
/// namespaced keys:
///
/// ```text
/// scope:region:<id>               → Region
/// scope:area:<id>                 → Area
/// scope:church:<id>               → Church
/// scope:group:<id>                → Group
/// scope:actor:<id>                → ActorRecord
/// scope:permission:<role>:<module> → PermissionRow
/// ```
pub struct KvDirectory {
    db: Arc<Database>,
}

impl KvDirectory {
    /// Open or create a redb database at the given path.
    pub fn open(path: &Path) -> Result<Self, ScopeError> {
        let db = Database::create(path).map_err(storage)?;

        // Ensure the table exists so read transactions can open it.
        let write_txn = db.begin_write().map_err(storage)?;
        {
            let _table = write_txn.open_table(TABLE).map_err(storage)?;
        }
        write_txn.commit().map_err(storage)?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Write a whole snapshot in one transaction. Existing keys are
    /// overwritten; keys absent from the snapshot are left alone.
    pub fn import(&self, snapshot: &DirectorySnapshot) -> Result<usize, ScopeError> {
        let mut entries: Vec<(String, Vec<u8>)> = Vec::new();
        let hierarchy = &snapshot.hierarchy;
        for region in &hierarchy.regions {
            entries.push((format!("{}{}", REGION_PREFIX, region.id), serde_json::to_vec(region)?));
        }
        for area in &hierarchy.areas {
            entries.push((format!("{}{}", AREA_PREFIX, area.id), serde_json::to_vec(area)?));
        }
        for church in &hierarchy.churches {
            entries.push((format!("{}{}", CHURCH_PREFIX, church.id), serde_json::to_vec(church)?));
        }
        for group in &hierarchy.groups {
            entries.push((format!("{}{}", GROUP_PREFIX, group.id), serde_json::to_vec(group)?));
        }
        for (actor_id, record) in &snapshot.actors {
            entries.push((format!("{}{}", ACTOR_PREFIX, actor_id), serde_json::to_vec(record)?));
        }
        for row in &snapshot.permissions {
            entries.push((permission_key(row), serde_json::to_vec(row)?));
        }

        let write_txn = self.db.begin_write().map_err(storage)?;
        {
            let mut table = write_txn.open_table(TABLE).map_err(storage)?;
            for (key, value) in &entries {
                table.insert(key.as_str(), value.as_slice()).map_err(storage)?;
            }
        }
        write_txn.commit().map_err(storage)?;

        info!(entries = entries.len(), "directory snapshot imported");
        Ok(entries.len())
    }

    pub fn put_actor(&self, actor_id: &str, record: &ActorRecord) -> Result<(), ScopeError> {
        self.put(&format!("{}{}", ACTOR_PREFIX, actor_id), record)
    }

    fn put<T: Serialize>(&self, key: &str, value: &T) -> Result<(), ScopeError> {
        let bytes = serde_json::to_vec(value)?;
        let write_txn = self.db.begin_write().map_err(storage)?;
        {
            let mut table = write_txn.open_table(TABLE).map_err(storage)?;
            table.insert(key, bytes.as_slice()).map_err(storage)?;
        }
        write_txn.commit().map_err(storage)?;
        Ok(())
    }

    fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ScopeError> {
        let read_txn = self.db.begin_read().map_err(storage)?;
        let table = read_txn.open_table(TABLE).map_err(storage)?;
        let value = table.get(key).map_err(storage)?;
        match value {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Decode every value under `prefix`, in key order.
    fn scan<T: DeserializeOwned>(&self, prefix: &str) -> Result<Vec<T>, ScopeError> {
        let read_txn = self.db.begin_read().map_err(storage)?;
        let table = read_txn.open_table(TABLE).map_err(storage)?;

        let mut results = Vec::new();
        for entry in table.range(prefix..).map_err(storage)? {
            let (key, value) = entry.map_err(storage)?;
            if !key.value().starts_with(prefix) {
                break;
            }
            results.push(serde_json::from_slice(value.value())?);
        }
        Ok(results)
    }

    fn actor(&self, actor_id: &str) -> Result<Option<ActorRecord>, ScopeError> {
        self.get(&format!("{}{}", ACTOR_PREFIX, actor_id))
    }
}

fn permission_key(row: &PermissionRow) -> String {
    format!("{}{}:{}", PERMISSION_PREFIX, row.role, row.module)
}

impl Directory for KvDirectory {
    fn load_hierarchy(&self) -> Result<HierarchySnapshot, ScopeError> {
        Ok(HierarchySnapshot {
            regions: self.scan(REGION_PREFIX)?,
            areas: self.scan(AREA_PREFIX)?,
            churches: self.scan(CHURCH_PREFIX)?,
            groups: self.scan(GROUP_PREFIX)?,
        })
    }

    fn load_roles(&self, actor_id: &str) -> Result<RoleSet, ScopeError> {
        self.actor(actor_id)?
            .map(|a| a.roles)
            .ok_or_else(|| ScopeError::NotFound(format!("actor '{}'", actor_id)))
    }

    fn load_profile(&self, actor_id: &str) -> Result<ActorProfile, ScopeError> {
        Ok(self.actor(actor_id)?.map(|a| a.profile).unwrap_or_default())
    }

    fn load_group_assignments(&self, actor_id: &str) -> Result<Vec<String>, ScopeError> {
        Ok(self.actor(actor_id)?.map(|a| a.groups).unwrap_or_default())
    }

    fn load_permission_rows(&self, roles: &RoleSet) -> Result<Vec<PermissionRow>, ScopeError> {
        let mut rows = Vec::new();
        for role in roles.iter() {
            rows.extend(self.scan::<PermissionRow>(&format!("{}{}:", PERMISSION_PREFIX, role))?);
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Area, Church, Group, Module, Region, Role};

    fn open() -> (tempfile::TempDir, KvDirectory) {
        let tmp = tempfile::TempDir::new().unwrap();
        let dir = KvDirectory::open(&tmp.path().join("scope.redb")).unwrap();
        (tmp, dir)
    }

    fn snapshot() -> DirectorySnapshot {
        let mut snapshot = DirectorySnapshot::default();
        snapshot.hierarchy = HierarchySnapshot {
            regions: vec![Region::new("R1", "Norte")],
            areas: vec![Area::new("A1", "Centro", "R1")],
            churches: vec![Church::new("C1", "Sede", Some("A1"), None)],
            groups: vec![Group::new("G1", "Jovens", "C1", Some("d1"))],
        };
        snapshot.actors.insert(
            "d1".into(),
            ActorRecord {
                roles: RoleSet::from([Role::Diacono]),
                profile: ActorProfile::new(Some("R1"), Some("A1"), Some("C1")),
                groups: vec!["G1".into()],
            },
        );
        snapshot.permissions.push(PermissionRow {
            role: Role::Diacono,
            module: Module::Frequencia,
            can_view: true,
            can_create: true,
            can_edit: false,
            can_delete: false,
        });
        snapshot
    }

    #[test]
    fn import_then_load() {
        let (_tmp, dir) = open();
        assert_eq!(dir.import(&snapshot()).unwrap(), 6);

        let hierarchy = dir.load_hierarchy().unwrap();
        assert_eq!(hierarchy, snapshot().hierarchy);

        assert_eq!(dir.load_roles("d1").unwrap(), RoleSet::from([Role::Diacono]));
        assert_eq!(dir.load_profile("d1").unwrap().church_id.as_deref(), Some("C1"));
        assert_eq!(dir.load_group_assignments("d1").unwrap(), vec!["G1"]);

        let rows = dir.load_permission_rows(&RoleSet::from([Role::Diacono, Role::User])).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].module, Module::Frequencia);
    }

    #[test]
    fn missing_actor() {
        let (_tmp, dir) = open();
        assert!(matches!(dir.load_roles("ghost"), Err(ScopeError::NotFound(_))));
        assert_eq!(dir.load_profile("ghost").unwrap(), ActorProfile::default());
    }

    #[test]
    fn role_prefix_does_not_leak_into_longer_tags() {
        // "pastor:" must not match rows stored for "pastor_regiao".
        let (_tmp, dir) = open();
        let mut snapshot = DirectorySnapshot::default();
        for role in [Role::Pastor, Role::PastorRegiao] {
            snapshot.permissions.push(PermissionRow {
                role,
                module: Module::Igrejas,
                can_view: true,
                can_create: false,
                can_edit: false,
                can_delete: false,
            });
        }
        dir.import(&snapshot).unwrap();
        let rows = dir.load_permission_rows(&RoleSet::from([Role::Pastor])).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].role, Role::Pastor);
    }

    #[test]
    fn put_actor_overwrites() {
        let (_tmp, dir) = open();
        dir.import(&snapshot()).unwrap();
        dir.put_actor("d1", &ActorRecord { roles: RoleSet::from([Role::User]), ..Default::default() })
            .unwrap();
        assert_eq!(dir.load_roles("d1").unwrap(), RoleSet::from([Role::User]));
        assert!(dir.load_group_assignments("d1").unwrap().is_empty());
    }
}

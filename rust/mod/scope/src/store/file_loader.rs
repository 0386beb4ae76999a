use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::ScopeError;
use crate::store::{ActorRecord, DirectorySnapshot};

/// Load a directory snapshot from JSON files in `data_dir`:
///
/// ```text
/// data-dir/
/// ├── hierarchy.json     → { regions, areas, churches, groups }
/// ├── actors.json        → { "<actor-id>": { roles, region_id?, area_id?, church_id?, groups } }
/// └── permissions.json   → [ { role, module, can_view, can_create, can_edit, can_delete } ]
/// ```
///
/// Missing files (or a missing directory) contribute nothing.
pub fn load_data_dir(data_dir: &Path) -> Result<DirectorySnapshot, ScopeError> {
    if !data_dir.is_dir() {
        debug!("data dir {:?} does not exist, skipping", data_dir);
        return Ok(DirectorySnapshot::default());
    }

    let snapshot = DirectorySnapshot {
        hierarchy: read_json(&data_dir.join("hierarchy.json"))?.unwrap_or_default(),
        actors: read_json::<BTreeMap<String, ActorRecord>>(&data_dir.join("actors.json"))?
            .unwrap_or_default(),
        permissions: read_json(&data_dir.join("permissions.json"))?.unwrap_or_default(),
    };

    debug!(
        regions = snapshot.hierarchy.regions.len(),
        actors = snapshot.actors.len(),
        permissions = snapshot.permissions.len(),
        "loaded data dir {:?}",
        data_dir
    );
    Ok(snapshot)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, ScopeError> {
    if !path.is_file() {
        return Ok(None);
    }
    let data = fs::read(path)?;
    serde_json::from_slice(&data)
        .map(Some)
        .map_err(|e| ScopeError::Serialization(format!("{}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Module, Role};

    #[test]
    fn missing_dir_is_empty() {
        let tmp = tempfile::TempDir::new().unwrap();
        let snapshot = load_data_dir(&tmp.path().join("nope")).unwrap();
        assert_eq!(snapshot, DirectorySnapshot::default());
    }

    #[test]
    fn loads_all_three_files() {
        let tmp = tempfile::TempDir::new().unwrap();
        fs::write(
            tmp.path().join("hierarchy.json"),
            r#"{"regions":[{"id":"R1","name":"Norte"}],
                "churches":[{"id":"C9","name":"Porto","region_id":"R1"}],
                "groups":[{"id":"G1","name":"Jovens","church_id":"C9"}]}"#,
        )
        .unwrap();
        fs::write(
            tmp.path().join("actors.json"),
            r#"{"u1":{"roles":["user"],"church_id":"C9","groups":["G1"]}}"#,
        )
        .unwrap();
        fs::write(
            tmp.path().join("permissions.json"),
            r#"[{"role":"user","module":"frequencia","can_view":true}]"#,
        )
        .unwrap();

        let snapshot = load_data_dir(tmp.path()).unwrap();
        assert_eq!(snapshot.hierarchy.churches[0].region_id.as_deref(), Some("R1"));
        let u1 = &snapshot.actors["u1"];
        assert!(u1.roles.contains(&Role::User));
        assert_eq!(u1.profile.church_id.as_deref(), Some("C9"));
        assert_eq!(u1.groups, vec!["G1"]);
        assert_eq!(snapshot.permissions[0].module, Module::Frequencia);
    }

    #[test]
    fn partial_dir_loads_what_exists() {
        let tmp = tempfile::TempDir::new().unwrap();
        fs::write(tmp.path().join("permissions.json"), "[]").unwrap();
        let snapshot = load_data_dir(tmp.path()).unwrap();
        assert!(snapshot.hierarchy.regions.is_empty());
        assert!(snapshot.actors.is_empty());
    }

    #[test]
    fn malformed_file_names_the_path() {
        let tmp = tempfile::TempDir::new().unwrap();
        fs::write(tmp.path().join("actors.json"), "{not json").unwrap();
        let err = load_data_dir(tmp.path()).unwrap_err();
        assert!(matches!(&err, ScopeError::Serialization(msg) if msg.contains("actors.json")));
    }
}

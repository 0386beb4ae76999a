use serde::{Deserialize, Serialize};

/// Top level of the organization. Has no parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub id: String,
    pub name: String,
}

/// A subdivision of exactly one Region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Area {
    pub id: String,
    pub name: String,
    pub region_id: String,
}

/// A local church.
///
/// The Area is optional: a church may hang directly off a Region. When both
/// are set, `region_id` is expected to equal the Area's region; if it does
/// not, the explicit `region_id` wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Church {
    pub id: String,
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_id: Option<String>,
}

/// A small group inside exactly one Church.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    pub name: String,
    pub church_id: String,

    /// Actor id of the group's single owner, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsible_id: Option<String>,
}

/// Full hierarchy as returned by the directory, in storage order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchySnapshot {
    #[serde(default)]
    pub regions: Vec<Region>,
    #[serde(default)]
    pub areas: Vec<Area>,
    #[serde(default)]
    pub churches: Vec<Church>,
    #[serde(default)]
    pub groups: Vec<Group>,
}

impl Region {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
        }
    }
}

impl Area {
    pub fn new(id: &str, name: &str, region_id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            region_id: region_id.to_string(),
        }
    }
}

impl Church {
    pub fn new(id: &str, name: &str, area_id: Option<&str>, region_id: Option<&str>) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            area_id: area_id.map(str::to_string),
            region_id: region_id.map(str::to_string),
        }
    }
}

impl Group {
    pub fn new(id: &str, name: &str, church_id: &str, responsible_id: Option<&str>) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            church_id: church_id.to_string(),
            responsible_id: responsible_id.map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn church_without_area_deserializes() {
        let church: Church =
            serde_json::from_str(r#"{"id":"C1","name":"Sede","region_id":"R1"}"#).unwrap();
        assert_eq!(church.area_id, None);
        assert_eq!(church.region_id.as_deref(), Some("R1"));
    }

    #[test]
    fn snapshot_sections_default_to_empty() {
        let snapshot: HierarchySnapshot =
            serde_json::from_str(r#"{"regions":[{"id":"R1","name":"Norte"}]}"#).unwrap();
        assert_eq!(snapshot.regions.len(), 1);
        assert!(snapshot.areas.is_empty());
        assert!(snapshot.groups.is_empty());
    }
}

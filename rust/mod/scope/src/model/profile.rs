use serde::{Deserialize, Serialize};

/// Organizational home of an actor, independent of role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub church_id: Option<String>,
}

impl ActorProfile {
    pub fn new(region_id: Option<&str>, area_id: Option<&str>, church_id: Option<&str>) -> Self {
        Self {
            region_id: region_id.map(str::to_string),
            area_id: area_id.map(str::to_string),
            church_id: church_id.map(str::to_string),
        }
    }
}

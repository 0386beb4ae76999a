//! In-memory view of the Region → Area → Church → Group tree.
//!
//! Built once from a [`HierarchySnapshot`] and read by the lock resolver and
//! the cascade filter. Dangling parent ids are tolerated: a node whose parent
//! cannot be resolved simply has no parent for filtering purposes.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use tracing::warn;

use crate::model::{Area, Church, Group, HierarchySnapshot, Region};

/// A data-quality condition found in the snapshot. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HierarchyIssue {
    /// Church.region_id disagrees with its Area's region. The church's own
    /// field is trusted.
    ChurchRegionMismatch {
        church_id: String,
        church_region: String,
        area_region: String,
    },
    AreaWithoutRegion { area_id: String, region_id: String },
    ChurchWithoutArea { church_id: String, area_id: String },
    ChurchWithoutRegion { church_id: String, region_id: String },
    GroupWithoutChurch { group_id: String, church_id: String },
}

impl fmt::Display for HierarchyIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HierarchyIssue::ChurchRegionMismatch { church_id, church_region, area_region } => write!(
                f,
                "church '{}' is in region '{}' but its area is in region '{}'",
                church_id, church_region, area_region
            ),
            HierarchyIssue::AreaWithoutRegion { area_id, region_id } => {
                write!(f, "area '{}' references missing region '{}'", area_id, region_id)
            }
            HierarchyIssue::ChurchWithoutArea { church_id, area_id } => {
                write!(f, "church '{}' references missing area '{}'", church_id, area_id)
            }
            HierarchyIssue::ChurchWithoutRegion { church_id, region_id } => {
                write!(f, "church '{}' references missing region '{}'", church_id, region_id)
            }
            HierarchyIssue::GroupWithoutChurch { group_id, church_id } => {
                write!(f, "group '{}' references missing church '{}'", group_id, church_id)
            }
        }
    }
}

/// Ancestor chain of a group, as far as it can be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupAncestors<'a> {
    pub church: Option<&'a Church>,
    pub area: Option<&'a Area>,
    pub region: Option<&'a Region>,
}

/// Indexed, immutable hierarchy. Iteration follows snapshot order.
#[derive(Debug, Clone, Default)]
pub struct HierarchyGraph {
    regions: Vec<Region>,
    areas: Vec<Area>,
    churches: Vec<Church>,
    groups: Vec<Group>,
    region_idx: HashMap<String, usize>,
    area_idx: HashMap<String, usize>,
    church_idx: HashMap<String, usize>,
    group_idx: HashMap<String, usize>,
}

fn index_by<T>(items: &[T], id: impl Fn(&T) -> &str) -> HashMap<String, usize> {
    let mut idx = HashMap::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        // First occurrence wins on duplicate ids.
        idx.entry(id(item).to_string()).or_insert(i);
    }
    idx
}

impl HierarchyGraph {
    pub fn from_snapshot(snapshot: HierarchySnapshot) -> Self {
        let HierarchySnapshot { regions, areas, churches, groups } = snapshot;
        let graph = Self {
            region_idx: index_by(&regions, |r| r.id.as_str()),
            area_idx: index_by(&areas, |a| a.id.as_str()),
            church_idx: index_by(&churches, |c| c.id.as_str()),
            group_idx: index_by(&groups, |g| g.id.as_str()),
            regions,
            areas,
            churches,
            groups,
        };
        for issue in graph.issues() {
            warn!(%issue, "inconsistent hierarchy data");
        }
        graph
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn areas(&self) -> &[Area] {
        &self.areas
    }

    pub fn churches(&self) -> &[Church] {
        &self.churches
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn region(&self, id: &str) -> Option<&Region> {
        self.region_idx.get(id).map(|&i| &self.regions[i])
    }

    pub fn area(&self, id: &str) -> Option<&Area> {
        self.area_idx.get(id).map(|&i| &self.areas[i])
    }

    pub fn church(&self, id: &str) -> Option<&Church> {
        self.church_idx.get(id).map(|&i| &self.churches[i])
    }

    pub fn group(&self, id: &str) -> Option<&Group> {
        self.group_idx.get(id).map(|&i| &self.groups[i])
    }

    /// Region a church belongs to.
    ///
    /// The church's own `region_id` is authoritative. Without it, the region
    /// is inferred through the church's area, if that area exists.
    pub fn effective_region_of_church<'a>(&'a self, church: &'a Church) -> Option<&'a str> {
        if let Some(region_id) = church.region_id.as_deref() {
            return Some(region_id);
        }
        church
            .area_id
            .as_deref()
            .and_then(|area_id| self.area(area_id))
            .map(|area| area.region_id.as_str())
    }

    pub fn ancestors_of_group(&self, group_id: &str) -> Option<GroupAncestors<'_>> {
        let group = self.group(group_id)?;
        let church = self.church(&group.church_id);
        let area = church
            .and_then(|c| c.area_id.as_deref())
            .and_then(|id| self.area(id));
        let region = church
            .and_then(|c| self.effective_region_of_church(c))
            .and_then(|id| self.region(id));
        Some(GroupAncestors { church, area, region })
    }

    /// First group in `church_id` whose responsible is `actor_id`.
    pub fn group_owned_by(&self, actor_id: &str, church_id: &str) -> Option<&Group> {
        self.groups
            .iter()
            .find(|g| g.church_id == church_id && g.responsible_id.as_deref() == Some(actor_id))
    }

    /// Every inconsistency in the snapshot, in a stable order.
    pub fn issues(&self) -> Vec<HierarchyIssue> {
        let mut issues = Vec::new();

        for area in &self.areas {
            if self.region(&area.region_id).is_none() {
                issues.push(HierarchyIssue::AreaWithoutRegion {
                    area_id: area.id.clone(),
                    region_id: area.region_id.clone(),
                });
            }
        }

        for church in &self.churches {
            let area = match church.area_id.as_deref() {
                Some(area_id) => {
                    let area = self.area(area_id);
                    if area.is_none() {
                        issues.push(HierarchyIssue::ChurchWithoutArea {
                            church_id: church.id.clone(),
                            area_id: area_id.to_string(),
                        });
                    }
                    area
                }
                None => None,
            };
            if let Some(region_id) = church.region_id.as_deref() {
                if self.region(region_id).is_none() {
                    issues.push(HierarchyIssue::ChurchWithoutRegion {
                        church_id: church.id.clone(),
                        region_id: region_id.to_string(),
                    });
                }
                if let Some(area) = area {
                    if area.region_id != region_id {
                        issues.push(HierarchyIssue::ChurchRegionMismatch {
                            church_id: church.id.clone(),
                            church_region: region_id.to_string(),
                            area_region: area.region_id.clone(),
                        });
                    }
                }
            }
        }

        for group in &self.groups {
            if self.church(&group.church_id).is_none() {
                issues.push(HierarchyIssue::GroupWithoutChurch {
                    group_id: group.id.clone(),
                    church_id: group.church_id.clone(),
                });
            }
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph() -> HierarchyGraph {
        HierarchyGraph::from_snapshot(HierarchySnapshot {
            regions: vec![Region::new("R1", "Norte"), Region::new("R2", "Sul")],
            areas: vec![Area::new("A1", "Centro", "R1"), Area::new("A2", "Litoral", "R2")],
            churches: vec![
                Church::new("C1", "Sede", Some("A1"), Some("R1")),
                Church::new("C2", "Vila", Some("A1"), None),
                Church::new("C3", "Porto", None, Some("R2")),
                Church::new("C4", "Errada", Some("A2"), Some("R1")),
            ],
            groups: vec![
                Group::new("G1", "Jovens", "C1", Some("u1")),
                Group::new("G2", "Casais", "C2", None),
                Group::new("G9", "Orfao", "C404", None),
            ],
        })
    }

    #[test]
    fn region_is_inferred_through_area() {
        let g = graph();
        let c2 = g.church("C2").unwrap();
        assert_eq!(g.effective_region_of_church(c2), Some("R1"));
        let c3 = g.church("C3").unwrap();
        assert_eq!(g.effective_region_of_church(c3), Some("R2"));
    }

    #[test]
    fn explicit_church_region_wins_over_area() {
        let g = graph();
        let c4 = g.church("C4").unwrap();
        assert_eq!(g.effective_region_of_church(c4), Some("R1"));
    }

    #[test]
    fn ancestors_walk_up_to_region() {
        let g = graph();
        let anc = g.ancestors_of_group("G2").unwrap();
        assert_eq!(anc.church.map(|c| c.id.as_str()), Some("C2"));
        assert_eq!(anc.area.map(|a| a.id.as_str()), Some("A1"));
        assert_eq!(anc.region.map(|r| r.id.as_str()), Some("R1"));

        let orphan = g.ancestors_of_group("G9").unwrap();
        assert!(orphan.church.is_none() && orphan.region.is_none());
        assert!(g.ancestors_of_group("nope").is_none());
    }

    #[test]
    fn owned_group_must_be_in_the_given_church() {
        let g = graph();
        assert_eq!(g.group_owned_by("u1", "C1").map(|g| g.id.as_str()), Some("G1"));
        assert!(g.group_owned_by("u1", "C2").is_none());
        assert!(g.group_owned_by("u2", "C1").is_none());
    }

    #[test]
    fn issues_report_mismatch_and_dangling_parents() {
        let issues = graph().issues();
        assert_eq!(issues.len(), 2);
        assert!(issues.contains(&HierarchyIssue::ChurchRegionMismatch {
            church_id: "C4".into(),
            church_region: "R1".into(),
            area_region: "R2".into(),
        }));
        assert!(issues.contains(&HierarchyIssue::GroupWithoutChurch {
            group_id: "G9".into(),
            church_id: "C404".into(),
        }));
    }

    #[test]
    fn duplicate_ids_keep_first_occurrence() {
        let g = HierarchyGraph::from_snapshot(HierarchySnapshot {
            regions: vec![Region::new("R1", "First"), Region::new("R1", "Second")],
            ..Default::default()
        });
        assert_eq!(g.region("R1").unwrap().name, "First");
    }
}

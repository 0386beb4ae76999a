//! Candidate filtering and cascading resets across hierarchy levels.
//!
//! Setters are pure: they take a selection and return the next one. A write
//! is ignored when the level is locked or the value is not among the level's
//! current candidates. After an accepted write, every unlocked level below
//! it whose value left its candidate set is reset to `all`.

use tracing::debug;

use crate::hierarchy::HierarchyGraph;
use crate::model::{Area, Choice, Church, Group, Level, Region, ScopeSelection};

#[derive(Debug, Clone, Copy)]
pub struct CascadeFilter<'g> {
    graph: &'g HierarchyGraph,
}

impl<'g> CascadeFilter<'g> {
    pub fn new(graph: &'g HierarchyGraph) -> Self {
        Self { graph }
    }

    /// All regions, or only the locked one.
    pub fn candidate_regions(&self, sel: &ScopeSelection) -> impl Iterator<Item = &'g Region> + use<'g> {
        let locked = match (&sel.region, sel.locks.region) {
            (Choice::Id(id), true) => Some(id.clone()),
            _ => None,
        };
        self.graph
            .regions()
            .iter()
            .filter(move |r| locked.as_deref().is_none_or(|id| r.id == id))
    }

    pub fn candidate_areas(&self, sel: &ScopeSelection) -> impl Iterator<Item = &'g Area> + use<'g> {
        let region = sel.region.as_id().map(str::to_string);
        self.graph
            .areas()
            .iter()
            .filter(move |a| region.as_deref().is_none_or(|id| a.region_id == id))
    }

    /// Area filter first, then region. The region match goes through the
    /// church's effective region, so a church with only an area still shows
    /// up under that area's region.
    pub fn candidate_churches(&self, sel: &ScopeSelection) -> impl Iterator<Item = &'g Church> + use<'g> {
        let area = sel.area.as_id().map(str::to_string);
        let region = sel.region.as_id().map(str::to_string);
        let graph = self.graph;
        graph.churches().iter().filter(move |c| match (&area, &region) {
            (Some(area), _) => c.area_id.as_deref() == Some(area.as_str()),
            (None, Some(region)) => graph.effective_region_of_church(c) == Some(region.as_str()),
            (None, None) => true,
        })
    }

    /// Only the locked group when the group level is locked. Otherwise the
    /// restricted list in assignment order if one was fixed at resolution,
    /// regardless of the church. Otherwise the groups of the selected
    /// church, or all.
    pub fn candidate_groups(&self, sel: &ScopeSelection) -> impl Iterator<Item = &'g Group> + use<'g> {
        let graph = self.graph;
        let groups: Vec<&'g Group> = match (&sel.group, sel.locks.group, &sel.restricted_groups) {
            (Choice::Id(id), true, _) => graph.group(id).into_iter().collect(),
            (_, _, Some(ids)) => ids.iter().filter_map(|id| graph.group(id)).collect(),
            (_, _, None) => match sel.church.as_id() {
                Some(church) => graph.groups().iter().filter(|g| g.church_id == church).collect(),
                None => graph.groups().iter().collect(),
            },
        };
        groups.into_iter()
    }

    fn is_candidate(&self, sel: &ScopeSelection, level: Level, id: &str) -> bool {
        match level {
            Level::Region => self.candidate_regions(sel).any(|r| r.id == id),
            Level::Area => self.candidate_areas(sel).any(|a| a.id == id),
            Level::Church => self.candidate_churches(sel).any(|c| c.id == id),
            Level::Group => self.candidate_groups(sel).any(|g| g.id == id),
        }
    }

    pub fn set_region(&self, sel: &ScopeSelection, value: Choice) -> ScopeSelection {
        self.set(sel, Level::Region, value)
    }

    pub fn set_area(&self, sel: &ScopeSelection, value: Choice) -> ScopeSelection {
        self.set(sel, Level::Area, value)
    }

    pub fn set_church(&self, sel: &ScopeSelection, value: Choice) -> ScopeSelection {
        self.set(sel, Level::Church, value)
    }

    pub fn set_group(&self, sel: &ScopeSelection, value: Choice) -> ScopeSelection {
        self.set(sel, Level::Group, value)
    }

    pub fn set(&self, sel: &ScopeSelection, level: Level, value: Choice) -> ScopeSelection {
        if *sel.choice(level) == value {
            return sel.clone();
        }
        if sel.locks.is_locked(level) {
            debug!(?level, %value, "write to locked level ignored");
            return sel.clone();
        }
        if let Choice::Id(id) = &value {
            if !self.is_candidate(sel, level, id) {
                debug!(?level, %value, "value outside candidate set ignored");
                return sel.clone();
            }
        }

        let mut next = sel.clone();
        *choice_mut(&mut next, level) = value;
        self.reset_descendants(&mut next, level);
        next
    }

    fn reset_descendants(&self, sel: &mut ScopeSelection, changed: Level) {
        for level in descendants(changed) {
            if sel.locks.is_locked(*level) {
                continue;
            }
            let stale = match sel.choice(*level).as_id() {
                Some(id) => !self.is_candidate(sel, *level, id),
                None => false,
            };
            if stale {
                debug!(level = ?*level, "descendant selection reset");
                *choice_mut(sel, *level) = Choice::All;
            }
        }
    }
}

fn descendants(level: Level) -> &'static [Level] {
    match level {
        Level::Region => &[Level::Area, Level::Church, Level::Group],
        Level::Area => &[Level::Church, Level::Group],
        Level::Church => &[Level::Group],
        Level::Group => &[],
    }
}

fn choice_mut(sel: &mut ScopeSelection, level: Level) -> &mut Choice {
    match level {
        Level::Region => &mut sel.region,
        Level::Area => &mut sel.area,
        Level::Church => &mut sel.church,
        Level::Group => &mut sel.group,
    }
}

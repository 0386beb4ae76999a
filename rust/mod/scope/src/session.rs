//! Per-actor selection state.
//!
//! A session is resolved once and then mutated only through the cascade
//! setters. Lock flags and the restricted group list never change after
//! construction. Sessions are not shared between actors.

use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use crate::cascade::CascadeFilter;
use crate::hierarchy::HierarchyGraph;
use crate::lock::{LockInput, LockRule, Resolution, ScopeLockResolver};
use crate::model::{
    ActorProfile, Area, Choice, Church, Group, Level, LockFlags, Region, RoleSet, ScopeSelection,
};

#[derive(Debug, Clone)]
pub struct ScopeSession {
    graph: Arc<HierarchyGraph>,
    rule: LockRule,
    selection: ScopeSelection,
}

/// Serializable snapshot of a session: selection, locks and candidate ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionView {
    pub rule: LockRule,
    pub selection: ScopeSelection,
    pub regions: Vec<String>,
    pub areas: Vec<String>,
    pub churches: Vec<String>,
    pub groups: Vec<String>,
}

impl ScopeSession {
    /// Resolve the initial selection for an actor against a hierarchy.
    pub fn start(
        graph: Arc<HierarchyGraph>,
        actor_id: &str,
        roles: &RoleSet,
        profile: &ActorProfile,
        assignments: &[String],
    ) -> Self {
        let owned_group = |church_id: &str| {
            graph
                .group_owned_by(actor_id, church_id)
                .map(|g| g.id.clone())
        };
        let resolution = ScopeLockResolver::resolve(&LockInput {
            roles,
            profile,
            assignments,
            owned_group: &owned_group,
        });
        Self::from_resolution(graph, resolution)
    }

    /// Assigned groups missing from the hierarchy are dropped here, so the
    /// preselected group is always one of the candidates.
    pub fn from_resolution(graph: Arc<HierarchyGraph>, resolution: Resolution) -> Self {
        let mut selection = resolution.selection;
        prune_restricted(&graph, &mut selection);
        Self {
            graph,
            rule: resolution.rule,
            selection,
        }
    }

    pub fn rule(&self) -> LockRule {
        self.rule
    }

    pub fn selection(&self) -> &ScopeSelection {
        &self.selection
    }

    pub fn locks(&self) -> LockFlags {
        self.selection.locks
    }

    pub fn is_locked(&self, level: Level) -> bool {
        self.selection.locks.is_locked(level)
    }

    pub fn graph(&self) -> &HierarchyGraph {
        &self.graph
    }

    fn filter(&self) -> CascadeFilter<'_> {
        CascadeFilter::new(&self.graph)
    }

    pub fn candidate_regions(&self) -> impl Iterator<Item = &Region> {
        self.filter().candidate_regions(&self.selection)
    }

    pub fn candidate_areas(&self) -> impl Iterator<Item = &Area> {
        self.filter().candidate_areas(&self.selection)
    }

    pub fn candidate_churches(&self) -> impl Iterator<Item = &Church> {
        self.filter().candidate_churches(&self.selection)
    }

    pub fn candidate_groups(&self) -> impl Iterator<Item = &Group> {
        self.filter().candidate_groups(&self.selection)
    }

    pub fn set_region(&mut self, value: impl Into<Choice>) -> &ScopeSelection {
        self.set(Level::Region, value.into())
    }

    pub fn set_area(&mut self, value: impl Into<Choice>) -> &ScopeSelection {
        self.set(Level::Area, value.into())
    }

    pub fn set_church(&mut self, value: impl Into<Choice>) -> &ScopeSelection {
        self.set(Level::Church, value.into())
    }

    pub fn set_group(&mut self, value: impl Into<Choice>) -> &ScopeSelection {
        self.set(Level::Group, value.into())
    }

    pub fn set(&mut self, level: Level, value: Choice) -> &ScopeSelection {
        let next = CascadeFilter::new(&self.graph).set(&self.selection, level, value);
        self.selection = next;
        &self.selection
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            rule: self.rule,
            selection: self.selection.clone(),
            regions: self.candidate_regions().map(|r| r.id.clone()).collect(),
            areas: self.candidate_areas().map(|a| a.id.clone()).collect(),
            churches: self.candidate_churches().map(|c| c.id.clone()).collect(),
            groups: self.candidate_groups().map(|g| g.id.clone()).collect(),
        }
    }
}

fn prune_restricted(graph: &HierarchyGraph, sel: &mut ScopeSelection) {
    let Some(ids) = sel.restricted_groups.as_mut() else {
        return;
    };
    let assigned = ids.len();
    ids.retain(|id| graph.group(id).is_some());
    if ids.len() < assigned {
        warn!(dropped = assigned - ids.len(), "assigned groups missing from hierarchy");
    }
    let preselected_ok = match sel.group.as_id() {
        Some(group) => ids.iter().any(|id| id == group),
        None => true,
    };
    if !preselected_ok {
        sel.group = ids.first().map_or(Choice::All, |id| Choice::id(id));
    }
}

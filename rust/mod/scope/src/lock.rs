//! Role-precedence lock resolution.
//!
//! [`LockRule::PRECEDENCE`] is the rule table: rules are tried top-down and
//! the first one that applies fixes the initial selection and lock flags for
//! the whole session. A rule whose required profile field is missing does
//! not apply, so resolution falls through to the next rule instead of
//! locking to an undefined value. [`LockRule::Open`] always applies.
//!
//! Only one rule is ever applied, even for an actor holding several roles.

use std::collections::HashSet;

use serde::Serialize;
use tracing::debug;

use crate::model::{ActorProfile, Choice, Level, LockFlags, Role, RoleSet, ScopeSelection};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LockRule {
    /// `admin` or `pastor_geral`: nothing locked.
    Unrestricted,
    /// `pastor_regiao` with a profile region.
    RegionPastor,
    /// `pastor_coordenador` with profile region and area.
    AreaCoordinator,
    /// `pastor` with profile region, area and church.
    ChurchPastor,
    /// Diaconal tier responsible for a group in its own church. Locks all four levels.
    GroupResponsible,
    /// Member tier with explicit group assignments. Group candidates are
    /// restricted to the assignments.
    AssignedGroups,
    /// Member tier with a church but no assignments.
    ChurchMember,
    /// Nothing else matched.
    Open,
}

/// What the resolver needs to know about one actor.
pub struct LockInput<'a> {
    pub roles: &'a RoleSet,
    pub profile: &'a ActorProfile,
    pub assignments: &'a [String],
    /// Looks up the group the actor is responsible for inside a church.
    pub owned_group: &'a dyn Fn(&str) -> Option<String>,
}

/// The applied rule and the selection it produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub rule: LockRule,
    pub selection: ScopeSelection,
}

impl LockRule {
    pub const PRECEDENCE: [LockRule; 8] = [
        LockRule::Unrestricted,
        LockRule::RegionPastor,
        LockRule::AreaCoordinator,
        LockRule::ChurchPastor,
        LockRule::GroupResponsible,
        LockRule::AssignedGroups,
        LockRule::ChurchMember,
        LockRule::Open,
    ];

    /// Returns the selection this rule produces, or `None` if it does not apply.
    pub fn apply(&self, input: &LockInput<'_>) -> Option<ScopeSelection> {
        let roles = input.roles;
        let profile = input.profile;
        match self {
            LockRule::Unrestricted => {
                (roles.contains(&Role::Admin) || roles.contains(&Role::PastorGeral))
                    .then(ScopeSelection::open)
            }
            LockRule::RegionPastor => {
                if !roles.contains(&Role::PastorRegiao) {
                    return None;
                }
                let region = profile.region_id.as_deref()?;
                Some(ScopeSelection {
                    region: Choice::id(region),
                    locks: LockFlags::down_to(Level::Region),
                    ..ScopeSelection::open()
                })
            }
            LockRule::AreaCoordinator => {
                if !roles.contains(&Role::PastorCoordenador) {
                    return None;
                }
                let region = profile.region_id.as_deref()?;
                let area = profile.area_id.as_deref()?;
                Some(ScopeSelection {
                    region: Choice::id(region),
                    area: Choice::id(area),
                    locks: LockFlags::down_to(Level::Area),
                    ..ScopeSelection::open()
                })
            }
            LockRule::ChurchPastor => {
                if !roles.contains(&Role::Pastor) {
                    return None;
                }
                let region = profile.region_id.as_deref()?;
                let area = profile.area_id.as_deref()?;
                let church = profile.church_id.as_deref()?;
                Some(ScopeSelection {
                    region: Choice::id(region),
                    area: Choice::id(area),
                    church: Choice::id(church),
                    locks: LockFlags::down_to(Level::Church),
                    ..ScopeSelection::open()
                })
            }
            LockRule::GroupResponsible => {
                if !roles.contains(&Role::Diacono) {
                    return None;
                }
                let church = profile.church_id.as_deref()?;
                let group = (input.owned_group)(church)?;
                Some(ScopeSelection {
                    group: Choice::Id(group),
                    locks: LockFlags::down_to(Level::Group),
                    ..member_church(profile, church)
                })
            }
            LockRule::AssignedGroups => {
                if !roles.any(Role::is_member_tier) {
                    return None;
                }
                let church = profile.church_id.as_deref()?;
                let assigned = dedup_assignments(input.assignments);
                let first = assigned.first()?.clone();
                Some(ScopeSelection {
                    group: Choice::Id(first),
                    restricted_groups: Some(assigned),
                    ..member_church(profile, church)
                })
            }
            LockRule::ChurchMember => {
                if !roles.any(Role::is_member_tier) {
                    return None;
                }
                let church = profile.church_id.as_deref()?;
                Some(member_church(profile, church))
            }
            LockRule::Open => Some(ScopeSelection::open()),
        }
    }
}

/// Region, area and church locked from the profile; missing region or area
/// stay `all` (still locked).
fn member_church(profile: &ActorProfile, church: &str) -> ScopeSelection {
    ScopeSelection {
        region: Choice::from_option(profile.region_id.as_deref()),
        area: Choice::from_option(profile.area_id.as_deref()),
        church: Choice::id(church),
        locks: LockFlags::down_to(Level::Church),
        ..ScopeSelection::open()
    }
}

fn dedup_assignments(assignments: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    assignments
        .iter()
        .filter(|id| !id.is_empty() && seen.insert(id.as_str()))
        .cloned()
        .collect()
}

/// Applies the precedence table to one actor.
pub struct ScopeLockResolver;

impl ScopeLockResolver {
    pub fn resolve(input: &LockInput<'_>) -> Resolution {
        for rule in LockRule::PRECEDENCE {
            if let Some(selection) = rule.apply(input) {
                debug!(?rule, ?selection, "scope lock resolved");
                return Resolution { rule, selection };
            }
        }
        // Open always applies; kept for totality.
        Resolution {
            rule: LockRule::Open,
            selection: ScopeSelection::open(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_owned(_: &str) -> Option<String> {
        None
    }

    fn resolve(roles: &[Role], profile: ActorProfile, assignments: &[&str]) -> Resolution {
        resolve_with(roles, profile, assignments, &no_owned)
    }

    fn resolve_with(
        roles: &[Role],
        profile: ActorProfile,
        assignments: &[&str],
        owned: &dyn Fn(&str) -> Option<String>,
    ) -> Resolution {
        let roles: RoleSet = roles.iter().cloned().collect();
        let assignments: Vec<String> = assignments.iter().map(|s| s.to_string()).collect();
        ScopeLockResolver::resolve(&LockInput {
            roles: &roles,
            profile: &profile,
            assignments: &assignments,
            owned_group: owned,
        })
    }

    fn full_profile() -> ActorProfile {
        ActorProfile::new(Some("R1"), Some("A1"), Some("C1"))
    }

    #[test]
    fn admin_and_pastor_geral_are_unrestricted() {
        for role in [Role::Admin, Role::PastorGeral] {
            let res = resolve(&[role], full_profile(), &["G1"]);
            assert_eq!(res.rule, LockRule::Unrestricted);
            assert_eq!(res.selection, ScopeSelection::open());
        }
    }

    #[test]
    fn region_pastor_locks_only_region() {
        let res = resolve(&[Role::PastorRegiao], full_profile(), &[]);
        assert_eq!(res.rule, LockRule::RegionPastor);
        let sel = res.selection;
        assert_eq!(sel.region, Choice::id("R1"));
        assert_eq!(sel.locks, LockFlags::down_to(Level::Region));
        assert!(sel.area.is_all() && sel.church.is_all() && sel.group.is_all());
    }

    #[test]
    fn coordinator_locks_region_and_area() {
        // Scenario A
        let res = resolve(
            &[Role::PastorCoordenador],
            ActorProfile::new(Some("R1"), Some("A1"), None),
            &[],
        );
        assert_eq!(res.rule, LockRule::AreaCoordinator);
        assert_eq!(
            res.selection,
            ScopeSelection {
                region: Choice::id("R1"),
                area: Choice::id("A1"),
                church: Choice::All,
                group: Choice::All,
                locks: LockFlags { region: true, area: true, church: false, group: false },
                restricted_groups: None,
            }
        );
    }

    #[test]
    fn pastor_locks_down_to_church() {
        let res = resolve(&[Role::Pastor], full_profile(), &[]);
        assert_eq!(res.rule, LockRule::ChurchPastor);
        assert_eq!(res.selection.church, Choice::id("C1"));
        assert_eq!(res.selection.locks, LockFlags::down_to(Level::Church));
    }

    #[test]
    fn missing_profile_field_falls_through() {
        let res = resolve(&[Role::PastorRegiao], ActorProfile::default(), &[]);
        assert_eq!(res.rule, LockRule::Open);

        // A pastor without an area is not a member tier either.
        let res = resolve(&[Role::Pastor], ActorProfile::new(Some("R1"), None, Some("C1")), &[]);
        assert_eq!(res.rule, LockRule::Open);

        // Falls from the regional rule down to the member rules.
        let res = resolve(&[Role::PastorRegiao, Role::User], ActorProfile::new(None, None, Some("C1")), &[]);
        assert_eq!(res.rule, LockRule::ChurchMember);
    }

    #[test]
    fn group_responsible_locks_all_four_levels() {
        let owned = |church: &str| (church == "C1").then(|| "G7".to_string());
        let res = resolve_with(&[Role::Diacono], full_profile(), &["G1", "G2"], &owned);
        assert_eq!(res.rule, LockRule::GroupResponsible);
        assert_eq!(res.selection.group, Choice::id("G7"));
        assert_eq!(res.selection.locks, LockFlags::down_to(Level::Group));
        assert_eq!(res.selection.restricted_groups, None);
    }

    #[test]
    fn non_diaconal_owner_is_not_group_locked() {
        let owned = |_: &str| Some("G7".to_string());
        let res = resolve_with(&[Role::User], full_profile(), &[], &owned);
        assert_eq!(res.rule, LockRule::ChurchMember);
    }

    #[test]
    fn assignments_restrict_group_candidates() {
        // Scenario B
        let res = resolve(&[Role::User], ActorProfile::new(None, None, Some("C9")), &["G1", "G2", "G1"]);
        assert_eq!(res.rule, LockRule::AssignedGroups);
        let sel = res.selection;
        assert_eq!(sel.church, Choice::id("C9"));
        assert!(sel.region.is_all() && sel.area.is_all());
        assert_eq!(sel.locks, LockFlags::down_to(Level::Church));
        assert_eq!(sel.group, Choice::id("G1"));
        assert_eq!(sel.restricted_groups, Some(vec!["G1".to_string(), "G2".to_string()]));
    }

    #[test]
    fn member_without_assignments_keeps_group_open() {
        let res = resolve(&[Role::Obreiro], full_profile(), &[]);
        assert_eq!(res.rule, LockRule::ChurchMember);
        assert_eq!(res.selection.locks, LockFlags::down_to(Level::Church));
        assert!(res.selection.group.is_all());
        assert!(res.selection.restricted_groups.is_none());
    }

    #[test]
    fn unknown_roles_resolve_as_members() {
        let roles = [Role::Unknown("tesoureiro".into())];
        let res = resolve(&roles, full_profile(), &[]);
        assert_eq!(res.rule, LockRule::ChurchMember);
    }

    #[test]
    fn first_matching_rule_wins_for_multi_role_actors() {
        let res = resolve(&[Role::Pastor, Role::PastorRegiao], full_profile(), &[]);
        assert_eq!(res.rule, LockRule::RegionPastor);
        assert!(!res.selection.locks.church);
    }

    #[test]
    fn no_roles_is_open() {
        let res = resolve(&[], full_profile(), &["G1"]);
        assert_eq!(res.rule, LockRule::Open);
        assert_eq!(res.selection, ScopeSelection::open());
    }
}

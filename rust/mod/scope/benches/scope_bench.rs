use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use scope::model::{
    ActorProfile, Area, Choice, Church, Group, HierarchySnapshot, Region, Role, RoleSet,
    ScopeSelection,
};
use scope::{CascadeFilter, HierarchyGraph, ScopeSession};

/// 10 regions × 10 areas × 10 churches × 10 groups.
fn large_graph() -> HierarchyGraph {
    let mut snapshot = HierarchySnapshot::default();
    for r in 0..10 {
        let region_id = format!("R{}", r);
        snapshot.regions.push(Region::new(&region_id, &region_id));
        for a in 0..10 {
            let area_id = format!("{}A{}", region_id, a);
            snapshot.areas.push(Area::new(&area_id, &area_id, &region_id));
            for c in 0..10 {
                let church_id = format!("{}C{}", area_id, c);
                // Every other church relies on its area for the region.
                let region = (c % 2 == 0).then_some(region_id.as_str());
                snapshot.churches.push(Church::new(&church_id, &church_id, Some(area_id.as_str()), region));
                for g in 0..10 {
                    let group_id = format!("{}G{}", church_id, g);
                    let owner = format!("u{}", g);
                    snapshot.groups.push(Group::new(&group_id, &group_id, &church_id, Some(owner.as_str())));
                }
            }
        }
    }
    HierarchyGraph::from_snapshot(snapshot)
}

fn bench_resolve(c: &mut Criterion) {
    let graph = Arc::new(large_graph());
    let roles = RoleSet::from([Role::Diacono]);
    let profile = ActorProfile::new(Some("R5"), Some("R5A5"), Some("R5A5C5"));
    let assignments: Vec<String> = Vec::new();

    c.bench_function("resolve_group_responsible", |b| {
        b.iter(|| {
            ScopeSession::start(
                Arc::clone(&graph),
                black_box("u9"),
                black_box(&roles),
                black_box(&profile),
                &assignments,
            )
        });
    });
}

fn bench_cascade(c: &mut Criterion) {
    let graph = large_graph();
    let filter = CascadeFilter::new(&graph);
    let sel = ScopeSelection {
        region: Choice::id("R3"),
        area: Choice::id("R3A3"),
        church: Choice::id("R3A3C3"),
        group: Choice::id("R3A3C3G3"),
        ..ScopeSelection::open()
    };

    c.bench_function("set_region_with_reset", |b| {
        b.iter(|| filter.set_region(black_box(&sel), Choice::id("R7")));
    });

    c.bench_function("candidate_churches_by_region", |b| {
        let by_region = ScopeSelection { region: Choice::id("R7"), ..ScopeSelection::open() };
        b.iter(|| filter.candidate_churches(black_box(&by_region)).count());
    });
}

criterion_group!(benches, bench_resolve, bench_cascade);
criterion_main!(benches);

//! Dependency graph validation and ordering.
//!
//! Validates the declared `depends_on` relation before anything starts:
//! duplicate names, references to unknown services, and cycles are all
//! configuration errors. Returns a deterministic topological order so
//! actors can be spawned upstream-first.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::RuntimeError;
use crate::services::ServiceSpec;

/// Validates the dependency relation and returns service names in topological
/// order (dependencies before dependents).
///
/// Checks run in a fixed sequence so the reported error is stable:
/// duplicates first, then unknown dependencies, then cycles.
pub(crate) fn validate(specs: &[ServiceSpec]) -> Result<Vec<String>, RuntimeError> {
    let mut known: BTreeSet<&str> = BTreeSet::new();
    for spec in specs {
        if !known.insert(spec.name()) {
            return Err(RuntimeError::DuplicateService {
                name: spec.name().to_string(),
            });
        }
    }

    for spec in specs {
        for dep in spec.depends_on() {
            if !known.contains(dep.as_str()) {
                return Err(RuntimeError::UnknownDependency {
                    service: spec.name().to_string(),
                    dependency: dep.clone(),
                });
            }
        }
    }

    // Kahn's algorithm with a sorted ready set for a deterministic order.
    let mut indegree: BTreeMap<&str, usize> = BTreeMap::new();
    let mut dependents: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for spec in specs {
        indegree.entry(spec.name()).or_insert(0);
        for dep in spec.depends_on() {
            *indegree.entry(spec.name()).or_insert(0) += 1;
            dependents
                .entry(dep.as_str())
                .or_default()
                .push(spec.name());
        }
    }

    let mut ready: BTreeSet<&str> = indegree
        .iter()
        .filter(|(_, deg)| **deg == 0)
        .map(|(name, _)| *name)
        .collect();

    let mut order = Vec::with_capacity(specs.len());
    while let Some(name) = ready.pop_first() {
        order.push(name.to_string());
        if let Some(downstream) = dependents.get(name) {
            for d in downstream {
                if let Some(deg) = indegree.get_mut(d) {
                    *deg -= 1;
                    if *deg == 0 {
                        ready.insert(d);
                    }
                }
            }
        }
    }

    if order.len() != specs.len() {
        let mut cycle: Vec<String> = indegree
            .into_iter()
            .filter(|(_, deg)| *deg > 0)
            .map(|(name, _)| name.to_string())
            .collect();
        cycle.sort();
        return Err(RuntimeError::CyclicDependency { cycle });
    }

    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ServiceSpec;

    fn spec(name: &str, deps: &[&str]) -> ServiceSpec {
        ServiceSpec::builder(name)
            .depends_on(deps.iter().copied())
            .build()
    }

    #[test]
    fn empty_graph_is_valid() {
        assert!(validate(&[]).unwrap().is_empty());
    }

    #[test]
    fn linear_chain_orders_upstream_first() {
        let specs = vec![spec("c", &["b"]), spec("a", &[]), spec("b", &["a"])];
        let order = validate(&specs).unwrap();
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    #[test]
    fn diamond_orders_dependencies_before_dependents() {
        let specs = vec![
            spec("top", &[]),
            spec("left", &["top"]),
            spec("right", &["top"]),
            spec("bottom", &["left", "right"]),
        ];
        let order = validate(&specs).unwrap();
        let pos = |n: &str| order.iter().position(|x| x == n).unwrap();
        assert!(pos("top") < pos("left"));
        assert!(pos("top") < pos("right"));
        assert!(pos("left") < pos("bottom"));
        assert!(pos("right") < pos("bottom"));
    }

    #[test]
    fn duplicate_names_rejected() {
        let specs = vec![spec("a", &[]), spec("a", &[])];
        match validate(&specs) {
            Err(RuntimeError::DuplicateService { name }) => assert_eq!(name, "a"),
            other => panic!("expected DuplicateService, got {other:?}"),
        }
    }

    #[test]
    fn unknown_dependency_rejected() {
        let specs = vec![spec("a", &["ghost"])];
        match validate(&specs) {
            Err(RuntimeError::UnknownDependency {
                service,
                dependency,
            }) => {
                assert_eq!(service, "a");
                assert_eq!(dependency, "ghost");
            }
            other => panic!("expected UnknownDependency, got {other:?}"),
        }
    }

    #[test]
    fn two_node_cycle_rejected() {
        let specs = vec![spec("a", &["b"]), spec("b", &["a"])];
        match validate(&specs) {
            Err(RuntimeError::CyclicDependency { cycle }) => {
                assert_eq!(cycle, vec!["a", "b"]);
            }
            other => panic!("expected CyclicDependency, got {other:?}"),
        }
    }

    #[test]
    fn self_cycle_rejected() {
        let specs = vec![spec("a", &["a"])];
        assert!(matches!(
            validate(&specs),
            Err(RuntimeError::CyclicDependency { .. })
        ));
    }

    #[test]
    fn cycle_report_excludes_healthy_branch() {
        let specs = vec![spec("ok", &[]), spec("x", &["y"]), spec("y", &["x"])];
        match validate(&specs) {
            Err(RuntimeError::CyclicDependency { cycle }) => {
                assert_eq!(cycle, vec!["x", "y"]);
            }
            other => panic!("expected CyclicDependency, got {other:?}"),
        }
    }
}

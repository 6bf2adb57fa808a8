use std::collections::BTreeSet;

use crate::config::OrderingKind;
use crate::error::{EngineError, Result};
use crate::service::Access;

/// What an ordering strategy knows about a registered service.
#[derive(Debug, Clone)]
pub struct ServiceInfo {
    pub name: String,
    pub access: Access,
}

/// Policy that turns the registered set into an execution plan.
///
/// `order` receives services in registration order and returns a permutation
/// of their indices.
pub trait OrderingStrategy {
    fn order(&self, services: &[ServiceInfo]) -> Result<Vec<usize>>;
}

/// Identity ordering: services run in registration order.
#[derive(Debug, Default, Copy, Clone)]
pub struct RegistrationOrder;

impl OrderingStrategy for RegistrationOrder {
    fn order(&self, services: &[ServiceInfo]) -> Result<Vec<usize>> {
        Ok((0..services.len()).collect())
    }
}

/// Topological ordering over declared component access.
///
/// A service that writes a component kind runs before every other service
/// that reads it without writing it. Services that both write the same kind
/// keep registration order relative to each other. Ties are broken by
/// registration index, so the result is deterministic.
#[derive(Debug, Default, Copy, Clone)]
pub struct DependencyOrder;

impl DependencyOrder {
    fn precedes(a: &Access, b: &Access) -> bool {
        a.writes
            .iter()
            .any(|k| b.is_read(k.id) && !b.is_written(k.id))
    }
}

impl OrderingStrategy for DependencyOrder {
    fn order(&self, services: &[ServiceInfo]) -> Result<Vec<usize>> {
        let n = services.len();
        let mut successors: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut indegree = vec![0usize; n];

        for (i, a) in services.iter().enumerate() {
            for (j, b) in services.iter().enumerate() {
                if i != j && Self::precedes(&a.access, &b.access) {
                    successors[i].push(j);
                    indegree[j] += 1;
                }
            }
        }

        let mut ready: BTreeSet<usize> = (0..n).filter(|&i| indegree[i] == 0).collect();
        let mut order = Vec::with_capacity(n);

        while let Some(i) = ready.pop_first() {
            order.push(i);
            for &j in &successors[i] {
                indegree[j] -= 1;
                if indegree[j] == 0 {
                    ready.insert(j);
                }
            }
        }

        if order.len() < n {
            // Unordered services downstream of a cycle are not part of it.
            let members = (0..n)
                .filter(|&i| indegree[i] > 0 && reaches_itself(i, &successors))
                .map(|i| services[i].name.clone())
                .collect();
            return Err(EngineError::DependencyCycle(members));
        }

        Ok(order)
    }
}

fn reaches_itself(start: usize, successors: &[Vec<usize>]) -> bool {
    let mut seen = vec![false; successors.len()];
    let mut stack = successors[start].clone();
    while let Some(i) = stack.pop() {
        if i == start {
            return true;
        }
        if !std::mem::replace(&mut seen[i], true) {
            stack.extend_from_slice(&successors[i]);
        }
    }
    false
}

/// Builds the strategy selected by configuration.
pub fn strategy_for(kind: OrderingKind) -> Box<dyn OrderingStrategy> {
    match kind {
        OrderingKind::Registration => Box::new(RegistrationOrder),
        OrderingKind::Dependency => Box::new(DependencyOrder),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::Component;

    struct Pos;
    impl Component for Pos {}
    struct Vel;
    impl Component for Vel {}

    fn info(name: &str, access: Access) -> ServiceInfo {
        ServiceInfo {
            name: name.to_string(),
            access,
        }
    }

    #[test]
    fn registration_order_is_identity() {
        let services = vec![info("a", Access::new()), info("b", Access::new())];
        assert_eq!(RegistrationOrder.order(&services).unwrap(), vec![0, 1]);
    }

    #[test]
    fn empty_set_orders_to_empty_plan() {
        assert!(DependencyOrder.order(&[]).unwrap().is_empty());
    }

    #[test]
    fn writer_runs_before_reader() {
        let services = vec![
            info("render", Access::new().reads::<Pos>()),
            info("motion", Access::new().reads::<Vel>().writes::<Pos>()),
        ];
        assert_eq!(DependencyOrder.order(&services).unwrap(), vec![1, 0]);
    }

    #[test]
    fn unrelated_services_keep_registration_order() {
        let services = vec![
            info("a", Access::new().reads::<Pos>()),
            info("b", Access::new().reads::<Vel>()),
            info("c", Access::new()),
        ];
        assert_eq!(DependencyOrder.order(&services).unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn shared_writers_do_not_form_a_cycle() {
        let services = vec![
            info("a", Access::new().reads::<Pos>().writes::<Pos>()),
            info("b", Access::new().reads::<Pos>().writes::<Pos>()),
        ];
        assert_eq!(DependencyOrder.order(&services).unwrap(), vec![0, 1]);
    }

    #[test]
    fn cycle_is_a_configuration_error() {
        let services = vec![
            info("ok", Access::new()),
            info("x", Access::new().reads::<Pos>().writes::<Vel>()),
            info("y", Access::new().reads::<Vel>().writes::<Pos>()),
        ];
        match DependencyOrder.order(&services) {
            Err(EngineError::DependencyCycle(names)) => {
                assert_eq!(names, vec!["x".to_string(), "y".to_string()]);
            }
            other => panic!("expected cycle, got {other:?}"),
        }
    }

    #[test]
    fn cycle_report_leaves_out_downstream_readers() {
        let services = vec![
            info("x", Access::new().reads::<Pos>().writes::<Vel>()),
            info("y", Access::new().reads::<Vel>().writes::<Pos>()),
            info("z", Access::new().reads::<Vel>()),
        ];
        match DependencyOrder.order(&services) {
            Err(EngineError::DependencyCycle(names)) => {
                assert_eq!(names, vec!["x".to_string(), "y".to_string()]);
            }
            other => panic!("expected cycle, got {other:?}"),
        }
    }
}

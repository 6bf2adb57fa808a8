use std::fmt;

use crate::config::{EngineConfig, FailurePolicy};
use crate::ecs::World;
use crate::error::{EngineError, Result, ServiceStage};
use crate::service::{Service, TickCtx};

use super::plan::{strategy_for, OrderingStrategy, RegistrationOrder, ServiceInfo};

/// Handle returned by [`Schedule::add_service`], used to remove the service.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ServiceId(u64);

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "service#{}", self.0)
    }
}

/// A failure recorded under [`FailurePolicy::Isolate`].
#[derive(Debug)]
pub struct ServiceFailure {
    pub service: String,
    pub stage: ServiceStage,
    pub error: anyhow::Error,
}

/// Outcome of one [`Schedule::update`].
#[derive(Debug, Default)]
pub struct TickReport {
    /// Services whose turn came up in the plan, including failed ones.
    pub services_run: usize,
    /// Successful `process_entity` calls across all services.
    pub entities_processed: usize,
    pub failures: Vec<ServiceFailure>,
}

impl TickReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Registered services plus the execution plan derived from them.
///
/// Invariant: `plan` is a permutation of `0..services.len()`.
pub struct Schedule {
    ids: Vec<ServiceId>,
    infos: Vec<ServiceInfo>,
    services: Vec<Box<dyn Service>>,
    plan: Vec<usize>,
    strategy: Box<dyn OrderingStrategy>,
    policy: FailurePolicy,
    next_id: u64,
}

impl Schedule {
    pub fn new() -> Self {
        Self::with_strategy(Box::new(RegistrationOrder), FailurePolicy::default())
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::with_strategy(strategy_for(config.ordering), config.failure_policy)
    }

    pub fn with_strategy(strategy: Box<dyn OrderingStrategy>, policy: FailurePolicy) -> Self {
        Self {
            ids: Vec::new(),
            infos: Vec::new(),
            services: Vec::new(),
            plan: Vec::new(),
            strategy,
            policy,
            next_id: 0,
        }
    }

    /// Registers a service and rebuilds the plan.
    ///
    /// If the ordering strategy rejects the new set, the service is not
    /// registered and the previous plan stays in place.
    pub fn add_service<S: Service + 'static>(&mut self, service: S) -> Result<ServiceId> {
        self.add_boxed(Box::new(service))
    }

    pub fn add_boxed(&mut self, service: Box<dyn Service>) -> Result<ServiceId> {
        let id = ServiceId(self.next_id);
        self.infos.push(ServiceInfo {
            name: service.name().to_string(),
            access: service.access(),
        });
        self.ids.push(id);
        self.services.push(service);

        if let Err(e) = self.rebuild() {
            self.infos.pop();
            self.ids.pop();
            self.services.pop();
            return Err(e);
        }

        self.next_id += 1;
        Ok(id)
    }

    /// Unregisters a service and rebuilds the plan. Returns `None` if `id`
    /// is not registered.
    pub fn remove_service(&mut self, id: ServiceId) -> Option<Box<dyn Service>> {
        let index = self.ids.iter().position(|&s| s == id)?;
        self.ids.remove(index);
        self.infos.remove(index);
        let service = self.services.remove(index);

        if let Err(e) = self.rebuild() {
            // Removing a node cannot introduce a cycle into a valid order;
            // fall back to registration order if a custom strategy disagrees.
            log::warn!("plan rebuild after removing {id} failed: {e}; using registration order");
            self.plan = (0..self.services.len()).collect();
        }
        Some(service)
    }

    /// Replaces the ordering strategy. On failure the old strategy and plan
    /// are kept.
    pub fn set_strategy(&mut self, strategy: Box<dyn OrderingStrategy>) -> Result<()> {
        let plan = strategy.order(&self.infos)?;
        self.strategy = strategy;
        self.plan = plan;
        Ok(())
    }

    pub fn set_failure_policy(&mut self, policy: FailurePolicy) {
        self.policy = policy;
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    pub fn contains(&self, id: ServiceId) -> bool {
        self.ids.contains(&id)
    }

    /// Service names in execution order.
    pub fn plan_names(&self) -> Vec<&str> {
        self.plan.iter().map(|&i| self.infos[i].name.as_str()).collect()
    }

    fn rebuild(&mut self) -> Result<()> {
        let plan = self.strategy.order(&self.infos)?;
        debug_assert_eq!(plan.len(), self.services.len());
        self.plan = plan;
        log::debug!("execution plan rebuilt: {:?}", self.plan_names());
        Ok(())
    }

    /// Runs every planned service over the world.
    ///
    /// For each service in plan order, `pre_pass` runs once, then
    /// `process_entity` for every eligible entity in creation order, before
    /// the next service starts.
    pub fn update(
        &mut self,
        world: &mut World,
        ctx: &mut TickCtx<'_>,
        delta: f32,
    ) -> Result<TickReport> {
        let mut report = TickReport::default();

        for &index in &self.plan {
            let service = self.services[index].as_mut();
            report.services_run += 1;

            let processed = &mut report.entities_processed;
            let Err((stage, source)) = run_service(service, world, ctx, delta, processed) else {
                continue;
            };

            let name = self.infos[index].name.clone();
            match self.policy {
                FailurePolicy::Abort => {
                    return Err(EngineError::Service {
                        service: name,
                        stage,
                        source,
                    });
                }
                FailurePolicy::Isolate => {
                    log::error!("service `{name}` failed during {stage}: {source:#}");
                    report.failures.push(ServiceFailure {
                        service: name,
                        stage,
                        error: source,
                    });
                }
            }
        }

        Ok(report)
    }
}

impl Default for Schedule {
    fn default() -> Self {
        Self::new()
    }
}

fn run_service(
    service: &mut dyn Service,
    world: &mut World,
    ctx: &mut TickCtx<'_>,
    delta: f32,
    processed: &mut usize,
) -> std::result::Result<(), (ServiceStage, anyhow::Error)> {
    service
        .pre_pass(world, ctx)
        .map_err(|e| (ServiceStage::PrePass, e))?;

    // Services cannot spawn mid-tick, so the slot count is fixed here.
    for index in 0..world.slot_count() {
        if !world.slot(index).is_some_and(|e| service.is_eligible(e)) {
            continue;
        }
        let Some((entity, others)) = world.split_mut(index) else {
            continue;
        };
        let id = entity.id();
        service
            .process_entity(entity, &others, ctx, delta)
            .map_err(|e| (ServiceStage::Process(id), e))?;
        *processed += 1;
    }

    Ok(())
}

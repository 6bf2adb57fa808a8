use std::any::TypeId;

use anyhow::Result;

use crate::ecs::{Component, Entity, Others, World};

use super::TickCtx;

/// A component kind a service declares it touches.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ComponentKind {
    pub id: TypeId,
    pub name: &'static str,
}

impl ComponentKind {
    pub fn of<C: Component>() -> Self {
        Self {
            id: TypeId::of::<C>(),
            name: std::any::type_name::<C>(),
        }
    }
}

/// Declared component access of a service.
///
/// Only consulted by dependency-aware ordering; registration-order plans
/// ignore it.
#[derive(Debug, Clone, Default)]
pub struct Access {
    pub reads: Vec<ComponentKind>,
    pub writes: Vec<ComponentKind>,
}

impl Access {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reads<C: Component>(mut self) -> Self {
        self.reads.push(ComponentKind::of::<C>());
        self
    }

    pub fn writes<C: Component>(mut self) -> Self {
        self.writes.push(ComponentKind::of::<C>());
        self
    }

    pub fn is_read(&self, id: TypeId) -> bool {
        self.reads.iter().any(|k| k.id == id)
    }

    pub fn is_written(&self, id: TypeId) -> bool {
        self.writes.iter().any(|k| k.id == id)
    }
}

/// Per-frame processor.
///
/// Every tick in which the service is scheduled:
/// 1. `pre_pass` runs once, before any per-entity step of this service;
/// 2. `process_entity` runs for each live entity, in creation order, for
///    which `is_eligible` holds.
///
/// A service may keep private state across ticks but holds no entity data.
pub trait Service {
    /// Name used in logs, errors, and plan diagnostics.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    fn access(&self) -> Access {
        Access::default()
    }

    fn pre_pass(&mut self, world: &World, ctx: &mut TickCtx<'_>) -> Result<()> {
        let _ = (world, ctx);
        Ok(())
    }

    /// Pure predicate over the entity's components.
    fn is_eligible(&self, entity: &Entity) -> bool;

    /// The only place a service mutates entity state or produces side effects.
    fn process_entity(
        &mut self,
        entity: &mut Entity,
        others: &Others<'_>,
        ctx: &mut TickCtx<'_>,
        delta: f32,
    ) -> Result<()>;
}

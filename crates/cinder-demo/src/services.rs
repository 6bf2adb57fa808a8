use anyhow::Result;

use cinder_engine::ecs::{Entity, Others, World};
use cinder_engine::service::{Access, Service, TickCtx};

use crate::components::{Lifetime, Position, Target, Velocity};

/// Integrates velocity into position.
pub struct Motion;

impl Service for Motion {
    fn name(&self) -> &str {
        "motion"
    }

    fn access(&self) -> Access {
        Access::new().reads::<Velocity>().reads::<Position>().writes::<Position>()
    }

    fn is_eligible(&self, entity: &Entity) -> bool {
        entity.has::<Position>() && entity.has::<Velocity>()
    }

    fn process_entity(
        &mut self,
        entity: &mut Entity,
        _others: &Others<'_>,
        _ctx: &mut TickCtx<'_>,
        delta: f32,
    ) -> Result<()> {
        let Some(&vel) = entity.get::<Velocity>() else {
            return Ok(());
        };
        if let Some(pos) = entity.get_mut::<Position>() {
            pos.x += vel.x * delta;
            pos.y += vel.y * delta;
        }
        Ok(())
    }
}

/// Steers entities toward their target's position. Drops the target once it
/// no longer exists.
pub struct Chase;

impl Service for Chase {
    fn name(&self) -> &str {
        "chase"
    }

    fn access(&self) -> Access {
        Access::new().reads::<Position>().reads::<Target>().writes::<Velocity>()
    }

    fn is_eligible(&self, entity: &Entity) -> bool {
        entity.has::<Target>() && entity.has::<Position>()
    }

    fn process_entity(
        &mut self,
        entity: &mut Entity,
        others: &Others<'_>,
        _ctx: &mut TickCtx<'_>,
        _delta: f32,
    ) -> Result<()> {
        let (Some(&target), Some(&here)) = (entity.get::<Target>(), entity.get::<Position>()) else {
            return Ok(());
        };

        let Some(there) = others.get_component::<Position>(target.entity) else {
            log::debug!("{} lost target {}", entity.id(), target.entity);
            entity.remove::<Target>();
            entity.add(Velocity { x: 0.0, y: 0.0 });
            return Ok(());
        };

        let (dx, dy) = (there.x - here.x, there.y - here.y);
        let dist = (dx * dx + dy * dy).sqrt();
        let vel = if dist > f32::EPSILON {
            Velocity {
                x: dx / dist * target.speed,
                y: dy / dist * target.speed,
            }
        } else {
            Velocity { x: 0.0, y: 0.0 }
        };
        entity.add(vel);
        Ok(())
    }
}

/// Counts down lifetimes and despawns expired entities.
pub struct Expiry;

impl Service for Expiry {
    fn name(&self) -> &str {
        "expiry"
    }

    fn is_eligible(&self, entity: &Entity) -> bool {
        entity.has::<Lifetime>()
    }

    fn process_entity(
        &mut self,
        entity: &mut Entity,
        _others: &Others<'_>,
        ctx: &mut TickCtx<'_>,
        delta: f32,
    ) -> Result<()> {
        if let Some(life) = entity.get_mut::<Lifetime>() {
            life.0 -= delta;
            if life.0 <= 0.0 {
                ctx.commands.despawn(entity.id());
            }
        }
        Ok(())
    }
}

/// Logs a population summary once a second and stops the loop when the world
/// is empty.
#[derive(Default)]
pub struct Census {
    last_report: f64,
}

impl Service for Census {
    fn name(&self) -> &str {
        "census"
    }

    fn pre_pass(&mut self, world: &World, ctx: &mut TickCtx<'_>) -> Result<()> {
        if world.is_empty() {
            log::info!("world is empty; stopping");
            ctx.commands.exit();
            return Ok(());
        }
        if ctx.time.time - self.last_report >= 1.0 {
            self.last_report = ctx.time.time;
            let chasers = world.iter().filter(|e| e.has::<Target>()).count();
            log::info!(
                "t={:.1}s frame {}: {} entities, {} chasing",
                ctx.time.time,
                ctx.time.frame_index,
                world.len(),
                chasers
            );
        }
        Ok(())
    }

    fn is_eligible(&self, _entity: &Entity) -> bool {
        false
    }

    fn process_entity(
        &mut self,
        _entity: &mut Entity,
        _others: &Others<'_>,
        _ctx: &mut TickCtx<'_>,
        _delta: f32,
    ) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cinder_engine::config::EngineConfig;
    use cinder_engine::schedule::Schedule;
    use cinder_engine::service::Commands;
    use cinder_engine::time::FrameTime;

    fn tick(schedule: &mut Schedule, world: &mut World, commands: &mut Commands, delta: f32) {
        let config = EngineConfig::default();
        let mut ctx = TickCtx::new(&config, FrameTime::default(), commands);
        let report = schedule.update(world, &mut ctx, delta).unwrap();
        assert!(report.is_clean());
    }

    #[test]
    fn motion_integrates_velocity() {
        let mut world = World::new();
        let id = world.create_entity().unwrap();
        world.add_component(id, Position { x: 0.0, y: 0.0 }).unwrap();
        world.add_component(id, Velocity { x: 2.0, y: -4.0 }).unwrap();

        let mut schedule = Schedule::new();
        schedule.add_service(Motion).unwrap();
        tick(&mut schedule, &mut world, &mut Commands::default(), 0.5);

        assert_eq!(world.get_component::<Position>(id), Some(&Position { x: 1.0, y: -2.0 }));
    }

    #[test]
    fn chase_points_at_target() {
        let mut world = World::new();
        let prey = world.create_entity().unwrap();
        world.add_component(prey, Position { x: 3.0, y: 4.0 }).unwrap();
        let hunter = world.create_entity().unwrap();
        world.add_component(hunter, Position { x: 0.0, y: 0.0 }).unwrap();
        world.add_component(hunter, Target { entity: prey, speed: 10.0 }).unwrap();

        let mut schedule = Schedule::new();
        schedule.add_service(Chase).unwrap();
        tick(&mut schedule, &mut world, &mut Commands::default(), 0.1);

        let vel = world.get_component::<Velocity>(hunter).unwrap();
        assert!((vel.x - 6.0).abs() < 1e-4);
        assert!((vel.y - 8.0).abs() < 1e-4);
    }

    #[test]
    fn chase_drops_despawned_target() {
        let mut world = World::new();
        let prey = world.create_entity().unwrap();
        let hunter = world.create_entity().unwrap();
        world.add_component(hunter, Position { x: 0.0, y: 0.0 }).unwrap();
        world.add_component(hunter, Target { entity: prey, speed: 1.0 }).unwrap();
        world.despawn(prey);

        let mut schedule = Schedule::new();
        schedule.add_service(Chase).unwrap();
        tick(&mut schedule, &mut world, &mut Commands::default(), 0.1);

        assert!(!world.has_component::<Target>(hunter));
        assert_eq!(world.get_component::<Velocity>(hunter), Some(&Velocity { x: 0.0, y: 0.0 }));
    }

    #[test]
    fn expiry_requests_despawn_when_time_runs_out() {
        let mut world = World::new();
        let short = world.create_entity().unwrap();
        world.add_component(short, Lifetime(0.1)).unwrap();
        let long = world.create_entity().unwrap();
        world.add_component(long, Lifetime(5.0)).unwrap();

        let mut schedule = Schedule::new();
        schedule.add_service(Expiry).unwrap();
        let mut commands = Commands::default();
        tick(&mut schedule, &mut world, &mut commands, 0.25);

        assert_eq!(commands.pending_despawns(), &[short]);
    }

    #[test]
    fn census_exits_on_empty_world() {
        let mut world = World::new();
        let mut schedule = Schedule::new();
        schedule.add_service(Census::default()).unwrap();
        let mut commands = Commands::default();
        tick(&mut schedule, &mut world, &mut commands, 0.1);

        assert!(commands.exit_requested());
    }

    #[test]
    fn dependency_order_rejects_motion_chase_loop() {
        use cinder_engine::config::FailurePolicy;
        use cinder_engine::schedule::DependencyOrder;
        use cinder_engine::EngineError;

        // Chase writes velocity from positions; motion writes positions from
        // velocity. The demo therefore runs in registration order.
        let mut schedule = Schedule::with_strategy(Box::new(DependencyOrder), FailurePolicy::Abort);
        schedule.add_service(Motion).unwrap();
        let err = schedule.add_service(Chase).unwrap_err();
        assert!(matches!(err, EngineError::DependencyCycle(_)));
    }
}

use crate::config::EngineConfig;
use crate::ecs::EntityId;
use crate::time::FrameTime;

/// Structural changes requested by services during a tick.
///
/// Commands are buffered and applied by the driver after the tick completes,
/// so the entity set never changes while services iterate it.
#[derive(Debug, Default)]
pub struct Commands {
    despawn: Vec<EntityId>,
    exit: bool,
}

impl Commands {
    /// Requests the frame loop to stop after the current iteration.
    pub fn exit(&mut self) {
        self.exit = true;
    }

    pub fn despawn(&mut self, id: EntityId) {
        self.despawn.push(id);
    }

    pub fn exit_requested(&self) -> bool {
        self.exit
    }

    /// Pending despawns in request order.
    pub fn pending_despawns(&self) -> &[EntityId] {
        &self.despawn
    }

    pub(crate) fn drain_despawns(&mut self) -> std::vec::Drain<'_, EntityId> {
        self.despawn.drain(..)
    }
}

/// Per-tick context passed to every service call.
pub struct TickCtx<'a> {
    pub config: &'a EngineConfig,
    pub time: FrameTime,
    pub commands: &'a mut Commands,
}

impl<'a> TickCtx<'a> {
    pub fn new(config: &'a EngineConfig, time: FrameTime, commands: &'a mut Commands) -> Self {
        Self {
            config,
            time,
            commands,
        }
    }
}

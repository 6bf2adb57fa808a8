use crate::error::{EngineError, Result};

use super::entity::IdAllocator;
use super::{Component, Entity, EntityId};

/// Entity registry.
///
/// Entities live in an arena indexed by id. Because ids are dense and never
/// reused, slot order is creation order, and a despawned entity leaves a
/// vacant slot behind.
#[derive(Debug, Default)]
pub struct World {
    ids: IdAllocator,
    slots: Vec<Option<Entity>>,
    live: usize,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a new, empty entity.
    pub fn create_entity(&mut self) -> Result<EntityId> {
        let id = self.ids.allocate();
        if self.exists(id) {
            return Err(EngineError::IdentityCollision(id));
        }

        let index = id.index();
        if index >= self.slots.len() {
            self.slots.resize_with(index + 1, || None);
        }
        self.slots[index] = Some(Entity::new(id));
        self.live += 1;

        log::trace!("created entity {id}");
        Ok(id)
    }

    pub fn exists(&self, id: EntityId) -> bool {
        self.entity(id).is_some()
    }

    /// Removes an entity and drops all of its components.
    ///
    /// Returns `false` if the entity was not live. The id is not reused.
    pub fn despawn(&mut self, id: EntityId) -> bool {
        let removed = self
            .slots
            .get_mut(id.index())
            .and_then(Option::take)
            .is_some();
        if removed {
            self.live -= 1;
            log::trace!("despawned entity {id}");
        }
        removed
    }

    /// Number of live entities.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.slots.get(id.index()).and_then(Option::as_ref)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.slots.get_mut(id.index()).and_then(Option::as_mut)
    }

    /// Live entities in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.slots.iter().flatten()
    }

    pub fn add_component<C: Component>(&mut self, id: EntityId, component: C) -> Result<&mut C> {
        let entity = self.entity_mut(id).ok_or(EngineError::NoSuchEntity(id))?;
        Ok(entity.add(component))
    }

    pub fn get_component<C: Component>(&self, id: EntityId) -> Option<&C> {
        self.entity(id).and_then(Entity::get::<C>)
    }

    pub fn get_component_mut<C: Component>(&mut self, id: EntityId) -> Option<&mut C> {
        self.entity_mut(id).and_then(Entity::get_mut::<C>)
    }

    pub fn has_component<C: Component>(&self, id: EntityId) -> bool {
        self.entity(id).is_some_and(Entity::has::<C>)
    }

    pub fn remove_component<C: Component>(&mut self, id: EntityId) -> Option<C> {
        self.entity_mut(id).and_then(Entity::remove::<C>)
    }

    /// Number of arena slots, live or vacant. Slot `i` holds entity `#i`.
    pub(crate) fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn slot(&self, index: usize) -> Option<&Entity> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Borrows the entity in slot `index` mutably alongside a read-only view
    /// of every other entity.
    pub(crate) fn split_mut(&mut self, index: usize) -> Option<(&mut Entity, Others<'_>)> {
        if index >= self.slots.len() {
            return None;
        }
        let (before, rest) = self.slots.split_at_mut(index);
        let (current, after) = rest.split_first_mut()?;
        let entity = current.as_mut()?;
        Some((entity, Others { before, after }))
    }

    #[cfg(test)]
    pub(crate) fn rewind_ids(&mut self, next: u64) {
        self.ids.rewind_to(next);
    }
}

/// Read-only view of every live entity except the one currently being
/// processed.
#[derive(Clone, Copy)]
pub struct Others<'a> {
    before: &'a [Option<Entity>],
    after: &'a [Option<Entity>],
}

impl<'a> Others<'a> {
    /// Looks up another entity by id. Returns `None` for the processed entity
    /// itself, for despawned ids, and for ids never allocated.
    pub fn get(&self, id: EntityId) -> Option<&'a Entity> {
        let index = id.index();
        let split = self.before.len();
        if index < split {
            self.before[index].as_ref()
        } else if index == split {
            None
        } else {
            self.after.get(index - split - 1).and_then(Option::as_ref)
        }
    }

    pub fn get_component<C: Component>(&self, id: EntityId) -> Option<&'a C> {
        self.get(id).and_then(Entity::get::<C>)
    }

    /// Other live entities in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &'a Entity> + 'a {
        self.before.iter().chain(self.after.iter()).flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Marker(u32);
    impl Component for Marker {}

    fn world_with(n: usize) -> (World, Vec<EntityId>) {
        let mut world = World::new();
        let ids = (0..n).map(|_| world.create_entity().unwrap()).collect();
        (world, ids)
    }

    // ── identity ──────────────────────────────────────────────────────────

    #[test]
    fn ids_are_sequential_from_zero() {
        let (world, ids) = world_with(5);
        let raw: Vec<u64> = ids.iter().map(|id| id.raw()).collect();
        assert_eq!(raw, vec![0, 1, 2, 3, 4]);
        for id in &ids {
            assert!(world.exists(*id));
        }
        assert_eq!(world.len(), 5);
    }

    #[test]
    fn unknown_id_does_not_exist() {
        let (world, _) = world_with(2);
        assert!(!world.exists(EntityId(2)));
        assert!(!world.exists(EntityId(99)));
    }

    #[test]
    fn colliding_id_is_an_identity_error() {
        let (mut world, _) = world_with(3);
        world.rewind_ids(1);
        match world.create_entity() {
            Err(EngineError::IdentityCollision(id)) => assert_eq!(id, EntityId(1)),
            other => panic!("expected collision, got {other:?}"),
        }
        assert_eq!(world.len(), 3);
    }

    #[test]
    fn despawn_never_reuses_ids() {
        let (mut world, ids) = world_with(2);
        assert!(world.despawn(ids[0]));
        assert!(!world.despawn(ids[0]));
        assert!(!world.exists(ids[0]));

        let next = world.create_entity().unwrap();
        assert_eq!(next.raw(), 2);
        assert_eq!(world.len(), 2);
    }

    // ── components ────────────────────────────────────────────────────────

    #[test]
    fn add_then_get_returns_same_instance() {
        let (mut world, ids) = world_with(1);
        let ptr = world.add_component(ids[0], Marker(1)).unwrap() as *const Marker;
        let got = world.get_component::<Marker>(ids[0]).unwrap() as *const Marker;
        assert_eq!(ptr, got);
    }

    #[test]
    fn re_adding_replaces_old_instance() {
        let (mut world, ids) = world_with(1);
        world.add_component(ids[0], Marker(1)).unwrap();
        world.add_component(ids[0], Marker(2)).unwrap();
        assert_eq!(world.get_component::<Marker>(ids[0]), Some(&Marker(2)));
    }

    #[test]
    fn add_to_missing_entity_fails() {
        let mut world = World::new();
        let err = world.add_component(EntityId(0), Marker(0)).unwrap_err();
        assert!(matches!(err, EngineError::NoSuchEntity(_)));
    }

    #[test]
    fn despawn_drops_components() {
        let (mut world, ids) = world_with(1);
        world.add_component(ids[0], Marker(5)).unwrap();
        world.despawn(ids[0]);
        assert!(!world.has_component::<Marker>(ids[0]));
        assert!(world.get_component::<Marker>(ids[0]).is_none());
    }

    // ── split view ────────────────────────────────────────────────────────

    #[test]
    fn split_excludes_current_entity() {
        let (mut world, ids) = world_with(3);
        for (n, id) in ids.iter().enumerate() {
            world.add_component(*id, Marker(n as u32)).unwrap();
        }

        let (current, others) = world.split_mut(1).unwrap();
        assert_eq!(current.id(), ids[1]);
        assert!(others.get(ids[1]).is_none());
        assert_eq!(others.get_component::<Marker>(ids[0]), Some(&Marker(0)));
        assert_eq!(others.get_component::<Marker>(ids[2]), Some(&Marker(2)));

        let seen: Vec<EntityId> = others.iter().map(Entity::id).collect();
        assert_eq!(seen, vec![ids[0], ids[2]]);
    }

    #[test]
    fn split_skips_vacant_slots() {
        let (mut world, ids) = world_with(3);
        world.despawn(ids[2]);
        assert!(world.split_mut(2).is_none());

        let (_, others) = world.split_mut(0).unwrap();
        assert!(others.get(ids[2]).is_none());
        assert!(others.get(EntityId(40)).is_none());
        assert_eq!(others.iter().count(), 1);
    }
}

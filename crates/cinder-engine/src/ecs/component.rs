use std::any::{Any, TypeId};
use std::collections::HashMap;

use super::EntityId;

/// Marker trait for data attachable to an [`Entity`].
///
/// Components are keyed by their concrete type: an entity carries at most one
/// instance of each component type.
pub trait Component: 'static {}

/// An entity: its identity plus the components it exclusively owns.
pub struct Entity {
    id: EntityId,
    components: HashMap<TypeId, Box<dyn Any>>,
}

impl Entity {
    pub(crate) fn new(id: EntityId) -> Self {
        Self {
            id,
            components: HashMap::new(),
        }
    }

    #[inline]
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Attaches `component`, replacing any prior component of the same type.
    ///
    /// Returns the attached instance for chaining.
    pub fn add<C: Component>(&mut self, component: C) -> &mut C {
        let slot = self
            .components
            .entry(TypeId::of::<C>())
            .insert_entry(Box::new(component))
            .into_mut();

        slot.downcast_mut::<C>()
            .unwrap_or_else(|| unreachable!("slot keyed by TypeId::of::<C>() holds a C"))
    }

    pub fn get<C: Component>(&self) -> Option<&C> {
        self.components
            .get(&TypeId::of::<C>())
            .and_then(|c| c.downcast_ref::<C>())
    }

    pub fn get_mut<C: Component>(&mut self) -> Option<&mut C> {
        self.components
            .get_mut(&TypeId::of::<C>())
            .and_then(|c| c.downcast_mut::<C>())
    }

    pub fn has<C: Component>(&self) -> bool {
        self.components.contains_key(&TypeId::of::<C>())
    }

    /// Detaches and returns the component of type `C`, if present.
    pub fn remove<C: Component>(&mut self) -> Option<C> {
        self.components
            .remove(&TypeId::of::<C>())
            .and_then(|c| c.downcast::<C>().ok())
            .map(|c| *c)
    }

    /// Number of attached components.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

impl std::fmt::Debug for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entity")
            .field("id", &self.id)
            .field("components", &self.components.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Health(i32);
    impl Component for Health {}

    #[derive(Debug, PartialEq)]
    struct Tag;
    impl Component for Tag {}

    fn entity() -> Entity {
        Entity::new(EntityId(0))
    }

    #[test]
    fn add_returns_attached_instance() {
        let mut e = entity();
        let h = e.add(Health(10));
        h.0 += 5;
        assert_eq!(e.get::<Health>(), Some(&Health(15)));
    }

    #[test]
    fn re_adding_replaces_previous() {
        let mut e = entity();
        e.add(Health(1));
        e.add(Health(2));
        assert_eq!(e.get::<Health>(), Some(&Health(2)));
        assert_eq!(e.len(), 1);
    }

    #[test]
    fn missing_component_is_none_not_panic() {
        let e = entity();
        assert!(e.get::<Health>().is_none());
        assert!(!e.has::<Health>());
        assert!(e.is_empty());
    }

    #[test]
    fn types_are_keyed_independently() {
        let mut e = entity();
        e.add(Health(3));
        e.add(Tag);
        assert!(e.has::<Health>());
        assert!(e.has::<Tag>());
        assert_eq!(e.len(), 2);
    }

    #[test]
    fn remove_detaches() {
        let mut e = entity();
        e.add(Health(4));
        assert_eq!(e.remove::<Health>(), Some(Health(4)));
        assert!(!e.has::<Health>());
        assert_eq!(e.remove::<Health>(), None);
    }
}

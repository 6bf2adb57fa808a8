//! Entity/component registry.
//!
//! Entities are integer identities that own a type-keyed set of components.
//! Cross-entity references are `EntityId` values resolved through the
//! [`World`] or an [`Others`] view; nothing here holds one entity inside
//! another.

mod component;
mod entity;
mod world;

pub use component::{Component, Entity};
pub use entity::EntityId;
pub use world::{Others, World};

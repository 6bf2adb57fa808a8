//! Service contract.
//!
//! Services are the unit of per-frame behavior. They receive the entity set
//! and an explicit [`TickCtx`]; structural changes go through [`Commands`].

mod ctx;
mod contract;

pub use ctx::{Commands, TickCtx};
pub use contract::{Access, ComponentKind, Service};

//! Execution plan and scheduler.
//!
//! The plan is rebuilt whenever the registered set changes. Ordering is a
//! pluggable [`OrderingStrategy`]; registration order is the default.

mod plan;
mod scheduler;

pub use plan::{strategy_for, DependencyOrder, OrderingStrategy, RegistrationOrder, ServiceInfo};
pub use scheduler::{Schedule, ServiceFailure, ServiceId, TickReport};

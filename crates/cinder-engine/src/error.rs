use thiserror::Error;

use crate::ecs::EntityId;

/// Phase of the service protocol in which a failure occurred.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ServiceStage {
    PrePass,
    Process(EntityId),
}

impl std::fmt::Display for ServiceStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceStage::PrePass => f.write_str("pre-pass"),
            ServiceStage::Process(id) => write!(f, "process {id}"),
        }
    }
}

/// Errors raised by the engine core.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A freshly allocated id is already registered. Indicates a broken
    /// allocator invariant.
    #[error("entity id {0} collides with a live entity")]
    IdentityCollision(EntityId),

    #[error("no entity with id {0}")]
    NoSuchEntity(EntityId),

    /// Dependency ordering found a cycle; lists the services on it.
    #[error("service dependency cycle between: {}", .0.join(", "))]
    DependencyCycle(Vec<String>),

    #[error("service `{service}` failed during {stage}")]
    Service {
        service: String,
        stage: ServiceStage,
        #[source]
        source: anyhow::Error,
    },

    /// The application's one-time setup failed.
    #[error("engine setup failed")]
    Setup(#[source] anyhow::Error),

    #[error("frame driver has already run")]
    AlreadyRan,

    /// An iteration was requested outside the running state.
    #[error("frame driver is not running")]
    NotRunning,

    /// Timing source or window failure, surfaced unchanged to the caller.
    #[error("collaborator failure")]
    Collaborator(#[source] anyhow::Error),
}

pub type Result<T, E = EngineError> = std::result::Result<T, E>;

//! Engine error taxonomy.
//!
//! Only the failures the engine cannot recover from locally surface as
//! [`EngineError`]. Missing images, unknown actions, failed path searches and
//! rejected moves are handled in place and logged instead.

use bevy_ecs::entity::Entity;

/// Alias for `Result<T, EngineError>`.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors returned by world-level operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Spawning would exceed the configured entity ceiling.
    #[error("too many sprites: refusing to spawn over {limit}")]
    TooManyEntities {
        /// The configured ceiling.
        limit: usize,
    },

    /// An actor sprite sheet could not be loaded or has no usable frames.
    #[error("unable to load actor \"{name}\": {reason}")]
    MalformedActor {
        /// Logical actor name.
        name: String,
        /// What was wrong with the archive.
        reason: String,
    },

    /// The entity does not exist or carries no sprite.
    #[error("unknown entity: {0}")]
    UnknownEntity(Entity),

    /// The entity exists but is not an actor.
    #[error("entity {0} is not an actor")]
    NotAnActor(Entity),

    /// Actor state could not be encoded, decoded, read or written.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(String),
}

//! # ECS Error Types
//!
//! Every failure the core can report. All of them describe a caller mistake
//! (asking for something that is not there, or binding a tag twice); none is
//! retried internally.

use thiserror::Error;

use crate::ecs::Entity;

/// Errors that can occur in the ECS core.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// The entity does not carry the requested component.
    #[error("missing component {component} on entity {entity}")]
    ComponentNotFound {
        /// Component type name.
        component: &'static str,
        /// Entity id that was queried.
        entity: u32,
    },

    /// No system of the requested type is registered.
    #[error("system not registered: {0}")]
    SystemNotFound(&'static str),

    /// The system is currently lent out by `run_system`.
    #[error("system already running: {0}")]
    SystemBusy(&'static str),

    /// The tag is already bound to a different live entity.
    #[error("tag '{tag}' already belongs to entity {owner}, cannot assign to entity {entity}")]
    DuplicateTag {
        /// The contested tag.
        tag: String,
        /// Entity currently holding the tag.
        owner: Entity,
        /// Entity that asked for it.
        entity: Entity,
    },

    /// The handle refers to an entity that has already been destroyed.
    #[error("stale entity handle {0:?}")]
    StaleEntity(Entity),

    /// Two component types declared the same id.
    #[error("component {component} reuses id {id} already taken by {existing}")]
    ComponentIdConflict {
        /// Component type being stored.
        component: &'static str,
        /// The shared id.
        id: u8,
        /// Component type that owns the pool for that id.
        existing: &'static str,
    },

    /// A component type declared an id that does not fit in a signature.
    #[error("component {component} declares id {id}, signatures hold 32 bits")]
    ComponentIdOutOfRange {
        /// Component type name.
        component: &'static str,
        /// The declared id.
        id: u8,
    },
}

/// Result type for ECS operations.
pub type EcsResult<T> = Result<T, EcsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = EcsError::ComponentNotFound {
            component: "Transform",
            entity: 7,
        };
        assert_eq!(err.to_string(), "missing component Transform on entity 7");

        let err = EcsError::DuplicateTag {
            tag: "player".to_owned(),
            owner: Entity::new(1, 0),
            entity: Entity::new(2, 0),
        };
        assert!(err.to_string().contains("'player'"));
    }
}

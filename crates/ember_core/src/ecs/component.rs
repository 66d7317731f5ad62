//! # Component Contract
//!
//! Components are plain data records attached to at most one entity each.
//! Every component type owns one bit of the [`Signature`](super::Signature),
//! assigned explicitly through [`Component::ID`].

use super::signature::MAX_COMPONENTS;
use crate::error::{EcsError, EcsResult};

/// Marker trait for ECS components.
///
/// The id is fixed by the type itself instead of being handed out in
/// registration order, so the same build always maps a type to the same
/// signature bit.
///
/// # Example
///
/// ```rust
/// use ember_core::Component;
///
/// #[derive(Clone, Copy, Debug, Default, PartialEq)]
/// struct Velocity {
///     x: f32,
///     y: f32,
/// }
///
/// impl Component for Velocity {
///     const ID: u8 = 1;
/// }
/// ```
pub trait Component: 'static {
    /// Signature bit for this component type (0-31).
    const ID: u8;
}

/// Short type name used in logs and errors.
#[must_use]
pub fn component_name<C: Component>() -> &'static str {
    let full = std::any::type_name::<C>();
    full.rsplit("::").next().unwrap_or(full)
}

/// Returns the component id, rejecting ids that do not fit a signature.
///
/// # Errors
///
/// Returns [`EcsError::ComponentIdOutOfRange`] when `C::ID >= 32`.
#[inline]
pub fn checked_id<C: Component>() -> EcsResult<usize> {
    let id = usize::from(C::ID);
    if id < MAX_COMPONENTS {
        Ok(id)
    } else {
        Err(EcsError::ComponentIdOutOfRange {
            component: component_name::<C>(),
            id: C::ID,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Marker;

    impl Component for Marker {
        const ID: u8 = 31;
    }

    struct TooHigh;

    impl Component for TooHigh {
        const ID: u8 = 32;
    }

    #[test]
    fn test_component_name_is_short() {
        assert_eq!(component_name::<Marker>(), "Marker");
    }

    #[test]
    fn test_checked_id_bounds() {
        assert_eq!(checked_id::<Marker>().unwrap(), 31);
        assert!(matches!(
            checked_id::<TooHigh>(),
            Err(EcsError::ComponentIdOutOfRange { id: 32, .. })
        ));
    }
}

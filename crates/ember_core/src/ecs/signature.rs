//! # Signatures
//!
//! Fixed-width bitset over component ids. An entity's signature lists the
//! component types it carries; a system's signature lists the types it
//! requires.

use std::fmt;

use super::component::Component;

/// Maximum number of distinct component types.
pub const MAX_COMPONENTS: usize = 32;

/// Bitset where bit `i` means "has component type `i`".
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Signature(u32);

impl Signature {
    /// Signature with no bits set.
    pub const EMPTY: Self = Self(0);

    /// Creates an empty signature.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self::EMPTY
    }

    /// Creates a signature from raw bits.
    #[inline]
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Raw bits.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Builder form used by systems to declare a required component.
    ///
    /// ```rust
    /// # use ember_core::{Component, Signature};
    /// # struct Transform;
    /// # impl Component for Transform { const ID: u8 = 0; }
    /// # struct RigidBody;
    /// # impl Component for RigidBody { const ID: u8 = 1; }
    /// let required = Signature::new().with::<Transform>().with::<RigidBody>();
    /// assert_eq!(required.count(), 2);
    /// ```
    #[inline]
    #[must_use]
    pub fn with<C: Component>(mut self) -> Self {
        self.set(usize::from(C::ID));
        self
    }

    /// Sets bit `bit`. Bits outside the signature width are ignored.
    #[inline]
    pub fn set(&mut self, bit: usize) {
        debug_assert!(bit < MAX_COMPONENTS, "component bit {bit} out of range");
        if bit < MAX_COMPONENTS {
            self.0 |= 1 << bit;
        }
    }

    /// Clears bit `bit`.
    #[inline]
    pub fn clear(&mut self, bit: usize) {
        if bit < MAX_COMPONENTS {
            self.0 &= !(1 << bit);
        }
    }

    /// Checks bit `bit`.
    #[inline]
    #[must_use]
    pub const fn test(self, bit: usize) -> bool {
        bit < MAX_COMPONENTS && (self.0 >> bit) & 1 == 1
    }

    /// Checks whether component type `C` is present.
    #[inline]
    #[must_use]
    pub fn has<C: Component>(self) -> bool {
        self.test(usize::from(C::ID))
    }

    /// Superset test: `(self & required) == required`.
    ///
    /// This is the matching rule between an entity and a system. An empty
    /// `required` signature matches every entity.
    #[inline]
    #[must_use]
    pub const fn contains(self, required: Self) -> bool {
        self.0 & required.0 == required.0
    }

    /// Bitwise union.
    #[inline]
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Bitwise intersection.
    #[inline]
    #[must_use]
    pub const fn intersection(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    /// True when no bit is set.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of bits set.
    #[inline]
    #[must_use]
    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }

    /// Clears every bit.
    #[inline]
    pub fn reset(&mut self) {
        self.0 = 0;
    }

    /// Iterates over set bit positions in ascending order.
    pub fn iter(self) -> impl Iterator<Item = usize> {
        let mut bits = self.0;
        std::iter::from_fn(move || {
            if bits == 0 {
                return None;
            }
            let bit = bits.trailing_zeros() as usize;
            bits &= bits - 1;
            Some(bit)
        })
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({:#034b})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct A;
    impl Component for A {
        const ID: u8 = 0;
    }

    struct B;
    impl Component for B {
        const ID: u8 = 5;
    }

    #[test]
    fn test_set_clear_test() {
        let mut sig = Signature::new();
        assert!(!sig.test(5));
        sig.set(5);
        assert!(sig.test(5));
        assert!(sig.has::<B>());
        sig.clear(5);
        assert!(sig.is_empty());
    }

    #[test]
    fn test_contains_is_superset_not_equality() {
        let system = Signature::new().with::<A>();
        let entity = Signature::new().with::<A>().with::<B>();
        assert!(entity.contains(system));
        assert!(!system.contains(entity));
        assert!(entity.contains(Signature::EMPTY));
    }

    #[test]
    fn test_iter_bits() {
        let sig = Signature::from_bits(0b1000_0000_0000_0000_0000_0000_0010_0101);
        assert_eq!(sig.iter().collect::<Vec<_>>(), vec![0, 2, 5, 31]);
        assert_eq!(sig.count(), 4);
    }

    #[test]
    fn test_out_of_range_test_is_false() {
        let sig = Signature::from_bits(u32::MAX);
        assert!(!sig.test(32));
    }
}

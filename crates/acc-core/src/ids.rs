//! Strongly typed identifier wrappers and a run-scoped id generator.
//!
//! All IDs are `Copy + Ord + Hash` so they can be used as map keys and sorted
//! collection elements without ceremony.  The inner integer is `pub` so node
//! ids can index CSR arrays directly, but callers should prefer `.index()`.

use std::fmt;
use std::marker::PhantomData;

/// Generate a typed ID wrapper around a `u32`.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident(u32);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub u32);

        impl $name {
            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<u32> for $name {
            #[inline(always)]
            fn from(raw: u32) -> $name {
                $name(raw)
            }
        }

        impl From<$name> for usize {
            #[inline(always)]
            fn from(id: $name) -> usize {
                id.0 as usize
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                u32::try_from(n).map($name)
            }
        }
    };
}

typed_id! {
    /// Index of a network node.  Stable for the lifetime of a built `Network`.
    pub struct NodeId(u32);
}

typed_id! {
    /// Index of an undirected network edge.
    pub struct EdgeId(u32);
}

typed_id! {
    /// Identifier of an origin (usually a grid cell).
    pub struct OriginId(u32);
}

typed_id! {
    /// Identifier of a destination service point.
    pub struct DestinationId(u32);
}

/// Monotonic id generator scoped to one analysis run.
///
/// Each run owns its own sequence, so ids never leak between runs the way a
/// process-wide counter would.
///
/// ```
/// use acc_core::{DestinationId, IdSequence};
///
/// let mut seq: IdSequence<DestinationId> = IdSequence::new();
/// assert_eq!(seq.next_id(), DestinationId(0));
/// assert_eq!(seq.next_id(), DestinationId(1));
/// ```
#[derive(Debug, Clone)]
pub struct IdSequence<T> {
    next:    u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T: From<u32>> IdSequence<T> {
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    pub fn starting_at(first: u32) -> Self {
        Self { next: first, _marker: PhantomData }
    }

    /// Hand out the next id.
    ///
    /// # Panics
    /// Panics once all `u32::MAX` ids have been issued.
    pub fn next_id(&mut self) -> T {
        let id = self.next;
        self.next = id.checked_add(1).unwrap_or_else(|| panic!("id sequence exhausted"));
        T::from(id)
    }

    /// The raw value the next call to [`next_id`](Self::next_id) returns.
    pub fn peek(&self) -> u32 {
        self.next
    }
}

impl<T: From<u32>> Default for IdSequence<T> {
    fn default() -> Self {
        Self::new()
    }
}

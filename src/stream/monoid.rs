//! Monoids for [`map_reduce`](crate::stream::CompressedNeighbors::map_reduce).
//!
//! Per-block partials are combined in block order, so a monoid only needs an
//! associative `combine`; commutativity is not required.

use core::marker::PhantomData;
use core::ops::Add;

use num_traits::{Bounded, Zero};

/// An identity element plus an associative combining operation.
pub trait Monoid<E>: Sync {
    /// The identity: `combine(identity(), x) == x == combine(x, identity())`.
    fn identity(&self) -> E;

    /// Associative combination.
    fn combine(&self, a: E, b: E) -> E;
}

/// Addition with zero as identity.
#[derive(Clone, Copy, Debug, Default)]
pub struct SumMonoid<E>(PhantomData<fn() -> E>);

impl<E> SumMonoid<E> {
    /// Creates the monoid.
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<E: Zero + Add<Output = E>> Monoid<E> for SumMonoid<E> {
    #[inline]
    fn identity(&self) -> E {
        E::zero()
    }

    #[inline]
    fn combine(&self, a: E, b: E) -> E {
        a + b
    }
}

/// Maximum with the type's minimum as identity.
#[derive(Clone, Copy, Debug, Default)]
pub struct MaxMonoid<E>(PhantomData<fn() -> E>);

impl<E> MaxMonoid<E> {
    /// Creates the monoid.
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<E: Bounded + PartialOrd> Monoid<E> for MaxMonoid<E> {
    #[inline]
    fn identity(&self) -> E {
        E::min_value()
    }

    #[inline]
    fn combine(&self, a: E, b: E) -> E {
        if b > a {
            b
        } else {
            a
        }
    }
}

/// Minimum with the type's maximum as identity.
#[derive(Clone, Copy, Debug, Default)]
pub struct MinMonoid<E>(PhantomData<fn() -> E>);

impl<E> MinMonoid<E> {
    /// Creates the monoid.
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<E: Bounded + PartialOrd> Monoid<E> for MinMonoid<E> {
    #[inline]
    fn identity(&self) -> E {
        E::max_value()
    }

    #[inline]
    fn combine(&self, a: E, b: E) -> E {
        if b < a {
            b
        } else {
            a
        }
    }
}

/// A monoid from an identity value and a closure.
#[derive(Clone, Debug)]
pub struct FnMonoid<E, F> {
    identity: E,
    f: F,
}

/// Builds a monoid from `identity` and an associative `f`.
pub fn make_monoid<E, F>(identity: E, f: F) -> FnMonoid<E, F>
where
    E: Clone + Sync,
    F: Fn(E, E) -> E + Sync,
{
    FnMonoid { identity, f }
}

impl<E, F> Monoid<E> for FnMonoid<E, F>
where
    E: Clone + Sync,
    F: Fn(E, E) -> E + Sync,
{
    #[inline]
    fn identity(&self) -> E {
        self.identity.clone()
    }

    #[inline]
    fn combine(&self, a: E, b: E) -> E {
        (self.f)(a, b)
    }
}

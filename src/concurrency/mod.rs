//! Fork-join helpers and shared traversal state.
//!
//! Parallel work in this crate is always a fork over disjoint pieces of one
//! buffer: blocks of a stream, or streams of a graph. Ownership of each piece
//! is handed to its task as a `&mut` sub-slice, so no locking is involved.

pub mod par;
pub mod visited;

pub use visited::VisitedSet;

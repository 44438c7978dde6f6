//! Internal data structures.
//!
//! [`Slab`] gives the scheduler an indexed task table that reuses freed
//! slots.

mod slab;

pub(crate) use slab::Slab;

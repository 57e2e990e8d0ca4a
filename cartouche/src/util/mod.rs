//! Utilities for working with the binary tag layout

pub(crate) mod alloc;
pub mod synchsafe;
pub mod text;

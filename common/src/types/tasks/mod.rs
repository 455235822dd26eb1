//! Defines task related types

pub mod descriptors;

pub use descriptors::*;

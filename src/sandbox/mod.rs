//! Restricted execution of generator-supplied scene code.
//!
//! Scene code is checked by [`validate`], compiled against a [`capability::CapabilityContext`]
//! and only ever reaches the host through the functions that context registers.

pub mod capability;
pub mod convert;
pub mod kits;
/// Compilation of scene code into reusable factories.
pub mod loader;
pub mod validate;

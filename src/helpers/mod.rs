//! Filesystem primitives shared by the renderer and the placement engine.
pub mod fs;
pub mod meta;

//! Filesystem primitives shared across features.

pub mod hash;
pub mod workdir;

pub use hash::ContentHasher;
pub use workdir::empty_dir;

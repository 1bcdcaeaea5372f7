//! Factory layer: library resolution, document templating, socket assembly.

mod assets;
mod builder;
mod core;
mod source;

pub use builder::FactoryBuilder;
pub use core::SocketFactory;
pub use source::{DEFAULT_LIBRARY_URL, LibrarySource};

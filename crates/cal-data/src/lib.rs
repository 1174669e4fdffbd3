pub mod loaders;
pub mod sources;
pub mod writer;

pub use loaders::*;
pub use sources::*;
pub use writer::*;

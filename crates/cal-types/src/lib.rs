pub mod dataset;
pub mod hyperparams;
pub mod result;
pub mod errors;

pub use dataset::*;
pub use hyperparams::*;
pub use result::*;
pub use errors::*;

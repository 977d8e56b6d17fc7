mod common;
mod file;
mod run;

pub use common::*;
pub use file::*;
pub use run::*;

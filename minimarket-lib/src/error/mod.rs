//! Error types

mod config;
mod rule;
mod table;

pub use config::*;
pub use rule::*;
pub use table::*;

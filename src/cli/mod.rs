//! CLI command handling

pub mod notifiers;
pub mod output;
pub mod send;

pub use notifiers::*;
pub use output::*;
pub use send::*;

//! Subcommands of the `antforage` binary

pub mod run;
pub mod scent;
pub mod values;

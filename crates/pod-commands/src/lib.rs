//! Command execution layer for the pod resource store.
//!
//! Commands are named, versioned operations over a [`Pod`]. Each one splits
//! its argument text into positionals and `--flag[=value]` options, resolves
//! paths against the caller's current location, and returns a structured
//! [`CommandResult`]. Rendering that result for a terminal is a separate,
//! optional projection, so the same command serves interactive and
//! scripted callers.
//!
//! [`Pod`]: pod_protocol::Pod

pub mod args;
pub mod commands;
pub mod context;
pub mod error;
pub mod metadata;
pub mod persona;
pub mod registry;
pub mod render;
pub mod result;

#[cfg(test)]
mod testing;

pub use args::{tokenize, ParsedArgs};
pub use context::{CommandContext, ExecOptions};
pub use error::{CommandError, ErrorCode};
pub use persona::{PersonaDirectory, PersonaState};
pub use registry::{Command, Registry};
pub use result::{envelope, CommandResult};

//! Built-in commands.

mod fs;
mod help;
mod meta;
mod persona;

use crate::registry::Command;

/// Every built-in command, in registration order.
pub fn builtin() -> Vec<Command> {
    let mut commands = fs::commands();
    commands.extend(meta::commands());
    commands.extend(persona::commands());
    commands.extend(help::commands());
    commands
}

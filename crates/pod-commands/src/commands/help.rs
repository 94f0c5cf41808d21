use std::io::{self, Write};

use colored::Colorize;
use serde_json::{json, Value};

use crate::args::ParsedArgs;
use crate::context::CommandContext;
use crate::error::{CommandError, ErrorCode};
use crate::registry::{Command, Registry};
use crate::render::field;
use crate::result::CommandResult;

pub fn commands() -> Vec<Command> {
    vec![Command {
        name: "help",
        version: "1.0.0",
        usage: "help [command]",
        summary: "List commands, or show how to use one",
        mutates: false,
        execute: help,
        render: Some(render_help),
    }]
}

fn describe(command: &Command) -> Value {
    json!({
        "name": command.name,
        "version": command.version,
        "usage": command.usage,
        "summary": command.summary,
    })
}

fn help(args: &ParsedArgs, _ctx: &mut CommandContext) -> CommandResult {
    let registry = Registry::builtin();
    match args.arg(0) {
        Some(name) => registry.get(name).map(describe).ok_or_else(|| {
            CommandError::new(ErrorCode::UnknownCommand, format!("unknown command: {name}"))
        }),
        None => Ok(json!({ "commands": registry.iter().map(describe).collect::<Vec<_>>() })),
    }
}

fn render_help(data: &Value, out: &mut dyn Write) -> io::Result<()> {
    if let Some(commands) = data["commands"].as_array() {
        for c in commands {
            writeln!(out, "  {:<10} {}", field(c, "name").bold(), field(c, "summary"))?;
        }
        return writeln!(out, "\nAdd {} to any command for machine-readable output.", "--json".cyan());
    }
    writeln!(out, "{} {}", "usage:".bold(), field(data, "usage"))?;
    writeln!(out, "  {}", field(data, "summary"))
}

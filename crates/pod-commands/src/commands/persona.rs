use std::io::{self, Write};

use colored::Colorize;
use serde_json::{json, Value};

use pod_types::Persona;

use crate::args::ParsedArgs;
use crate::context::CommandContext;
use crate::error::{CommandError, ErrorCode};
use crate::registry::Command;
use crate::render::{field, ok_line, scalar};
use crate::result::CommandResult;

pub fn commands() -> Vec<Command> {
    vec![Command {
        name: "persona",
        version: "1.0.0",
        usage: "persona <list | add <id> [--name=] [--email=] | remove <id> | default [id] | clear-default>",
        summary: "Manage personas and the default persona",
        mutates: true,
        execute: persona,
        render: Some(render_persona),
    }]
}

fn persona(args: &ParsedArgs, ctx: &mut CommandContext) -> CommandResult {
    let sub = args
        .arg(0)
        .ok_or_else(|| CommandError::missing_argument("subcommand"))?;
    match sub {
        "list" => list(ctx),
        "add" => add(args, ctx),
        "remove" => remove(args, ctx),
        "default" => default(args, ctx),
        "clear-default" => {
            let version = ctx.personas.state().clear()?;
            Ok(json!({ "action": "clear-default", "default": null, "version": version }))
        }
        other => Err(CommandError::new(
            ErrorCode::UnknownSubcommand,
            format!("unknown persona subcommand: {other}"),
        )),
    }
}

fn persona_id<'a>(args: &'a ParsedArgs) -> Result<&'a str, CommandError> {
    args.arg(1)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| CommandError::missing_argument("persona id"))
}

fn list(ctx: &CommandContext) -> CommandResult {
    let personas = ctx.personas.list()?;
    let state = ctx.personas.state().read()?;
    Ok(json!({
        "action": "list",
        "personas": personas,
        "default": state.id,
        "version": state.version,
    }))
}

fn add(args: &ParsedArgs, ctx: &CommandContext) -> CommandResult {
    let id = persona_id(args)?;
    let mut persona = Persona::new(id, args.flag("name").unwrap_or(id));
    if let Some(email) = args.flag("email") {
        persona = persona.with_email(email);
    }
    let replaced = ctx.personas.put(&persona)?;
    tracing::debug!(persona = id, replaced, "persona stored");
    Ok(json!({ "action": "add", "persona": persona, "replaced": replaced }))
}

fn remove(args: &ParsedArgs, ctx: &CommandContext) -> CommandResult {
    let id = persona_id(args)?;
    if !ctx.personas.remove(id)? {
        return Err(CommandError::entity_not_found("persona", id));
    }
    Ok(json!({ "action": "remove", "id": id }))
}

fn default(args: &ParsedArgs, ctx: &CommandContext) -> CommandResult {
    let state = ctx.personas.state();
    let Some(id) = args.arg(1) else {
        let current = state.read()?;
        return Ok(json!({ "action": "default", "default": current.id, "version": current.version }));
    };
    if !ctx.personas.exists(id)? {
        return Err(CommandError::entity_not_found("persona", id));
    }
    let version = state.set(id)?;
    Ok(json!({ "action": "default", "default": id, "version": version, "changed": true }))
}

fn render_persona(data: &Value, out: &mut dyn Write) -> io::Result<()> {
    match data["action"].as_str().unwrap_or_default() {
        "list" => {
            let personas = data["personas"].as_array().map(Vec::as_slice).unwrap_or_default();
            if personas.is_empty() {
                return writeln!(out, "{}", "No personas.".dimmed());
            }
            for p in personas {
                let is_default = p["id"] == data["default"];
                let marker = if is_default { "*".green().bold().to_string() } else { " ".to_string() };
                let email = p.get("email").map(|e| format!(" <{}>", scalar(e))).unwrap_or_default();
                writeln!(out, "{marker} {} {}{}", field(p, "id").yellow(), field(p, "name"), email.dimmed())?;
            }
            Ok(())
        }
        "add" => {
            let verb = if data["replaced"] == true { "Updated" } else { "Added" };
            ok_line(out, &format!("{verb} persona {}", field(&data["persona"], "id").yellow()))
        }
        "remove" => ok_line(out, &format!("Removed persona {}", field(data, "id").yellow())),
        "clear-default" => ok_line(out, "Default persona cleared"),
        _ => match data["default"].as_str() {
            Some(id) if data["changed"] == true => {
                ok_line(out, &format!("Default persona is now {}", id.yellow()))
            }
            Some(id) => writeln!(out, "Default persona: {}", id.yellow()),
            None => writeln!(out, "{}", "No default persona.".dimmed()),
        },
    }
}

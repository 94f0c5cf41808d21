use std::io::{self, Write};

use colored::Colorize;
use serde_json::{json, Value};

use crate::args::ParsedArgs;
use crate::context::{display_path, CommandContext};
use crate::error::CommandError;
use crate::metadata::{self, MetadataEdit};
use crate::registry::Command;
use crate::render::{field, ok_line, scalar};
use crate::result::CommandResult;

pub fn commands() -> Vec<Command> {
    vec![Command {
        name: "meta",
        version: "1.0.0",
        usage: "meta [path] [--title=<text>] [--description=<text>] [--author=<persona>] [--clear=<key>]",
        summary: "Show or edit the metadata of a file or folder",
        mutates: true,
        execute: meta,
        render: Some(render_meta),
    }]
}

/// A flag that must carry a value when present.
fn value<'a>(args: &'a ParsedArgs, name: &str) -> Result<Option<&'a str>, CommandError> {
    match (args.has(name), args.flag(name)) {
        (true, None) => Err(CommandError::missing_argument(&format!("value for --{name}"))),
        (_, value) => Ok(value),
    }
}

fn meta(args: &ParsedArgs, ctx: &mut CommandContext) -> CommandResult {
    let resource = ctx.locate(args.arg(0).unwrap_or(""))?;
    let id = resource.id;
    let pod = &ctx.pod;

    let mut edit = MetadataEdit::new();
    if let Some(title) = value(args, "title")? {
        edit.set(metadata::TITLE, Value::String(title.to_string()));
    }
    if let Some(description) = value(args, "description")? {
        edit.set(metadata::DESCRIPTION, Value::String(description.to_string()));
    }
    if let Some(author) = value(args, "author")? {
        edit.author(&ctx.personas, author)?;
    }
    if let Some(key) = value(args, "clear")? {
        edit.clear(key);
    }
    if !edit.is_empty() {
        edit.apply(pod, &id)?;
    }
    let changed = edit.changed();
    let cleared = edit.cleared();

    let current = metadata::read(pod, &id)?;
    let author = match current.get(metadata::AUTHOR).and_then(Value::as_str) {
        Some(persona) => ctx.personas.get(persona)?,
        None => None,
    };
    Ok(json!({
        "id": id,
        "path": display_path(pod.base_url(), &id),
        "metadata": current,
        "author": author,
        "changed": changed,
        "cleared": cleared,
    }))
}

fn render_meta(data: &Value, out: &mut dyn Write) -> io::Result<()> {
    for key in data["changed"].as_array().map(Vec::as_slice).unwrap_or_default() {
        ok_line(out, &format!("Set {}", scalar(key).bold()))?;
    }
    for key in data["cleared"].as_array().map(Vec::as_slice).unwrap_or_default() {
        ok_line(out, &format!("Cleared {}", scalar(key).bold()))?;
    }
    writeln!(out, "{}", field(data, "path").yellow())?;
    let meta = data["metadata"].as_object();
    match meta.filter(|m| !m.is_empty()) {
        None => writeln!(out, "  {}", "(no metadata)".dimmed()),
        Some(meta) => {
            for (key, value) in meta {
                if key == metadata::AUTHOR && data["author"].is_object() {
                    writeln!(
                        out,
                        "  {key}: {} ({})",
                        scalar(value),
                        field(&data["author"], "name")
                    )?;
                } else {
                    writeln!(out, "  {key}: {}", scalar(value))?;
                }
            }
            Ok(())
        }
    }
}

//! Navigation and file commands.

use std::io::{self, Write};

use chrono::SecondsFormat;
use colored::Colorize;
use serde_json::{json, Value};

use pod_path::parent_id;
use pod_protocol::{reason, Request, Response};
use pod_types::Resource;

use crate::args::ParsedArgs;
use crate::context::{display_path, CommandContext};
use crate::error::{CommandError, ErrorCode};
use crate::registry::Command;
use crate::render::{entry_name, field, ok_line, scalar};
use crate::result::CommandResult;

pub fn commands() -> Vec<Command> {
    vec![
        Command {
            name: "pwd",
            version: "1.0.0",
            usage: "pwd",
            summary: "Show the current location",
            mutates: false,
            execute: pwd,
            render: Some(render_location),
        },
        Command {
            name: "cd",
            version: "1.0.0",
            usage: "cd [path]",
            summary: "Change the current folder (no path: the pod root)",
            mutates: false,
            execute: cd,
            render: Some(render_nothing),
        },
        Command {
            name: "ls",
            version: "1.0.0",
            usage: "ls [path]",
            summary: "List the contents of a folder",
            mutates: false,
            execute: ls,
            render: Some(render_listing),
        },
        Command {
            name: "cat",
            version: "1.0.0",
            usage: "cat <path>",
            summary: "Print the content of a file",
            mutates: false,
            execute: cat,
            render: Some(render_body),
        },
        Command {
            name: "info",
            version: "1.0.0",
            usage: "info [path]",
            summary: "Show the stored attributes of a file or folder",
            mutates: false,
            execute: info,
            render: Some(render_info),
        },
        Command {
            name: "write",
            version: "1.0.0",
            usage: "write <path> <content...> [--type=<mime>]",
            summary: "Create or replace a file",
            mutates: true,
            execute: write,
            render: Some(render_written),
        },
        Command {
            name: "touch",
            version: "1.0.0",
            usage: "touch <path>",
            summary: "Create an empty file, or refresh the timestamp of an existing one",
            mutates: true,
            execute: touch,
            render: Some(render_written),
        },
        Command {
            name: "mkdir",
            version: "1.0.0",
            usage: "mkdir <path> [--parents]",
            summary: "Create a folder (--parents: and any missing ancestors)",
            mutates: true,
            execute: mkdir,
            render: Some(render_created),
        },
        Command {
            name: "rm",
            version: "1.0.0",
            usage: "rm <path> [--recursive]",
            summary: "Delete a file or an empty folder (--recursive: a folder and its contents)",
            mutates: true,
            execute: rm,
            render: Some(render_removed),
        },
    ]
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn required<'a>(args: &'a ParsedArgs, index: usize, what: &str) -> Result<&'a str, CommandError> {
    args.arg(index)
        .ok_or_else(|| CommandError::missing_argument(what))
}

/// Send a request through the handler, turning failure responses into errors.
fn request(ctx: &CommandContext, id: &str, request: &Request) -> Result<Response, CommandError> {
    let response = ctx.pod.handle_request(id, request);
    if response.is_success() {
        Ok(response)
    } else {
        Err(CommandError::from_response(&response))
    }
}

/// Resolve a path that must name a file, not a folder.
fn file_target(ctx: &CommandContext, path: &str) -> Result<String, CommandError> {
    let id = ctx.resolve(path)?;
    if id.ends_with('/') || ctx.pod.exists(&format!("{id}/"))? {
        return Err(CommandError::new(
            ErrorCode::NotAFile,
            format!("is a folder: {path}"),
        ));
    }
    Ok(id)
}

fn updated(resource: &Resource) -> String {
    resource
        .core
        .updated
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn size(resource: &Resource) -> usize {
    resource.core.body.as_ref().map_or(0, String::len)
}

fn location(ctx: &CommandContext, id: &str) -> Value {
    json!({ "location": id, "path": display_path(ctx.pod.base_url(), id) })
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn pwd(_args: &ParsedArgs, ctx: &mut CommandContext) -> CommandResult {
    Ok(location(ctx, &ctx.current))
}

fn cd(args: &ParsedArgs, ctx: &mut CommandContext) -> CommandResult {
    let target = ctx.locate_container(args.arg(0).unwrap_or("/"))?;
    tracing::debug!(from = %ctx.current, to = %target.id, "changing location");
    ctx.current = target.id;
    Ok(location(ctx, &ctx.current))
}

fn ls(args: &ParsedArgs, ctx: &mut CommandContext) -> CommandResult {
    let dir = ctx.locate_container(args.arg(0).unwrap_or(""))?;
    let mut entries = Vec::new();
    for child in ctx.pod.list_children(&dir.id)? {
        let Some(resource) = ctx.pod.resource(&child)? else {
            continue;
        };
        let name = child.strip_prefix(dir.id.as_str()).unwrap_or(&child).to_string();
        entries.push(json!({
            "name": name,
            "id": child,
            "kind": resource.kind().as_str(),
            "contentType": resource.core.content_type,
            "size": size(&resource),
            "updated": updated(&resource),
        }));
    }
    let mut data = location(ctx, &dir.id);
    data["entries"] = Value::Array(entries);
    Ok(data)
}

fn cat(args: &ParsedArgs, ctx: &mut CommandContext) -> CommandResult {
    let path = required(args, 0, "path")?;
    let resource = ctx.locate(path)?;
    if resource.is_container() {
        return Err(CommandError::new(
            ErrorCode::NotAFile,
            format!("is a folder: {path}"),
        ));
    }
    let response = request(ctx, &resource.id, &Request::get())?;
    Ok(json!({
        "id": resource.id,
        "contentType": response.content_type(),
        "body": response.body,
    }))
}

fn info(args: &ParsedArgs, ctx: &mut CommandContext) -> CommandResult {
    let resource = ctx.locate(args.arg(0).unwrap_or(""))?;
    let mut data = location(ctx, &resource.id);
    data["id"] = json!(resource.id);
    data["kind"] = json!(resource.kind().as_str());
    data["contentType"] = json!(resource.core.content_type);
    data["parentId"] = json!(resource.core.parent_id);
    data["updated"] = json!(updated(&resource));
    data["size"] = json!(size(&resource));
    data["metadata"] = json!(resource.extensions());
    if resource.is_container() {
        data["children"] = json!(ctx.pod.list_children(&resource.id)?.len());
    }
    Ok(data)
}

fn write(args: &ParsedArgs, ctx: &mut CommandContext) -> CommandResult {
    let path = required(args, 0, "path")?;
    let content = args
        .rest(1)
        .ok_or_else(|| CommandError::missing_argument("content"))?;
    let id = file_target(ctx, path)?;
    let existed = ctx.pod.exists(&id)?;

    let mut put = Request::put(Some(content.clone()));
    if let Some(content_type) = args.flag("type") {
        put = put.with_content_type(content_type);
    }
    request(ctx, &id, &put)?;

    let mut data = location(ctx, &id);
    data["id"] = json!(id);
    data["bytes"] = json!(content.len());
    data["created"] = json!(!existed);
    Ok(data)
}

fn touch(args: &ParsedArgs, ctx: &mut CommandContext) -> CommandResult {
    let path = required(args, 0, "path")?;
    let id = file_target(ctx, path)?;

    let (put, created) = match ctx.pod.resource(&id)? {
        Some(existing) => (
            Request::put(existing.core.body.clone())
                .with_content_type(existing.core.content_type.as_str()),
            false,
        ),
        None => (Request::put(Some(String::new())), true),
    };
    request(ctx, &id, &put)?;

    let resource = ctx.pod.resource(&id)?;
    let mut data = location(ctx, &id);
    data["id"] = json!(id);
    data["bytes"] = json!(resource.as_ref().map_or(0, size));
    data["created"] = json!(created);
    Ok(data)
}

fn mkdir(args: &ParsedArgs, ctx: &mut CommandContext) -> CommandResult {
    let path = required(args, 0, "path")?;
    let mut id = ctx.resolve(path)?;
    if !id.ends_with('/') {
        id.push('/');
    }

    let mut targets = vec![id.clone()];
    if args.flag_bool("parents") {
        let mut cursor = parent_id(&id, ctx.pod.base());
        while let Some(parent) = cursor {
            if ctx.pod.exists(&parent)? {
                break;
            }
            cursor = parent_id(&parent, ctx.pod.base());
            targets.push(parent);
        }
        targets.reverse();
    }

    // A folder may not share its name with a file, at any level created.
    for target in &targets {
        let object = target.trim_end_matches('/');
        if ctx.pod.exists(object)? {
            return Err(CommandError::new(
                ErrorCode::NotAContainer,
                format!("not a folder: {}", display_path(ctx.pod.base_url(), object)),
            ));
        }
    }

    let mut created = Vec::new();
    for target in targets {
        if ctx.pod.exists(&target)? {
            continue;
        }
        request(ctx, &target, &Request::put(None))?;
        created.push(target);
    }

    let mut data = location(ctx, &id);
    data["id"] = json!(id);
    data["created"] = json!(created);
    Ok(data)
}

fn rm(args: &ParsedArgs, ctx: &mut CommandContext) -> CommandResult {
    let path = required(args, 0, "path")?;
    let resource = ctx.locate(path)?;
    if ctx.pod.is_root(&resource.id) {
        return Err(CommandError::new(
            ErrorCode::MethodNotAllowed,
            reason::ROOT_NOT_DELETABLE,
        ));
    }
    if resource.is_container()
        && !args.flag_bool("recursive")
        && !ctx.pod.list_children(&resource.id)?.is_empty()
    {
        return Err(CommandError::new(
            ErrorCode::ContainerNotEmpty,
            format!("folder not empty: {path} (use --recursive)"),
        ));
    }

    let mut removed = Vec::new();
    remove_tree(ctx, &resource.id, &mut removed)?;

    // Never leave the current location pointing at a deleted folder.
    if resource.is_container() && ctx.current.starts_with(resource.id.as_str()) {
        ctx.current = parent_id(&resource.id, ctx.pod.base())
            .unwrap_or_else(|| ctx.pod.base_url().to_string());
    }

    let paths: Vec<String> = removed
        .iter()
        .map(|id| display_path(ctx.pod.base_url(), id))
        .collect();
    Ok(json!({ "removed": removed, "paths": paths }))
}

/// Delete `id` after its descendants, children first.
fn remove_tree(ctx: &CommandContext, id: &str, removed: &mut Vec<String>) -> Result<(), CommandError> {
    if id.ends_with('/') {
        for child in ctx.pod.list_children(id)? {
            remove_tree(ctx, &child, removed)?;
        }
    }
    request(ctx, id, &Request::delete())?;
    removed.push(id.to_string());
    Ok(())
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn render_nothing(_data: &Value, _out: &mut dyn Write) -> io::Result<()> {
    Ok(())
}

fn render_location(data: &Value, out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "{}", field(data, "path"))
}

fn render_listing(data: &Value, out: &mut dyn Write) -> io::Result<()> {
    let entries = data["entries"].as_array().map(Vec::as_slice).unwrap_or_default();
    if entries.is_empty() {
        return writeln!(out, "{}", "(empty)".dimmed());
    }
    for entry in entries {
        let container = entry["kind"] == "container";
        let name = format!("{:<32}", field(entry, "name"));
        writeln!(
            out,
            "{} {:>8}  {}",
            entry_name(&name, container),
            field(entry, "size"),
            field(entry, "contentType").dimmed()
        )?;
    }
    Ok(())
}

fn render_body(data: &Value, out: &mut dyn Write) -> io::Result<()> {
    match data["body"].as_str() {
        Some(body) if body.ends_with('\n') => write!(out, "{body}"),
        Some(body) => writeln!(out, "{body}"),
        None => Ok(()),
    }
}

fn render_info(data: &Value, out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "{}", field(data, "id").bold())?;
    for (label, key) in [
        ("kind", "kind"),
        ("type", "contentType"),
        ("parent", "parentId"),
        ("updated", "updated"),
        ("size", "size"),
        ("children", "children"),
    ] {
        if data.get(key).is_some() {
            writeln!(out, "  {:<9} {}", format!("{label}:"), field(data, key))?;
        }
    }
    if let Some(meta) = data["metadata"].as_object().filter(|m| !m.is_empty()) {
        writeln!(out, "  {}", "metadata:".cyan())?;
        for (key, value) in meta {
            writeln!(out, "    {key}: {}", scalar(value))?;
        }
    }
    Ok(())
}

fn render_written(data: &Value, out: &mut dyn Write) -> io::Result<()> {
    let verb = if data["created"] == true { "Created" } else { "Updated" };
    ok_line(out, &format!("{verb} {} ({} bytes)", field(data, "path").yellow(), field(data, "bytes")))
}

fn render_created(data: &Value, out: &mut dyn Write) -> io::Result<()> {
    let created = data["created"].as_array().map(Vec::as_slice).unwrap_or_default();
    if created.is_empty() {
        return writeln!(out, "{} already exists", field(data, "path").yellow());
    }
    for id in created {
        ok_line(out, &format!("Created folder {}", scalar(id).yellow()))?;
    }
    Ok(())
}

fn render_removed(data: &Value, out: &mut dyn Write) -> io::Result<()> {
    for path in data["paths"].as_array().map(Vec::as_slice).unwrap_or_default() {
        ok_line(out, &format!("Removed {}", scalar(path).yellow()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::context::ExecOptions;
    use crate::error::ErrorCode;
    use crate::registry::Registry;
    use crate::testing::{context, context_with, write, Capture};
    use crate::CommandContext;
    use crate::CommandResult;
    use pod_protocol::PodConfig;
    use serde_json::json;

    const BASE: &str = "https://pod.example/";

    fn run(ctx: &mut CommandContext, line: &str) -> CommandResult {
        Registry::builtin().execute(line, ctx, ExecOptions::silent())
    }

    fn rendered(ctx: &mut CommandContext, out: &Capture, line: &str) -> String {
        out.clear();
        let _ = Registry::builtin().execute(line, ctx, ExecOptions::default());
        out.text()
    }

    fn code(result: CommandResult) -> ErrorCode {
        result.unwrap_err().code
    }

    // -----------------------------------------------------------------------
    // pwd / cd
    // -----------------------------------------------------------------------

    #[test]
    fn pwd_at_root() {
        let (mut ctx, out) = context();
        let data = run(&mut ctx, "pwd").unwrap();
        assert_eq!(data, json!({"location": BASE, "path": "/"}));
        assert_eq!(rendered(&mut ctx, &out, "pwd"), "/\n");
    }

    #[test]
    fn cd_into_folder_and_back() {
        let (mut ctx, _) = context();
        write(&ctx, "https://pod.example/a/", None);
        write(&ctx, "https://pod.example/a/b/", None);

        run(&mut ctx, "cd a").unwrap();
        assert_eq!(ctx.current, "https://pod.example/a/");
        run(&mut ctx, "cd b/").unwrap();
        assert_eq!(ctx.current, "https://pod.example/a/b/");
        run(&mut ctx, "cd ..").unwrap();
        assert_eq!(ctx.current, "https://pod.example/a/");
        run(&mut ctx, "cd").unwrap();
        assert_eq!(ctx.current, BASE);
    }

    #[test]
    fn cd_rejections() {
        let (mut ctx, _) = context();
        write(&ctx, "https://pod.example/f.txt", Some("x"));
        assert_eq!(code(run(&mut ctx, "cd nowhere")), ErrorCode::PathNotFound);
        assert_eq!(code(run(&mut ctx, "cd f.txt")), ErrorCode::NotAContainer);
        assert_eq!(code(run(&mut ctx, "cd https://evil.example/")), ErrorCode::AccessDenied);
        assert_eq!(ctx.current, BASE);
    }

    #[test]
    fn cd_above_root_stays_at_root() {
        let (mut ctx, _) = context();
        run(&mut ctx, "cd ..").unwrap();
        assert_eq!(ctx.current, BASE);
    }

    // -----------------------------------------------------------------------
    // ls
    // -----------------------------------------------------------------------

    #[test]
    fn ls_lists_children_sorted() {
        let (mut ctx, out) = context();
        write(&ctx, "https://pod.example/notes/", None);
        write(&ctx, "https://pod.example/b.txt", Some("hello"));
        write(&ctx, "https://pod.example/notes/inner.txt", Some("x"));

        let data = run(&mut ctx, "ls").unwrap();
        let names: Vec<_> = data["entries"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["b.txt", "notes/"]);
        assert_eq!(data["entries"][0]["size"], json!(5));
        assert_eq!(data["entries"][1]["kind"], json!("container"));

        let text = rendered(&mut ctx, &out, "ls notes");
        assert!(text.contains("inner.txt"));
        assert!(!text.contains("b.txt"));
    }

    #[test]
    fn ls_empty_and_errors() {
        let (mut ctx, out) = context();
        assert!(rendered(&mut ctx, &out, "ls").contains("(empty)"));
        write(&ctx, "https://pod.example/f", Some("x"));
        assert_eq!(code(run(&mut ctx, "ls f")), ErrorCode::NotAContainer);
        assert_eq!(code(run(&mut ctx, "ls ghost")), ErrorCode::PathNotFound);
    }

    // -----------------------------------------------------------------------
    // cat / info
    // -----------------------------------------------------------------------

    #[test]
    fn cat_prints_body() {
        let (mut ctx, out) = context();
        write(&ctx, "https://pod.example/hello.txt", Some("hi there"));
        let data = run(&mut ctx, "cat hello.txt").unwrap();
        assert_eq!(data["body"], json!("hi there"));
        assert_eq!(data["contentType"], json!("text/plain"));
        assert_eq!(rendered(&mut ctx, &out, "cat hello.txt"), "hi there\n");
    }

    #[test]
    fn cat_rejections() {
        let (mut ctx, _) = context();
        write(&ctx, "https://pod.example/d/", None);
        assert_eq!(code(run(&mut ctx, "cat")), ErrorCode::MissingArgument);
        assert_eq!(code(run(&mut ctx, "cat d")), ErrorCode::NotAFile);
        assert_eq!(code(run(&mut ctx, "cat missing.txt")), ErrorCode::PathNotFound);
    }

    #[test]
    fn info_describes_resource() {
        let (mut ctx, out) = context();
        write(&ctx, "https://pod.example/d/", None);
        write(&ctx, "https://pod.example/d/a.txt", Some("abc"));

        let data = run(&mut ctx, "info d").unwrap();
        assert_eq!(data["kind"], json!("container"));
        assert_eq!(data["children"], json!(1));
        assert_eq!(data["parentId"], json!(BASE));

        let data = run(&mut ctx, "info d/a.txt").unwrap();
        assert_eq!(data["size"], json!(3));
        assert!(data.get("children").is_none());

        let root = run(&mut ctx, "info").unwrap();
        assert_eq!(root["parentId"], json!(null));

        let text = rendered(&mut ctx, &out, "info d/a.txt");
        assert!(text.contains("https://pod.example/d/a.txt"));
        assert!(text.contains("text/plain"));
    }

    // -----------------------------------------------------------------------
    // write / touch
    // -----------------------------------------------------------------------

    #[test]
    fn write_creates_then_replaces() {
        let (mut ctx, out) = context();
        let data = run(&mut ctx, r##"write note.md "# Title" --type=text/markdown"##).unwrap();
        assert_eq!(data["created"], json!(true));
        assert_eq!(data["bytes"], json!(7));

        let stored = ctx.pod.resource("https://pod.example/note.md").unwrap().unwrap();
        assert_eq!(stored.core.body.as_deref(), Some("# Title"));
        assert_eq!(stored.core.content_type, "text/markdown");

        let text = rendered(&mut ctx, &out, "write note.md second version");
        assert!(text.contains("Updated"));
        let stored = ctx.pod.resource("https://pod.example/note.md").unwrap().unwrap();
        assert_eq!(stored.core.body.as_deref(), Some("second version"));
        assert_eq!(stored.core.content_type, "text/plain");
    }

    #[test]
    fn write_rejections() {
        let (mut ctx, _) = context();
        write(&ctx, "https://pod.example/d/", None);
        assert_eq!(code(run(&mut ctx, "write")), ErrorCode::MissingArgument);
        assert_eq!(code(run(&mut ctx, "write a.txt")), ErrorCode::MissingArgument);
        assert_eq!(code(run(&mut ctx, "write d hello")), ErrorCode::NotAFile);
        assert_eq!(code(run(&mut ctx, "write d/ hello")), ErrorCode::NotAFile);
        assert_eq!(code(run(&mut ctx, "write nope/a.txt hi")), ErrorCode::ParentNotFound);
        assert_eq!(code(run(&mut ctx, "write a|b hi")), ErrorCode::InvalidName);
    }

    #[test]
    fn write_is_relative_to_current() {
        let (mut ctx, _) = context();
        write(&ctx, "https://pod.example/d/", None);
        run(&mut ctx, "cd d").unwrap();
        run(&mut ctx, "write x.txt hi").unwrap();
        assert!(ctx.pod.exists("https://pod.example/d/x.txt").unwrap());
    }

    #[test]
    fn touch_creates_empty_and_keeps_existing() {
        let (mut ctx, _) = context();
        let data = run(&mut ctx, "touch empty.txt").unwrap();
        assert_eq!(data["created"], json!(true));
        let stored = ctx.pod.resource("https://pod.example/empty.txt").unwrap().unwrap();
        assert_eq!(stored.core.body.as_deref(), Some(""));

        run(&mut ctx, "write keep.md body --type=text/markdown").unwrap();
        let before = ctx.pod.resource("https://pod.example/keep.md").unwrap().unwrap();
        let data = run(&mut ctx, "touch keep.md").unwrap();
        assert_eq!(data["created"], json!(false));
        let after = ctx.pod.resource("https://pod.example/keep.md").unwrap().unwrap();
        assert_eq!(after.core.body.as_deref(), Some("body"));
        assert_eq!(after.core.content_type, "text/markdown");
        assert!(after.core.updated >= before.core.updated);
    }

    // -----------------------------------------------------------------------
    // mkdir
    // -----------------------------------------------------------------------

    #[test]
    fn mkdir_single_and_existing() {
        let (mut ctx, out) = context();
        let data = run(&mut ctx, "mkdir docs").unwrap();
        assert_eq!(data["created"], json!(["https://pod.example/docs/"]));
        let stored = ctx.pod.resource("https://pod.example/docs/").unwrap().unwrap();
        assert!(stored.is_container());

        let data = run(&mut ctx, "mkdir docs/").unwrap();
        assert_eq!(data["created"], json!([]));
        assert!(rendered(&mut ctx, &out, "mkdir docs").contains("already exists"));
    }

    #[test]
    fn mkdir_needs_parent_unless_parents_flag() {
        let (mut ctx, _) = context();
        assert_eq!(code(run(&mut ctx, "mkdir a/b/c")), ErrorCode::ParentNotFound);

        let data = run(&mut ctx, "mkdir a/b/c --parents").unwrap();
        assert_eq!(
            data["created"],
            json!([
                "https://pod.example/a/",
                "https://pod.example/a/b/",
                "https://pod.example/a/b/c/"
            ])
        );
        assert_eq!(
            ctx.pod.list_children("https://pod.example/a/b/").unwrap(),
            vec!["https://pod.example/a/b/c/"]
        );
    }

    #[test]
    fn mkdir_refuses_name_of_existing_file() {
        let (mut ctx, _) = context();
        write(&ctx, "https://pod.example/d", Some("x"));
        let err = run(&mut ctx, "mkdir d").unwrap_err();
        assert_eq!(err.code, ErrorCode::NotAContainer);
        assert_eq!(err.message, "not a folder: /d");
        assert!(!ctx.pod.exists("https://pod.example/d/").unwrap());

        assert_eq!(code(run(&mut ctx, "mkdir d/e --parents")), ErrorCode::NotAContainer);
        assert!(!ctx.pod.exists("https://pod.example/d/e/").unwrap());
        assert_eq!(ctx.pod.list_children(ctx.pod.base_url()).unwrap(), vec!["https://pod.example/d"]);
    }

    // -----------------------------------------------------------------------
    // rm
    // -----------------------------------------------------------------------

    #[test]
    fn rm_file() {
        let (mut ctx, _) = context();
        write(&ctx, "https://pod.example/f.txt", Some("x"));
        let data = run(&mut ctx, "rm f.txt").unwrap();
        assert_eq!(data["removed"], json!(["https://pod.example/f.txt"]));
        assert!(!ctx.pod.exists("https://pod.example/f.txt").unwrap());
        assert_eq!(code(run(&mut ctx, "rm f.txt")), ErrorCode::PathNotFound);
    }

    #[test]
    fn rm_refuses_non_empty_folder_without_recursive() {
        let (mut ctx, _) = context();
        write(&ctx, "https://pod.example/d/", None);
        write(&ctx, "https://pod.example/d/x", Some("x"));
        assert_eq!(code(run(&mut ctx, "rm d")), ErrorCode::ContainerNotEmpty);
        assert!(ctx.pod.exists("https://pod.example/d/x").unwrap());

        let data = run(&mut ctx, "rm d --recursive").unwrap();
        assert_eq!(
            data["removed"],
            json!(["https://pod.example/d/x", "https://pod.example/d/"])
        );
        assert!(ctx.pod.list_children(BASE).unwrap().is_empty());
    }

    #[test]
    fn rm_recursive_works_when_core_rejects_non_empty_delete() {
        let config = PodConfig {
            reject_non_empty_delete: true,
            ..PodConfig::default()
        };
        let (mut ctx, _) = context_with(config);
        run(&mut ctx, "mkdir a/b --parents").unwrap();
        run(&mut ctx, "write a/b/f hi").unwrap();
        run(&mut ctx, "rm a --recursive").unwrap();
        assert!(!ctx.pod.exists("https://pod.example/a/b/f").unwrap());
        assert!(!ctx.pod.exists("https://pod.example/a/").unwrap());
    }

    #[test]
    fn rm_empty_folder_and_root() {
        let (mut ctx, _) = context();
        write(&ctx, "https://pod.example/d/", None);
        run(&mut ctx, "rm d").unwrap();
        assert!(!ctx.pod.exists("https://pod.example/d/").unwrap());
        assert_eq!(code(run(&mut ctx, "rm /")), ErrorCode::MethodNotAllowed);
        assert_eq!(code(run(&mut ctx, "rm")), ErrorCode::MissingArgument);
    }

    #[test]
    fn rm_current_folder_moves_up() {
        let (mut ctx, _) = context();
        run(&mut ctx, "mkdir a/b --parents").unwrap();
        run(&mut ctx, "cd a/b").unwrap();
        run(&mut ctx, "rm /a --recursive").unwrap();
        assert_eq!(ctx.current, BASE);
    }
}

use std::collections::BTreeMap;
use std::io::Write;

use crate::args::{tokenize, ParsedArgs};
use crate::commands;
use crate::context::{CommandContext, ExecOptions};
use crate::error::{CommandError, ErrorCode};
use crate::render::{self, RenderFn};
use crate::result::{envelope, CommandResult};

/// Runs a command against parsed arguments.
pub type ExecuteFn = fn(&ParsedArgs, &mut CommandContext) -> CommandResult;

/// A named, versioned command.
#[derive(Clone, Copy)]
pub struct Command {
    pub name: &'static str,
    pub version: &'static str,
    pub usage: &'static str,
    pub summary: &'static str,
    /// Whether the command can change stored rows.
    pub mutates: bool,
    pub execute: ExecuteFn,
    /// Human rendering of the data payload; the generic renderer is used
    /// when absent.
    pub render: Option<RenderFn>,
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("mutates", &self.mutates)
            .finish_non_exhaustive()
    }
}

/// Name to command lookup plus the dispatch loop around it.
#[derive(Debug, Default)]
pub struct Registry {
    commands: BTreeMap<&'static str, Command>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in command.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for command in commands::builtin() {
            registry.register(command);
        }
        registry
    }

    /// Add a command, replacing any previous one with the same name.
    pub fn register(&mut self, command: Command) -> Option<Command> {
        self.commands.insert(command.name, command)
    }

    pub fn get(&self, name: &str) -> Option<&Command> {
        self.commands.get(name)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.commands.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Command> {
        self.commands.values()
    }

    /// Tokenize and run one command line.
    pub fn execute(&self, line: &str, ctx: &mut CommandContext, opts: ExecOptions) -> CommandResult {
        let mut tokens = tokenize(line).into_iter();
        let Some(name) = tokens.next() else {
            return self.finish(None, Err(CommandError::missing_argument("command")), ctx, opts);
        };
        self.run(&name, ParsedArgs::parse(tokens), ctx, opts)
    }

    /// Run a command by name with already-parsed arguments.
    ///
    /// A `--json` flag on the arguments switches to JSON output just like
    /// [`ExecOptions::json`].
    pub fn run(
        &self,
        name: &str,
        args: ParsedArgs,
        ctx: &mut CommandContext,
        mut opts: ExecOptions,
    ) -> CommandResult {
        opts.json |= args.flag_bool("json");

        let Some(command) = self.get(name) else {
            let err = CommandError::new(
                ErrorCode::UnknownCommand,
                format!("unknown command: {name} (try 'help')"),
            );
            return self.finish(None, Err(err), ctx, opts);
        };

        tracing::debug!(command = command.name, args = ?args.positional, "executing command");
        let result = (command.execute)(&args, ctx);
        if let Err(e) = &result {
            tracing::debug!(command = command.name, code = %e.code, "command failed");
        }
        self.finish(Some(command), result, ctx, opts)
    }

    fn finish(
        &self,
        command: Option<&Command>,
        result: CommandResult,
        ctx: &mut CommandContext,
        opts: ExecOptions,
    ) -> CommandResult {
        if opts.silent {
            return result;
        }
        let out: &mut dyn Write = ctx.out.as_mut();
        let written = if opts.json {
            serde_json::to_string_pretty(&envelope(&result))
                .map_err(std::io::Error::from)
                .and_then(|text| writeln!(out, "{text}"))
        } else {
            match &result {
                Ok(data) => {
                    let render = command.and_then(|c| c.render).unwrap_or(render::render_value);
                    render(data, out)
                }
                Err(e) => render::render_error(e, out),
            }
        };
        if let Err(e) = written.and_then(|_| out.flush()) {
            tracing::warn!(error = %e, "failed to write command output");
        }
        result
    }
}

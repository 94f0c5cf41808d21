use std::io;
use std::process::ExitCode;

use colored::Colorize;
use pod_commands::ExecOptions;

use crate::cli::Cli;
use crate::session::Session;

pub fn run_command(cli: Cli) -> anyhow::Result<ExitCode> {
    let opts = ExecOptions {
        silent: false,
        json: cli.wants_json(),
    };
    let mut session = Session::open(&cli, Box::new(io::stdout()))?;

    match cli.command.split_first() {
        Some((name, args)) => {
            let result = session.run(name, args, opts)?;
            Ok(if result.is_ok() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        None => {
            if !opts.json {
                println!(
                    "Pod at {}. Type {} for commands, {} to leave.",
                    session.context().pod.base_url().bold(),
                    "help".cyan(),
                    "exit".cyan()
                );
            }
            session.repl(io::stdin().lock(), &mut io::stdout(), opts)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

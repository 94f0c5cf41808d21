//! A pod plus the command context driving it, with optional snapshot
//! persistence.

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use colored::Colorize;

use pod_commands::persona::{PERSONAS_TABLE, STATE_TABLE};
use pod_commands::{tokenize, CommandContext, CommandResult, ExecOptions, ParsedArgs, Registry};
use pod_protocol::{Pod, PodConfig, RESOURCES_TABLE};
use pod_store::{load_snapshot, save_snapshot, InMemoryRowStore, RowStore};

use crate::cli::Cli;

/// Tables written to the snapshot file.
const SNAPSHOT_TABLES: [&str; 3] = [RESOURCES_TABLE, PERSONAS_TABLE, STATE_TABLE];

pub struct Session {
    ctx: CommandContext,
    registry: Registry,
    snapshot: Option<PathBuf>,
}

impl Session {
    pub fn open(cli: &Cli, out: Box<dyn Write + Send>) -> anyhow::Result<Self> {
        let mut config = match &cli.config {
            Some(path) => PodConfig::load(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => PodConfig::default(),
        };
        if let Some(base) = &cli.base {
            config.base_url = base.clone();
        }

        let store: Arc<dyn RowStore> = Arc::new(InMemoryRowStore::new());
        if let Some(path) = cli.snapshot.as_deref().filter(|p| p.exists()) {
            let tables = load_snapshot(store.as_ref(), path)
                .with_context(|| format!("loading snapshot {}", path.display()))?;
            tracing::info!(path = %path.display(), ?tables, "snapshot loaded");
        }

        let pod = Pod::new(store, config).context("opening pod")?;
        let ctx = CommandContext::new(Arc::new(pod)).with_output(out);
        Ok(Self {
            ctx,
            registry: Registry::builtin(),
            snapshot: cli.snapshot.clone(),
        })
    }

    pub fn context(&self) -> &CommandContext {
        &self.ctx
    }

    /// Run one command, saving the snapshot if it changed anything.
    ///
    /// The outer error is reserved for persistence failures; a failed
    /// command is reported in the returned result.
    pub fn run(
        &mut self,
        name: &str,
        args: &[String],
        opts: ExecOptions,
    ) -> anyhow::Result<CommandResult> {
        let mutates = self.registry.get(name).is_some_and(|c| c.mutates);
        let parsed = ParsedArgs::parse(args.iter().cloned());
        let result = self.registry.run(name, parsed, &mut self.ctx, opts);
        if mutates && result.is_ok() {
            self.save()?;
        }
        Ok(result)
    }

    /// Read commands line by line until end of input, `exit` or `quit`.
    pub fn repl<R: BufRead>(
        &mut self,
        input: R,
        prompt: &mut dyn Write,
        opts: ExecOptions,
    ) -> anyhow::Result<()> {
        let mut lines = input.lines();
        loop {
            if !opts.json {
                let label = format!("pod:{}>", self.ctx.display_path());
                write!(prompt, "{} ", label.green().bold())?;
                prompt.flush()?;
            }
            let Some(line) = lines.next() else {
                break;
            };
            let tokens = tokenize(&line?);
            let Some((name, args)) = tokens.split_first() else {
                continue;
            };
            if matches!(name.as_str(), "exit" | "quit") {
                break;
            }
            self.run(name, args, opts)?;
        }
        Ok(())
    }

    fn save(&self) -> anyhow::Result<()> {
        let Some(path) = &self.snapshot else {
            return Ok(());
        };
        save_snapshot(self.ctx.pod.store().as_ref(), &SNAPSHOT_TABLES, path)
            .with_context(|| format!("saving snapshot {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pod_commands::ErrorCode;
    use std::io::Cursor;
    use std::sync::Mutex;

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl Capture {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl Write for Capture {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn open(args: &[&str]) -> (Session, Capture) {
        let cli = Cli::try_parse_from(std::iter::once("pod").chain(args.iter().copied())).unwrap();
        let out = Capture::default();
        let session = Session::open(&cli, Box::new(out.clone())).unwrap();
        (session, out)
    }

    fn strings(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    // ---- one-shot ----

    #[test]
    fn run_reports_failures_as_results() {
        let (mut session, out) = open(&[]);
        let result = session.run("cat", &strings(&["nope.txt"]), ExecOptions::default()).unwrap();
        assert_eq!(result.unwrap_err().code, ErrorCode::PathNotFound);
        assert!(out.text().contains("PATH_NOT_FOUND"));
    }

    #[test]
    fn base_override() {
        let (session, _) = open(&["--base", "https://alice.pod.example/home"]);
        assert_eq!(session.context().pod.base_url(), "https://alice.pod.example/home/");
    }

    #[test]
    fn config_file_is_applied() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pod.toml");
        std::fs::write(&path, "base_url = \"https://bob.pod.example/\"\n").unwrap();
        let (session, _) = open(&["--config", path.to_str().unwrap()]);
        assert_eq!(session.context().pod.base_url(), "https://bob.pod.example/");
    }

    #[test]
    fn missing_config_is_an_error() {
        let cli = Cli::try_parse_from(["pod", "--config", "/definitely/not/here.toml"]).unwrap();
        assert!(Session::open(&cli, Box::new(Capture::default())).is_err());
    }

    // ---- snapshots ----

    #[test]
    fn snapshot_saved_after_changes_and_reloaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pod.json");
        let snapshot = path.to_str().unwrap();

        let (mut session, _) = open(&["--snapshot", snapshot]);
        session.run("pwd", &[], ExecOptions::silent()).unwrap().unwrap();
        assert!(!path.exists(), "read-only commands do not save");

        session.run("mkdir", &strings(&["docs"]), ExecOptions::silent()).unwrap().unwrap();
        session
            .run("write", &strings(&["docs/a.txt", "hello"]), ExecOptions::silent())
            .unwrap()
            .unwrap();
        session
            .run("persona", &strings(&["add", "alice"]), ExecOptions::silent())
            .unwrap()
            .unwrap();
        assert!(path.exists());

        let doc: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(
            doc["resources"]["https://pod.example/docs/a.txt"]["body"],
            serde_json::json!("hello")
        );
        assert!(doc["personas"]["alice"].is_object());

        let (mut reopened, _) = open(&["--snapshot", snapshot]);
        let data = reopened
            .run("cat", &strings(&["docs/a.txt"]), ExecOptions::silent())
            .unwrap()
            .unwrap();
        assert_eq!(data["body"], serde_json::json!("hello"));
        let children = reopened
            .context()
            .pod
            .list_children("https://pod.example/docs/")
            .unwrap();
        assert_eq!(children, vec!["https://pod.example/docs/a.txt"]);
    }

    #[test]
    fn failed_command_does_not_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pod.json");
        let (mut session, _) = open(&["--snapshot", path.to_str().unwrap()]);
        let result = session
            .run("write", &strings(&["missing/a.txt", "x"]), ExecOptions::silent())
            .unwrap();
        assert!(result.is_err());
        assert!(!path.exists());
    }

    // ---- interactive ----

    #[test]
    fn repl_runs_until_exit() {
        let (mut session, out) = open(&[]);
        let input = Cursor::new("mkdir notes\ncd notes\n\nwrite \"a b.txt\" hi there\npwd\nexit\nrm a\n");
        let mut prompt = Vec::new();
        session.repl(input, &mut prompt, ExecOptions::default()).unwrap();

        let prompts = String::from_utf8(prompt).unwrap();
        assert!(prompts.contains("pod:/>"));
        assert!(prompts.contains("pod:/notes/>"));
        assert!(out.text().contains("/notes/\n"));
        assert_eq!(session.context().current, "https://pod.example/notes/");
        assert!(session
            .context()
            .pod
            .exists("https://pod.example/notes/a%20b.txt")
            .unwrap());
    }

    #[test]
    fn repl_json_mode_has_no_prompt() {
        let (mut session, out) = open(&[]);
        let mut prompt = Vec::new();
        session
            .repl(Cursor::new("pwd\n"), &mut prompt, ExecOptions { silent: false, json: true })
            .unwrap();
        assert!(prompt.is_empty());
        let v: serde_json::Value = serde_json::from_str(&out.text()).unwrap();
        assert_eq!(v["data"]["path"], serde_json::json!("/"));
    }
}

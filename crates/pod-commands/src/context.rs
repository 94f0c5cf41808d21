use std::io::{self, Write};
use std::sync::Arc;

use pod_protocol::Pod;
use pod_types::Resource;

use crate::error::{CommandError, ErrorCode};
use crate::persona::PersonaDirectory;

/// How a command's result is presented.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExecOptions {
    /// Produce no output at all; the caller only wants the result value.
    pub silent: bool,
    /// Write the result envelope as JSON instead of rendering it.
    pub json: bool,
}

impl ExecOptions {
    pub fn silent() -> Self {
        Self {
            silent: true,
            json: false,
        }
    }

    pub fn json() -> Self {
        Self {
            silent: false,
            json: true,
        }
    }
}

/// Everything a command may touch while it runs.
pub struct CommandContext {
    pub pod: Arc<Pod>,
    /// Current location; always a container identifier.
    pub current: String,
    pub personas: PersonaDirectory,
    pub out: Box<dyn Write + Send>,
}

impl CommandContext {
    /// A context positioned at the pod root, writing to stdout.
    pub fn new(pod: Arc<Pod>) -> Self {
        let personas = PersonaDirectory::new(Arc::clone(pod.store()));
        let current = pod.base_url().to_string();
        Self {
            pod,
            current,
            personas,
            out: Box::new(io::stdout()),
        }
    }

    pub fn with_output(mut self, out: Box<dyn Write + Send>) -> Self {
        self.out = out;
        self
    }

    /// Current location relative to the base, with a leading `/`.
    pub fn display_path(&self) -> String {
        display_path(self.pod.base_url(), &self.current)
    }

    /// Resolve a user-typed path to a canonical identifier.
    ///
    /// The resolved URL goes through the same normalization as requests, so
    /// names are validated here rather than at the first failed write.
    pub fn resolve(&self, input: &str) -> Result<String, CommandError> {
        let resolved = self.pod.resolve(input, &self.current)?;
        Ok(self.pod.normalize(&resolved)?)
    }

    /// Resolve a path and load the resource it names.
    ///
    /// A path typed without its trailing `/` still finds the container.
    pub fn locate(&self, input: &str) -> Result<Resource, CommandError> {
        let id = self.resolve(input)?;
        if let Some(resource) = self.pod.resource(&id)? {
            return Ok(resource);
        }
        if !id.ends_with('/') {
            if let Some(resource) = self.pod.resource(&format!("{id}/"))? {
                return Ok(resource);
            }
        }
        Err(CommandError::path_not_found(input))
    }

    /// Like [`locate`](Self::locate) but requires a container.
    pub fn locate_container(&self, input: &str) -> Result<Resource, CommandError> {
        let resource = self.locate(input)?;
        if !resource.is_container() {
            return Err(CommandError::new(
                ErrorCode::NotAContainer,
                format!("not a folder: {input}"),
            ));
        }
        Ok(resource)
    }
}

impl std::fmt::Debug for CommandContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandContext")
            .field("pod", &self.pod)
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}

/// `id` relative to `base`, with a leading `/`.
pub fn display_path(base: &str, id: &str) -> String {
    match id.strip_prefix(base) {
        Some(rest) => format!("/{rest}"),
        None => id.to_string(),
    }
}
